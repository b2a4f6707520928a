//! Investment cycle endpoints: public lookup, read views, contribution
//! recording and the admin day override.
//!
//! Every group-scoped route requires the group to be validated; the guard
//! answers 403 with a stable code otherwise.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{ApiResponse, AppState, PageQuery, Paginated};
use crate::core::cycle::{ContributionReceipt, CycleStats, OverrideReceipt};
use crate::entities::{
    CycleDayModel, CycleModel, DayStatus, GroupModel, GroupStatus, WalletEntryModel,
};
use crate::errors::{Error, Result};
use crate::gateway::send_best_effort;
use sea_orm::DatabaseConnection;

#[derive(Debug, Deserialize)]
pub struct ValidateGroupBody {
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct ValidatedGroup {
    pub group: GroupModel,
}

#[derive(Debug, Deserialize)]
pub struct ContributeBody {
    pub date: NaiveDate,
    pub amount: i64,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetDayBody {
    pub status: DayStatus,
    pub note: Option<String>,
}

/// Loads a group and enforces the validated-status precondition shared by
/// every investment route.
async fn require_validated(db: &DatabaseConnection, id: i64) -> Result<GroupModel> {
    let group = crate::core::group::require_group(db, id).await?;
    if group.status != GroupStatus::Validated {
        return Err(Error::GroupNotValidated {
            status: group.status,
        });
    }
    Ok(group)
}

/// POST /investments/validate-group, the public lookup by registration code.
/// Issues a verification code to the president's contact on success.
pub async fn validate_group(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ValidateGroupBody>,
) -> Result<Json<ApiResponse<ValidatedGroup>>> {
    let group = crate::core::group::get_group_by_code(&state.db, &body.code)
        .await?
        .ok_or_else(|| Error::GroupNotFound {
            id: body.code.clone(),
        })?;

    if group.status != GroupStatus::Validated {
        return Err(Error::GroupNotValidated {
            status: group.status,
        });
    }

    let issued =
        crate::core::verification::issue_code(&state.db, &group.code, &group.president_phone)
            .await?;
    send_best_effort(
        state.notifier.as_ref(),
        &group.president_phone,
        &format!("Your verification code: {}", issued.code),
    )
    .await;

    Ok(Json(ApiResponse::ok(
        "Group found, verification code sent",
        ValidatedGroup { group },
    )))
}

/// GET /investments/group/:id
pub async fn get_cycle(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<CycleModel>>> {
    require_validated(&state.db, id).await?;
    let cycle = crate::core::cycle::require_cycle(&state.db, id).await?;
    Ok(Json(ApiResponse::ok("Investment cycle", cycle)))
}

/// GET /investments/group/:id/calendar
pub async fn calendar(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ApiResponse<Paginated<CycleDayModel>>>> {
    require_validated(&state.db, id).await?;
    let (items, total) =
        crate::core::cycle::calendar(&state.db, id, query.page, query.per_page).await?;

    Ok(Json(ApiResponse::ok(
        "Investment calendar",
        Paginated::new(items, query.page, query.per_page, total),
    )))
}

/// GET /investments/group/:id/stats
pub async fn stats(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<CycleStats>>> {
    require_validated(&state.db, id).await?;
    let view = crate::core::cycle::stats(&state.db, id).await?;
    Ok(Json(ApiResponse::ok("Investment statistics", view)))
}

/// GET /investments/group/:id/wallet/history
pub async fn wallet_history(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ApiResponse<Paginated<WalletEntryModel>>>> {
    require_validated(&state.db, id).await?;
    let (items, total) =
        crate::core::cycle::wallet_history(&state.db, id, query.page, query.per_page).await?;

    Ok(Json(ApiResponse::ok(
        "Wallet history",
        Paginated::new(items, query.page, query.per_page, total),
    )))
}

/// POST /investments/group/:id/contribute
pub async fn contribute(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<ContributeBody>,
) -> Result<Json<ApiResponse<ContributionReceipt>>> {
    require_validated(&state.db, id).await?;
    let receipt =
        crate::core::cycle::record_contribution(&state.db, id, body.date, body.amount, body.note)
            .await?;

    Ok(Json(ApiResponse::ok("Contribution recorded", receipt)))
}

/// PUT /investments/group/:id/day/:day_index admin override.
pub async fn set_day(
    State(state): State<Arc<AppState>>,
    Path((id, day_index)): Path<(i64, i32)>,
    Json(body): Json<SetDayBody>,
) -> Result<Json<ApiResponse<OverrideReceipt>>> {
    require_validated(&state.db, id).await?;
    let receipt =
        crate::core::cycle::set_day_status(&state.db, id, day_index, body.status, body.note)
            .await?;

    Ok(Json(ApiResponse::ok("Day status updated", receipt)))
}
