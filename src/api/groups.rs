//! Group registration and administration endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use super::{ApiResponse, AppState, PageQuery, Paginated};
use crate::core::group::{NewGroup, UpdateGroup};
use crate::core::membership;
use crate::entities::{
    CycleModel, GroupMemberModel, GroupModel, GroupStatus, MembershipModel,
};
use crate::errors::Result;
use crate::gateway::send_best_effort;

#[derive(Debug, Serialize)]
pub struct GroupCreated {
    pub group: GroupModel,
    pub membership: MembershipModel,
}

#[derive(Debug, Serialize)]
pub struct GroupDetail {
    pub group: GroupModel,
    pub members: Vec<GroupMemberModel>,
    pub membership: Option<MembershipModel>,
    pub progression_percent: Option<f64>,
    pub cycle: Option<CycleModel>,
}

#[derive(Debug, Deserialize)]
pub struct SetStatusBody {
    pub status: GroupStatus,
    pub actor: Option<String>,
    pub remarks: Option<String>,
}

/// POST /groups
pub async fn create_group(
    State(state): State<Arc<AppState>>,
    Json(input): Json<NewGroup>,
) -> Result<(StatusCode, Json<ApiResponse<GroupCreated>>)> {
    let president_phone = input.president.phone.clone();
    let (group, membership) = crate::core::group::create_group(&state.db, input).await?;

    // Welcome message is best-effort; registration already succeeded.
    send_best_effort(
        state.notifier.as_ref(),
        &president_phone,
        &format!(
            "Your group {} has been registered. Application reference: {}.",
            group.code, group.protocol_number
        ),
    )
    .await;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            "Group registered",
            GroupCreated { group, membership },
        )),
    ))
}

/// GET /groups
pub async fn list_groups(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ApiResponse<Paginated<GroupModel>>>> {
    let (items, total) = crate::core::group::list_groups(&state.db, query.page, query.per_page).await?;

    Ok(Json(ApiResponse::ok(
        "Groups",
        Paginated::new(items, query.page, query.per_page, total),
    )))
}

/// GET /groups/:id
pub async fn get_group(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<GroupDetail>>> {
    let group = crate::core::group::require_group(&state.db, id).await?;
    let members = crate::core::group::get_members(&state.db, id).await?;
    let record = membership::get_by_group(&state.db, id).await?;
    let progression = record.as_ref().map(membership::progression_percent);
    let cycle = crate::core::cycle::get_cycle_by_group(&state.db, id).await?;

    Ok(Json(ApiResponse::ok(
        "Group",
        GroupDetail {
            group,
            members,
            membership: record,
            progression_percent: progression,
            cycle,
        },
    )))
}

/// PUT /groups/:id
pub async fn update_group(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(patch): Json<UpdateGroup>,
) -> Result<Json<ApiResponse<GroupModel>>> {
    let updated = crate::core::group::update_group(&state.db, id, patch).await?;
    Ok(Json(ApiResponse::ok("Group updated", updated)))
}

/// PUT /groups/:id/status
pub async fn set_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<SetStatusBody>,
) -> Result<Json<ApiResponse<GroupModel>>> {
    let updated =
        crate::core::group::set_group_status(&state.db, id, body.status, body.actor, body.remarks)
            .await?;

    Ok(Json(ApiResponse::ok("Group status updated", updated)))
}

/// DELETE /groups/:id
pub async fn delete_group(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>> {
    crate::core::group::delete_group(&state.db, id).await?;
    Ok(Json(ApiResponse::message("Group deleted")))
}
