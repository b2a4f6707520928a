//! Payment endpoints: checkout creation, status polling and the provider
//! webhook.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{error, info};

use super::{ApiResponse, AppState};
use crate::core::payment::{InitiatePayment, PaymentInitiated, ProviderEvent};
use crate::entities::{PaymentEventModel, PaymentModel};
use crate::errors::Result;

#[derive(Debug, Serialize)]
pub struct PaymentDetail {
    pub transaction: PaymentModel,
    pub events: Vec<PaymentEventModel>,
}

/// POST /payments
pub async fn create_payment(
    State(state): State<Arc<AppState>>,
    Json(input): Json<InitiatePayment>,
) -> Result<(StatusCode, Json<ApiResponse<PaymentInitiated>>)> {
    let result = crate::core::payment::initiate(
        &state.db,
        state.checkout.as_ref(),
        &state.settings.public_base_url,
        input,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Payment created", result)),
    ))
}

/// GET /payments/:reference status poll. Refreshes the stored state from
/// the provider before answering.
pub async fn get_payment(
    State(state): State<Arc<AppState>>,
    Path(reference): Path<String>,
) -> Result<Json<ApiResponse<PaymentDetail>>> {
    let transaction =
        crate::core::payment::poll_status(&state.db, state.checkout.as_ref(), &reference).await?;
    let events = crate::core::payment::history(&state.db, &reference).await?;

    Ok(Json(ApiResponse::ok(
        "Payment status",
        PaymentDetail {
            transaction,
            events,
        },
    )))
}

/// POST /payments/webhook/wave, the inbound provider webhook.
///
/// Always acknowledges with 200, even when processing fails internally;
/// anything else would put the provider into an endless retry loop. Failures
/// are logged for operator follow-up instead.
pub async fn wave_webhook(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    match ProviderEvent::from_webhook(&body) {
        Some(event) => match crate::core::payment::reconcile(&state.db, &event).await {
            Ok(outcome) => {
                info!(reference = %event.reference, ?outcome, "webhook processed");
            }
            Err(e) => {
                error!(reference = %event.reference, error = %e, "webhook processing failed");
            }
        },
        None => {
            info!("webhook body carried no client reference, ignoring");
        }
    }

    (
        StatusCode::OK,
        Json(json!({"success": true, "message": "acknowledged"})),
    )
}
