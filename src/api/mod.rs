//! HTTP API layer - axum routers, handlers and response envelopes.
//!
//! Handlers translate requests into `core` calls and wrap results in the
//! uniform `{success, message, ...}` envelope. All domain failures surface
//! through [`crate::errors::Error`], which carries its own HTTP mapping.

pub mod groups;
pub mod investments;
pub mod payments;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Settings;
use crate::gateway::{CheckoutProvider, Notifier};

/// Shared application state handed to every handler.
pub struct AppState {
    pub db: DatabaseConnection,
    pub checkout: Arc<dyn CheckoutProvider>,
    pub notifier: Arc<dyn Notifier>,
    pub settings: Settings,
}

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    let state = Arc::new(state);

    Router::new()
        .route(
            "/groups",
            post(groups::create_group).get(groups::list_groups),
        )
        .route(
            "/groups/:id",
            get(groups::get_group)
                .put(groups::update_group)
                .delete(groups::delete_group),
        )
        .route("/groups/:id/status", put(groups::set_status))
        .route(
            "/investments/validate-group",
            post(investments::validate_group),
        )
        .route("/investments/group/:id", get(investments::get_cycle))
        .route("/investments/group/:id/calendar", get(investments::calendar))
        .route("/investments/group/:id/stats", get(investments::stats))
        .route(
            "/investments/group/:id/wallet/history",
            get(investments::wallet_history),
        )
        .route(
            "/investments/group/:id/contribute",
            post(investments::contribute),
        )
        .route(
            "/investments/group/:id/day/:day_index",
            put(investments::set_day),
        )
        .route("/payments", post(payments::create_payment))
        .route("/payments/:reference", get(payments::get_payment))
        .route("/payments/webhook/wave", post(payments::wave_webhook))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Uniform success envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Builds a success envelope with a payload.
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// Builds a success envelope without a payload.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }
}

/// Pagination metadata returned by list endpoints.
#[derive(Debug, Serialize)]
pub struct PageMeta {
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
}

/// A page of items plus its metadata.
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pagination: PageMeta,
}

impl<T: Serialize> Paginated<T> {
    pub fn new(items: Vec<T>, page: u64, per_page: u64, total: u64) -> Self {
        Self {
            items,
            pagination: PageMeta {
                page,
                per_page,
                total,
            },
        }
    }
}

/// Common page query parameters.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
}

const fn default_page() -> u64 {
    1
}

const fn default_per_page() -> u64 {
    20
}
