//! External collaborators: payment checkout provider and message delivery.
//!
//! Both sit behind async traits so core logic and tests never touch the
//! network. Provider failures are typed ([`GatewayError`]) and converted at
//! the call site; they never propagate as panics or raw HTTP errors.

pub mod notify;
pub mod wave;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub use notify::{FallbackNotifier, send_best_effort};
pub use wave::WaveClient;

/// Errors surfaced by a provider client.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The provider answered with a non-success HTTP status.
    #[error("provider returned {status}: {body}")]
    Provider { status: u16, body: String },

    /// The request never completed (DNS, connect, timeout).
    #[error("transport error: {0}")]
    Transport(String),

    /// The client could not be built or is misconfigured.
    #[error("gateway configuration error: {0}")]
    Config(String),
}

/// A request to open a hosted checkout session.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    /// Amount in XOF
    pub amount: i64,
    /// ISO currency code
    pub currency: String,
    /// Our transaction reference, echoed back by the provider
    pub client_reference: String,
    /// Where the provider redirects the payer on success
    pub success_url: String,
    /// Where the provider redirects the payer on failure
    pub error_url: String,
}

/// A provider-side checkout session.
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    /// Provider session id
    pub session_id: String,
    /// Hosted payment page URL to hand to the payer
    pub checkout_url: String,
    /// Raw provider response for audit
    pub raw: Value,
}

/// Current provider-side view of a checkout session.
#[derive(Debug, Clone)]
pub struct ProviderStatus {
    /// Checkout session status (`open`, `complete`, `expired`)
    pub checkout_status: Option<String>,
    /// Payment status (`processing`, `succeeded`, `cancelled`)
    pub payment_status: Option<String>,
    /// Provider transaction id, once assigned
    pub transaction_id: Option<String>,
    /// Raw provider response for audit
    pub raw: Value,
}

/// A payment provider that hosts checkout sessions.
#[async_trait]
pub trait CheckoutProvider: Send + Sync {
    /// Creates a checkout session for the given request.
    async fn create_checkout(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, GatewayError>;

    /// Fetches the current status of a session.
    async fn fetch_status(&self, session_id: &str) -> Result<ProviderStatus, GatewayError>;
}

/// A message delivery channel (WhatsApp, SMS).
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends `body` to the phone number `to`.
    async fn send(&self, to: &str, body: &str) -> Result<(), GatewayError>;
}
