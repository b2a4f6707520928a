//! Message delivery with provider fallback.
//!
//! WhatsApp is tried first, SMS second. Notifications are always best-effort
//! for callers: [`send_best_effort`] logs a failure and returns, so a dead
//! messaging provider never fails the operation that triggered the message.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tracing::warn;

use super::{GatewayError, Notifier};

/// A notifier posting to a single HTTP endpoint.
pub struct HttpNotifier {
    client: Client,
    endpoint: String,
    channel: &'static str,
}

impl HttpNotifier {
    /// Builds a notifier for one provider endpoint.
    pub fn new(
        endpoint: String,
        channel: &'static str,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            channel,
        })
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn send(&self, to: &str, body: &str) -> Result<(), GatewayError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&json!({ "to": to, "body": body, "channel": self.channel }))
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Provider {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

/// Tries the primary channel first, then the fallback.
pub struct FallbackNotifier {
    primary: Box<dyn Notifier>,
    fallback: Option<Box<dyn Notifier>>,
}

impl FallbackNotifier {
    /// Builds a chain: the fallback is only tried after the primary fails.
    #[must_use]
    pub fn new(primary: Box<dyn Notifier>, fallback: Option<Box<dyn Notifier>>) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl Notifier for FallbackNotifier {
    async fn send(&self, to: &str, body: &str) -> Result<(), GatewayError> {
        match self.primary.send(to, body).await {
            Ok(()) => Ok(()),
            Err(primary_err) => match &self.fallback {
                Some(fallback) => {
                    warn!(error = %primary_err, "primary channel failed, trying fallback");
                    fallback.send(to, body).await
                }
                None => Err(primary_err),
            },
        }
    }
}

/// A notifier for deployments with no messaging provider configured.
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn send(&self, to: &str, _body: &str) -> Result<(), GatewayError> {
        warn!(%to, "no messaging provider configured, dropping notification");
        Ok(())
    }
}

/// Sends a notification and swallows any failure after logging it.
/// Use this for every message whose loss must not fail the caller.
pub async fn send_best_effort(notifier: &dyn Notifier, to: &str, body: &str) {
    if let Err(e) = notifier.send(to, body).await {
        warn!(%to, error = %e, "notification delivery failed");
    }
}
