//! Wave hosted-checkout client.
//!
//! Thin wrapper over Wave's checkout sessions API: bearer-key auth, JSON
//! bodies, fixed request timeout. HTTP and transport failures are mapped to
//! [`GatewayError`] so callers can persist them as failed transactions.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use super::{CheckoutProvider, CheckoutRequest, CheckoutSession, GatewayError, ProviderStatus};
use crate::config::Settings;

/// Wave API client.
pub struct WaveClient {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Serialize)]
struct CreateSessionBody<'a> {
    amount: String,
    currency: &'a str,
    client_reference: &'a str,
    success_url: &'a str,
    error_url: &'a str,
}

#[derive(Deserialize)]
struct SessionResponse {
    id: String,
    wave_launch_url: Option<String>,
    checkout_status: Option<String>,
    payment_status: Option<String>,
    transaction_id: Option<String>,
}

impl WaveClient {
    /// Builds a client from settings.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(settings: &Settings) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(settings.provider_timeout)
            .build()
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        Ok(Self {
            client,
            base_url: settings.wave_base_url.clone(),
            api_key: settings.wave_api_key.clone(),
        })
    }

    /// Builds a client against an explicit base URL, with a custom timeout.
    /// Used by integration tests pointing at a local stub server.
    pub fn with_base_url(
        base_url: String,
        api_key: String,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    async fn read_json(response: reqwest::Response) -> Result<Value, GatewayError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Provider {
                status: status.as_u16(),
                body,
            });
        }
        response
            .json::<Value>()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))
    }
}

#[async_trait]
impl CheckoutProvider for WaveClient {
    async fn create_checkout(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, GatewayError> {
        let url = format!("{}/v1/checkout/sessions", self.base_url);
        let body = CreateSessionBody {
            amount: request.amount.to_string(),
            currency: &request.currency,
            client_reference: &request.client_reference,
            success_url: &request.success_url,
            error_url: &request.error_url,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let raw = Self::read_json(response).await?;
        let session: SessionResponse = serde_json::from_value(raw.clone())
            .map_err(|e| GatewayError::Transport(format!("unexpected response shape: {e}")))?;

        let checkout_url = session.wave_launch_url.ok_or_else(|| {
            GatewayError::Transport("session response missing wave_launch_url".to_string())
        })?;

        Ok(CheckoutSession {
            session_id: session.id,
            checkout_url,
            raw,
        })
    }

    async fn fetch_status(&self, session_id: &str) -> Result<ProviderStatus, GatewayError> {
        let url = format!("{}/v1/checkout/sessions/{session_id}", self.base_url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let raw = Self::read_json(response).await?;
        let session: SessionResponse = serde_json::from_value(raw.clone())
            .map_err(|e| GatewayError::Transport(format!("unexpected response shape: {e}")))?;

        Ok(ProviderStatus {
            checkout_status: session.checkout_status,
            payment_status: session.payment_status,
            transaction_id: session.transaction_id,
            raw,
        })
    }
}
