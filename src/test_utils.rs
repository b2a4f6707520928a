//! Shared test utilities.
//!
//! Common helpers for setting up in-memory test databases, creating test
//! entities with sensible defaults, and faking the external gateways.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use sea_orm::DatabaseConnection;
use serde_json::json;

use crate::api::AppState;
use crate::config::Settings;
use crate::core::group::{MemberInput, NewGroup, PresidentInput};
use crate::core::payment::InitiatePayment;
use crate::entities::{
    CycleModel, CycleStatus, FundedEntityKind, GroupModel, GroupStatus, MemberCategory,
    MemberRole, PaymentMethod, PaymentPurpose,
};
use crate::errors::Result;
use crate::gateway::{
    CheckoutProvider, CheckoutRequest, CheckoutSession, GatewayError, Notifier, ProviderStatus,
};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Builds a valid registration payload: a woman president plus a secretary
/// and a treasurer (minimum size, accepted regardless of demographic mix).
/// The protocol number is derived from the code so codes stay the only
/// uniqueness knob tests need to vary.
pub fn test_group_input(code: &str) -> NewGroup {
    NewGroup {
        code: code.to_string(),
        protocol_number: format!("P-{code}"),
        president: PresidentInput {
            first_name: "Awa".to_string(),
            last_name: "Diop".to_string(),
            phone: "+221770000001".to_string(),
            address: "Thiès".to_string(),
            national_id: "SN-0001".to_string(),
            category: MemberCategory::Woman,
        },
        members: vec![
            MemberInput {
                first_name: "Fatou".to_string(),
                last_name: "Ndiaye".to_string(),
                phone: "+221770000002".to_string(),
                role: MemberRole::Secretary,
                category: MemberCategory::Woman,
            },
            MemberInput {
                first_name: "Moussa".to_string(),
                last_name: "Fall".to_string(),
                phone: "+221770000003".to_string(),
                role: MemberRole::Treasurer,
                category: MemberCategory::Youth,
            },
        ],
        membership_type: crate::entities::MembershipType::Standard,
    }
}

/// Sets up a database with one pending group.
pub async fn setup_with_group() -> Result<(DatabaseConnection, GroupModel)> {
    let db = setup_test_db().await?;
    let (group, _membership) =
        crate::core::group::create_group(&db, test_group_input("001-002-003-004-005")).await?;
    Ok((db, group))
}

/// Sets up a database with one validated group (which also creates its
/// investment cycle, starting today).
pub async fn setup_with_validated_group() -> Result<(DatabaseConnection, GroupModel)> {
    let (db, group) = setup_with_group().await?;
    let group = crate::core::group::set_group_status(
        &db,
        group.id,
        GroupStatus::Validated,
        Some("test-admin".to_string()),
        None,
    )
    .await?;
    Ok((db, group))
}

/// Sets up a pending group with a cycle whose schedule started 9 days ago,
/// so slots exist both in the past and for today.
pub async fn setup_with_cycle() -> Result<(DatabaseConnection, GroupModel, CycleModel)> {
    let (db, group) = setup_with_group().await?;
    let start = Utc::now().date_naive() - Duration::days(9);
    let cycle =
        crate::core::cycle::create_cycle(&db, group.id, start, crate::core::cycle::DAILY_AMOUNT)
            .await?;
    Ok((db, group, cycle))
}

/// Builds a cycle model without touching the database, for pure-function
/// tests (day index, next pending date).
pub fn fake_cycle_model(start: NaiveDate) -> CycleModel {
    let now = Utc::now();
    CycleModel {
        id: 1,
        group_id: 1,
        start_date: start,
        end_date: start + Duration::days(1825),
        duration_days: crate::core::cycle::CYCLE_DURATION_DAYS,
        daily_amount: crate::core::cycle::DAILY_AMOUNT,
        status: CycleStatus::Active,
        contributed_days: 0,
        remaining_days: crate::core::cycle::CYCLE_DURATION_DAYS,
        total_contributed: 0,
        completion_percent: 0.0,
        wallet_balance: 0,
        current_streak: 0,
        best_streak: 0,
        missed_days: 0,
        last_contribution_at: None,
        created_at: now,
        updated_at: now,
    }
}

/// Builds a membership-fee payment payload for a group.
pub fn membership_fee_payment(group_id: i64) -> InitiatePayment {
    InitiatePayment {
        purpose: PaymentPurpose::MembershipFee,
        amount: crate::core::membership::STANDARD_FEE,
        currency: "XOF".to_string(),
        funded_entity_id: group_id,
        funded_entity_kind: FundedEntityKind::Group,
        payer_name: "Awa Diop".to_string(),
        payer_phone: "+221770000001".to_string(),
        method: PaymentMethod::Wave,
    }
}

/// A checkout provider double that records every request it sees.
pub struct FakeCheckout {
    fail: bool,
    requests: Mutex<Vec<CheckoutRequest>>,
}

impl FakeCheckout {
    /// A gateway that accepts every checkout.
    pub fn succeeding() -> Self {
        Self {
            fail: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A gateway that rejects every checkout.
    pub fn failing() -> Self {
        Self {
            fail: true,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// The checkout requests this fake received, in order.
    pub fn requests(&self) -> Vec<CheckoutRequest> {
        self.requests.lock().expect("request log poisoned").clone()
    }
}

#[async_trait]
impl CheckoutProvider for FakeCheckout {
    async fn create_checkout(
        &self,
        request: &CheckoutRequest,
    ) -> std::result::Result<CheckoutSession, GatewayError> {
        self.requests
            .lock()
            .expect("request log poisoned")
            .push(request.clone());

        if self.fail {
            return Err(GatewayError::Provider {
                status: 401,
                body: "invalid api key".to_string(),
            });
        }

        Ok(CheckoutSession {
            session_id: "cos-test-1".to_string(),
            checkout_url: format!("https://pay.wave.test/c/{}", request.client_reference),
            raw: json!({"id": "cos-test-1", "checkout_status": "open"}),
        })
    }

    async fn fetch_status(
        &self,
        _session_id: &str,
    ) -> std::result::Result<ProviderStatus, GatewayError> {
        Ok(ProviderStatus {
            checkout_status: Some("open".to_string()),
            payment_status: None,
            transaction_id: None,
            raw: json!({"id": "cos-test-1", "checkout_status": "open"}),
        })
    }
}

/// A notifier double that records messages instead of sending them.
pub struct RecordingNotifier {
    messages: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
        }
    }

    pub fn messages(&self) -> Vec<(String, String)> {
        self.messages.lock().expect("message log poisoned").clone()
    }
}

impl Default for RecordingNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, to: &str, body: &str) -> std::result::Result<(), GatewayError> {
        self.messages
            .lock()
            .expect("message log poisoned")
            .push((to.to_string(), body.to_string()));
        Ok(())
    }
}

/// Settings suitable for tests: no real endpoints, short timeout.
pub fn test_settings() -> Settings {
    Settings {
        bind_addr: "127.0.0.1:0".to_string(),
        public_base_url: "https://app.example.test".to_string(),
        wave_base_url: "https://wave.example.test".to_string(),
        wave_api_key: "wave_test_key".to_string(),
        provider_timeout: std::time::Duration::from_secs(1),
        whatsapp_url: None,
        sms_url: None,
    }
}

/// Builds a full application state over a fresh in-memory database, with
/// fake gateways. Panics on setup failure, which is fine in tests.
pub async fn test_state() -> AppState {
    let db = setup_test_db().await.expect("test database setup failed");
    AppState {
        db,
        checkout: std::sync::Arc::new(FakeCheckout::succeeding()),
        notifier: std::sync::Arc::new(RecordingNotifier::new()),
        settings: test_settings(),
    }
}
