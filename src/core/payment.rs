//! Payment transaction business logic - checkout initiation and
//! webhook-driven reconciliation.
//!
//! A transaction is created pending, optionally opens a provider-side
//! checkout session, and is afterwards only mutated by [`reconcile`] (fed by
//! webhooks or status polls). The status history is append-only. The
//! "already succeeded" guard in [`reconcile`] is the idempotency boundary:
//! replayed provider events change nothing and fire no second side effect.

use crate::{
    entities::{
        FundedEntityKind, Payment, PaymentEventModel, PaymentMethod, PaymentModel,
        PaymentPurpose, TransactionStatus, payment, payment_event,
    },
    errors::{Error, Result},
    gateway::{CheckoutProvider, CheckoutRequest},
};
use chrono::{Duration, Utc};
use sea_orm::{ConnectionTrait, QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

/// How long a pending checkout stays claimable.
pub const EXPIRY_MINUTES: i64 = 30;

/// Payload for creating a payment.
#[derive(Debug, Clone, Deserialize)]
pub struct InitiatePayment {
    pub purpose: PaymentPurpose,
    pub amount: i64,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub funded_entity_id: i64,
    pub funded_entity_kind: FundedEntityKind,
    pub payer_name: String,
    pub payer_phone: String,
    pub method: PaymentMethod,
}

fn default_currency() -> String {
    "XOF".to_string()
}

/// Result of [`initiate`]: the stored transaction and, for hosted-checkout
/// methods, the provider URL to hand to the payer.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentInitiated {
    pub transaction: PaymentModel,
    pub checkout_url: Option<String>,
}

/// A normalized provider event, parsed from a webhook body or built from a
/// status poll.
#[derive(Debug, Clone)]
pub struct ProviderEvent {
    pub reference: String,
    pub checkout_status: Option<String>,
    pub payment_status: Option<String>,
    pub transaction_id: Option<String>,
    pub raw: Value,
}

impl ProviderEvent {
    /// Extracts an event from a Wave webhook body. Returns None when the
    /// body carries no client reference; such events are logged and ignored
    /// upstream, never treated as errors.
    #[must_use]
    pub fn from_webhook(body: &Value) -> Option<Self> {
        let data = body.get("data")?;
        let reference = data.get("client_reference")?.as_str()?.to_string();

        let field = |key: &str| data.get(key).and_then(Value::as_str).map(str::to_string);

        Some(Self {
            reference,
            checkout_status: field("checkout_status"),
            payment_status: field("payment_status"),
            transaction_id: field("transaction_id"),
            raw: body.clone(),
        })
    }

    /// Builds an event from a polled provider status.
    #[must_use]
    pub fn from_provider_status(
        reference: String,
        status: crate::gateway::ProviderStatus,
    ) -> Self {
        Self {
            reference,
            checkout_status: status.checkout_status,
            payment_status: status.payment_status,
            transaction_id: status.transaction_id,
            raw: status.raw,
        }
    }

    fn is_success(&self) -> bool {
        self.checkout_status.as_deref() == Some("complete")
            && self.payment_status.as_deref() == Some("succeeded")
    }

    fn is_cancellation(&self) -> bool {
        self.checkout_status.as_deref() == Some("expired")
            || self.payment_status.as_deref() == Some("cancelled")
    }

    fn is_processing(&self) -> bool {
        self.payment_status.as_deref() == Some("processing")
    }
}

/// What [`reconcile`] did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileOutcome {
    /// The transaction moved to succeeded and the side effect fired.
    Succeeded,
    /// The transaction moved to cancelled.
    Cancelled,
    /// The transaction moved to in-progress.
    MarkedInProgress,
    /// The event repeated a state already applied; nothing changed.
    AlreadyProcessed,
    /// The event shape was unknown or not applicable; nothing changed.
    Ignored,
}

/// Creates a payment transaction and, for the Wave method, opens the
/// provider-side checkout session synchronously.
///
/// On gateway failure the transaction row is kept as an audit trail of the
/// failed attempt, marked failed with the provider's error, and a
/// [`Error::CheckoutFailed`] is returned.
pub async fn initiate(
    db: &DatabaseConnection,
    gateway: &dyn CheckoutProvider,
    public_base_url: &str,
    input: InitiatePayment,
) -> Result<PaymentInitiated> {
    let reference = format!("PAY-{}", Uuid::new_v4());
    let now = Utc::now();

    let txn = db.begin().await?;
    let created = payment::ActiveModel {
        reference: Set(reference.clone()),
        amount: Set(input.amount),
        currency: Set(input.currency.clone()),
        status: Set(TransactionStatus::Pending),
        purpose: Set(input.purpose),
        funded_entity_id: Set(input.funded_entity_id),
        funded_entity_kind: Set(input.funded_entity_kind),
        payer_name: Set(input.payer_name),
        payer_phone: Set(input.payer_phone),
        method: Set(input.method),
        expires_at: Set(now + Duration::minutes(EXPIRY_MINUTES)),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    append_event(&txn, created.id, TransactionStatus::Pending, "transaction created", None).await?;
    txn.commit().await?;

    if input.method != PaymentMethod::Wave {
        // Manual methods (cash, transfer) are reconciled by staff later.
        return Ok(PaymentInitiated {
            transaction: created,
            checkout_url: None,
        });
    }

    let request = CheckoutRequest {
        amount: input.amount,
        currency: input.currency,
        client_reference: reference.clone(),
        success_url: format!("{public_base_url}/payments/{reference}/success"),
        error_url: format!("{public_base_url}/payments/{reference}/error"),
    };

    match gateway.create_checkout(&request).await {
        Ok(session) => {
            let txn = db.begin().await?;
            let mut active: payment::ActiveModel = created.into();
            active.provider_session_id = Set(Some(session.session_id));
            active.provider_payload = Set(Some(session.raw));
            active.status = Set(TransactionStatus::InProgress);
            let updated = active.update(&txn).await?;
            append_event(
                &txn,
                updated.id,
                TransactionStatus::InProgress,
                "checkout session created",
                None,
            )
            .await?;
            txn.commit().await?;

            Ok(PaymentInitiated {
                transaction: updated,
                checkout_url: Some(session.checkout_url),
            })
        }
        Err(gateway_err) => {
            let message = gateway_err.to_string();
            let txn = db.begin().await?;
            let mut active: payment::ActiveModel = created.into();
            active.status = Set(TransactionStatus::Failed);
            active.error_code = Set(Some("CHECKOUT_ERROR".to_string()));
            active.error_message = Set(Some(message.clone()));
            let updated = active.update(&txn).await?;
            append_event(
                &txn,
                updated.id,
                TransactionStatus::Failed,
                "checkout creation failed",
                None,
            )
            .await?;
            txn.commit().await?;

            Err(Error::CheckoutFailed { reference, message })
        }
    }
}

/// Applies one provider event to the matching transaction.
///
/// Unknown event shapes and repeats of already-applied states are ignored,
/// never errors, since webhooks may duplicate and reorder freely. The success
/// side effect fires at most once, guarded by the stored status.
pub async fn reconcile(db: &DatabaseConnection, event: &ProviderEvent) -> Result<ReconcileOutcome> {
    let txn = db.begin().await?;

    let row = Payment::find()
        .filter(payment::Column::Reference.eq(event.reference.as_str()))
        .one(&txn)
        .await?
        .ok_or_else(|| Error::TransactionNotFound {
            reference: event.reference.clone(),
        })?;

    let outcome = if event.is_success() {
        if row.status == TransactionStatus::Succeeded {
            ReconcileOutcome::AlreadyProcessed
        } else {
            let mut active: payment::ActiveModel = row.into();
            active.status = Set(TransactionStatus::Succeeded);
            if event.transaction_id.is_some() {
                active.provider_transaction_id = Set(event.transaction_id.clone());
            }
            active.provider_payload = Set(Some(event.raw.clone()));
            let updated = active.update(&txn).await?;
            append_event(
                &txn,
                updated.id,
                TransactionStatus::Succeeded,
                "payment confirmed by provider",
                Some(event.raw.clone()),
            )
            .await?;
            apply_success(&txn, &updated).await?;
            ReconcileOutcome::Succeeded
        }
    } else if event.is_cancellation() {
        if row.status == TransactionStatus::Cancelled {
            ReconcileOutcome::AlreadyProcessed
        } else if row.status.is_final() {
            // A cancellation arriving after a final state changes nothing.
            warn!(
                reference = %event.reference,
                status = ?row.status,
                "ignoring cancellation event on finalized transaction"
            );
            ReconcileOutcome::Ignored
        } else {
            let updated = mark_cancelled(&txn, row, "checkout expired or payment cancelled").await?;
            info!(reference = %updated.reference, "payment cancelled");
            ReconcileOutcome::Cancelled
        }
    } else if event.is_processing() {
        if row.status == TransactionStatus::Pending {
            let mut active: payment::ActiveModel = row.into();
            active.status = Set(TransactionStatus::InProgress);
            let updated = active.update(&txn).await?;
            append_event(
                &txn,
                updated.id,
                TransactionStatus::InProgress,
                "payment processing",
                None,
            )
            .await?;
            ReconcileOutcome::MarkedInProgress
        } else {
            ReconcileOutcome::AlreadyProcessed
        }
    } else {
        info!(reference = %event.reference, "ignoring provider event with unknown shape");
        ReconcileOutcome::Ignored
    };

    txn.commit().await?;
    Ok(outcome)
}

/// Client-initiated status poll: applies lazy expiry, then asks the provider
/// for the session state and reconciles it.
pub async fn poll_status(
    db: &DatabaseConnection,
    gateway: &dyn CheckoutProvider,
    reference: &str,
) -> Result<PaymentModel> {
    let row = require_by_reference(db, reference).await?;
    if row.status.is_final() {
        return Ok(row);
    }

    if Utc::now() > row.expires_at {
        let txn = db.begin().await?;
        let updated = mark_cancelled(&txn, row, "expired without completion").await?;
        txn.commit().await?;
        return Ok(updated);
    }

    if let Some(session_id) = row.provider_session_id.clone() {
        match gateway.fetch_status(&session_id).await {
            Ok(status) => {
                let event = ProviderEvent::from_provider_status(reference.to_string(), status);
                reconcile(db, &event).await?;
            }
            Err(e) => {
                // A provider hiccup on a poll is not fatal; the stored state
                // stands until the next poll or webhook.
                warn!(reference, error = %e, "status poll against provider failed");
            }
        }
    }

    require_by_reference(db, reference).await
}

/// Retrieves a transaction by its reference.
pub async fn get_by_reference<C>(conn: &C, reference: &str) -> Result<Option<PaymentModel>>
where
    C: ConnectionTrait,
{
    Payment::find()
        .filter(payment::Column::Reference.eq(reference))
        .one(conn)
        .await
        .map_err(Into::into)
}

/// Like [`get_by_reference`] but errors when the transaction is absent.
pub async fn require_by_reference<C>(conn: &C, reference: &str) -> Result<PaymentModel>
where
    C: ConnectionTrait,
{
    get_by_reference(conn, reference)
        .await?
        .ok_or_else(|| Error::TransactionNotFound {
            reference: reference.to_string(),
        })
}

/// Full status history of a transaction, oldest first.
pub async fn history(db: &DatabaseConnection, reference: &str) -> Result<Vec<PaymentEventModel>> {
    let row = require_by_reference(db, reference).await?;

    crate::entities::PaymentEvent::find()
        .filter(payment_event::Column::PaymentId.eq(row.id))
        .order_by_asc(payment_event::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

async fn mark_cancelled<C>(
    conn: &C,
    row: PaymentModel,
    remark: &str,
) -> Result<PaymentModel>
where
    C: ConnectionTrait,
{
    let mut active: payment::ActiveModel = row.into();
    active.status = Set(TransactionStatus::Cancelled);
    let updated = active.update(conn).await?;
    append_event(conn, updated.id, TransactionStatus::Cancelled, remark, None).await?;
    Ok(updated)
}

async fn append_event<C>(
    conn: &C,
    payment_id: i64,
    status: TransactionStatus,
    remark: &str,
    data: Option<Value>,
) -> Result<PaymentEventModel>
where
    C: ConnectionTrait,
{
    payment_event::ActiveModel {
        payment_id: Set(payment_id),
        status: Set(status),
        timestamp: Set(Utc::now()),
        remark: Set(Some(remark.to_string())),
        data: Set(data),
        ..Default::default()
    }
    .insert(conn)
    .await
    .map_err(Into::into)
}

/// Purpose-specific completion side effect. Runs inside the reconcile
/// transaction, at most once per transaction (guarded by the status check).
async fn apply_success<C>(conn: &C, row: &PaymentModel) -> Result<()>
where
    C: ConnectionTrait,
{
    match row.purpose {
        PaymentPurpose::MembershipFee => apply_membership_fee(conn, row).await,
        PaymentPurpose::Investment => apply_investment(conn, row).await,
        PaymentPurpose::Dues | PaymentPurpose::Service | PaymentPurpose::Other => {
            info!(reference = %row.reference, purpose = ?row.purpose, "no side effect for purpose");
            Ok(())
        }
    }
}

/// A settled membership fee activates the group without further admin
/// review: membership validated and paid, group validated with a valid
/// registration, workflow steps completed, and the investment cycle created
/// if the public self-service flow deferred it.
async fn apply_membership_fee<C>(conn: &C, row: &PaymentModel) -> Result<()>
where
    C: ConnectionTrait,
{
    use crate::core::membership::{self, ProcessStep};
    use crate::entities::{GroupStatus, RegistrationStatus, ValidationStatus, group};

    if row.funded_entity_kind != FundedEntityKind::Group {
        warn!(
            reference = %row.reference,
            kind = ?row.funded_entity_kind,
            "membership fee payment does not reference a group"
        );
        return Ok(());
    }
    let group_id = row.funded_entity_id;

    membership::set_validation(
        conn,
        group_id,
        ValidationStatus::Validated,
        Some(format!("payment:{}", row.reference)),
        None,
        None,
    )
    .await?;
    membership::mark_fee_paid(
        conn,
        group_id,
        method_label(row.method),
        &row.reference,
        row.amount,
    )
    .await?;
    membership::complete_step(conn, group_id, ProcessStep::Payment).await?;
    membership::complete_step(conn, group_id, ProcessStep::Validation).await?;
    membership::complete_step(conn, group_id, ProcessStep::Activation).await?;

    let group_row = crate::core::group::require_group(conn, group_id).await?;
    let mut active: group::ActiveModel = group_row.into();
    active.status = Set(GroupStatus::Validated);
    active.registration_status = Set(RegistrationStatus::Valid);
    active.updated_at = Set(Utc::now());
    active.update(conn).await?;

    if crate::core::cycle::get_cycle_by_group(conn, group_id).await?.is_none() {
        crate::core::cycle::create_cycle_with_conn(
            conn,
            group_id,
            Utc::now().date_naive(),
            crate::core::cycle::DAILY_AMOUNT,
        )
        .await?;
    }

    info!(reference = %row.reference, group_id, "membership fee settled, group activated");
    Ok(())
}

/// An investment top-up funds the group's next pending schedule day. A
/// top-up the cycle cannot absorb (duplicate day, inactive cycle, amount
/// mismatch) keeps the payment succeeded and is left for operator follow-up.
async fn apply_investment<C>(conn: &C, row: &PaymentModel) -> Result<()>
where
    C: ConnectionTrait,
{
    let group_id = row.funded_entity_id;

    let Some(cycle_row) = crate::core::cycle::get_cycle_by_group(conn, group_id).await? else {
        warn!(reference = %row.reference, group_id, "investment payment for group without cycle");
        return Ok(());
    };

    let today = Utc::now().date_naive();
    let Some(date) = crate::core::cycle::next_pending_date(&cycle_row, today) else {
        warn!(reference = %row.reference, group_id, "investment payment on exhausted schedule");
        return Ok(());
    };

    match crate::core::cycle::record_contribution_with_conn(
        conn,
        group_id,
        date,
        row.amount,
        Some(format!("Funded by payment {}", row.reference)),
    )
    .await
    {
        Ok(_) => {
            info!(reference = %row.reference, group_id, %date, "investment payment recorded");
            Ok(())
        }
        Err(
            e @ (Error::DuplicateContribution { .. }
            | Error::CycleNotActive { .. }
            | Error::InvalidInvestmentDate { .. }
            | Error::WrongAmount { .. }),
        ) => {
            warn!(reference = %row.reference, error = %e, "investment payment left unapplied");
            Ok(())
        }
        Err(other) => Err(other),
    }
}

const fn method_label(method: PaymentMethod) -> &'static str {
    match method {
        PaymentMethod::Wave => "wave",
        PaymentMethod::OrangeMoney => "orange_money",
        PaymentMethod::Cash => "cash",
        PaymentMethod::BankTransfer => "bank_transfer",
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entities::{GroupStatus, RegistrationStatus, ValidationStatus};
    use crate::test_utils::*;
    use serde_json::json;

    fn success_webhook(reference: &str) -> Value {
        json!({
            "type": "checkout.session.completed",
            "data": {
                "id": "cos-test-1",
                "client_reference": reference,
                "checkout_status": "complete",
                "payment_status": "succeeded",
                "transaction_id": "TX-77001"
            }
        })
    }

    #[test]
    fn test_webhook_parsing() {
        let event = ProviderEvent::from_webhook(&success_webhook("PAY-abc")).unwrap();
        assert_eq!(event.reference, "PAY-abc");
        assert!(event.is_success());
        assert_eq!(event.transaction_id.as_deref(), Some("TX-77001"));

        // A body without a client reference is unparseable, not an error.
        assert!(ProviderEvent::from_webhook(&json!({"type": "ping"})).is_none());
    }

    #[tokio::test]
    async fn test_initiate_wave_checkout() -> Result<()> {
        let (db, group) = setup_with_group().await?;
        let gateway = FakeCheckout::succeeding();

        let result = initiate(
            &db,
            &gateway,
            "https://app.example.test",
            membership_fee_payment(group.id),
        )
        .await?;

        assert_eq!(result.transaction.status, TransactionStatus::InProgress);
        assert!(result.transaction.provider_session_id.is_some());
        assert!(result.checkout_url.is_some());
        assert!(result.transaction.reference.starts_with("PAY-"));

        // The gateway saw redirect URLs embedding our reference.
        let seen = gateway.requests();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].success_url.contains(&result.transaction.reference));

        let events = history(&db, &result.transaction.reference).await?;
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].status, TransactionStatus::Pending);
        assert_eq!(events[1].status, TransactionStatus::InProgress);

        Ok(())
    }

    #[tokio::test]
    async fn test_initiate_gateway_failure_keeps_audit_row() -> Result<()> {
        let (db, group) = setup_with_group().await?;
        let gateway = FakeCheckout::failing();

        let err = initiate(
            &db,
            &gateway,
            "https://app.example.test",
            membership_fee_payment(group.id),
        )
        .await
        .unwrap_err();

        let Error::CheckoutFailed { reference, .. } = err else {
            panic!("expected CheckoutFailed");
        };

        let row = require_by_reference(&db, &reference).await?;
        assert_eq!(row.status, TransactionStatus::Failed);
        assert_eq!(row.error_code.as_deref(), Some("CHECKOUT_ERROR"));
        assert!(row.error_message.is_some());

        Ok(())
    }

    #[tokio::test]
    async fn test_initiate_manual_method_skips_gateway() -> Result<()> {
        let (db, group) = setup_with_group().await?;
        let gateway = FakeCheckout::failing(); // would fail if called

        let mut input = membership_fee_payment(group.id);
        input.method = PaymentMethod::Cash;
        let result = initiate(&db, &gateway, "https://app.example.test", input).await?;

        assert_eq!(result.transaction.status, TransactionStatus::Pending);
        assert!(result.checkout_url.is_none());
        assert!(gateway.requests().is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_membership_fee_success_activates_group_once() -> Result<()> {
        let (db, group) = setup_with_group().await?;
        let gateway = FakeCheckout::succeeding();

        let result = initiate(
            &db,
            &gateway,
            "https://app.example.test",
            membership_fee_payment(group.id),
        )
        .await?;
        let reference = result.transaction.reference;

        let event = ProviderEvent::from_webhook(&success_webhook(&reference)).unwrap();
        let outcome = reconcile(&db, &event).await?;
        assert_eq!(outcome, ReconcileOutcome::Succeeded);

        // The whole activation chain fired.
        let group_row = crate::core::group::require_group(&db, group.id).await?;
        assert_eq!(group_row.status, GroupStatus::Validated);
        assert_eq!(group_row.registration_status, RegistrationStatus::Valid);

        let membership = crate::core::membership::require_by_group(&db, group.id).await?;
        assert_eq!(membership.validation_status, ValidationStatus::Validated);
        assert_eq!(
            membership.payment_status,
            crate::entities::PaymentStatus::Complete
        );
        assert_eq!(membership.amount_paid, Some(10_000));
        assert!(membership.step_payment_done);
        assert!(membership.step_activation_done);

        let cycle = crate::core::cycle::get_cycle_by_group(&db, group.id).await?;
        assert!(cycle.is_some());

        // Replaying the same webhook is a no-op: one succeeded history
        // entry, one cycle, no duplicate side effects.
        let outcome = reconcile(&db, &event).await?;
        assert_eq!(outcome, ReconcileOutcome::AlreadyProcessed);

        let events = history(&db, &reference).await?;
        let succeeded_count = events
            .iter()
            .filter(|e| e.status == TransactionStatus::Succeeded)
            .count();
        assert_eq!(succeeded_count, 1);

        let cycles = crate::entities::Cycle::find()
            .filter(crate::entities::cycle::Column::GroupId.eq(group.id))
            .all(&db)
            .await?;
        assert_eq!(cycles.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_cancellation_event() -> Result<()> {
        let (db, group) = setup_with_group().await?;
        let gateway = FakeCheckout::succeeding();

        let result = initiate(
            &db,
            &gateway,
            "https://app.example.test",
            membership_fee_payment(group.id),
        )
        .await?;
        let reference = result.transaction.reference;

        let event = ProviderEvent {
            reference: reference.clone(),
            checkout_status: Some("expired".to_string()),
            payment_status: None,
            transaction_id: None,
            raw: json!({}),
        };

        assert_eq!(reconcile(&db, &event).await?, ReconcileOutcome::Cancelled);
        assert_eq!(
            reconcile(&db, &event).await?,
            ReconcileOutcome::AlreadyProcessed
        );

        let row = require_by_reference(&db, &reference).await?;
        assert_eq!(row.status, TransactionStatus::Cancelled);

        // The group was never activated.
        let group_row = crate::core::group::require_group(&db, group.id).await?;
        assert_eq!(group_row.status, GroupStatus::Pending);

        Ok(())
    }

    #[tokio::test]
    async fn test_processing_event_marks_in_progress() -> Result<()> {
        let (db, group) = setup_with_group().await?;
        let gateway = FakeCheckout::succeeding();

        let mut input = membership_fee_payment(group.id);
        input.method = PaymentMethod::Cash; // stays Pending
        let result = initiate(&db, &gateway, "https://app.example.test", input).await?;

        let event = ProviderEvent {
            reference: result.transaction.reference.clone(),
            checkout_status: Some("open".to_string()),
            payment_status: Some("processing".to_string()),
            transaction_id: None,
            raw: json!({}),
        };

        assert_eq!(
            reconcile(&db, &event).await?,
            ReconcileOutcome::MarkedInProgress
        );

        let row = require_by_reference(&db, &result.transaction.reference).await?;
        assert_eq!(row.status, TransactionStatus::InProgress);

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_event_ignored() -> Result<()> {
        let (db, group) = setup_with_group().await?;
        let gateway = FakeCheckout::succeeding();

        let result = initiate(
            &db,
            &gateway,
            "https://app.example.test",
            membership_fee_payment(group.id),
        )
        .await?;

        let event = ProviderEvent {
            reference: result.transaction.reference.clone(),
            checkout_status: Some("open".to_string()),
            payment_status: None,
            transaction_id: None,
            raw: json!({}),
        };
        assert_eq!(reconcile(&db, &event).await?, ReconcileOutcome::Ignored);

        Ok(())
    }

    #[tokio::test]
    async fn test_reconcile_unknown_reference() -> Result<()> {
        let db = setup_test_db().await?;

        let event = ProviderEvent {
            reference: "PAY-missing".to_string(),
            checkout_status: Some("complete".to_string()),
            payment_status: Some("succeeded".to_string()),
            transaction_id: None,
            raw: json!({}),
        };
        let err = reconcile(&db, &event).await.unwrap_err();
        assert!(matches!(err, Error::TransactionNotFound { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_poll_expires_overdue_transaction() -> Result<()> {
        let (db, group) = setup_with_group().await?;
        let gateway = FakeCheckout::succeeding();

        let mut input = membership_fee_payment(group.id);
        input.method = PaymentMethod::Cash;
        let result = initiate(&db, &gateway, "https://app.example.test", input).await?;

        // Backdate the expiry.
        let mut active: payment::ActiveModel = result.transaction.clone().into();
        active.expires_at = Set(Utc::now() - Duration::minutes(5));
        active.update(&db).await?;

        let row = poll_status(&db, &gateway, &result.transaction.reference).await?;
        assert_eq!(row.status, TransactionStatus::Cancelled);

        let events = history(&db, &row.reference).await?;
        assert_eq!(
            events.last().unwrap().remark.as_deref(),
            Some("expired without completion")
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_investment_payment_funds_next_day() -> Result<()> {
        let (db, group) = setup_with_validated_group().await?;
        let gateway = FakeCheckout::succeeding();

        let input = InitiatePayment {
            purpose: PaymentPurpose::Investment,
            amount: crate::core::cycle::DAILY_AMOUNT,
            currency: "XOF".to_string(),
            funded_entity_id: group.id,
            funded_entity_kind: FundedEntityKind::Group,
            payer_name: "Awa Diop".to_string(),
            payer_phone: "+221770000001".to_string(),
            method: PaymentMethod::Wave,
        };
        let result = initiate(&db, &gateway, "https://app.example.test", input).await?;
        let reference = result.transaction.reference;

        let event = ProviderEvent::from_webhook(&success_webhook(&reference)).unwrap();
        assert_eq!(reconcile(&db, &event).await?, ReconcileOutcome::Succeeded);

        let cycle = crate::core::cycle::require_cycle(&db, group.id).await?;
        assert_eq!(cycle.contributed_days, 1);
        assert_eq!(cycle.wallet_balance, crate::core::cycle::DAILY_AMOUNT);

        Ok(())
    }
}
