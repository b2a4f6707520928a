//! Membership workflow business logic.
//!
//! A membership record tracks the approval and payment workflow of one group
//! application. The fee amount and benefit flags are pure derivations of the
//! membership type and are written at save time, never set independently.
//! The five process steps are completed explicitly by workflow actions;
//! progression is the completed fraction.

use crate::{
    entities::{
        Membership, MembershipModel, MembershipType, ValidationStatus, membership,
    },
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{ConnectionTrait, Set, prelude::*};

/// Membership fee in XOF for the standard tier.
pub const STANDARD_FEE: i64 = 10_000;
/// Membership fee in XOF for the premium tier.
pub const PREMIUM_FEE: i64 = 25_000;

/// Benefits included in a membership tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Benefits {
    /// Training sessions included
    pub training: bool,
    /// Group insurance included
    pub insurance: bool,
}

/// One of the five workflow steps tracked on a membership record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessStep {
    Submission,
    Verification,
    Payment,
    Validation,
    Activation,
}

/// Fee amount for a membership tier.
#[must_use]
pub const fn fee_for(membership_type: MembershipType) -> i64 {
    match membership_type {
        MembershipType::Standard => STANDARD_FEE,
        MembershipType::Premium => PREMIUM_FEE,
    }
}

/// Benefit flags for a membership tier.
#[must_use]
pub const fn benefits_for(membership_type: MembershipType) -> Benefits {
    match membership_type {
        MembershipType::Standard => Benefits {
            training: false,
            insurance: false,
        },
        MembershipType::Premium => Benefits {
            training: true,
            insurance: true,
        },
    }
}

/// Builds the active model for a fresh membership record.
///
/// Fee and benefits are derived from the type; the submission step is
/// completed immediately, everything else starts pending.
#[must_use]
pub fn new_record(group_id: i64, membership_type: MembershipType) -> membership::ActiveModel {
    let now = Utc::now();
    let benefits = benefits_for(membership_type);

    membership::ActiveModel {
        group_id: Set(group_id),
        membership_type: Set(membership_type),
        fee_amount: Set(fee_for(membership_type)),
        has_training: Set(benefits.training),
        has_insurance: Set(benefits.insurance),
        validation_status: Set(ValidationStatus::Pending),
        documents_checked: Set(serde_json::json!({})),
        payment_status: Set(crate::entities::PaymentStatus::Pending),
        step_submission_done: Set(true),
        step_submission_at: Set(Some(now)),
        step_verification_done: Set(false),
        step_payment_done: Set(false),
        step_validation_done: Set(false),
        step_activation_done: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
}

/// Retrieves the membership record of a group.
pub async fn get_by_group<C>(conn: &C, group_id: i64) -> Result<Option<MembershipModel>>
where
    C: ConnectionTrait,
{
    Membership::find()
        .filter(membership::Column::GroupId.eq(group_id))
        .one(conn)
        .await
        .map_err(Into::into)
}

/// Like [`get_by_group`] but errors when the record is absent.
pub async fn require_by_group<C>(conn: &C, group_id: i64) -> Result<MembershipModel>
where
    C: ConnectionTrait,
{
    get_by_group(conn, group_id)
        .await?
        .ok_or(Error::MembershipNotFound { group_id })
}

/// Sets the validation sub-state of a group's membership record.
pub async fn set_validation<C>(
    conn: &C,
    group_id: i64,
    status: ValidationStatus,
    validator: Option<String>,
    remarks: Option<String>,
    documents_checked: Option<Json>,
) -> Result<MembershipModel>
where
    C: ConnectionTrait,
{
    let record = require_by_group(conn, group_id).await?;
    let now = Utc::now();

    let mut active: membership::ActiveModel = record.into();
    active.validation_status = Set(status);
    active.validated_at = Set(Some(now));
    active.validated_by = Set(validator);
    active.validation_remarks = Set(remarks);
    if let Some(documents) = documents_checked {
        active.documents_checked = Set(documents);
    }
    active.updated_at = Set(now);

    active.update(conn).await.map_err(Into::into)
}

/// Marks one workflow step complete. Completing an already-complete step is
/// a no-op, so workflow actions can call this unconditionally.
pub async fn complete_step<C>(
    conn: &C,
    group_id: i64,
    step: ProcessStep,
) -> Result<MembershipModel>
where
    C: ConnectionTrait,
{
    let record = require_by_group(conn, group_id).await?;

    let already_done = match step {
        ProcessStep::Submission => record.step_submission_done,
        ProcessStep::Verification => record.step_verification_done,
        ProcessStep::Payment => record.step_payment_done,
        ProcessStep::Validation => record.step_validation_done,
        ProcessStep::Activation => record.step_activation_done,
    };
    if already_done {
        return Ok(record);
    }

    let now = Utc::now();
    let mut active: membership::ActiveModel = record.into();
    match step {
        ProcessStep::Submission => {
            active.step_submission_done = Set(true);
            active.step_submission_at = Set(Some(now));
        }
        ProcessStep::Verification => {
            active.step_verification_done = Set(true);
            active.step_verification_at = Set(Some(now));
        }
        ProcessStep::Payment => {
            active.step_payment_done = Set(true);
            active.step_payment_at = Set(Some(now));
        }
        ProcessStep::Validation => {
            active.step_validation_done = Set(true);
            active.step_validation_at = Set(Some(now));
        }
        ProcessStep::Activation => {
            active.step_activation_done = Set(true);
            active.step_activation_at = Set(Some(now));
        }
    }
    active.updated_at = Set(now);

    active.update(conn).await.map_err(Into::into)
}

/// Records the settled membership fee on the record.
pub async fn mark_fee_paid<C>(
    conn: &C,
    group_id: i64,
    method: &str,
    reference: &str,
    amount: i64,
) -> Result<MembershipModel>
where
    C: ConnectionTrait,
{
    let record = require_by_group(conn, group_id).await?;
    let now = Utc::now();

    let mut active: membership::ActiveModel = record.into();
    active.payment_status = Set(crate::entities::PaymentStatus::Complete);
    active.payment_method = Set(Some(method.to_string()));
    active.payment_reference = Set(Some(reference.to_string()));
    active.amount_paid = Set(Some(amount));
    active.paid_at = Set(Some(now));
    active.updated_at = Set(now);

    active.update(conn).await.map_err(Into::into)
}

/// Workflow progression as a percentage of completed steps.
#[must_use]
pub fn progression_percent(record: &MembershipModel) -> f64 {
    let done = [
        record.step_submission_done,
        record.step_verification_done,
        record.step_payment_done,
        record.step_validation_done,
        record.step_activation_done,
    ]
    .iter()
    .filter(|d| **d)
    .count();

    done as f64 / 5.0 * 100.0
}
