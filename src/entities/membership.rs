//! Membership record entity - Tracks the approval and payment workflow for
//! one group's application, one-to-one with `groups`.
//!
//! The fee amount and benefit flags are fully determined by the membership
//! type; `core::membership` derives them at save time. The five process-step
//! columns drive the progression percentage shown to applicants.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Membership record database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "membership_records")]
pub struct Model {
    /// Unique identifier for the record
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the group this record belongs to (one-to-one)
    #[sea_orm(unique)]
    pub group_id: i64,
    /// Membership tier driving fee and benefits
    pub membership_type: MembershipType,
    /// Fee amount in XOF, derived from the type
    pub fee_amount: i64,
    /// Whether the tier includes training sessions
    pub has_training: bool,
    /// Whether the tier includes group insurance
    pub has_insurance: bool,
    /// Current validation status of the application
    pub validation_status: ValidationStatus,
    /// When the application was validated or rejected
    pub validated_at: Option<DateTimeUtc>,
    /// Identity of the validating administrator
    pub validated_by: Option<String>,
    /// Free-text remarks left by the validator
    pub validation_remarks: Option<String>,
    /// Map of supporting documents that have been checked, as JSON
    pub documents_checked: Json,
    /// Current fee-payment status
    pub payment_status: PaymentStatus,
    /// Payment method used, if any
    pub payment_method: Option<String>,
    /// External transaction reference of the fee payment
    pub payment_reference: Option<String>,
    /// Amount actually paid in XOF
    pub amount_paid: Option<i64>,
    /// When the fee was paid
    pub paid_at: Option<DateTimeUtc>,
    /// Step 1: application submitted (completed at creation)
    pub step_submission_done: bool,
    /// When step 1 completed
    pub step_submission_at: Option<DateTimeUtc>,
    /// Step 2: documents verified
    pub step_verification_done: bool,
    /// When step 2 completed
    pub step_verification_at: Option<DateTimeUtc>,
    /// Step 3: membership fee paid
    pub step_payment_done: bool,
    /// When step 3 completed
    pub step_payment_at: Option<DateTimeUtc>,
    /// Step 4: application validated
    pub step_validation_done: bool,
    /// When step 4 completed
    pub step_validation_at: Option<DateTimeUtc>,
    /// Step 5: group activated
    pub step_activation_done: bool,
    /// When step 5 completed
    pub step_activation_at: Option<DateTimeUtc>,
    /// When the record was created
    pub created_at: DateTimeUtc,
    /// When the record was last modified
    pub updated_at: DateTimeUtc,
}

/// Membership tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum MembershipType {
    #[sea_orm(string_value = "standard")]
    Standard,
    #[sea_orm(string_value = "premium")]
    Premium,
}

/// Validation status of a membership application.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "validated")]
    Validated,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

/// Fee-payment status of a membership application.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "complete")]
    Complete,
    #[sea_orm(string_value = "failed")]
    Failed,
    #[sea_orm(string_value = "refunded")]
    Refunded,
}

/// Defines relationships between MembershipRecord and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each membership record belongs to one group
    #[sea_orm(
        belongs_to = "super::group::Entity",
        from = "Column::GroupId",
        to = "super::group::Column::Id"
    )]
    Group,
}

impl Related<super::group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Group.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
