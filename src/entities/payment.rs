//! Payment transaction entity - One externally-processed payment.
//!
//! A transaction has its own lifecycle, independent of the entity it funds;
//! the funded entity is referenced polymorphically (id + kind tag). Status
//! transitions after creation happen only through `core::payment::reconcile`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Payment transaction database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payment_transactions")]
pub struct Model {
    /// Unique identifier for the transaction
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Internally generated unique reference (`PAY-<uuid>`), echoed back by
    /// the provider in webhooks and redirects
    #[sea_orm(unique)]
    pub reference: String,
    /// Provider-side checkout session id
    pub provider_session_id: Option<String>,
    /// Provider-side transaction id, once known
    pub provider_transaction_id: Option<String>,
    /// Amount in XOF
    pub amount: i64,
    /// ISO currency code
    pub currency: String,
    /// Transaction lifecycle status
    pub status: TransactionStatus,
    /// What the payment funds
    pub purpose: PaymentPurpose,
    /// ID of the funded entity
    pub funded_entity_id: i64,
    /// Kind tag of the funded entity
    pub funded_entity_kind: FundedEntityKind,
    /// Payer name snapshot
    pub payer_name: String,
    /// Payer contact snapshot
    pub payer_phone: String,
    /// Chosen payment method
    pub method: PaymentMethod,
    /// Raw provider response snapshot, as JSON
    pub provider_payload: Option<Json>,
    /// When a still-pending transaction lapses (creation + 30 minutes)
    pub expires_at: DateTimeUtc,
    /// Provider error code on failure
    pub error_code: Option<String>,
    /// Provider error message on failure
    pub error_message: Option<String>,
    /// When the transaction was created
    pub created_at: DateTimeUtc,
}

/// Lifecycle status of a payment transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "succeeded")]
    Succeeded,
    #[sea_orm(string_value = "failed")]
    Failed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    #[sea_orm(string_value = "refunded")]
    Refunded,
}

impl TransactionStatus {
    /// Whether the transaction can still move to another status.
    #[must_use]
    pub const fn is_final(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled | Self::Refunded)
    }
}

/// What a payment funds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum PaymentPurpose {
    /// Membership fee of a group application
    #[sea_orm(string_value = "membership_fee")]
    MembershipFee,
    /// Investment top-up
    #[sea_orm(string_value = "investment")]
    Investment,
    /// Periodic dues
    #[sea_orm(string_value = "dues")]
    Dues,
    /// Paid service
    #[sea_orm(string_value = "service")]
    Service,
    /// Future extension placeholder
    #[sea_orm(string_value = "other")]
    Other,
}

/// Kind tag of the entity a payment funds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum FundedEntityKind {
    #[sea_orm(string_value = "group")]
    Group,
    #[sea_orm(string_value = "membership")]
    Membership,
    #[sea_orm(string_value = "cycle")]
    Cycle,
    #[sea_orm(string_value = "other")]
    Other,
}

/// Payment method chosen by the payer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Wave mobile money hosted checkout (primary provider)
    #[sea_orm(string_value = "wave")]
    Wave,
    /// Orange Money transfer, reconciled manually
    #[sea_orm(string_value = "orange_money")]
    OrangeMoney,
    /// Cash handed to an agent
    #[sea_orm(string_value = "cash")]
    Cash,
    /// Bank transfer
    #[sea_orm(string_value = "bank_transfer")]
    BankTransfer,
}

/// Defines relationships between PaymentTransaction and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One transaction has many status-history events
    #[sea_orm(has_many = "super::payment_event::Entity")]
    Events,
}

impl Related<super::payment_event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Events.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
