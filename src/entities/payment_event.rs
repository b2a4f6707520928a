//! Payment event entity - Append-only status history of a transaction.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::payment::TransactionStatus;

/// Payment status-history event database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payment_events")]
pub struct Model {
    /// Unique identifier for the event
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the transaction this event belongs to
    pub payment_id: i64,
    /// Status the transaction moved to
    pub status: TransactionStatus,
    /// When the transition happened
    pub timestamp: DateTimeUtc,
    /// Optional remark describing the transition
    pub remark: Option<String>,
    /// Extra provider data attached to the transition, as JSON
    pub data: Option<Json>,
}

/// Defines relationships between PaymentEvent and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each event belongs to one transaction
    #[sea_orm(
        belongs_to = "super::payment::Entity",
        from = "Column::PaymentId",
        to = "super::payment::Column::Id"
    )]
    Payment,
}

impl Related<super::payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
