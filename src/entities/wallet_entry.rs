//! Wallet entry entity - One line of a cycle's append-only ledger.
//!
//! Amounts are always positive; the kind carries the sign. `balance_after`
//! snapshots the wallet balance resulting from the entry, so the history is
//! auditable without replaying it.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Wallet ledger entry database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "wallet_entries")]
pub struct Model {
    /// Unique identifier for the entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the owning cycle
    pub cycle_id: i64,
    /// When the entry was appended
    pub timestamp: DateTimeUtc,
    /// Entry kind; determines the sign applied to `amount`
    pub kind: EntryKind,
    /// Absolute amount in XOF
    pub amount: i64,
    /// Human-readable description of the movement
    pub description: String,
    /// Wallet balance after applying this entry
    pub balance_after: i64,
}

/// Kind of a wallet ledger entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Daily contribution credit
    #[sea_orm(string_value = "contribution")]
    Contribution,
    /// Debit, including reversal of an overridden contribution
    #[sea_orm(string_value = "withdrawal")]
    Withdrawal,
    /// Staff-granted bonus credit
    #[sea_orm(string_value = "bonus")]
    Bonus,
    /// Staff-applied penalty debit
    #[sea_orm(string_value = "penalty")]
    Penalty,
}

impl EntryKind {
    /// Sign applied to the amount when summing the ledger.
    #[must_use]
    pub const fn sign(self) -> i64 {
        match self {
            Self::Contribution | Self::Bonus => 1,
            Self::Withdrawal | Self::Penalty => -1,
        }
    }
}

/// Defines relationships between WalletEntry and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each entry belongs to one cycle
    #[sea_orm(
        belongs_to = "super::cycle::Entity",
        from = "Column::CycleId",
        to = "super::cycle::Column::Id"
    )]
    Cycle,
}

impl Related<super::cycle::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cycle.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
