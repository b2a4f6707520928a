//! Investment cycle entity - The 1826-day daily-contribution schedule owned
//! by one group, one-to-one with `groups`.
//!
//! Rollup columns (contributed/remaining counts, totals, percentage, wallet
//! balance, streaks) are derived caches over `cycle_days` and
//! `wallet_entries`; they are recomputed inside the same transaction as every
//! schedule mutation and must never be written by any other code path.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Investment cycle database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "investment_cycles")]
pub struct Model {
    /// Unique identifier for the cycle
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the owning group (one-to-one)
    #[sea_orm(unique)]
    pub group_id: i64,
    /// First calendar day of the schedule
    pub start_date: Date,
    /// Last calendar day of the schedule (start + duration - 1)
    pub end_date: Date,
    /// Schedule length in days, always 1826
    pub duration_days: i32,
    /// Fixed daily contribution amount in XOF
    pub daily_amount: i64,
    /// Cycle lifecycle status
    pub status: CycleStatus,
    /// Number of days with a recorded contribution
    pub contributed_days: i32,
    /// Number of days not yet contributed
    pub remaining_days: i32,
    /// Total contributed amount (contributed_days x daily_amount)
    pub total_contributed: i64,
    /// Completion percentage, 0-100
    pub completion_percent: f64,
    /// Running wallet balance, equal to the signed sum of wallet entries
    pub wallet_balance: i64,
    /// Consecutive contributed days ending today (or yesterday)
    pub current_streak: i32,
    /// Best streak ever reached
    pub best_streak: i32,
    /// Days explicitly marked missed by staff
    pub missed_days: i32,
    /// When the last contribution was recorded
    pub last_contribution_at: Option<DateTimeUtc>,
    /// When the cycle was created
    pub created_at: DateTimeUtc,
    /// When the cycle was last modified
    pub updated_at: DateTimeUtc,
}

/// Lifecycle status of an investment cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum CycleStatus {
    /// Contributions can be recorded
    #[sea_orm(string_value = "active")]
    Active,
    /// Paused by an administrator
    #[sea_orm(string_value = "suspended")]
    Suspended,
    /// All scheduled days contributed
    #[sea_orm(string_value = "complete")]
    Complete,
    /// Terminated by an administrator
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

/// Defines relationships between InvestmentCycle and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each cycle belongs to one group
    #[sea_orm(
        belongs_to = "super::group::Entity",
        from = "Column::GroupId",
        to = "super::group::Column::Id"
    )]
    Group,
    /// One cycle has many schedule days
    #[sea_orm(has_many = "super::cycle_day::Entity")]
    Days,
    /// One cycle has many wallet entries
    #[sea_orm(has_many = "super::wallet_entry::Entity")]
    WalletEntries,
}

impl Related<super::group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Group.def()
    }
}

impl Related<super::cycle_day::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Days.def()
    }
}

impl Related<super::wallet_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WalletEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
