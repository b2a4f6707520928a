//! Cycle day entity - One slot of a cycle's daily schedule.
//!
//! The schedule is normalized into its own table (one row per day, keyed by
//! cycle id) rather than embedded in the cycle document. Exactly
//! `duration_days` rows exist per cycle, generated once at cycle creation.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Cycle day database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cycle_days")]
pub struct Model {
    /// Unique identifier for the slot
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the owning cycle
    pub cycle_id: i64,
    /// 1-based position within the schedule
    pub day_index: i32,
    /// Calendar date of the slot
    pub date: Date,
    /// Planned amount until contributed, then the recorded amount
    pub amount: i64,
    /// Slot status
    pub status: DayStatus,
    /// Optional free-text note attached by the recorder or by staff
    pub note: Option<String>,
}

/// Status of one schedule slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    /// Not yet contributed
    #[sea_orm(string_value = "scheduled")]
    Scheduled,
    /// Contribution recorded
    #[sea_orm(string_value = "contributed")]
    Contributed,
    /// Explicitly marked missed by staff
    #[sea_orm(string_value = "missed")]
    Missed,
    /// Deferred to a later settlement by staff
    #[sea_orm(string_value = "deferred")]
    Deferred,
}

/// Defines relationships between CycleDay and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each slot belongs to one cycle
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
