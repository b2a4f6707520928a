//! Group entity - Represents a registered community savings group (GIE).
//!
//! Each group carries its registration identity (code + protocol number), the
//! president's identity snapshot, and the authoritative membership status.
//! The president columns are immutable after creation, enforced at the update
//! boundary in `core::group`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::group_member::MemberCategory;

/// Group database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "groups")]
pub struct Model {
    /// Unique identifier for the group
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable registration code: five hyphen-separated numeric
    /// segments encoding region-department-district-commune-sequence
    #[sea_orm(unique)]
    pub code: String,
    /// Official registration protocol number
    #[sea_orm(unique)]
    pub protocol_number: String,
    /// President's first name
    pub president_first_name: String,
    /// President's last name
    pub president_last_name: String,
    /// President's mobile contact, used for verification and notifications
    pub president_phone: String,
    /// President's postal address
    pub president_address: String,
    /// President's national identity document number
    pub president_national_id: String,
    /// Demographic category of the president; counts toward the
    /// composition thresholds alongside the roster
    pub president_category: MemberCategory,
    /// Authoritative membership-approval status
    pub status: GroupStatus,
    /// Payment-derived registration view; mutated only by group validation
    /// and payment reconciliation
    pub registration_status: RegistrationStatus,
    /// When the group was registered
    pub created_at: DateTimeUtc,
    /// When the group was last modified
    pub updated_at: DateTimeUtc,
}

/// Membership-approval status of a group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum GroupStatus {
    /// Awaiting review
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Approved by an administrator or by payment-triggered activation
    #[sea_orm(string_value = "validated")]
    Validated,
    /// Application rejected
    #[sea_orm(string_value = "rejected")]
    Rejected,
    /// Temporarily suspended by an administrator
    #[sea_orm(string_value = "suspended")]
    Suspended,
}

/// Registration (fee) status of a group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    /// Membership fee not yet paid
    #[sea_orm(string_value = "pending_payment")]
    PendingPayment,
    /// Membership fee settled; the group is fully registered
    #[sea_orm(string_value = "valid")]
    Valid,
}

/// Defines relationships between Group and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One group has many roster members
    #[sea_orm(has_many = "super::group_member::Entity")]
    Members,
    /// One group has one membership record
    #[sea_orm(has_one = "super::membership::Entity")]
    Membership,
    /// One group has one investment cycle
    #[sea_orm(has_one = "super::cycle::Entity")]
    Cycle,
}

impl Related<super::group_member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl Related<super::membership::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Membership.def()
    }
}

impl Related<super::cycle::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cycle.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
