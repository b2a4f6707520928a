//! Group member entity - One roster entry of a savings group.
//!
//! Each member carries identity, contact, a bureau role and a demographic
//! category. Roles and categories feed the creation-time composition check.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Group member database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "group_members")]
pub struct Model {
    /// Unique identifier for the member
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the group this member belongs to
    pub group_id: i64,
    /// Member's first name
    pub first_name: String,
    /// Member's last name
    pub last_name: String,
    /// Member's mobile contact
    pub phone: String,
    /// Bureau role within the group
    pub role: MemberRole,
    /// Demographic category used by the composition rules
    pub category: MemberCategory,
}

/// Bureau role of a roster member.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    /// Deputy of the president
    #[sea_orm(string_value = "vice_lead")]
    ViceLead,
    /// Keeps the group's records; required at creation
    #[sea_orm(string_value = "secretary")]
    Secretary,
    /// Holds the group's funds; required at creation
    #[sea_orm(string_value = "treasurer")]
    Treasurer,
    /// Ordinary member
    #[sea_orm(string_value = "member")]
    Member,
}

/// Demographic category of a participant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
#[serde(rename_all = "snake_case")]
pub enum MemberCategory {
    #[sea_orm(string_value = "woman")]
    Woman,
    #[sea_orm(string_value = "youth")]
    Youth,
    #[sea_orm(string_value = "man")]
    Man,
}

/// Defines relationships between GroupMember and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each member belongs to one group
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
