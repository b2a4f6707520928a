//! Verification code entity - Time-bounded codes for the public group
//! lookup flow, keyed by group code.
//!
//! Persisting the codes (instead of a process-global map) survives restarts
//! and works across instances; expiry is enforced at check time.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Verification code database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "verification_codes")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Registration code of the group the code was issued for
    #[sea_orm(unique)]
    pub group_code: String,
    /// The 6-digit code sent to the contact
    pub code: String,
    /// Contact the code was sent to
    pub contact: String,
    /// When the code stops being accepted
    pub expires_at: DateTimeUtc,
    /// When the code was issued
    pub created_at: DateTimeUtc,
}

/// `VerificationCode` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
