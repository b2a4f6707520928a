//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod cycle;
pub mod cycle_day;
pub mod group;
pub mod group_member;
pub mod membership;
pub mod payment;
pub mod payment_event;
pub mod verification_code;
pub mod wallet_entry;

// Re-export specific types to avoid conflicts
pub use cycle::{
    Column as CycleColumn, CycleStatus, Entity as Cycle, Model as CycleModel,
};
pub use cycle_day::{
    Column as CycleDayColumn, DayStatus, Entity as CycleDay, Model as CycleDayModel,
};
pub use group::{
    Column as GroupColumn, Entity as Group, GroupStatus, Model as GroupModel, RegistrationStatus,
};
pub use group_member::{
    Column as GroupMemberColumn, Entity as GroupMember, MemberCategory, MemberRole,
    Model as GroupMemberModel,
};
pub use membership::{
    Column as MembershipColumn, Entity as Membership, MembershipType, Model as MembershipModel,
    PaymentStatus, ValidationStatus,
};
pub use payment::{
    Column as PaymentColumn, Entity as Payment, FundedEntityKind, Model as PaymentModel,
    PaymentMethod, PaymentPurpose, TransactionStatus,
};
pub use payment_event::{
    Column as PaymentEventColumn, Entity as PaymentEvent, Model as PaymentEventModel,
};
pub use verification_code::{
    Column as VerificationCodeColumn, Entity as VerificationCode, Model as VerificationCodeModel,
};
pub use wallet_entry::{
    Column as WalletEntryColumn, Entity as WalletEntry, EntryKind, Model as WalletEntryModel,
};
