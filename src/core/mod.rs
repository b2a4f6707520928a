//! Core business logic - framework-agnostic group, membership, cycle,
//! payment and verification operations.
//!
//! Functions here take a database connection (or an open transaction) and
//! return domain results; nothing in this module knows about HTTP.

/// Investment cycle schedule, wallet ledger and derived statistics
pub mod cycle;
/// Group registration, composition invariant and admin actions
pub mod group;
/// Membership workflow: fee derivation, validation, process steps
pub mod membership;
/// Payment initiation and webhook reconciliation
pub mod payment;
/// Time-bounded verification codes for the public lookup flow
pub mod verification;
