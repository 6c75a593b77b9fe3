//! Domain types and pure business rules for the NextMove portal.
//!
//! Nothing in this crate performs I/O; the database and HTTP layers depend
//! on it, never the other way round.

pub mod callbacks;
pub mod checklist;
pub mod error;
pub mod phase;
pub mod referral;
pub mod roles;
pub mod tokens;
pub mod types;
pub mod validation;
