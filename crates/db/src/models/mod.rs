//! Domain model structs and DTOs.
//!
//! Each submodule contains a `FromRow` entity struct matching the database
//! row plus the DTOs the repositories accept. Entities that reach API
//! responses serialize in camelCase.

pub mod callback;
pub mod checklist;
pub mod company;
pub mod company_settings;
pub mod metric;
pub mod password_reset;
pub mod referral;
pub mod session;
pub mod tutorial;
pub mod user;
pub mod user_progress;
