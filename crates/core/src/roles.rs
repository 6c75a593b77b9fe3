//! Well-known role name constants.
//!
//! These must match the `ck_users_role` check constraint in
//! `20250101000002_create_users.sql`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_CUSTOMER: &str = "customer";
