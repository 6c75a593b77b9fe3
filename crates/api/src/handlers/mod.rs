//! Request handlers, one module per resource.
//!
//! Handlers delegate to the repositories in `nextmove_db` and map errors via
//! [`AppError`](crate::error::AppError).

pub mod admin;
pub mod auth;
pub mod callbacks;
pub mod customer;
pub mod metrics;
pub mod password_reset;
pub mod phase;
pub mod referrals;
pub mod tutorials;

use nextmove_db::models::user::User;
use nextmove_events::Recipient;

/// Recipient details for account events about `user`.
pub(crate) fn recipient_for(user: &User) -> Recipient {
    Recipient {
        user_id: user.id,
        email: user.email.clone(),
        first_name: user.first_name.clone(),
    }
}
