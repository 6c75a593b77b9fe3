//! User entity model and DTOs.

use nextmove_core::phase::{PhaseState, RoadmapStatus};
use nextmove_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub company_id: Option<DbId>,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub is_approved: bool,
    pub profile_image: Option<String>,
    pub assigned_admin: String,
    pub is_first_login: bool,
    pub onboarding_completed: bool,
    pub current_phase: String,
    pub completed_phases: Json<Vec<String>>,
    pub progress: i32,
    pub last_active: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    /// Normalized phase state of this row.
    pub fn phase_state(&self) -> PhaseState {
        PhaseState::from_stored(&self.current_phase, &self.completed_phases.0)
    }
}

/// Safe user representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: DbId,
    pub company_id: Option<DbId>,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub is_approved: bool,
    pub profile_image: Option<String>,
    pub assigned_admin: String,
    pub is_first_login: bool,
    pub onboarding_completed: bool,
    pub current_phase: String,
    pub completed_phases: Vec<String>,
    pub progress: i32,
    pub last_active: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            company_id: user.company_id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            role: user.role,
            is_approved: user.is_approved,
            profile_image: user.profile_image,
            assigned_admin: user.assigned_admin,
            is_first_login: user.is_first_login,
            onboarding_completed: user.onboarding_completed,
            current_phase: user.current_phase,
            completed_phases: user.completed_phases.0,
            progress: user.progress,
            last_active: user.last_active,
            created_at: user.created_at,
        }
    }
}

/// Phase tracker view of a user, returned by the progress endpoints.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseProgressResponse {
    pub user_id: DbId,
    pub current_phase: String,
    pub completed_phases: Vec<String>,
    pub progress: i32,
    pub onboarding_completed: bool,
    pub roadmap: Vec<RoadmapStatus>,
}

impl PhaseProgressResponse {
    pub fn for_user(user: &User) -> Self {
        let state = user.phase_state();
        Self {
            user_id: user.id,
            current_phase: state.current().as_str().to_string(),
            completed_phases: state.completed_names(),
            progress: state.progress(),
            onboarding_completed: state.onboarding_completed(),
            roadmap: state.roadmap(),
        }
    }
}

/// DTO for creating a new user.
#[derive(Debug)]
pub struct CreateUser {
    pub company_id: Option<DbId>,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub is_approved: bool,
    pub assigned_admin: String,
}

/// DTO for the customer's own profile settings.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}
