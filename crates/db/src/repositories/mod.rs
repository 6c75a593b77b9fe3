//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Methods that must join a
//! caller's transaction take `&mut PgConnection` instead.

pub mod callback_repo;
pub mod checklist_repo;
pub mod company_repo;
pub mod company_settings_repo;
pub mod metric_repo;
pub mod password_reset_repo;
pub mod referral_repo;
pub mod session_repo;
pub mod stats_repo;
pub mod tutorial_repo;
pub mod user_progress_repo;
pub mod user_repo;

pub use callback_repo::CallbackRepo;
pub use checklist_repo::ChecklistRepo;
pub use company_repo::CompanyRepo;
pub use company_settings_repo::CompanySettingsRepo;
pub use metric_repo::MetricRepo;
pub use password_reset_repo::PasswordResetRepo;
pub use referral_repo::ReferralRepo;
pub use session_repo::SessionRepo;
pub use stats_repo::StatsRepo;
pub use tutorial_repo::TutorialRepo;
pub use user_progress_repo::UserProgressRepo;
pub use user_repo::UserRepo;
