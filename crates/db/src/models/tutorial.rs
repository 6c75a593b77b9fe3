//! Tutorial (video) entity model and DTOs.

use nextmove_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `tutorials` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tutorial {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub thumbnail_url: Option<String>,
    pub category: String,
    pub is_onboarding: bool,
    #[serde(rename = "order")]
    pub sort_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A tutorial joined with one user's completion flag.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TutorialWithProgress {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub thumbnail_url: Option<String>,
    pub category: String,
    #[serde(rename = "order")]
    pub sort_order: i32,
    pub completed: bool,
}

/// DTO for creating a tutorial. Videos are referenced by URL.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTutorial {
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub thumbnail_url: Option<String>,
    pub category: String,
    #[serde(default)]
    pub is_onboarding: bool,
    #[serde(rename = "order")]
    pub sort_order: Option<i32>,
}
