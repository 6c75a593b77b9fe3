use std::sync::Arc;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: nextmove_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Account events (registration, approval, password reset) for the
    /// email notifier.
    pub event_bus: Arc<nextmove_events::EventBus>,
}
