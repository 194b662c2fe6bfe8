use std::sync::Arc;

use sqlx::PgPool;

use crate::ai::TaskExecutor;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// The AI task executor. Holds the chat client and retry policy; has no
    /// per-request state, so cloning the Arc is all the sharing needed.
    pub executor: Arc<TaskExecutor>,
    pub config: Config,
}
