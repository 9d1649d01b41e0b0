//! HTTP server configuration object.

use inventory_admin::config::AppConfig;
use inventory_admin::outbound::persistence::DbPool;

/// Everything needed to start the HTTP server.
pub struct ServerConfig {
    pub(crate) app: AppConfig,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    /// Wrap the loaded application configuration.
    #[must_use]
    pub fn new(app: AppConfig) -> Self {
        Self { app, db_pool: None }
    }

    /// Attach a database pool so persistence adapters replace the
    /// database-unavailable fallbacks.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }
}
