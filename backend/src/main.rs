//! Backend entry-point: loads configuration, prepares the database and serves
//! the report and schema administration API.

mod server;

use actix_web::web;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use inventory_admin::config::AppConfig;
use inventory_admin::inbound::http::health::HealthState;
use inventory_admin::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};

use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let app = AppConfig::load()
        .map_err(|err| std::io::Error::other(format!("configuration: {err}")))?;
    let mut config = ServerConfig::new(app.clone());

    if let Some(database) = &app.database {
        if database.run_migrations {
            run_pending_migrations(database.url.expose())
                .await
                .map_err(|err| std::io::Error::other(format!("migrations: {err}")))?;
        }
        let pool = DbPool::new(
            PoolConfig::new(database.url.expose()).with_max_size(database.pool_max_size),
        )
        .await
        .map_err(|err| std::io::Error::other(format!("database pool: {err}")))?;
        config = config.with_db_pool(pool);
    }

    info!(
        bind_addr = %app.bind_addr,
        schema = %app.active_schema,
        snapshot = %app.snapshot_path.display(),
        "starting inventory admin server"
    );

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;
    let result = server.await;
    health_state.mark_unhealthy();
    result
}
