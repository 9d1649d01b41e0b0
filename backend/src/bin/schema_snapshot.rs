//! Build the schema snapshot that grounds natural-language reports.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::runtime::Builder;
use tracing_subscriber::{EnvFilter, fmt};

use inventory_admin::config::AppConfig;
use inventory_admin::domain::ports::SchemaSnapshotCommand;
use inventory_admin::domain::{SchemaSnapshotService, SnapshotScope};
use inventory_admin::outbound::persistence::{DbPool, DieselSchemaCatalog, PoolConfig};
use inventory_admin::outbound::snapshot_file::FileSnapshotStore;

/// `schema-snapshot` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "schema-snapshot",
    about = "Introspect the database catalog and write the schema snapshot",
    version
)]
struct CliArgs {
    /// Schema to introspect. Defaults to `PG_SCHEMA`, then `PG_SEARCH_PATH`, then `public`.
    #[arg(long, value_name = "name")]
    schema: Option<String>,
    /// Restrict the snapshot to this table (repeatable, case-insensitive).
    #[arg(long = "only-table", value_name = "name")]
    only_tables: Vec<String>,
    /// Snapshot file to write. Defaults to `SNAPSHOT_PATH`.
    #[arg(long, value_name = "path")]
    output: Option<PathBuf>,
    /// Database connection URL. Falls back to `DATABASE_URL` when omitted.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
}

fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .try_init()
    {
        eprintln!("tracing init failed: {e}");
    }

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let app = AppConfig::load().map_err(|err| io::Error::other(format!("configuration: {err}")))?;

    let database_url = match (&args.database_url, &app.database) {
        (Some(url), _) => url.clone(),
        (None, Some(database)) => database.url.expose().to_owned(),
        (None, None) => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "provide --database-url or set DATABASE_URL",
            ));
        }
    };

    let pool = DbPool::new(PoolConfig::new(database_url).with_max_size(1))
        .await
        .map_err(|err| io::Error::other(format!("database pool: {err}")))?;

    let only_tables = if args.only_tables.is_empty() {
        app.only_tables.clone()
    } else {
        args.only_tables.clone()
    };
    let store = FileSnapshotStore::new(args.output.clone().unwrap_or(app.snapshot_path.clone()));
    let service = SchemaSnapshotService::new(
        Arc::new(DieselSchemaCatalog::new(pool)),
        Arc::new(store),
        SnapshotScope {
            env_override: app.schema_override.clone(),
            configured: app.search_path.clone(),
            only_tables,
        },
    );

    let build = service
        .build(args.schema.clone())
        .await
        .map_err(|err| io::Error::other(err.to_string()))?;
    eprintln!(
        "captured {} tables from schema {}",
        build.table_count, build.schema
    );
    println!("{}", build.location);
    Ok(())
}
