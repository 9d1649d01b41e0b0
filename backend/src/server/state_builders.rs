//! Builders wiring adapters into services and HTTP state.

use std::sync::Arc;

use actix_web::web;
use async_trait::async_trait;
use mockable::DefaultClock;
use serde_json::Value;
use tracing::warn;

use inventory_admin::config::AppConfig;
use inventory_admin::domain::ports::{
    CompletionSource, ReportQuery, ReportQueryError, SchemaCatalog, SchemaCatalogError, SchemaDdl,
    SchemaDdlError, UnconfiguredCompletionSource,
};
use inventory_admin::domain::{
    AuditRecordBuilder, NewAuditRecord, ReadOnlySelect, ReportService, SchemaAdminService,
    SchemaChange, SchemaSnapshotService, SnapshotColumn, SnapshotScope,
};
use inventory_admin::inbound::http::admin_auth::AdminGate;
use inventory_admin::inbound::http::state::{HttpState, HttpStatePorts};
use inventory_admin::outbound::completion::ChatCompletionHttpSource;
use inventory_admin::outbound::persistence::{
    DbPool, DieselReportQuery, DieselSchemaCatalog, DieselSchemaDdl,
};
use inventory_admin::outbound::snapshot_file::FileSnapshotStore;

use super::ServerConfig;

const NO_DATABASE: &str = "DATABASE_URL is not configured";

/// Stand-in for every database port when no pool is configured; each call
/// reports the database as unreachable.
#[derive(Debug, Clone, Copy, Default)]
struct NoDatabase;

#[async_trait]
impl SchemaCatalog for NoDatabase {
    async fn list_base_tables(&self, _schema: &str) -> Result<Vec<String>, SchemaCatalogError> {
        Err(SchemaCatalogError::connection(NO_DATABASE))
    }

    async fn list_columns(
        &self,
        _schema: &str,
        _table: &str,
    ) -> Result<Vec<SnapshotColumn>, SchemaCatalogError> {
        Err(SchemaCatalogError::connection(NO_DATABASE))
    }

    async fn table_exists(&self, _schema: &str, _table: &str) -> Result<bool, SchemaCatalogError> {
        Err(SchemaCatalogError::connection(NO_DATABASE))
    }

    async fn column_exists(
        &self,
        _schema: &str,
        _table: &str,
        _column: &str,
    ) -> Result<bool, SchemaCatalogError> {
        Err(SchemaCatalogError::connection(NO_DATABASE))
    }
}

#[async_trait]
impl SchemaDdl for NoDatabase {
    async fn apply(
        &self,
        _change: &SchemaChange,
        _audit: &NewAuditRecord,
    ) -> Result<(), SchemaDdlError> {
        Err(SchemaDdlError::connection(NO_DATABASE))
    }
}

#[async_trait]
impl ReportQuery for NoDatabase {
    async fn run(&self, _statement: &ReadOnlySelect) -> Result<Vec<Value>, ReportQueryError> {
        Err(ReportQueryError::connection(NO_DATABASE))
    }
}

/// Database-facing ports, either Diesel-backed or [`NoDatabase`].
struct DatabasePorts {
    catalog: Arc<dyn SchemaCatalog>,
    ddl: Arc<dyn SchemaDdl>,
    query: Arc<dyn ReportQuery>,
}

fn build_database_ports(pool: Option<&DbPool>, app: &AppConfig) -> DatabasePorts {
    match pool {
        Some(pool) => DatabasePorts {
            catalog: Arc::new(DieselSchemaCatalog::new(pool.clone())),
            ddl: Arc::new(DieselSchemaDdl::new(pool.clone())),
            query: Arc::new(DieselReportQuery::new(pool.clone(), app.report_timeout)),
        },
        None => {
            warn!("no database configured; reports and schema changes will fail with 503");
            DatabasePorts {
                catalog: Arc::new(NoDatabase),
                ddl: Arc::new(NoDatabase),
                query: Arc::new(NoDatabase),
            }
        }
    }
}

/// Build the completion source, falling back to the unconfigured one.
///
/// # Errors
/// Returns [`std::io::Error`] when the HTTP client cannot be built.
fn build_completion_source(
    app: &AppConfig,
) -> std::io::Result<Arc<dyn CompletionSource>> {
    match &app.completion {
        Some(completion) => {
            let source = ChatCompletionHttpSource::new(
                completion.api_url.clone(),
                completion.api_key.to_zeroizing(),
                completion.model.clone(),
                completion.timeout,
            )
            .map_err(|err| std::io::Error::other(format!("completion client: {err}")))?;
            Ok(Arc::new(source))
        }
        None => {
            warn!("AI_API_KEY is not set; natural-language reports are unavailable");
            Ok(Arc::new(UnconfiguredCompletionSource))
        }
    }
}

/// Snapshot scope derived from configuration.
fn snapshot_scope(app: &AppConfig) -> SnapshotScope {
    SnapshotScope {
        env_override: app.schema_override.clone(),
        configured: app.search_path.clone(),
        only_tables: app.only_tables.clone(),
    }
}

/// Assemble services and wrap them in HTTP state.
///
/// # Errors
/// Returns [`std::io::Error`] when an outbound client cannot be built.
pub(crate) fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let app = &config.app;
    let ports = build_database_ports(config.db_pool.as_ref(), app);
    let store = Arc::new(FileSnapshotStore::new(app.snapshot_path.clone()));
    let completion = build_completion_source(app)?;

    let snapshots = SchemaSnapshotService::new(ports.catalog.clone(), store.clone(), snapshot_scope(app));
    let reports =
        ReportService::new(store, completion, ports.query).with_row_limit(app.row_limit);
    let schema_admin = SchemaAdminService::new(
        ports.catalog,
        ports.ddl,
        AuditRecordBuilder::new(Arc::new(DefaultClock)),
        app.active_schema.clone(),
    );

    let admin = AdminGate::new(app.admin_token.as_ref().map(|token| token.expose()));
    if !admin.is_enabled() {
        warn!("ADMIN_TOKEN is not set; every admin endpoint will answer 403");
    }

    Ok(web::Data::new(HttpState::new(
        HttpStatePorts {
            reports: Arc::new(reports),
            schema_admin: Arc::new(schema_admin),
            snapshots: Arc::new(snapshots),
        },
        admin,
    )))
}
