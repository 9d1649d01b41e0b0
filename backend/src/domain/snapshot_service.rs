//! Schema snapshot builder and loader.
//!
//! The builder introspects one schema, assembles the whole mapping in memory
//! and hands it to the store in a single write, so a failed catalog query
//! never leaves a partial snapshot behind.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::SchemaSnapshot;
use crate::domain::ports::{
    SchemaCatalog, SchemaCatalogError, SchemaSnapshotCommand, SnapshotBuild, SnapshotError,
    SnapshotStore, SnapshotStoreError,
};

/// Schema used when nothing else is configured.
pub const DEFAULT_SCHEMA: &str = "public";

/// Migration bookkeeping tables never included in a snapshot.
pub const EXCLUDED_TABLES: [&str; 3] = [
    "__diesel_schema_migrations",
    "knex_migrations",
    "knex_migrations_lock",
];

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Pick the schema to introspect.
///
/// Priority: explicit argument, then environment override, then the first
/// element of the configured search path, then `public`.
///
/// # Examples
/// ```
/// use inventory_admin::domain::resolve_schema_name;
///
/// assert_eq!(resolve_schema_name(None, None, Some("inventory, public")), "inventory");
/// assert_eq!(resolve_schema_name(Some("audit"), Some("other"), None), "audit");
/// assert_eq!(resolve_schema_name(None, Some("  "), None), "public");
/// ```
#[must_use]
pub fn resolve_schema_name(
    explicit: Option<&str>,
    env_override: Option<&str>,
    configured: Option<&str>,
) -> String {
    let configured_head = non_blank(configured).and_then(|path| non_blank(path.split(',').next()));
    non_blank(explicit)
        .or_else(|| non_blank(env_override))
        .or(configured_head)
        .unwrap_or(DEFAULT_SCHEMA)
        .to_owned()
}

/// Which schema and tables a builder covers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotScope {
    /// Environment override (`PG_SCHEMA`).
    pub env_override: Option<String>,
    /// Configured search path (`PG_SEARCH_PATH`).
    pub configured: Option<String>,
    /// Optional allowlist, compared case-insensitively. Empty means all tables.
    pub only_tables: Vec<String>,
}

impl SnapshotScope {
    fn includes(&self, table: &str) -> bool {
        if EXCLUDED_TABLES.contains(&table) {
            return false;
        }
        self.only_tables.is_empty()
            || self
                .only_tables
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(table))
    }
}

/// Load the stored snapshot, mapping absence to [`SnapshotError::SnapshotMissing`].
///
/// # Errors
/// Returns [`SnapshotError`] when the snapshot is absent or unreadable.
pub async fn load_snapshot<S>(store: &S) -> Result<SchemaSnapshot, SnapshotError>
where
    S: SnapshotStore + ?Sized,
{
    match store.read().await {
        Ok(Some(snapshot)) => Ok(snapshot),
        Ok(None) => Err(SnapshotError::SnapshotMissing {
            location: store.location(),
        }),
        Err(err) => Err(map_store_error(err)),
    }
}

fn map_catalog_error(error: SchemaCatalogError) -> SnapshotError {
    let message = match error {
        SchemaCatalogError::Connection { message } | SchemaCatalogError::Query { message } => {
            message
        }
    };
    SnapshotError::CatalogUnavailable { message }
}

fn map_store_error(error: SnapshotStoreError) -> SnapshotError {
    match error {
        SnapshotStoreError::Write { .. } => SnapshotError::SnapshotWrite {
            message: error.to_string(),
        },
        SnapshotStoreError::Read { .. } | SnapshotStoreError::Corrupt { .. } => {
            SnapshotError::SnapshotCorrupt {
                message: error.to_string(),
            }
        }
    }
}

/// Snapshot service implementing [`SchemaSnapshotCommand`].
#[derive(Clone)]
pub struct SchemaSnapshotService<C: ?Sized, S: ?Sized> {
    catalog: Arc<C>,
    store: Arc<S>,
    scope: SnapshotScope,
}

impl<C: ?Sized, S: ?Sized> SchemaSnapshotService<C, S> {
    /// Create a service reading `catalog` and writing to `store`.
    pub fn new(catalog: Arc<C>, store: Arc<S>, scope: SnapshotScope) -> Self {
        Self {
            catalog,
            store,
            scope,
        }
    }
}

impl<C, S> SchemaSnapshotService<C, S>
where
    C: SchemaCatalog + ?Sized,
    S: ?Sized,
{
    /// Introspect `schema` without touching the store.
    ///
    /// # Errors
    /// Returns [`SnapshotError::CatalogUnavailable`] on any catalog failure.
    pub async fn capture(&self, schema: &str) -> Result<SchemaSnapshot, SnapshotError> {
        let tables = self
            .catalog
            .list_base_tables(schema)
            .await
            .map_err(map_catalog_error)?;

        let mut snapshot = SchemaSnapshot::default();
        for table in tables.into_iter().filter(|t| self.scope.includes(t)) {
            let columns = self
                .catalog
                .list_columns(schema, &table)
                .await
                .map_err(map_catalog_error)?;
            snapshot.insert_table(table, columns);
        }
        Ok(snapshot)
    }
}

#[async_trait]
impl<C, S> SchemaSnapshotCommand for SchemaSnapshotService<C, S>
where
    C: SchemaCatalog + ?Sized,
    S: SnapshotStore + ?Sized,
{
    async fn build(&self, schema: Option<String>) -> Result<SnapshotBuild, SnapshotError> {
        let schema = resolve_schema_name(
            schema.as_deref(),
            self.scope.env_override.as_deref(),
            self.scope.configured.as_deref(),
        );
        let snapshot = self.capture(&schema).await.inspect_err(|err| {
            warn!(error = %err, schema = %schema, "schema snapshot build failed");
        })?;
        if snapshot.is_empty() {
            warn!(schema = %schema, "schema snapshot captured no tables");
        }

        let location = self
            .store
            .write(&snapshot)
            .await
            .map_err(map_store_error)?;
        info!(
            schema = %schema,
            tables = snapshot.table_count(),
            location = %location,
            "schema snapshot written"
        );
        Ok(SnapshotBuild {
            location,
            schema,
            table_count: snapshot.table_count(),
        })
    }

    async fn load(&self) -> Result<SchemaSnapshot, SnapshotError> {
        load_snapshot(self.store.as_ref()).await
    }
}

#[cfg(test)]
#[path = "snapshot_service_tests.rs"]
mod tests;
