//! In-memory stand-in for the inventory database.
//!
//! One shared state backs the catalog and DDL ports so schema changes
//! and their audit rows stay consistent, mirroring the transactional
//! PostgreSQL adapter without a server.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use inventory_admin::domain::ports::{SchemaCatalog, SchemaCatalogError, SchemaDdl, SchemaDdlError};
use inventory_admin::domain::{NewAuditRecord, SchemaChange, SnapshotColumn};

#[derive(Debug, Default)]
struct InventoryState {
    tables: BTreeMap<String, Vec<SnapshotColumn>>,
    audits: Vec<NewAuditRecord>,
    ddl_calls: usize,
    catalog_offline: bool,
}

/// Shared in-memory catalog, DDL executor and audit log.
#[derive(Debug, Clone, Default)]
pub struct InMemoryInventory {
    state: Arc<Mutex<InventoryState>>,
}

impl InMemoryInventory {
    /// Database holding the baseline inventory tables.
    pub fn seeded() -> Self {
        Self::default()
            .with_table(
                "users",
                &[
                    ("id", "integer", false),
                    ("username", "character varying", false),
                    ("email", "character varying", false),
                    ("password", "character varying", false),
                ],
            )
            .with_table(
                "areas",
                &[
                    ("id", "integer", false),
                    ("nombre", "character varying", false),
                    ("codigo", "character varying", false),
                ],
            )
            .with_table(
                "paises",
                &[
                    ("id", "integer", false),
                    ("nombre", "character varying", false),
                    ("codigo", "character varying", false),
                ],
            )
            .with_table(
                "inventarios",
                &[
                    ("id", "integer", false),
                    ("codigo", "character varying", false),
                    ("descripcion", "character varying", false),
                    ("area_funcional_id", "integer", true),
                    ("pais_id", "integer", true),
                    ("created_at", "timestamp with time zone", false),
                ],
            )
            .with_table(
                "__diesel_schema_migrations",
                &[
                    ("version", "character varying", false),
                    ("run_on", "timestamp without time zone", false),
                ],
            )
    }

    /// Add a table with `(name, type, nullable)` columns.
    pub fn with_table(self, table: &str, columns: &[(&str, &str, bool)]) -> Self {
        let columns = columns
            .iter()
            .map(|(name, data_type, nullable)| SnapshotColumn::new(*name, *data_type, *nullable))
            .collect();
        self.lock().tables.insert(table.to_owned(), columns);
        self
    }

    /// Make every catalog call fail as if the database were unreachable.
    pub fn take_offline(&self) {
        self.lock().catalog_offline = true;
    }

    /// Audit rows appended so far.
    pub fn audits(&self) -> Vec<NewAuditRecord> {
        self.lock().audits.clone()
    }

    /// Number of DDL statements the executor received.
    pub fn ddl_calls(&self) -> usize {
        self.lock().ddl_calls
    }

    /// Whether `table` currently has `column`.
    pub fn has_column(&self, table: &str, column: &str) -> bool {
        self.lock()
            .tables
            .get(table)
            .is_some_and(|columns| columns.iter().any(|c| c.name == column))
    }

    /// Column descriptor for `table.column`, if present.
    pub fn column(&self, table: &str, column: &str) -> Option<SnapshotColumn> {
        self.lock()
            .tables
            .get(table)
            .and_then(|columns| columns.iter().find(|c| c.name == column).cloned())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, InventoryState> {
        self.state.lock().expect("inventory state poisoned")
    }

    fn ensure_online(&self) -> Result<(), SchemaCatalogError> {
        if self.lock().catalog_offline {
            Err(SchemaCatalogError::connection("connection refused"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SchemaCatalog for InMemoryInventory {
    async fn list_base_tables(&self, _schema: &str) -> Result<Vec<String>, SchemaCatalogError> {
        self.ensure_online()?;
        Ok(self.lock().tables.keys().cloned().collect())
    }

    async fn list_columns(
        &self,
        _schema: &str,
        table: &str,
    ) -> Result<Vec<SnapshotColumn>, SchemaCatalogError> {
        self.ensure_online()?;
        Ok(self.lock().tables.get(table).cloned().unwrap_or_default())
    }

    async fn table_exists(&self, _schema: &str, table: &str) -> Result<bool, SchemaCatalogError> {
        self.ensure_online()?;
        Ok(self.lock().tables.contains_key(table))
    }

    async fn column_exists(
        &self,
        _schema: &str,
        table: &str,
        column: &str,
    ) -> Result<bool, SchemaCatalogError> {
        self.ensure_online()?;
        Ok(self.has_column(table, column))
    }
}

#[async_trait]
impl SchemaDdl for InMemoryInventory {
    async fn apply(
        &self,
        change: &SchemaChange,
        audit: &NewAuditRecord,
    ) -> Result<(), SchemaDdlError> {
        let mut state = self.lock();
        state.ddl_calls += 1;
        let table = change.table().as_str().to_owned();
        let Some(columns) = state.tables.get_mut(&table) else {
            return Err(SchemaDdlError::table_not_found(table));
        };

        match change {
            SchemaChange::AddColumn(add) => {
                let name = add.column.as_str();
                if columns.iter().any(|c| c.name == name) {
                    return Err(SchemaDdlError::column_already_exists(table, name));
                }
                columns.push(SnapshotColumn::new(
                    name,
                    add.column_type.postgres_type(),
                    add.nullable,
                ));
            }
            SchemaChange::RenameColumn(rename) => {
                if columns.iter().any(|c| c.name == rename.new_name.as_str()) {
                    return Err(SchemaDdlError::column_already_exists(
                        table,
                        rename.new_name.as_str(),
                    ));
                }
                let Some(column) = columns
                    .iter_mut()
                    .find(|c| c.name == rename.old_name.as_str())
                else {
                    return Err(SchemaDdlError::column_not_found(
                        table,
                        rename.old_name.as_str(),
                    ));
                };
                column.name = rename.new_name.as_str().to_owned();
            }
        }

        state.audits.push(audit.clone());
        Ok(())
    }
}
