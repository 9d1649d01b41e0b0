//! Port for live catalog introspection.

use async_trait::async_trait;

use crate::domain::SnapshotColumn;

use super::define_port_error;

define_port_error! {
    /// Errors raised while reading the database catalog.
    pub enum SchemaCatalogError {
        /// The catalog could not be reached.
        Connection { message: String } => "catalog connection failed: {message}",
        /// An introspection query failed.
        Query { message: String } => "catalog query failed: {message}",
    }
}

/// Read-only access to table and column metadata of one schema.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SchemaCatalog: Send + Sync {
    /// Base tables of `schema`, ordered by name.
    async fn list_base_tables(&self, schema: &str) -> Result<Vec<String>, SchemaCatalogError>;

    /// Columns of `schema.table` in ordinal order.
    async fn list_columns(
        &self,
        schema: &str,
        table: &str,
    ) -> Result<Vec<SnapshotColumn>, SchemaCatalogError>;

    /// Whether `schema.table` exists as a base table.
    async fn table_exists(&self, schema: &str, table: &str) -> Result<bool, SchemaCatalogError>;

    /// Whether `schema.table` has a column named `column`.
    async fn column_exists(
        &self,
        schema: &str,
        table: &str,
        column: &str,
    ) -> Result<bool, SchemaCatalogError>;
}

/// Catalog with no tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureSchemaCatalog;

#[async_trait]
impl SchemaCatalog for FixtureSchemaCatalog {
    async fn list_base_tables(&self, _schema: &str) -> Result<Vec<String>, SchemaCatalogError> {
        Ok(Vec::new())
    }

    async fn list_columns(
        &self,
        _schema: &str,
        _table: &str,
    ) -> Result<Vec<SnapshotColumn>, SchemaCatalogError> {
        Ok(Vec::new())
    }

    async fn table_exists(&self, _schema: &str, _table: &str) -> Result<bool, SchemaCatalogError> {
        Ok(false)
    }

    async fn column_exists(
        &self,
        _schema: &str,
        _table: &str,
        _column: &str,
    ) -> Result<bool, SchemaCatalogError> {
        Ok(false)
    }
}
