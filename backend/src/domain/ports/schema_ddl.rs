//! Port applying whitelisted DDL together with its audit record.

use async_trait::async_trait;

use crate::domain::{NewAuditRecord, SchemaChange};

use super::define_port_error;

define_port_error! {
    /// Errors raised while applying a schema change.
    pub enum SchemaDdlError {
        /// Connection could not be established.
        Connection { message: String } => "schema change connection failed: {message}",
        /// Infrastructure failure (transaction, audit insert); nothing was applied.
        Query { message: String } => "schema change failed: {message}",
        /// The database refused the ALTER statement; nothing was applied.
        Rejected { message: String } => "database rejected schema change: {message}",
        /// The table vanished between validation and execution.
        TableNotFound { table: String } => "table {table} does not exist",
        /// The source column vanished between validation and execution.
        ColumnNotFound { table: String, column: String } =>
            "column {column} does not exist on {table}",
        /// The target column appeared between validation and execution.
        ColumnAlreadyExists { table: String, column: String } =>
            "column {column} already exists on {table}",
    }
}

/// Applies one schema change and its audit record atomically.
///
/// Implementations must re-check table and column existence inside the same
/// transaction as the ALTER statement and must roll the change back when the
/// audit insert fails.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SchemaDdl: Send + Sync {
    /// Apply `change` and append `audit` in one transaction.
    async fn apply(&self, change: &SchemaChange, audit: &NewAuditRecord)
    -> Result<(), SchemaDdlError>;
}
