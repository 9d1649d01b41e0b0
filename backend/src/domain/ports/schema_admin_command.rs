//! Driving port for safe column mutations.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{AuditActor, AuditEvent};

/// Raw add-column request as received from a caller.
#[derive(Debug, Clone, PartialEq)]
pub struct AddColumnRequest {
    pub table: String,
    pub column: String,
    pub column_type: String,
    pub nullable: bool,
    pub default: Option<Value>,
    pub after: Option<String>,
}

/// Raw rename-column request as received from a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameColumnRequest {
    pub table: String,
    pub old_name: String,
    pub new_name: String,
}

/// Result of an applied mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaMutationOutcome {
    pub event: AuditEvent,
    pub message: String,
}

/// Request field an identifier came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierField {
    Table,
    Column,
    After,
    OldName,
    NewName,
}

impl IdentifierField {
    /// Wire name of the field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Column => "column",
            Self::After => "after",
            Self::OldName => "oldName",
            Self::NewName => "newName",
        }
    }
}

/// Failures of schema mutations. Every variant means no DDL was applied and
/// no audit record was written.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaMutationError {
    #[error("invalid identifier in `{}`: {value:?}", .field.as_str())]
    InvalidIdentifier { field: IdentifierField, value: String },
    #[error("column type `{value}` is not allowed")]
    UnknownType { value: String },
    #[error("default value is not valid for column type `{column_type}`")]
    InvalidDefault { column_type: String },
    #[error("table {table} does not exist")]
    TableNotFound { table: String },
    #[error("column {column} does not exist on {table}")]
    ColumnNotFound { table: String, column: String },
    #[error("column {column} already exists on {table}")]
    ColumnAlreadyExists { table: String, column: String },
    #[error("database rejected the change: {message}")]
    Rejected { message: String },
    #[error("database catalog unavailable: {message}")]
    CatalogUnavailable { message: String },
    #[error("schema change failed: {message}")]
    Execution { message: String },
}

impl SchemaMutationError {
    /// Stable snake_case identifier used in error details.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidIdentifier { .. } => "invalid_identifier",
            Self::UnknownType { .. } => "unknown_type",
            Self::InvalidDefault { .. } => "invalid_default",
            Self::TableNotFound { .. } => "table_not_found",
            Self::ColumnNotFound { .. } => "column_not_found",
            Self::ColumnAlreadyExists { .. } => "column_already_exists",
            Self::Rejected { .. } => "ddl_rejected",
            Self::CatalogUnavailable { .. } => "catalog_unavailable",
            Self::Execution { .. } => "execution_failed",
        }
    }
}

/// Add and rename columns under validation and audit.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SchemaAdminCommand: Send + Sync {
    /// Validate and apply an `ADD COLUMN`.
    async fn add_column(
        &self,
        request: AddColumnRequest,
        actor: &AuditActor,
    ) -> Result<SchemaMutationOutcome, SchemaMutationError>;

    /// Validate and apply a `RENAME COLUMN`.
    async fn rename_column(
        &self,
        request: RenameColumnRequest,
        actor: &AuditActor,
    ) -> Result<SchemaMutationOutcome, SchemaMutationError>;
}
