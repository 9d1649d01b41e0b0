//! Domain primitives, services and ports.
//!
//! Purpose: hold the rules of the admin backend independent of transport and
//! storage. Inbound adapters call the driving ports in [`ports`]; outbound
//! adapters implement the driven ones.
//!
//! Public surface:
//! - Error / ErrorCode: API error payload and stable codes.
//! - Identifier / ColumnType: validated DDL inputs.
//! - SchemaSnapshot: table to column mapping fed to the report translator.
//! - ReportService, SchemaSnapshotService, SchemaAdminService: the three
//!   driving-port implementations.

pub mod audit;
pub mod error;
pub mod identifier;
pub mod ports;
pub mod report_prompt;
pub mod report_service;
pub mod schema_admin_service;
pub mod schema_mutation;
pub mod schema_snapshot;
pub mod snapshot_service;
pub mod sql_format;
pub mod sql_guard;
pub mod trace_id;

pub use self::audit::{
    AuditActor, AuditEvent, AuditRecordBuilder, AuditRecorder, NewAuditRecord, SCHEMA_AUDITABLE_TYPE,
    SCHEMA_ENTITY_ID,
};
pub use self::error::{Error, ErrorCode};
pub use self::identifier::{
    ColumnType, Identifier, IdentifierError, MAX_IDENTIFIER_LEN, is_allowed_type,
    is_valid_identifier,
};
pub use self::report_prompt::build_report_prompt;
pub use self::report_service::ReportService;
pub use self::schema_admin_service::{
    SchemaAdminService, validate_add_column, validate_rename_column,
};
pub use self::schema_mutation::{
    AddColumnChange, ColumnDefault, InvalidDefault, RenameColumnChange, SchemaChange,
};
pub use self::schema_snapshot::{SchemaSnapshot, SnapshotColumn};
pub use self::snapshot_service::{
    DEFAULT_SCHEMA, SchemaSnapshotService, SnapshotScope, load_snapshot, resolve_schema_name,
};
pub use self::sql_format::{SqlFormat, format_sql};
pub use self::sql_guard::{DEFAULT_ROW_LIMIT, ReadOnlySelect, SqlGuardError};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use inventory_admin::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
