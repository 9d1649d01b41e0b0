//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod audit_repository;
mod completion_source;
mod report_command;
mod report_query;
mod schema_admin_command;
mod schema_catalog;
mod schema_ddl;
mod schema_snapshot_command;
mod snapshot_store;

#[cfg(test)]
pub use audit_repository::MockAuditRepository;
pub use audit_repository::{AuditRepository, AuditRepositoryError};
#[cfg(test)]
pub use completion_source::MockCompletionSource;
pub use completion_source::{
    CompletionSource, CompletionSourceError, UnconfiguredCompletionSource,
};
#[cfg(test)]
pub use report_command::MockReportCommand;
pub use report_command::{ReportCommand, ReportError, ReportRows, ReportSource, TranslationError};
#[cfg(test)]
pub use report_query::MockReportQuery;
pub use report_query::{FixtureReportQuery, ReportQuery, ReportQueryError};
#[cfg(test)]
pub use schema_admin_command::MockSchemaAdminCommand;
pub use schema_admin_command::{
    AddColumnRequest, IdentifierField, RenameColumnRequest, SchemaAdminCommand,
    SchemaMutationError, SchemaMutationOutcome,
};
#[cfg(test)]
pub use schema_catalog::MockSchemaCatalog;
pub use schema_catalog::{FixtureSchemaCatalog, SchemaCatalog, SchemaCatalogError};
#[cfg(test)]
pub use schema_ddl::MockSchemaDdl;
pub use schema_ddl::{SchemaDdl, SchemaDdlError};
#[cfg(test)]
pub use schema_snapshot_command::MockSchemaSnapshotCommand;
pub use schema_snapshot_command::{SchemaSnapshotCommand, SnapshotBuild, SnapshotError};
#[cfg(test)]
pub use snapshot_store::MockSnapshotStore;
pub use snapshot_store::{FixtureSnapshotStore, SnapshotStore, SnapshotStoreError};
