//! Safe DDL executor: validation, existence checks, ALTER and audit.
//!
//! Checks run in a fixed order and the first failure wins: identifiers, type,
//! default, table existence, column existence. Only then is the change handed
//! to [`SchemaDdl`], which repeats the existence checks inside the transaction
//! that runs the ALTER statement and inserts the audit record.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::audit::AuditRecordBuilder;
use crate::domain::ports::{
    AddColumnRequest, IdentifierField, RenameColumnRequest, SchemaAdminCommand,
    SchemaCatalog, SchemaCatalogError, SchemaDdl, SchemaDdlError, SchemaMutationError,
    SchemaMutationOutcome,
};
use crate::domain::{
    AddColumnChange, AuditActor, ColumnDefault, ColumnType, Identifier, RenameColumnChange,
    SchemaChange,
};

fn parse_identifier(field: IdentifierField, raw: String) -> Result<Identifier, SchemaMutationError> {
    Identifier::parse(raw).map_err(|err| SchemaMutationError::InvalidIdentifier {
        field,
        value: err.value().to_owned(),
    })
}

fn map_catalog_error(error: SchemaCatalogError) -> SchemaMutationError {
    let message = match error {
        SchemaCatalogError::Connection { message } | SchemaCatalogError::Query { message } => {
            message
        }
    };
    SchemaMutationError::CatalogUnavailable { message }
}

fn map_ddl_error(error: SchemaDdlError) -> SchemaMutationError {
    match error {
        SchemaDdlError::Connection { message } => {
            SchemaMutationError::CatalogUnavailable { message }
        }
        SchemaDdlError::Query { message } => SchemaMutationError::Execution { message },
        SchemaDdlError::Rejected { message } => SchemaMutationError::Rejected { message },
        SchemaDdlError::TableNotFound { table } => SchemaMutationError::TableNotFound { table },
        SchemaDdlError::ColumnNotFound { table, column } => {
            SchemaMutationError::ColumnNotFound { table, column }
        }
        SchemaDdlError::ColumnAlreadyExists { table, column } => {
            SchemaMutationError::ColumnAlreadyExists { table, column }
        }
    }
}

/// Validate the request shape without touching the database.
///
/// # Errors
/// Returns the first grammar, type or default violation.
pub fn validate_add_column(
    schema: &Identifier,
    request: AddColumnRequest,
) -> Result<AddColumnChange, SchemaMutationError> {
    let AddColumnRequest {
        table,
        column,
        column_type,
        nullable,
        default,
        after,
    } = request;

    let table = parse_identifier(IdentifierField::Table, table)?;
    let column = parse_identifier(IdentifierField::Column, column)?;
    let after = after
        .filter(|value| !value.is_empty())
        .map(|value| parse_identifier(IdentifierField::After, value))
        .transpose()?;
    let kind = ColumnType::parse(&column_type)
        .ok_or(SchemaMutationError::UnknownType { value: column_type })?;
    let default = match default {
        Some(value) => ColumnDefault::from_json(kind, &value).map_err(|err| {
            SchemaMutationError::InvalidDefault {
                column_type: err.column_type.as_str().to_owned(),
            }
        })?,
        None => None,
    };

    Ok(AddColumnChange {
        schema: schema.clone(),
        table,
        column,
        column_type: kind,
        nullable,
        default,
        after,
    })
}

/// Validate the rename request shape without touching the database.
///
/// # Errors
/// Returns the first grammar violation.
pub fn validate_rename_column(
    schema: &Identifier,
    request: RenameColumnRequest,
) -> Result<RenameColumnChange, SchemaMutationError> {
    Ok(RenameColumnChange {
        schema: schema.clone(),
        table: parse_identifier(IdentifierField::Table, request.table)?,
        old_name: parse_identifier(IdentifierField::OldName, request.old_name)?,
        new_name: parse_identifier(IdentifierField::NewName, request.new_name)?,
    })
}

/// Schema administration service implementing [`SchemaAdminCommand`].
#[derive(Clone)]
pub struct SchemaAdminService<C: ?Sized, D: ?Sized> {
    catalog: Arc<C>,
    ddl: Arc<D>,
    records: AuditRecordBuilder,
    schema: Identifier,
}

impl<C: ?Sized, D: ?Sized> SchemaAdminService<C, D> {
    /// Create a service mutating tables of `schema`.
    ///
    /// `records` stamps the audit row that `ddl` inserts alongside the change.
    pub fn new(
        catalog: Arc<C>,
        ddl: Arc<D>,
        records: AuditRecordBuilder,
        schema: Identifier,
    ) -> Self {
        Self {
            catalog,
            ddl,
            records,
            schema,
        }
    }
}

impl<C, D> SchemaAdminService<C, D>
where
    C: SchemaCatalog + ?Sized,
    D: SchemaDdl + ?Sized,
{
    async fn ensure_table(&self, table: &Identifier) -> Result<(), SchemaMutationError> {
        let exists = self
            .catalog
            .table_exists(self.schema.as_str(), table.as_str())
            .await
            .map_err(map_catalog_error)?;
        if exists {
            Ok(())
        } else {
            Err(SchemaMutationError::TableNotFound {
                table: table.to_string(),
            })
        }
    }

    async fn column_exists(
        &self,
        table: &Identifier,
        column: &Identifier,
    ) -> Result<bool, SchemaMutationError> {
        self.catalog
            .column_exists(self.schema.as_str(), table.as_str(), column.as_str())
            .await
            .map_err(map_catalog_error)
    }

    async fn apply(
        &self,
        change: SchemaChange,
        actor: &AuditActor,
        message: String,
    ) -> Result<SchemaMutationOutcome, SchemaMutationError> {
        let event = change.audit_event();
        let audit = self
            .records
            .prepare_schema_event(event, change.audit_payload(), actor);
        self.ddl.apply(&change, &audit).await.map_err(|err| {
            warn!(error = %err, table = %change.table(), event = event.as_str(), "schema change not applied");
            map_ddl_error(err)
        })?;
        info!(
            table = %change.table(),
            event = event.as_str(),
            actor = actor.as_str(),
            "schema change applied"
        );
        Ok(SchemaMutationOutcome { event, message })
    }
}

#[async_trait]
impl<C, D> SchemaAdminCommand for SchemaAdminService<C, D>
where
    C: SchemaCatalog + ?Sized,
    D: SchemaDdl + ?Sized,
{
    async fn add_column(
        &self,
        request: AddColumnRequest,
        actor: &AuditActor,
    ) -> Result<SchemaMutationOutcome, SchemaMutationError> {
        let change = validate_add_column(&self.schema, request)?;
        self.ensure_table(&change.table).await?;
        if self.column_exists(&change.table, &change.column).await? {
            return Err(SchemaMutationError::ColumnAlreadyExists {
                table: change.table.to_string(),
                column: change.column.to_string(),
            });
        }

        let message = format!("column {} added to {}", change.column, change.table);
        self.apply(SchemaChange::AddColumn(change), actor, message)
            .await
    }

    async fn rename_column(
        &self,
        request: RenameColumnRequest,
        actor: &AuditActor,
    ) -> Result<SchemaMutationOutcome, SchemaMutationError> {
        let change = validate_rename_column(&self.schema, request)?;
        self.ensure_table(&change.table).await?;
        if !self.column_exists(&change.table, &change.old_name).await? {
            return Err(SchemaMutationError::ColumnNotFound {
                table: change.table.to_string(),
                column: change.old_name.to_string(),
            });
        }
        if self.column_exists(&change.table, &change.new_name).await? {
            return Err(SchemaMutationError::ColumnAlreadyExists {
                table: change.table.to_string(),
                column: change.new_name.to_string(),
            });
        }

        let message = format!(
            "column {} renamed to {} on {}",
            change.old_name, change.new_name, change.table
        );
        self.apply(SchemaChange::RenameColumn(change), actor, message)
            .await
    }
}

#[cfg(test)]
#[path = "schema_admin_service_tests.rs"]
mod tests;
