//! Transactional DDL adapter.
//!
//! One transaction re-checks the catalog, runs the `ALTER TABLE` statement and
//! appends the audit row. PostgreSQL DDL is transactional, so a failed audit
//! insert leaves the table untouched.

use async_trait::async_trait;
use diesel::sql_query;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, AsyncPgConnection, RunQueryDsl};
use tracing::debug;

use crate::domain::ports::{SchemaDdl, SchemaDdlError};
use crate::domain::{NewAuditRecord, SchemaChange};

use super::ddl_statement::render_alter;
use super::diesel_audit_repository::insert_audit_on;
use super::diesel_helpers::{is_connection_error, map_diesel_error_message, map_pool_error_message};
use super::diesel_schema_catalog::{column_exists_on, table_exists_on};
use super::pool::DbPool;

/// Failure inside the DDL transaction.
#[derive(Debug)]
enum ApplyError {
    Diesel(diesel::result::Error),
    Refused(SchemaDdlError),
}

impl From<diesel::result::Error> for ApplyError {
    fn from(value: diesel::result::Error) -> Self {
        Self::Diesel(value)
    }
}

impl ApplyError {
    fn into_ddl_error(self) -> SchemaDdlError {
        match self {
            Self::Refused(err) => err,
            Self::Diesel(err) if is_connection_error(&err) => {
                SchemaDdlError::connection(map_diesel_error_message(err, "apply schema change"))
            }
            Self::Diesel(err) => {
                SchemaDdlError::query(map_diesel_error_message(err, "apply schema change"))
            }
        }
    }
}

/// Applies whitelisted schema changes through the shared pool.
#[derive(Clone)]
pub struct DieselSchemaDdl {
    pool: DbPool,
}

impl DieselSchemaDdl {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

async fn recheck(conn: &mut AsyncPgConnection, change: &SchemaChange) -> Result<(), ApplyError> {
    let schema = change.schema().as_str();
    let table = change.table().as_str();

    if !table_exists_on(conn, schema, table).await? {
        return Err(ApplyError::Refused(SchemaDdlError::table_not_found(table)));
    }

    match change {
        SchemaChange::AddColumn(add) => {
            if column_exists_on(conn, schema, table, add.column.as_str()).await? {
                return Err(ApplyError::Refused(SchemaDdlError::column_already_exists(
                    table,
                    add.column.as_str(),
                )));
            }
        }
        SchemaChange::RenameColumn(rename) => {
            if !column_exists_on(conn, schema, table, rename.old_name.as_str()).await? {
                return Err(ApplyError::Refused(SchemaDdlError::column_not_found(
                    table,
                    rename.old_name.as_str(),
                )));
            }
            if column_exists_on(conn, schema, table, rename.new_name.as_str()).await? {
                return Err(ApplyError::Refused(SchemaDdlError::column_already_exists(
                    table,
                    rename.new_name.as_str(),
                )));
            }
        }
    }
    Ok(())
}

async fn execute_alter(conn: &mut AsyncPgConnection, statement: &str) -> Result<(), ApplyError> {
    debug!(statement, "executing schema change");
    sql_query(statement)
        .execute(conn)
        .await
        .map(|_| ())
        .map_err(|err| {
            if is_connection_error(&err) {
                ApplyError::Diesel(err)
            } else {
                ApplyError::Refused(SchemaDdlError::rejected(map_diesel_error_message(
                    err,
                    "alter table",
                )))
            }
        })
}

#[async_trait]
impl SchemaDdl for DieselSchemaDdl {
    async fn apply(
        &self,
        change: &SchemaChange,
        audit: &NewAuditRecord,
    ) -> Result<(), SchemaDdlError> {
        let statement = render_alter(change);
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| SchemaDdlError::connection(map_pool_error_message(err)))?;

        conn.transaction::<_, ApplyError, _>(|conn| {
            async move {
                recheck(conn, change).await?;
                execute_alter(conn, &statement).await?;
                insert_audit_on(conn, audit).await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(ApplyError::into_ddl_error)
    }
}
