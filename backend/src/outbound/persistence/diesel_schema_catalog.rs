//! Information-schema backed implementation of [`SchemaCatalog`].
//!
//! The existence probes are also used by the DDL adapter inside its
//! transaction, so they take a bare connection rather than the pool.

use async_trait::async_trait;
use diesel::sql_query;
use diesel::sql_types::Text;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::domain::SnapshotColumn;
use crate::domain::ports::{SchemaCatalog, SchemaCatalogError};

use super::diesel_helpers::{map_diesel_error_message, map_pool_error_message};
use super::models::{ColumnRow, ExistsRow, TableNameRow};
use super::pool::DbPool;

const LIST_TABLES_SQL: &str = concat!(
    "SELECT table_name::text AS table_name ",
    "FROM information_schema.tables ",
    "WHERE table_schema = $1 AND table_type = 'BASE TABLE' ",
    "ORDER BY table_name"
);

const LIST_COLUMNS_SQL: &str = concat!(
    "SELECT column_name::text AS column_name, ",
    "  data_type::text AS data_type, ",
    "  (is_nullable = 'YES') AS is_nullable ",
    "FROM information_schema.columns ",
    "WHERE table_schema = $1 AND table_name = $2 ",
    "ORDER BY ordinal_position"
);

const TABLE_EXISTS_SQL: &str = concat!(
    "SELECT EXISTS (",
    "  SELECT 1 FROM information_schema.tables ",
    "  WHERE table_schema = $1 AND table_name = $2 AND table_type = 'BASE TABLE'",
    ") AS present"
);

const COLUMN_EXISTS_SQL: &str = concat!(
    "SELECT EXISTS (",
    "  SELECT 1 FROM information_schema.columns ",
    "  WHERE table_schema = $1 AND table_name = $2 AND column_name = $3",
    ") AS present"
);

/// Whether `schema.table` is a base table, on an existing connection.
pub(crate) async fn table_exists_on(
    conn: &mut AsyncPgConnection,
    schema: &str,
    table: &str,
) -> Result<bool, diesel::result::Error> {
    let row: ExistsRow = sql_query(TABLE_EXISTS_SQL)
        .bind::<Text, _>(schema)
        .bind::<Text, _>(table)
        .get_result(conn)
        .await?;
    Ok(row.present)
}

/// Whether `schema.table.column` exists, on an existing connection.
pub(crate) async fn column_exists_on(
    conn: &mut AsyncPgConnection,
    schema: &str,
    table: &str,
    column: &str,
) -> Result<bool, diesel::result::Error> {
    let row: ExistsRow = sql_query(COLUMN_EXISTS_SQL)
        .bind::<Text, _>(schema)
        .bind::<Text, _>(table)
        .bind::<Text, _>(column)
        .get_result(conn)
        .await?;
    Ok(row.present)
}

/// Catalog reader over the shared pool.
#[derive(Clone)]
pub struct DieselSchemaCatalog {
    pool: DbPool,
}

impl DieselSchemaCatalog {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn query_error(error: diesel::result::Error, operation: &str) -> SchemaCatalogError {
    SchemaCatalogError::query(map_diesel_error_message(error, operation))
}

#[async_trait]
impl SchemaCatalog for DieselSchemaCatalog {
    async fn list_base_tables(&self, schema: &str) -> Result<Vec<String>, SchemaCatalogError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| SchemaCatalogError::connection(map_pool_error_message(err)))?;

        let rows: Vec<TableNameRow> = sql_query(LIST_TABLES_SQL)
            .bind::<Text, _>(schema)
            .load(&mut conn)
            .await
            .map_err(|err| query_error(err, "list base tables"))?;

        Ok(rows.into_iter().map(|row| row.table_name).collect())
    }

    async fn list_columns(
        &self,
        schema: &str,
        table: &str,
    ) -> Result<Vec<SnapshotColumn>, SchemaCatalogError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| SchemaCatalogError::connection(map_pool_error_message(err)))?;

        let rows: Vec<ColumnRow> = sql_query(LIST_COLUMNS_SQL)
            .bind::<Text, _>(schema)
            .bind::<Text, _>(table)
            .load(&mut conn)
            .await
            .map_err(|err| query_error(err, "list columns"))?;

        Ok(rows.into_iter().map(SnapshotColumn::from).collect())
    }

    async fn table_exists(&self, schema: &str, table: &str) -> Result<bool, SchemaCatalogError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| SchemaCatalogError::connection(map_pool_error_message(err)))?;

        table_exists_on(&mut conn, schema, table)
            .await
            .map_err(|err| query_error(err, "check table"))
    }

    async fn column_exists(
        &self,
        schema: &str,
        table: &str,
        column: &str,
    ) -> Result<bool, SchemaCatalogError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| SchemaCatalogError::connection(map_pool_error_message(err)))?;

        column_exists_on(&mut conn, schema, table, column)
            .await
            .map_err(|err| query_error(err, "check column"))
    }
}
