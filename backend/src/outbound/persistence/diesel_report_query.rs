//! Read-only execution of report statements.
//!
//! The validated statement is wrapped in a subquery and aggregated with
//! `json_agg`, so rows of any shape come back as one JSON document. The
//! surrounding transaction is marked `READ ONLY`, which makes PostgreSQL
//! refuse writes that slip past the statement guard.

use async_trait::async_trait;
use diesel::sql_query;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, RunQueryDsl};
use serde_json::Value;
use std::time::Duration;

use crate::domain::ReadOnlySelect;
use crate::domain::ports::{ReportQuery, ReportQueryError};

use super::diesel_helpers::{is_connection_error, map_diesel_error_message, map_pool_error_message};
use super::models::JsonRowsRow;
use super::pool::DbPool;

/// Wrap `statement` so the result set arrives as a JSON array.
fn aggregate_rows_sql(statement: &str) -> String {
    format!(
        "SELECT coalesce(json_agg(report_rows), '[]'::json)::text AS rows FROM ({statement}) AS report_rows"
    )
}

fn parse_rows(raw: &str) -> Result<Vec<Value>, ReportQueryError> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(rows)) => Ok(rows),
        Ok(other) => Err(ReportQueryError::execution(format!(
            "expected a JSON array of rows, got {}",
            json_kind(&other)
        ))),
        Err(err) => Err(ReportQueryError::execution(err.to_string())),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Runs report statements through the shared pool.
#[derive(Clone)]
pub struct DieselReportQuery {
    pool: DbPool,
    statement_timeout: Duration,
}

impl DieselReportQuery {
    /// Statements running longer than `statement_timeout` are cancelled.
    pub fn new(pool: DbPool, statement_timeout: Duration) -> Self {
        Self {
            pool,
            statement_timeout,
        }
    }
}

fn map_execution_error(error: diesel::result::Error) -> ReportQueryError {
    if is_connection_error(&error) {
        ReportQueryError::connection(map_diesel_error_message(error, "run report"))
    } else {
        ReportQueryError::execution(map_diesel_error_message(error, "run report"))
    }
}

#[async_trait]
impl ReportQuery for DieselReportQuery {
    async fn run(&self, statement: &ReadOnlySelect) -> Result<Vec<Value>, ReportQueryError> {
        let sql = aggregate_rows_sql(statement.as_str());
        let timeout_ms = self.statement_timeout.as_millis().max(1);
        let set_timeout = format!("SET LOCAL statement_timeout = {timeout_ms}");
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| ReportQueryError::connection(map_pool_error_message(err)))?;

        let row = conn
            .transaction::<JsonRowsRow, diesel::result::Error, _>(|conn| {
                async move {
                    sql_query("SET TRANSACTION READ ONLY").execute(conn).await?;
                    sql_query(set_timeout).execute(conn).await?;
                    sql_query(sql).get_result::<JsonRowsRow>(conn).await
                }
                .scope_boxed()
            })
            .await
            .map_err(map_execution_error)?;

        parse_rows(&row.rows)
    }
}
