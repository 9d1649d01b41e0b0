//! Port executing validated report statements.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::sql_guard::ReadOnlySelect;

use super::define_port_error;

define_port_error! {
    /// Errors raised while executing a report statement.
    pub enum ReportQueryError {
        /// Connection could not be established.
        Connection { message: String } => "report connection failed: {message}",
        /// The database rejected or failed the statement.
        Execution { message: String } => "report execution failed: {message}",
    }
}

/// Executes read-only statements and returns rows as JSON objects.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportQuery: Send + Sync {
    /// Run `statement` in a read-only transaction.
    async fn run(&self, statement: &ReadOnlySelect) -> Result<Vec<Value>, ReportQueryError>;
}

/// Query adapter returning no rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureReportQuery;

#[async_trait]
impl ReportQuery for FixtureReportQuery {
    async fn run(&self, _statement: &ReadOnlySelect) -> Result<Vec<Value>, ReportQueryError> {
        Ok(Vec::new())
    }
}
