//! Port for appending audit records.

use async_trait::async_trait;

use crate::domain::NewAuditRecord;

use super::define_port_error;

define_port_error! {
    /// Errors raised when appending audit records.
    pub enum AuditRepositoryError {
        /// Connection could not be established.
        Connection { message: String } => "audit connection failed: {message}",
        /// The insert failed.
        Query { message: String } => "audit insert failed: {message}",
    }
}

/// Append-only audit storage. Records are never read back for decisions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuditRepository: Send + Sync {
    /// Append one record.
    async fn append(&self, record: &NewAuditRecord) -> Result<(), AuditRepositoryError>;
}
