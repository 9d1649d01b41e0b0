//! Diesel-backed [`AuditRepository`].

use async_trait::async_trait;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::domain::NewAuditRecord;
use crate::domain::ports::{AuditRepository, AuditRepositoryError};

use super::diesel_helpers::{is_connection_error, map_diesel_error_message, map_pool_error_message};
use super::models::NewAuditRow;
use super::pool::DbPool;
use super::schema::audits;

/// Insert `record` on an existing connection, joining any open transaction.
pub(crate) async fn insert_audit_on(
    conn: &mut AsyncPgConnection,
    record: &NewAuditRecord,
) -> Result<(), diesel::result::Error> {
    diesel::insert_into(audits::table)
        .values(NewAuditRow::from(record))
        .execute(conn)
        .await
        .map(|_| ())
}

/// Appends audit rows through the shared pool.
#[derive(Clone)]
pub struct DieselAuditRepository {
    pool: DbPool,
}

impl DieselAuditRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_insert_error(error: diesel::result::Error) -> AuditRepositoryError {
    if is_connection_error(&error) {
        AuditRepositoryError::connection(map_diesel_error_message(error, "insert audit"))
    } else {
        AuditRepositoryError::query(map_diesel_error_message(error, "insert audit"))
    }
}

#[async_trait]
impl AuditRepository for DieselAuditRepository {
    async fn append(&self, record: &NewAuditRecord) -> Result<(), AuditRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| AuditRepositoryError::connection(map_pool_error_message(err)))?;

        insert_audit_on(&mut conn, record)
            .await
            .map_err(map_insert_error)
    }
}
