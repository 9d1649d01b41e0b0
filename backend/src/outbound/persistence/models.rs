//! Internal Diesel row structs.
//!
//! These stay inside the persistence layer; adapters convert them to domain
//! types before returning.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::{Bool, Text};
use serde_json::Value;

use crate::domain::{NewAuditRecord, SnapshotColumn};

use super::schema::audits;

/// Insertable audit row.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = audits)]
pub(crate) struct NewAuditRow<'a> {
    pub auditable_type: &'a str,
    pub auditable_id: i64,
    pub event: &'a str,
    pub old_values: Option<&'a Value>,
    pub new_values: &'a Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a NewAuditRecord> for NewAuditRow<'a> {
    fn from(record: &'a NewAuditRecord) -> Self {
        Self {
            auditable_type: &record.auditable_type,
            auditable_id: record.auditable_id,
            event: record.event.as_str(),
            old_values: record.old_values.as_ref(),
            new_values: &record.new_values,
            created_at: record.recorded_at,
            updated_at: record.recorded_at,
        }
    }
}

#[derive(Debug, QueryableByName)]
pub(crate) struct TableNameRow {
    #[diesel(sql_type = Text)]
    pub table_name: String,
}

#[derive(Debug, QueryableByName)]
pub(crate) struct ColumnRow {
    #[diesel(sql_type = Text)]
    pub column_name: String,
    #[diesel(sql_type = Text)]
    pub data_type: String,
    #[diesel(sql_type = Bool)]
    pub is_nullable: bool,
}

impl From<ColumnRow> for SnapshotColumn {
    fn from(row: ColumnRow) -> Self {
        Self::new(row.column_name, row.data_type, row.is_nullable)
    }
}

#[derive(Debug, QueryableByName)]
pub(crate) struct ExistsRow {
    #[diesel(sql_type = Bool)]
    pub present: bool,
}

/// Report result set aggregated to a JSON array by PostgreSQL.
#[derive(Debug, QueryableByName)]
pub(crate) struct JsonRowsRow {
    #[diesel(sql_type = Text)]
    pub rows: String,
}
