//! Validated schema changes.
//!
//! Values of these types only exist once every identifier has passed the
//! grammar and the column type and default have been checked, so adapters can
//! render DDL from them without further validation.

use serde_json::{Value, json};

use crate::domain::{AuditEvent, ColumnType, Identifier};

/// Typed column default.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnDefault {
    Boolean(bool),
    Integer(i64),
    Text(String),
    Json(Value),
}

/// Why a default value was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("default value is not compatible with column type `{column_type}`")]
pub struct InvalidDefault {
    /// Target column type.
    pub column_type: ColumnType,
}

impl ColumnDefault {
    /// Convert a JSON value into a default for `column_type`.
    ///
    /// `null` means "no default".
    ///
    /// # Errors
    /// Returns [`InvalidDefault`] when the value does not suit the type.
    pub fn from_json(column_type: ColumnType, value: &Value) -> Result<Option<Self>, InvalidDefault> {
        if !column_type.accepts_default(value) {
            return Err(InvalidDefault { column_type });
        }
        let converted = match (column_type, value) {
            (_, Value::Null) => None,
            (ColumnType::Json, other) => Some(Self::Json(other.clone())),
            (ColumnType::Boolean, Value::Bool(flag)) => Some(Self::Boolean(*flag)),
            (ColumnType::Integer, Value::Number(number)) => number.as_i64().map(Self::Integer),
            (_, Value::String(text)) => Some(Self::Text(text.clone())),
            _ => return Err(InvalidDefault { column_type }),
        };
        Ok(converted)
    }

    /// JSON form used in audit payloads.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Boolean(flag) => Value::Bool(*flag),
            Self::Integer(number) => json!(number),
            Self::Text(text) => Value::String(text.clone()),
            Self::Json(value) => value.clone(),
        }
    }
}

/// Validated `ADD COLUMN` request.
#[derive(Debug, Clone, PartialEq)]
pub struct AddColumnChange {
    pub schema: Identifier,
    pub table: Identifier,
    pub column: Identifier,
    pub column_type: ColumnType,
    pub nullable: bool,
    pub default: Option<ColumnDefault>,
    /// Placement hint; validated but only honoured by engines with column ordering.
    pub after: Option<Identifier>,
}

/// Validated `RENAME COLUMN` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameColumnChange {
    pub schema: Identifier,
    pub table: Identifier,
    pub old_name: Identifier,
    pub new_name: Identifier,
}

/// A single whitelisted schema mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaChange {
    AddColumn(AddColumnChange),
    RenameColumn(RenameColumnChange),
}

impl SchemaChange {
    /// Schema the change targets.
    #[must_use]
    pub fn schema(&self) -> &Identifier {
        match self {
            Self::AddColumn(change) => &change.schema,
            Self::RenameColumn(change) => &change.schema,
        }
    }

    /// Table the change targets.
    #[must_use]
    pub fn table(&self) -> &Identifier {
        match self {
            Self::AddColumn(change) => &change.table,
            Self::RenameColumn(change) => &change.table,
        }
    }

    /// Audit event recorded for this change.
    #[must_use]
    pub const fn audit_event(&self) -> AuditEvent {
        match self {
            Self::AddColumn(_) => AuditEvent::AddColumn,
            Self::RenameColumn(_) => AuditEvent::RenameColumn,
        }
    }

    /// Request payload stored in the audit record's `new_values`.
    #[must_use]
    pub fn audit_payload(&self) -> Value {
        match self {
            Self::AddColumn(change) => json!({
                "table": change.table.as_str(),
                "column": change.column.as_str(),
                "type": change.column_type.as_str(),
                "nullable": change.nullable,
                "def": change.default.as_ref().map_or(Value::Null, ColumnDefault::to_json),
                "after": change.after.as_ref().map(Identifier::as_str),
            }),
            Self::RenameColumn(change) => json!({
                "table": change.table.as_str(),
                "oldName": change.old_name.as_str(),
                "newName": change.new_name.as_str(),
            }),
        }
    }
}
