//! Identifier grammar and the column type whitelist.
//!
//! Table and column names cannot be bound as parameters in DDL, so every
//! name that reaches an `ALTER TABLE` must first pass through [`Identifier`].
//! The grammar is `^[A-Za-z_][A-Za-z0-9_]*$`; it excludes quotes, spaces and
//! every other character that could terminate a quoted identifier.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Longest identifier PostgreSQL stores without truncation (`NAMEDATALEN - 1`).
pub const MAX_IDENTIFIER_LEN: usize = 63;

/// Return `true` when `candidate` matches `^[A-Za-z_][A-Za-z0-9_]*$`.
///
/// # Examples
/// ```
/// use inventory_admin::domain::is_valid_identifier;
///
/// assert!(is_valid_identifier("area_funcional_id"));
/// assert!(!is_valid_identifier("1abc"));
/// assert!(!is_valid_identifier("name; DROP TABLE users"));
/// ```
#[must_use]
pub fn is_valid_identifier(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Errors raised while parsing an [`Identifier`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentifierError {
    /// The value does not match the identifier grammar.
    #[error("`{value}` is not a valid identifier")]
    Malformed { value: String },
    /// The value matches the grammar but would be truncated by the catalog.
    #[error("identifier `{value}` exceeds {MAX_IDENTIFIER_LEN} characters")]
    TooLong { value: String },
}

impl IdentifierError {
    /// Raw value that failed validation.
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Malformed { value } | Self::TooLong { value } => value,
        }
    }
}

/// A table or column name that is safe to splice into DDL once quoted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier(String);

impl Identifier {
    /// Validate and wrap `raw`.
    ///
    /// # Errors
    /// Returns [`IdentifierError`] when `raw` breaks the grammar or the length cap.
    pub fn parse(raw: impl Into<String>) -> Result<Self, IdentifierError> {
        let value = raw.into();
        if !is_valid_identifier(&value) {
            return Err(IdentifierError::Malformed { value });
        }
        if value.len() > MAX_IDENTIFIER_LEN {
            return Err(IdentifierError::TooLong { value });
        }
        Ok(Self(value))
    }

    /// Borrow the raw name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Double-quoted form for DDL. The grammar guarantees no embedded quotes.
    #[must_use]
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.0)
    }
}

impl TryFrom<String> for Identifier {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Identifier> for String {
    fn from(value: Identifier) -> Self {
        value.0
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Column types accepted by the add-column operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    String,
    Integer,
    Boolean,
    Date,
    Datetime,
    Text,
    Json,
}

impl ColumnType {
    /// Every accepted type, in documentation order.
    pub const ALL: [Self; 7] = [
        Self::String,
        Self::Integer,
        Self::Boolean,
        Self::Date,
        Self::Datetime,
        Self::Text,
        Self::Json,
    ];

    /// Parse an exact, lower-case type name.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == raw)
    }

    /// Wire name of the type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Datetime => "datetime",
            Self::Text => "text",
            Self::Json => "json",
        }
    }

    /// PostgreSQL column type used in `ALTER TABLE ... ADD COLUMN`.
    #[must_use]
    pub const fn postgres_type(self) -> &'static str {
        match self {
            Self::String => "VARCHAR(255)",
            Self::Integer => "INTEGER",
            Self::Boolean => "BOOLEAN",
            Self::Date => "DATE",
            Self::Datetime => "TIMESTAMPTZ",
            Self::Text => "TEXT",
            Self::Json => "JSON",
        }
    }

    /// Whether `value` can serve as a default for a column of this type.
    ///
    /// Temporal defaults are accepted as strings and validated by the
    /// database when the statement runs.
    #[must_use]
    pub fn accepts_default(self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) | (Self::Json, _) => true,
            (Self::Boolean, Value::Bool(_)) => true,
            (Self::Integer, Value::Number(number)) => number
                .as_i64()
                .is_some_and(|n| i32::try_from(n).is_ok()),
            (Self::String, Value::String(text)) => text.chars().count() <= 255,
            (Self::Text | Self::Date | Self::Datetime, Value::String(_)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Return `true` when `candidate` names a whitelisted column type.
///
/// # Examples
/// ```
/// use inventory_admin::domain::is_allowed_type;
///
/// assert!(is_allowed_type("boolean"));
/// assert!(!is_allowed_type("bigint"));
/// ```
#[must_use]
pub fn is_allowed_type(candidate: &str) -> bool {
    ColumnType::parse(candidate).is_some()
}
