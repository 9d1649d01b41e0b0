//! Trust boundary for model-generated (or caller-supplied) report SQL.
//!
//! Text is sanitised only in two ways: code fences and trailing statement
//! separators are removed, and a row limit is appended when none is present.
//! Anything else that looks suspicious is rejected, never repaired.

use std::fmt;

/// Row cap appended when a statement carries no `LIMIT <n>` clause.
pub const DEFAULT_ROW_LIMIT: u32 = 50_000;

const FORBIDDEN_KEYWORDS: [&str; 7] = [
    "insert", "update", "delete", "drop", "alter", "truncate", "create",
];

const DISALLOWED_MARKERS: [&str; 4] = ["--", "/*", "*/", ";"];

const FENCE: &str = "```";

const FENCE_LANGUAGES: [&str; 3] = ["postgresql", "pgsql", "sql"];

/// Reasons a statement fails validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SqlGuardError {
    /// The statement does not start with `SELECT`.
    #[error("statement must be a single SELECT")]
    NotASelect,
    /// A comment marker or statement separator was found.
    #[error("statement contains disallowed construct `{marker}`")]
    DisallowedConstruct { marker: &'static str },
    /// A data-modifying or DDL keyword was found.
    #[error("statement contains forbidden keyword `{keyword}`")]
    ForbiddenKeyword { keyword: &'static str },
}

impl SqlGuardError {
    /// Stable snake_case identifier used in error details.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::NotASelect => "not_a_select",
            Self::DisallowedConstruct { .. } => "disallowed_construct",
            Self::ForbiddenKeyword { .. } => "forbidden_keyword",
        }
    }
}

/// Remove Markdown code fences (with an optional SQL info string) and
/// trailing `;` separators, then trim.
///
/// # Examples
/// ```
/// use inventory_admin::domain::sql_guard::sanitize_statement;
///
/// let raw = "```sql\nSELECT 1;\n```";
/// assert_eq!(sanitize_statement(raw), "SELECT 1");
/// ```
#[must_use]
pub fn sanitize_statement(raw: &str) -> String {
    let unfenced = remove_code_fences(raw);
    strip_trailing_separators(&unfenced).to_owned()
}

fn remove_code_fences(raw: &str) -> String {
    let mut output = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(index) = rest.find(FENCE) {
        output.push_str(rest.get(..index).unwrap_or_default());
        rest = rest.get(index + FENCE.len()..).unwrap_or_default();
        if let Some(language) = FENCE_LANGUAGES
            .iter()
            .find(|language| starts_with_ignore_ascii_case(rest, language))
        {
            rest = rest.get(language.len()..).unwrap_or_default();
        }
    }
    output.push_str(rest);
    output
}

fn strip_trailing_separators(text: &str) -> &str {
    let mut current = text.trim();
    while let Some(stripped) = current.strip_suffix(';') {
        current = stripped.trim_end();
    }
    current
}

fn starts_with_ignore_ascii_case(text: &str, prefix: &str) -> bool {
    text.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

fn is_word_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

/// Check that `statement` is a single comment-free SELECT without DDL/DML
/// keywords.
///
/// Checks run in a fixed order so the reported reason is deterministic:
/// SELECT prefix, then comment markers and separators, then keywords.
///
/// # Errors
/// Returns the first [`SqlGuardError`] encountered.
pub fn validate_select(statement: &str) -> Result<(), SqlGuardError> {
    let lowered = statement.trim().to_ascii_lowercase();
    if !lowered.starts_with("select") {
        return Err(SqlGuardError::NotASelect);
    }
    if let Some(marker) = DISALLOWED_MARKERS
        .into_iter()
        .find(|marker| lowered.contains(marker))
    {
        return Err(SqlGuardError::DisallowedConstruct { marker });
    }
    let forbidden = lowered
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .find_map(|word| FORBIDDEN_KEYWORDS.into_iter().find(|keyword| *keyword == word));
    match forbidden {
        Some(keyword) => Err(SqlGuardError::ForbiddenKeyword { keyword }),
        None => Ok(()),
    }
}

/// Whether `statement` already contains `LIMIT <digits>`.
#[must_use]
pub fn has_row_limit(statement: &str) -> bool {
    let lowered = statement.to_ascii_lowercase();
    let bytes = lowered.as_bytes();
    lowered.match_indices("limit").any(|(start, keyword)| {
        let bounded_before = start
            .checked_sub(1)
            .and_then(|prev| bytes.get(prev))
            .is_none_or(|byte| !is_word_byte(*byte));
        let after = bytes.get(start + keyword.len()..).unwrap_or_default();
        let spaces = after.iter().take_while(|b| b.is_ascii_whitespace()).count();
        bounded_before
            && spaces > 0
            && after.get(spaces).is_some_and(u8::is_ascii_digit)
    })
}

/// Append ` LIMIT <row_limit>` unless a numeric limit is already present.
#[must_use]
pub fn ensure_row_limit(statement: &str, row_limit: u32) -> String {
    if has_row_limit(statement) {
        statement.to_owned()
    } else {
        format!("{statement} LIMIT {row_limit}")
    }
}

/// A statement that passed sanitisation, validation and limit injection.
///
/// The only constructor is [`ReadOnlySelect::from_untrusted`], so holding a
/// value proves the checks ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOnlySelect(String);

impl ReadOnlySelect {
    /// Run the full guard pipeline over untrusted text.
    ///
    /// # Errors
    /// Returns [`SqlGuardError`] when the sanitised text is not a safe SELECT.
    ///
    /// # Examples
    /// ```
    /// use inventory_admin::domain::sql_guard::{ReadOnlySelect, SqlGuardError};
    ///
    /// let sql = ReadOnlySelect::from_untrusted("select * from areas;", 50_000)?;
    /// assert_eq!(sql.as_str(), "select * from areas LIMIT 50000");
    ///
    /// let rejected = ReadOnlySelect::from_untrusted("select 1; drop table users", 50_000);
    /// assert!(matches!(rejected, Err(SqlGuardError::DisallowedConstruct { .. })));
    /// # Ok::<(), SqlGuardError>(())
    /// ```
    pub fn from_untrusted(raw: &str, row_limit: u32) -> Result<Self, SqlGuardError> {
        let statement = sanitize_statement(raw);
        validate_select(&statement)?;
        Ok(Self(ensure_row_limit(&statement, row_limit)))
    }

    /// Borrow the statement text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Take ownership of the statement text.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ReadOnlySelect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
