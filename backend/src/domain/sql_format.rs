//! Presentation formats for report SQL.
//!
//! Formatting happens after validation and never feeds back into execution.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Output format requested by a report caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum SqlFormat {
    /// Multi-line, one major clause per line.
    Pretty,
    /// Whitespace collapsed onto a single line.
    OneLine,
    /// Single-line statement encoded as a JSON string literal.
    Json,
    /// Statement exactly as validated.
    #[default]
    Text,
}

const CLAUSE_STARTERS: [&str; 7] = ["FROM", "WHERE", "HAVING", "LIMIT", "OFFSET", "UNION", "JOIN"];
const JOIN_QUALIFIERS: [&str; 6] = ["LEFT", "RIGHT", "INNER", "FULL", "CROSS", "OUTER"];

/// Render `sql` in the requested format.
///
/// # Examples
/// ```
/// use inventory_admin::domain::{SqlFormat, format_sql};
///
/// let sql = "SELECT a.nombre,\n  COUNT(*)   FROM inventarios i GROUP BY a.nombre LIMIT 50000";
/// assert_eq!(
///     format_sql(sql, SqlFormat::OneLine),
///     "SELECT a.nombre, COUNT(*) FROM inventarios i GROUP BY a.nombre LIMIT 50000"
/// );
/// assert_eq!(
///     format_sql(sql, SqlFormat::Pretty),
///     "SELECT a.nombre, COUNT(*)\nFROM inventarios i\nGROUP BY a.nombre\nLIMIT 50000"
/// );
/// ```
#[must_use]
pub fn format_sql(sql: &str, format: SqlFormat) -> String {
    match format {
        SqlFormat::Text => sql.to_owned(),
        SqlFormat::OneLine => split_words(sql).join(" "),
        SqlFormat::Pretty => pretty(&split_words(sql)),
        SqlFormat::Json => {
            let one_line = split_words(sql).join(" ");
            serde_json::Value::String(one_line).to_string()
        }
    }
}

/// Split on whitespace outside single- and double-quoted spans.
fn split_words(sql: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    for c in sql.chars() {
        match quote {
            Some(open) => {
                current.push(c);
                if c == open {
                    quote = None;
                }
            }
            None if c == '\'' || c == '"' => {
                quote = Some(c);
                current.push(c);
            }
            None if c.is_whitespace() => {
                if !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
            }
            None => current.push(c),
        }
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn starts_clause(words: &[String], index: usize) -> bool {
    let upper = |i: usize| words.get(i).map(|w| w.to_ascii_uppercase());
    let Some(word) = upper(index) else {
        return false;
    };
    let previous = index.checked_sub(1).and_then(upper);
    let next = upper(index + 1);
    match word.as_str() {
        "GROUP" | "ORDER" => next.as_deref() == Some("BY"),
        "JOIN" => previous.is_none_or(|p| !JOIN_QUALIFIERS.contains(&p.as_str())),
        "LEFT" | "RIGHT" | "INNER" | "FULL" | "CROSS" => {
            matches!(next.as_deref(), Some("JOIN" | "OUTER"))
        }
        other => CLAUSE_STARTERS.contains(&other),
    }
}

fn pretty(words: &[String]) -> String {
    let mut output = String::new();
    for (index, word) in words.iter().enumerate() {
        if index > 0 {
            output.push(if starts_clause(words, index) { '\n' } else { ' ' });
        }
        output.push_str(word);
    }
    output
}
