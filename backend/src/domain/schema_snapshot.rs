//! In-memory schema snapshot: table name to ordered column descriptors.
//!
//! The serialised form is a plain JSON object keyed by table name, each value
//! an array of `{name, type, nullable}` objects in declaration order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Column descriptor captured from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotColumn {
    /// Column name.
    pub name: String,
    /// Declared data type as reported by the catalog.
    #[serde(rename = "type")]
    pub data_type: String,
    /// Whether the column accepts `NULL`.
    pub nullable: bool,
}

impl SnapshotColumn {
    /// Convenience constructor.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>, nullable: bool) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable,
        }
    }
}

/// Table name to columns mapping used to ground report translation.
///
/// # Examples
/// ```
/// use inventory_admin::domain::{SchemaSnapshot, SnapshotColumn};
///
/// let mut snapshot = SchemaSnapshot::default();
/// snapshot.insert_table(
///     "areas",
///     vec![
///         SnapshotColumn::new("id", "integer", false),
///         SnapshotColumn::new("nombre", "character varying", true),
///     ],
/// );
/// assert_eq!(snapshot.render_listing(), "areas(id, nombre)");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaSnapshot {
    tables: BTreeMap<String, Vec<SnapshotColumn>>,
}

impl SchemaSnapshot {
    /// Add or replace a table entry.
    pub fn insert_table(&mut self, table: impl Into<String>, columns: Vec<SnapshotColumn>) {
        self.tables.insert(table.into(), columns);
    }

    /// Columns of `table`, if captured.
    #[must_use]
    pub fn columns(&self, table: &str) -> Option<&[SnapshotColumn]> {
        self.tables.get(table).map(Vec::as_slice)
    }

    /// Iterate tables in name order.
    pub fn tables(&self) -> impl Iterator<Item = (&str, &[SnapshotColumn])> {
        self.tables
            .iter()
            .map(|(name, columns)| (name.as_str(), columns.as_slice()))
    }

    /// Number of captured tables.
    #[must_use]
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Whether no table was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Compact `table(col1, col2, ...)` listing, one table per line.
    #[must_use]
    pub fn render_listing(&self) -> String {
        self.tables
            .iter()
            .map(|(table, columns)| {
                let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
                format!("{table}({})", names.join(", "))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
