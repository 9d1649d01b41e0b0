//! Renders validated schema changes as PostgreSQL `ALTER TABLE` statements.
//!
//! Identifiers are always double-quoted. Their grammar excludes quotes, so
//! quoting cannot be escaped. Text literals double embedded single quotes.

use crate::domain::{AddColumnChange, ColumnDefault, RenameColumnChange, SchemaChange};

/// Statement text for `change`.
///
/// # Examples
/// ```
/// use inventory_admin::domain::{Identifier, RenameColumnChange, SchemaChange};
/// use inventory_admin::outbound::persistence::render_alter;
///
/// let ident = |raw: &str| Identifier::parse(raw).unwrap();
/// let change = SchemaChange::RenameColumn(RenameColumnChange {
///     schema: ident("public"),
///     table: ident("inventarios"),
///     old_name: ident("pais"),
///     new_name: ident("pais_id"),
/// });
/// assert_eq!(
///     render_alter(&change),
///     r#"ALTER TABLE "public"."inventarios" RENAME COLUMN "pais" TO "pais_id""#
/// );
/// ```
#[must_use]
pub fn render_alter(change: &SchemaChange) -> String {
    match change {
        SchemaChange::AddColumn(add) => render_add(add),
        SchemaChange::RenameColumn(rename) => render_rename(rename),
    }
}

fn render_add(change: &AddColumnChange) -> String {
    let mut statement = format!(
        "ALTER TABLE {}.{} ADD COLUMN {} {}",
        change.schema.quoted(),
        change.table.quoted(),
        change.column.quoted(),
        change.column_type.postgres_type(),
    );
    if !change.nullable {
        statement.push_str(" NOT NULL");
    }
    if let Some(default) = &change.default {
        statement.push_str(" DEFAULT ");
        statement.push_str(&render_literal(default));
    }
    statement
}

fn render_rename(change: &RenameColumnChange) -> String {
    format!(
        "ALTER TABLE {}.{} RENAME COLUMN {} TO {}",
        change.schema.quoted(),
        change.table.quoted(),
        change.old_name.quoted(),
        change.new_name.quoted(),
    )
}

fn render_literal(default: &ColumnDefault) -> String {
    match default {
        ColumnDefault::Boolean(true) => "TRUE".to_owned(),
        ColumnDefault::Boolean(false) => "FALSE".to_owned(),
        ColumnDefault::Integer(value) => value.to_string(),
        ColumnDefault::Text(text) => quote_text(text),
        ColumnDefault::Json(value) => quote_text(&value.to_string()),
    }
}

fn quote_text(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}
