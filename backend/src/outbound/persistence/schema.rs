//! Diesel table definitions.
//!
//! Only the tables the adapters write through the query builder are declared
//! here. Inventory tables are reached through raw SQL (reports) or the
//! information schema (catalog) and have no static definition.

diesel::table! {
    /// Append-only audit trail.
    audits (id) {
        id -> Int8,
        auditable_type -> Text,
        /// `0` for schema-level events.
        auditable_id -> Int8,
        event -> Text,
        old_values -> Nullable<Jsonb>,
        new_values -> Jsonb,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}
