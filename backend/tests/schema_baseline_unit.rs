//! Static contract checks for the baseline inventory migration SQL.

use rstest::rstest;

const MIGRATION_UP: &str =
    include_str!("../migrations/2026-10-16-000000_baseline_inventory/up.sql");
const MIGRATION_DOWN: &str =
    include_str!("../migrations/2026-10-16-000000_baseline_inventory/down.sql");

#[rstest]
#[case("CREATE TABLE users")]
#[case("CREATE TABLE areas")]
#[case("CREATE TABLE sistemas")]
#[case("CREATE TABLE paises")]
#[case("CREATE TABLE inventarios")]
#[case("CREATE TABLE audits")]
fn creates_expected_baseline_tables(#[case] table_ddl: &str) {
    assert!(
        MIGRATION_UP.contains(table_ddl),
        "expected migration to contain: {table_ddl}"
    );
}

#[rstest]
#[case("auditable_type TEXT NOT NULL")]
#[case("auditable_id BIGINT NOT NULL")]
#[case("event TEXT NOT NULL")]
#[case("old_values JSONB,")]
#[case("new_values JSONB NOT NULL")]
fn audits_table_matches_the_persistence_model(#[case] column_ddl: &str) {
    assert!(
        MIGRATION_UP.contains(column_ddl),
        "expected audits column: {column_ddl}"
    );
}

#[rstest]
#[case("area_funcional_id INTEGER REFERENCES areas (id)")]
#[case("sistema_id INTEGER REFERENCES sistemas (id)")]
#[case("pais_id INTEGER REFERENCES paises (id)")]
#[case("user_id INTEGER REFERENCES users (id)")]
fn inventory_rows_reference_their_dimensions(#[case] fk_ddl: &str) {
    assert!(MIGRATION_UP.contains(fk_ddl), "expected foreign key: {fk_ddl}");
}

#[rstest]
fn report_date_filters_are_indexed() {
    assert!(MIGRATION_UP.contains("ON inventarios (created_at)"));
    assert!(MIGRATION_UP.contains("ON audits (auditable_type, auditable_id)"));
}

#[rstest]
fn down_migration_drops_dependents_first() {
    let position = |table: &str| {
        MIGRATION_DOWN
            .find(&format!("DROP TABLE IF EXISTS {table};"))
            .unwrap_or_else(|| panic!("down migration should drop {table}"))
    };
    assert!(position("inventarios") < position("areas"));
    assert!(position("inventarios") < position("paises"));
    assert!(position("inventarios") < position("users"));
    position("audits");
    position("sistemas");
}
