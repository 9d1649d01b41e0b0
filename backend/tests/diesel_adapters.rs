//! Integration tests for the Diesel adapters against embedded PostgreSQL.
//!
//! Each test provisions a fresh migrated database so catalog contents and
//! audit rows are deterministic.

use std::sync::Arc;
use std::time::Duration;

use inventory_admin::domain::ports::{
    AuditRepositoryError, ReportQuery, ReportQueryError, SchemaCatalog, SchemaDdl,
    SchemaDdlError, SchemaSnapshotCommand,
};
use inventory_admin::domain::{
    AddColumnChange, AuditActor, AuditEvent, AuditRecordBuilder, AuditRecorder, ColumnType,
    Identifier, ReadOnlySelect, RenameColumnChange, SchemaChange, SchemaSnapshotService,
    SnapshotColumn, SnapshotScope, load_snapshot,
};
use inventory_admin::outbound::persistence::{
    DbPool, DieselAuditRepository, DieselReportQuery, DieselSchemaCatalog, DieselSchemaDdl,
    PoolConfig,
};
use inventory_admin::outbound::snapshot_file::FileSnapshotStore;
use mockable::DefaultClock;
use pg_embedded_setup_unpriv::TemporaryDatabase;
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use tokio::runtime::Runtime;

#[path = "support/embedded_postgres.rs"]
mod embedded_postgres;

use embedded_postgres::{
    connect, execute_batch, handle_cluster_setup_failure, provision_migrated_database,
    shared_cluster,
};

struct AdapterContext {
    runtime: Runtime,
    pool: DbPool,
    database_url: String,
    _database: TemporaryDatabase,
}

impl AdapterContext {
    fn catalog(&self) -> DieselSchemaCatalog {
        DieselSchemaCatalog::new(self.pool.clone())
    }

    fn ddl(&self) -> DieselSchemaDdl {
        DieselSchemaDdl::new(self.pool.clone())
    }

    fn column_exists(&self, table: &str, column: &str) -> bool {
        self.runtime
            .block_on(self.catalog().column_exists("public", table, column))
            .expect("column lookup succeeds")
    }

    fn audit_rows(&self, table: &str) -> Vec<(String, i64, String, Option<Value>, Value)> {
        let mut client = connect(&self.database_url).expect("client connects");
        let sql = format!(
            "SELECT auditable_type, auditable_id, event, old_values::text, new_values::text \
             FROM {table} ORDER BY id"
        );
        client
            .query(sql.as_str(), &[])
            .expect("audit rows load")
            .into_iter()
            .map(|row| {
                let old_values: Option<String> = row.get(3);
                let new_values: String = row.get(4);
                (
                    row.get(0),
                    row.get(1),
                    row.get(2),
                    old_values.map(|raw| serde_json::from_str(&raw).expect("old values parse")),
                    serde_json::from_str(&new_values).expect("new values parse"),
                )
            })
            .collect()
    }
}

fn setup_context() -> Result<AdapterContext, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let cluster = shared_cluster()?;
    let database = provision_migrated_database(cluster, &runtime)?;
    let database_url = database.url().to_owned();
    let pool = runtime
        .block_on(DbPool::new(
            PoolConfig::new(database_url.as_str()).with_max_size(2),
        ))
        .map_err(|err| err.to_string())?;

    Ok(AdapterContext {
        runtime,
        pool,
        database_url,
        _database: database,
    })
}

#[fixture]
fn adapter_context() -> Option<AdapterContext> {
    match setup_context() {
        Ok(context) => Some(context),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

fn ident(raw: &str) -> Identifier {
    Identifier::parse(raw).expect("valid identifier")
}

fn add_column(table: &str, column: &str, nullable: bool) -> SchemaChange {
    SchemaChange::AddColumn(AddColumnChange {
        schema: ident("public"),
        table: ident(table),
        column: ident(column),
        column_type: ColumnType::String,
        nullable,
        default: None,
        after: None,
    })
}

fn rename_column(table: &str, old_name: &str, new_name: &str) -> SchemaChange {
    SchemaChange::RenameColumn(RenameColumnChange {
        schema: ident("public"),
        table: ident(table),
        old_name: ident(old_name),
        new_name: ident(new_name),
    })
}

fn actor() -> AuditActor {
    AuditActor::system("adapter-tests")
}

fn apply(context: &AdapterContext, change: &SchemaChange) -> Result<(), SchemaDdlError> {
    let audit = AuditRecordBuilder::new(Arc::new(DefaultClock)).prepare_schema_event(
        change.audit_event(),
        change.audit_payload(),
        &actor(),
    );
    context.runtime.block_on(context.ddl().apply(change, &audit))
}

#[rstest]
fn catalog_lists_base_tables_in_name_order(adapter_context: Option<AdapterContext>) {
    let Some(context) = adapter_context else {
        eprintln!("SKIP-TEST-CLUSTER: catalog_lists_base_tables_in_name_order skipped");
        return;
    };
    execute_batch(
        &context.database_url,
        "CREATE VIEW inventario_resumen AS SELECT id, codigo FROM inventarios;",
    )
    .expect("view created");

    let tables = context
        .runtime
        .block_on(context.catalog().list_base_tables("public"))
        .expect("tables load");

    assert_eq!(
        tables,
        vec![
            "__diesel_schema_migrations",
            "areas",
            "audits",
            "inventarios",
            "paises",
            "sistemas",
            "users",
        ]
    );
}

#[rstest]
fn catalog_reports_columns_in_ordinal_order(adapter_context: Option<AdapterContext>) {
    let Some(context) = adapter_context else {
        eprintln!("SKIP-TEST-CLUSTER: catalog_reports_columns_in_ordinal_order skipped");
        return;
    };

    let columns = context
        .runtime
        .block_on(context.catalog().list_columns("public", "areas"))
        .expect("columns load");

    assert_eq!(
        columns,
        vec![
            SnapshotColumn::new("id", "integer", false),
            SnapshotColumn::new("nombre", "character varying", false),
            SnapshotColumn::new("codigo", "character varying", false),
            SnapshotColumn::new("created_at", "timestamp with time zone", false),
            SnapshotColumn::new("updated_at", "timestamp with time zone", false),
        ]
    );
}

#[rstest]
#[case("public", "inventarios", None, true)]
#[case("public", "inventario_resumen", None, false)]
#[case("auditoria", "bitacora", None, true)]
#[case("public", "bitacora", None, false)]
#[case("public", "inventarios", Some("area_funcional_id"), true)]
#[case("public", "inventarios", Some("responsable"), false)]
#[case("auditoria", "bitacora", Some("detalle"), true)]
fn catalog_existence_checks_respect_the_schema(
    adapter_context: Option<AdapterContext>,
    #[case] schema: &str,
    #[case] table: &str,
    #[case] column: Option<&str>,
    #[case] expected: bool,
) {
    let Some(context) = adapter_context else {
        eprintln!("SKIP-TEST-CLUSTER: catalog_existence_checks_respect_the_schema skipped");
        return;
    };
    execute_batch(
        &context.database_url,
        "CREATE VIEW inventario_resumen AS SELECT id FROM inventarios; \
         CREATE SCHEMA auditoria; \
         CREATE TABLE auditoria.bitacora (id SERIAL PRIMARY KEY, detalle TEXT);",
    )
    .expect("fixtures created");
    let catalog = context.catalog();

    let found = context
        .runtime
        .block_on(async {
            match column {
                Some(column) => catalog.column_exists(schema, table, column).await,
                None => catalog.table_exists(schema, table).await,
            }
        })
        .expect("lookup succeeds");

    assert_eq!(found, expected);
}

#[rstest]
fn add_column_commits_the_column_and_its_audit_row(adapter_context: Option<AdapterContext>) {
    let Some(context) = adapter_context else {
        eprintln!("SKIP-TEST-CLUSTER: add_column_commits_the_column_and_its_audit_row skipped");
        return;
    };

    apply(&context, &add_column("inventarios", "responsable", true)).expect("change applies");

    assert!(context.column_exists("inventarios", "responsable"));
    let rows = context.audit_rows("audits");
    assert_eq!(rows.len(), 1);
    let (auditable_type, auditable_id, event, old_values, new_values) = &rows[0];
    assert_eq!(auditable_type, "Schema");
    assert_eq!(*auditable_id, 0);
    assert_eq!(event, "add_column");
    assert_eq!(old_values, &None);
    assert_eq!(new_values["table"], json!("inventarios"));
    assert_eq!(new_values["column"], json!("responsable"));
    assert_eq!(new_values["userId"], json!(actor().as_str()));
}

#[rstest]
fn rename_column_commits_the_rename_and_its_audit_row(adapter_context: Option<AdapterContext>) {
    let Some(context) = adapter_context else {
        eprintln!("SKIP-TEST-CLUSTER: rename_column_commits_the_rename_and_its_audit_row skipped");
        return;
    };

    apply(&context, &rename_column("inventarios", "datos", "detalle")).expect("change applies");

    assert!(context.column_exists("inventarios", "detalle"));
    assert!(!context.column_exists("inventarios", "datos"));
    let events: Vec<String> = context
        .audit_rows("audits")
        .into_iter()
        .map(|(_, _, event, _, _)| event)
        .collect();
    assert_eq!(events, vec!["rename_column"]);
}

#[rstest]
#[case::added_column_already_present(
    add_column("inventarios", "codigo", true),
    SchemaDdlError::column_already_exists("inventarios", "codigo")
)]
#[case::renamed_column_missing(
    rename_column("inventarios", "ubicacion", "sitio"),
    SchemaDdlError::column_not_found("inventarios", "ubicacion")
)]
#[case::rename_target_taken(
    rename_column("inventarios", "datos", "codigo"),
    SchemaDdlError::column_already_exists("inventarios", "codigo")
)]
#[case::table_missing(
    add_column("bodegas", "responsable", true),
    SchemaDdlError::table_not_found("bodegas")
)]
fn stale_changes_are_refused_inside_the_transaction(
    adapter_context: Option<AdapterContext>,
    #[case] change: SchemaChange,
    #[case] expected: SchemaDdlError,
) {
    let Some(context) = adapter_context else {
        eprintln!("SKIP-TEST-CLUSTER: stale_changes_are_refused_inside_the_transaction skipped");
        return;
    };

    let error = apply(&context, &change).expect_err("stale change is refused");

    assert_eq!(error, expected);
    assert!(context.audit_rows("audits").is_empty());
}

#[rstest]
fn failed_audit_insert_rolls_the_column_back(adapter_context: Option<AdapterContext>) {
    let Some(context) = adapter_context else {
        eprintln!("SKIP-TEST-CLUSTER: failed_audit_insert_rolls_the_column_back skipped");
        return;
    };
    execute_batch(
        &context.database_url,
        "ALTER TABLE audits RENAME TO audits_archivo;",
    )
    .expect("audit table moved aside");

    let error = apply(&context, &add_column("inventarios", "responsable", true))
        .expect_err("change fails without an audit table");

    assert!(matches!(error, SchemaDdlError::Query { .. }), "{error:?}");
    assert!(!context.column_exists("inventarios", "responsable"));
    assert!(context.audit_rows("audits_archivo").is_empty());
}

#[rstest]
fn database_refusals_surface_as_rejections(adapter_context: Option<AdapterContext>) {
    let Some(context) = adapter_context else {
        eprintln!("SKIP-TEST-CLUSTER: database_refusals_surface_as_rejections skipped");
        return;
    };
    execute_batch(
        &context.database_url,
        "INSERT INTO inventarios (codigo, descripcion) VALUES ('INV-1', 'Servidor');",
    )
    .expect("row seeded");

    let error = apply(&context, &add_column("inventarios", "responsable", false))
        .expect_err("NOT NULL column without default is refused on a populated table");

    assert!(matches!(error, SchemaDdlError::Rejected { .. }), "{error:?}");
    assert!(!context.column_exists("inventarios", "responsable"));
    assert!(context.audit_rows("audits").is_empty());
}

fn seed_areas(context: &AdapterContext) {
    execute_batch(
        &context.database_url,
        "INSERT INTO areas (nombre, codigo) VALUES ('Tecnologia', 'TI'), ('Finanzas', 'FIN');",
    )
    .expect("areas seeded");
}

fn run_report(
    context: &AdapterContext,
    statement: &str,
    row_limit: u32,
    timeout: Duration,
) -> Result<Vec<Value>, ReportQueryError> {
    let statement = ReadOnlySelect::from_untrusted(statement, row_limit).expect("statement passes");
    let query = DieselReportQuery::new(context.pool.clone(), timeout);
    context.runtime.block_on(query.run(&statement))
}

#[rstest]
fn report_rows_come_back_as_json_objects(adapter_context: Option<AdapterContext>) {
    let Some(context) = adapter_context else {
        eprintln!("SKIP-TEST-CLUSTER: report_rows_come_back_as_json_objects skipped");
        return;
    };
    seed_areas(&context);

    let rows = run_report(
        &context,
        "SELECT id, nombre FROM areas ORDER BY id",
        50_000,
        Duration::from_secs(5),
    )
    .expect("report runs");

    assert_eq!(
        rows,
        vec![
            json!({"id": 1, "nombre": "Tecnologia"}),
            json!({"id": 2, "nombre": "Finanzas"}),
        ]
    );
}

#[rstest]
fn report_honours_the_appended_row_limit(adapter_context: Option<AdapterContext>) {
    let Some(context) = adapter_context else {
        eprintln!("SKIP-TEST-CLUSTER: report_honours_the_appended_row_limit skipped");
        return;
    };
    seed_areas(&context);

    let rows = run_report(
        &context,
        "SELECT codigo FROM areas ORDER BY id",
        1,
        Duration::from_secs(5),
    )
    .expect("report runs");

    assert_eq!(rows, vec![json!({"codigo": "TI"})]);
}

#[rstest]
fn empty_reports_are_empty_arrays(adapter_context: Option<AdapterContext>) {
    let Some(context) = adapter_context else {
        eprintln!("SKIP-TEST-CLUSTER: empty_reports_are_empty_arrays skipped");
        return;
    };

    let rows = run_report(
        &context,
        "SELECT id FROM paises",
        50_000,
        Duration::from_secs(5),
    )
    .expect("report runs");

    assert!(rows.is_empty());
}

#[rstest]
fn report_transactions_refuse_writes(adapter_context: Option<AdapterContext>) {
    let Some(context) = adapter_context else {
        eprintln!("SKIP-TEST-CLUSTER: report_transactions_refuse_writes skipped");
        return;
    };

    let error = run_report(
        &context,
        "SELECT nextval('areas_id_seq') AS siguiente",
        50_000,
        Duration::from_secs(5),
    )
    .expect_err("sequence advance is refused");

    match error {
        ReportQueryError::Execution { message } => {
            assert!(message.contains("read-only transaction"), "{message}");
        }
        other => panic!("expected an execution error, got {other:?}"),
    }
}

#[rstest]
fn slow_reports_hit_the_statement_timeout(adapter_context: Option<AdapterContext>) {
    let Some(context) = adapter_context else {
        eprintln!("SKIP-TEST-CLUSTER: slow_reports_hit_the_statement_timeout skipped");
        return;
    };

    let error = run_report(
        &context,
        "SELECT pg_sleep(2) AS pausa",
        50_000,
        Duration::from_millis(50),
    )
    .expect_err("statement is cancelled");

    match error {
        ReportQueryError::Execution { message } => {
            assert!(message.contains("statement timeout"), "{message}");
        }
        other => panic!("expected an execution error, got {other:?}"),
    }
}

#[rstest]
fn entity_events_are_appended_through_the_recorder(adapter_context: Option<AdapterContext>) {
    let Some(context) = adapter_context else {
        eprintln!("SKIP-TEST-CLUSTER: entity_events_are_appended_through_the_recorder skipped");
        return;
    };
    let recorder = AuditRecorder::new(
        Arc::new(DieselAuditRepository::new(context.pool.clone())),
        Arc::new(DefaultClock),
    );

    context
        .runtime
        .block_on(recorder.record(
            "Inventario",
            7,
            AuditEvent::Update,
            Some(json!({"codigo": "INV-1"})),
            json!({"codigo": "INV-2"}),
        ))
        .expect("audit appended");

    assert_eq!(
        context.audit_rows("audits"),
        vec![(
            "Inventario".to_owned(),
            7,
            "update".to_owned(),
            Some(json!({"codigo": "INV-1"})),
            json!({"codigo": "INV-2"}),
        )]
    );
}

#[rstest]
fn audit_append_failures_are_returned(adapter_context: Option<AdapterContext>) {
    let Some(context) = adapter_context else {
        eprintln!("SKIP-TEST-CLUSTER: audit_append_failures_are_returned skipped");
        return;
    };
    execute_batch(&context.database_url, "DROP TABLE audits;").expect("audit table dropped");
    let recorder = AuditRecorder::new(
        Arc::new(DieselAuditRepository::new(context.pool.clone())),
        Arc::new(DefaultClock),
    );

    let error = context
        .runtime
        .block_on(recorder.record("Inventario", 7, AuditEvent::Delete, None, json!({})))
        .expect_err("append fails");

    assert!(matches!(error, AuditRepositoryError::Query { .. }), "{error:?}");
}

fn snapshot_service(
    context: &AdapterContext,
    store: Arc<FileSnapshotStore>,
    scope: SnapshotScope,
) -> SchemaSnapshotService<DieselSchemaCatalog, FileSnapshotStore> {
    SchemaSnapshotService::new(Arc::new(context.catalog()), store, scope)
}

#[rstest]
fn stored_snapshot_matches_the_live_catalog(adapter_context: Option<AdapterContext>) {
    let Some(context) = adapter_context else {
        eprintln!("SKIP-TEST-CLUSTER: stored_snapshot_matches_the_live_catalog skipped");
        return;
    };
    let tmp = tempfile::tempdir().expect("tempdir");
    let store = Arc::new(FileSnapshotStore::new(tmp.path().join("schema_snapshot.json")));
    let service = snapshot_service(&context, Arc::clone(&store), SnapshotScope::default());

    let (build, loaded, live) = context.runtime.block_on(async {
        let build = service.build(None).await.expect("snapshot builds");
        let loaded = load_snapshot(store.as_ref()).await.expect("snapshot loads");
        let live = service.capture("public").await.expect("catalog captures");
        (build, loaded, live)
    });

    assert_eq!(build.schema, "public");
    assert_eq!(build.table_count, 6);
    assert_eq!(loaded, live);
    assert!(loaded.columns("__diesel_schema_migrations").is_none());
    let inventarios = loaded.columns("inventarios").expect("inventarios captured");
    assert!(inventarios.iter().any(|column| column.name == "area_funcional_id"));
}

#[rstest]
fn rebuilt_snapshot_reflects_an_applied_rename(adapter_context: Option<AdapterContext>) {
    let Some(context) = adapter_context else {
        eprintln!("SKIP-TEST-CLUSTER: rebuilt_snapshot_reflects_an_applied_rename skipped");
        return;
    };
    let tmp = tempfile::tempdir().expect("tempdir");
    let store = Arc::new(FileSnapshotStore::new(tmp.path().join("schema_snapshot.json")));
    let service = snapshot_service(
        &context,
        Arc::clone(&store),
        SnapshotScope {
            only_tables: vec!["Inventarios".to_owned()],
            ..SnapshotScope::default()
        },
    );

    apply(&context, &rename_column("inventarios", "datos", "detalle")).expect("change applies");
    let loaded = context.runtime.block_on(async {
        service.build(None).await.expect("snapshot builds");
        load_snapshot(store.as_ref()).await.expect("snapshot loads")
    });

    assert_eq!(loaded.table_count(), 1);
    let names: Vec<&str> = loaded
        .columns("inventarios")
        .expect("inventarios captured")
        .iter()
        .map(|column| column.name.as_str())
        .collect();
    assert!(names.contains(&"detalle"));
    assert!(!names.contains(&"datos"));
}

#[rstest]
fn schema_override_selects_another_namespace(adapter_context: Option<AdapterContext>) {
    let Some(context) = adapter_context else {
        eprintln!("SKIP-TEST-CLUSTER: schema_override_selects_another_namespace skipped");
        return;
    };
    execute_batch(
        &context.database_url,
        "CREATE SCHEMA auditoria; \
         CREATE TABLE auditoria.bitacora (id SERIAL PRIMARY KEY, detalle TEXT NOT NULL);",
    )
    .expect("schema created");
    let tmp = tempfile::tempdir().expect("tempdir");
    let store = Arc::new(FileSnapshotStore::new(tmp.path().join("schema_snapshot.json")));
    let service = snapshot_service(
        &context,
        Arc::clone(&store),
        SnapshotScope {
            env_override: Some("auditoria".to_owned()),
            ..SnapshotScope::default()
        },
    );

    let (build, loaded) = context.runtime.block_on(async {
        let build = service.build(None).await.expect("snapshot builds");
        let loaded = load_snapshot(store.as_ref()).await.expect("snapshot loads");
        (build, loaded)
    });

    assert_eq!(build.schema, "auditoria");
    assert_eq!(
        loaded.columns("bitacora"),
        Some(
            &[
                SnapshotColumn::new("id", "integer", false),
                SnapshotColumn::new("detalle", "text", false),
            ][..]
        )
    );
}
