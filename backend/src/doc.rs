//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers the report, schema administration and health
//! endpoints plus the admin bearer-token security scheme. Swagger UI serves it
//! in debug builds and `openapi-dump` prints it for external tooling.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode, SqlFormat};
use crate::inbound::http::reports::{
    ReportRunResponse, ReportSourceBody, ReportSqlRequest, ReportSqlResponse,
};
use crate::inbound::http::schema_admin::{
    AddColumnBody, RebuildSnapshotBody, RebuildSnapshotResponse, RenameColumnBody,
    SchemaMutationResponse,
};
use crate::inbound::http::schemas::SnapshotColumnSchema;

/// Adds the `AdminToken` bearer scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "AdminToken",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .description(Some("Static admin token configured via ADMIN_TOKEN."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Inventory admin API",
        description = "Natural-language reports and audited schema changes for the IT inventory."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("AdminToken" = [])),
    paths(
        crate::inbound::http::reports::generate_report_sql,
        crate::inbound::http::reports::run_report,
        crate::inbound::http::schema_admin::add_column,
        crate::inbound::http::schema_admin::rename_column,
        crate::inbound::http::schema_admin::rebuild_snapshot,
        crate::inbound::http::schema_admin::get_snapshot,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        SqlFormat,
        ReportSourceBody,
        ReportSqlRequest,
        ReportSqlResponse,
        ReportRunResponse,
        AddColumnBody,
        RenameColumnBody,
        SchemaMutationResponse,
        RebuildSnapshotBody,
        RebuildSnapshotResponse,
        SnapshotColumnSchema,
    )),
    tags(
        (name = "reports", description = "Natural-language and SQL reports"),
        (name = "schema", description = "Audited schema changes and snapshots"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
