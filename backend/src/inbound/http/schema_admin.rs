//! Schema administration HTTP handlers.
//!
//! ```text
//! POST /api/v1/schema/add-column
//! POST /api/v1/schema/rename-column
//! POST /api/v1/schema/snapshot
//! GET /api/v1/schema/snapshot
//! ```

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::domain::ports::{AddColumnRequest, RenameColumnRequest, SchemaMutationOutcome};
use crate::domain::{Error, SchemaSnapshot};
use crate::inbound::http::ApiResult;
use crate::inbound::http::admin_auth::AdminSession;
use crate::inbound::http::schemas::SnapshotColumnSchema;
use crate::inbound::http::state::HttpState;

/// Request payload for adding a column.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddColumnBody {
    #[schema(example = "users")]
    pub table: String,
    #[schema(example = "is_admin")]
    pub column: String,
    /// One of `string`, `integer`, `boolean`, `date`, `datetime`, `text`, `json`.
    #[serde(rename = "type")]
    #[schema(example = "boolean")]
    pub column_type: String,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    /// Default value; must suit `type`.
    #[serde(default, rename = "def")]
    pub default: Option<Value>,
    /// Requested position. Validated, ignored by PostgreSQL.
    #[serde(default)]
    pub after: Option<String>,
}

fn default_nullable() -> bool {
    true
}

/// Request payload for renaming a column.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenameColumnBody {
    pub table: String,
    pub old_name: String,
    pub new_name: String,
}

/// Response payload for a successful mutation.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SchemaMutationResponse {
    pub ok: bool,
    #[schema(example = "add_column")]
    pub event: String,
    pub message: String,
}

/// Request payload for rebuilding the snapshot.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RebuildSnapshotBody {
    /// Schema to introspect; defaults to configuration.
    pub schema: Option<String>,
}

/// Response payload for a snapshot rebuild.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RebuildSnapshotResponse {
    pub path: String,
    pub schema: String,
    pub tables: usize,
}

impl From<AddColumnBody> for AddColumnRequest {
    fn from(body: AddColumnBody) -> Self {
        Self {
            table: body.table,
            column: body.column,
            column_type: body.column_type,
            nullable: body.nullable,
            default: body.default,
            after: body.after,
        }
    }
}

impl From<RenameColumnBody> for RenameColumnRequest {
    fn from(body: RenameColumnBody) -> Self {
        Self {
            table: body.table,
            old_name: body.old_name,
            new_name: body.new_name,
        }
    }
}

fn mutation_response(outcome: SchemaMutationOutcome) -> SchemaMutationResponse {
    let SchemaMutationOutcome { event, message } = outcome;
    SchemaMutationResponse {
        ok: true,
        event: event.as_str().to_owned(),
        message,
    }
}

/// Add a column after validating identifiers, type, default and existence.
#[utoipa::path(
    post,
    path = "/api/v1/schema/add-column",
    request_body = AddColumnBody,
    responses(
        (status = 200, description = "Column added and audited", body = SchemaMutationResponse),
        (status = 400, description = "Invalid identifier, type or default", body = Error),
        (status = 401, description = "Admin token missing or wrong", body = Error),
        (status = 404, description = "Table not found", body = Error),
        (status = 409, description = "Column already exists", body = Error),
        (status = 503, description = "Database unavailable", body = Error)
    ),
    tags = ["schema"],
    operation_id = "addColumn",
    security(("AdminToken" = []))
)]
#[post("/schema/add-column")]
pub async fn add_column(
    state: web::Data<HttpState>,
    admin: AdminSession,
    payload: web::Json<AddColumnBody>,
) -> ApiResult<web::Json<SchemaMutationResponse>> {
    let outcome = state
        .schema_admin
        .add_column(payload.into_inner().into(), admin.actor())
        .await?;
    Ok(web::Json(mutation_response(outcome)))
}

/// Rename a column after validating identifiers and existence.
#[utoipa::path(
    post,
    path = "/api/v1/schema/rename-column",
    request_body = RenameColumnBody,
    responses(
        (status = 200, description = "Column renamed and audited", body = SchemaMutationResponse),
        (status = 400, description = "Invalid identifier", body = Error),
        (status = 401, description = "Admin token missing or wrong", body = Error),
        (status = 404, description = "Table or column not found", body = Error),
        (status = 409, description = "Target column already exists", body = Error),
        (status = 503, description = "Database unavailable", body = Error)
    ),
    tags = ["schema"],
    operation_id = "renameColumn",
    security(("AdminToken" = []))
)]
#[post("/schema/rename-column")]
pub async fn rename_column(
    state: web::Data<HttpState>,
    admin: AdminSession,
    payload: web::Json<RenameColumnBody>,
) -> ApiResult<web::Json<SchemaMutationResponse>> {
    let outcome = state
        .schema_admin
        .rename_column(payload.into_inner().into(), admin.actor())
        .await?;
    Ok(web::Json(mutation_response(outcome)))
}

/// Rebuild the schema snapshot from the live catalog.
#[utoipa::path(
    post,
    path = "/api/v1/schema/snapshot",
    request_body = RebuildSnapshotBody,
    responses(
        (status = 200, description = "Snapshot written", body = RebuildSnapshotResponse),
        (status = 401, description = "Admin token missing or wrong", body = Error),
        (status = 503, description = "Catalog unavailable", body = Error)
    ),
    tags = ["schema"],
    operation_id = "rebuildSchemaSnapshot",
    security(("AdminToken" = []))
)]
#[post("/schema/snapshot")]
pub async fn rebuild_snapshot(
    state: web::Data<HttpState>,
    _admin: AdminSession,
    payload: Option<web::Json<RebuildSnapshotBody>>,
) -> ApiResult<web::Json<RebuildSnapshotResponse>> {
    let schema = payload.and_then(|body| body.into_inner().schema);
    let build = state.snapshots.build(schema).await?;
    Ok(web::Json(RebuildSnapshotResponse {
        path: build.location,
        schema: build.schema,
        tables: build.table_count,
    }))
}

/// Return the stored snapshot mapping.
#[utoipa::path(
    get,
    path = "/api/v1/schema/snapshot",
    responses(
        (
            status = 200,
            description = "Stored snapshot",
            body = std::collections::BTreeMap<String, Vec<SnapshotColumnSchema>>
        ),
        (status = 401, description = "Admin token missing or wrong", body = Error),
        (status = 503, description = "Snapshot missing", body = Error)
    ),
    tags = ["schema"],
    operation_id = "getSchemaSnapshot",
    security(("AdminToken" = []))
)]
#[get("/schema/snapshot")]
pub async fn get_snapshot(
    state: web::Data<HttpState>,
    _admin: AdminSession,
) -> ApiResult<web::Json<SchemaSnapshot>> {
    Ok(web::Json(state.snapshots.load().await?))
}

#[cfg(test)]
#[path = "schema_admin_tests.rs"]
mod tests;
