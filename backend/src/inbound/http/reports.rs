//! Report HTTP handlers.
//!
//! ```text
//! POST /api/v1/reports/sql
//! POST /api/v1/reports/run
//! ```

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use utoipa::ToSchema;

use crate::domain::ports::ReportSource;
use crate::domain::{Error, SqlFormat, format_sql};
use crate::inbound::http::ApiResult;
use crate::inbound::http::admin_auth::AdminSession;
use crate::inbound::http::state::HttpState;

/// Report statement source: exactly one of `nl` or `query`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportSourceBody {
    /// Natural-language request translated by the completion service.
    #[schema(example = "cuántos inventarios hay por área")]
    pub nl: Option<String>,
    /// Hand-written SELECT, validated like generated SQL.
    pub query: Option<String>,
}

/// Request payload for `POST /reports/sql`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportSqlRequest {
    #[serde(flatten)]
    pub source: ReportSourceBody,
    #[serde(default)]
    pub format: SqlFormat,
}

/// Response payload for `POST /reports/sql`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportSqlResponse {
    /// Validated statement, including the row cap.
    pub sql: String,
    pub format: SqlFormat,
    /// `sql` rendered in `format`.
    pub formatted: String,
}

/// Response payload for `POST /reports/run`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportRunResponse {
    pub sql: String,
    pub row_count: usize,
    /// One JSON object per row.
    pub rows: Vec<Value>,
}

impl TryFrom<ReportSourceBody> for ReportSource {
    type Error = Error;

    fn try_from(body: ReportSourceBody) -> Result<Self, Self::Error> {
        match (body.nl, body.query) {
            (Some(nl), None) => Ok(Self::NaturalLanguage(nl)),
            (None, Some(query)) => Ok(Self::Sql(query)),
            _ => Err(
                Error::invalid_request("provide exactly one of `nl` or `query`")
                    .with_details(json!({"code": "invalid_source"})),
            ),
        }
    }
}

/// Produce a validated report statement without executing it.
#[utoipa::path(
    post,
    path = "/api/v1/reports/sql",
    request_body = ReportSqlRequest,
    responses(
        (status = 200, description = "Validated statement", body = ReportSqlResponse),
        (status = 400, description = "Invalid request or rejected statement", body = Error),
        (status = 401, description = "Admin token missing or wrong", body = Error),
        (status = 503, description = "Snapshot or completion service unavailable", body = Error)
    ),
    tags = ["reports"],
    operation_id = "generateReportSql",
    security(("AdminToken" = []))
)]
#[post("/reports/sql")]
pub async fn generate_report_sql(
    state: web::Data<HttpState>,
    _admin: AdminSession,
    payload: web::Json<ReportSqlRequest>,
) -> ApiResult<web::Json<ReportSqlResponse>> {
    let ReportSqlRequest { source, format } = payload.into_inner();
    let statement = state.reports.prepare(source.try_into()?).await?;
    let formatted = format_sql(statement.as_str(), format);

    Ok(web::Json(ReportSqlResponse {
        sql: statement.into_inner(),
        format,
        formatted,
    }))
}

/// Produce a validated statement and execute it read-only.
#[utoipa::path(
    post,
    path = "/api/v1/reports/run",
    request_body = ReportSourceBody,
    responses(
        (status = 200, description = "Report rows", body = ReportRunResponse),
        (status = 400, description = "Invalid request or rejected statement", body = Error),
        (status = 401, description = "Admin token missing or wrong", body = Error),
        (status = 503, description = "Dependency unavailable", body = Error)
    ),
    tags = ["reports"],
    operation_id = "runReport",
    security(("AdminToken" = []))
)]
#[post("/reports/run")]
pub async fn run_report(
    state: web::Data<HttpState>,
    _admin: AdminSession,
    payload: web::Json<ReportSourceBody>,
) -> ApiResult<web::Json<ReportRunResponse>> {
    let report = state.reports.run(payload.into_inner().try_into()?).await?;

    Ok(web::Json(ReportRunResponse {
        sql: report.statement.into_inner(),
        row_count: report.rows.len(),
        rows: report.rows,
    }))
}

#[cfg(test)]
#[path = "reports_tests.rs"]
mod tests;
