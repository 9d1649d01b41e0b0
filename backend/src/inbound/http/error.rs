//! HTTP adapter mapping for domain errors.
//!
//! Services return typed errors; the `From` impls here fold them into the
//! shared [`Error`] envelope with a stable `details.code`, and
//! [`ResponseError`] turns that envelope into a status code and JSON body.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use tracing::error;

use crate::domain::ports::{
    ReportError, SchemaMutationError, SnapshotError, TranslationError,
};
use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn redact_if_internal(error: &Error) -> Error {
    if matches!(error.code(), ErrorCode::InternalError) {
        let mut redacted = Error::internal("Internal server error");
        if let Some(id) = error.trace_id() {
            redacted = redacted.with_trace_id(id.to_owned());
        }
        redacted
    } else {
        error.clone()
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }

        builder.json(redact_if_internal(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "actix error promoted to domain error");
        Error::internal("Internal server error")
    }
}

fn with_kind(error: Error, kind: &str) -> Error {
    error.with_details(json!({ "code": kind }))
}

impl From<SnapshotError> for Error {
    fn from(err: SnapshotError) -> Self {
        let kind = err.kind();
        let base = match &err {
            SnapshotError::CatalogUnavailable { .. } | SnapshotError::SnapshotMissing { .. } => {
                Error::service_unavailable(err.to_string())
            }
            SnapshotError::SnapshotWrite { .. } | SnapshotError::SnapshotCorrupt { .. } => {
                error!(error = %err, "schema snapshot storage failure");
                Error::internal(err.to_string())
            }
        };
        with_kind(base, kind)
    }
}

impl From<TranslationError> for Error {
    fn from(err: TranslationError) -> Self {
        match err {
            TranslationError::Snapshot(inner) => inner.into(),
            TranslationError::EmptyRequest | TranslationError::Rejected(_) => {
                with_kind(Error::invalid_request(err.to_string()), err.kind())
            }
            TranslationError::UpstreamUnavailable { .. } => {
                with_kind(Error::service_unavailable(err.to_string()), err.kind())
            }
        }
    }
}

impl From<ReportError> for Error {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::Translation(inner) => inner.into(),
            ReportError::Unavailable { .. } => with_kind(
                Error::service_unavailable(err.to_string()),
                "database_unavailable",
            ),
            ReportError::Execution { .. } => {
                with_kind(Error::invalid_request(err.to_string()), "execution_failed")
            }
        }
    }
}

impl From<SchemaMutationError> for Error {
    fn from(err: SchemaMutationError) -> Self {
        let kind = err.kind();
        let base = match &err {
            SchemaMutationError::InvalidIdentifier { field, value } => {
                return Error::invalid_request(err.to_string()).with_details(json!({
                    "code": kind,
                    "field": field.as_str(),
                    "value": value,
                }));
            }
            SchemaMutationError::UnknownType { .. }
            | SchemaMutationError::InvalidDefault { .. }
            | SchemaMutationError::Rejected { .. } => Error::invalid_request(err.to_string()),
            SchemaMutationError::TableNotFound { .. }
            | SchemaMutationError::ColumnNotFound { .. } => Error::not_found(err.to_string()),
            SchemaMutationError::ColumnAlreadyExists { .. } => Error::conflict(err.to_string()),
            SchemaMutationError::CatalogUnavailable { .. } => {
                Error::service_unavailable(err.to_string())
            }
            SchemaMutationError::Execution { .. } => {
                error!(error = %err, "schema change failed");
                Error::internal(err.to_string())
            }
        };
        with_kind(base, kind)
    }
}
