//! Inventory admin backend library.
//!
//! Hexagonal layout: `domain` holds services and ports, `outbound` the
//! PostgreSQL, filesystem and completion-service adapters, `inbound` the
//! actix-web handlers.

pub mod config;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
