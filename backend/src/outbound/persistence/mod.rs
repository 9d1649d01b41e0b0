//! PostgreSQL adapters built on `diesel-async` and a `bb8` pool.
//!
//! Adapters translate between Diesel rows and domain types and hold no
//! business rules. Row structs and table definitions stay private to this
//! module.
//!
//! # Example
//!
//! ```ignore
//! use inventory_admin::outbound::persistence::{DbPool, DieselSchemaCatalog, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/inventario")).await?;
//! let catalog = DieselSchemaCatalog::new(pool);
//! ```

mod ddl_statement;
mod diesel_audit_repository;
pub(crate) mod diesel_helpers;
mod diesel_report_query;
mod diesel_schema_catalog;
mod diesel_schema_ddl;
mod migrations;
mod models;
mod pool;
mod schema;

pub use ddl_statement::render_alter;
pub use diesel_audit_repository::DieselAuditRepository;
pub use diesel_report_query::DieselReportQuery;
pub use diesel_schema_catalog::DieselSchemaCatalog;
pub use diesel_schema_ddl::DieselSchemaDdl;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
