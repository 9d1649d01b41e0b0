//! HTTP inbound adapter exposing REST endpoints.

pub mod admin_auth;
pub mod error;
pub mod health;
pub mod reports;
pub mod schema_admin;
pub mod schemas;
pub mod state;

pub use error::ApiResult;
