//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL catalog, DDL, audit and report adapters
//! - **completion**: chat-completions HTTP client used for report translation
//! - **snapshot_file**: durable schema snapshot storage on the local filesystem
//!
//! Adapters translate between domain types and infrastructure representations
//! and contain no business logic.

pub mod completion;
pub mod persistence;
pub mod snapshot_file;
