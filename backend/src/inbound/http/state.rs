//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on driving ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{ReportCommand, SchemaAdminCommand, SchemaSnapshotCommand};
use crate::inbound::http::admin_auth::AdminGate;

/// Parameter object bundling the driving ports used by handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub reports: Arc<dyn ReportCommand>,
    pub schema_admin: Arc<dyn SchemaAdminCommand>,
    pub snapshots: Arc<dyn SchemaSnapshotCommand>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub reports: Arc<dyn ReportCommand>,
    pub schema_admin: Arc<dyn SchemaAdminCommand>,
    pub snapshots: Arc<dyn SchemaSnapshotCommand>,
    pub admin: AdminGate,
}

impl HttpState {
    /// Construct state from ports and the admin gate.
    pub fn new(ports: HttpStatePorts, admin: AdminGate) -> Self {
        let HttpStatePorts {
            reports,
            schema_admin,
            snapshots,
        } = ports;
        Self {
            reports,
            schema_admin,
            snapshots,
            admin,
        }
    }
}
