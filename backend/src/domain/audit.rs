//! Append-only audit trail for entity and schema mutations.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::error;

use crate::domain::ports::{AuditRepository, AuditRepositoryError};

/// `auditable_type` used for schema-level events.
pub const SCHEMA_AUDITABLE_TYPE: &str = "Schema";

/// `auditable_id` sentinel for events not tied to a single row.
pub const SCHEMA_ENTITY_ID: i64 = 0;

const ACTOR_FINGERPRINT_BYTES: usize = 8;

/// Kind of mutation being recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEvent {
    Create,
    Update,
    Delete,
    AddColumn,
    RenameColumn,
}

impl AuditEvent {
    /// Value stored in the `event` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::AddColumn => "add_column",
            Self::RenameColumn => "rename_column",
        }
    }
}

/// Principal responsible for a mutation, recorded as `userId`.
///
/// Administrative callers authenticate with a shared token; the actor is a
/// truncated SHA-256 fingerprint of that token so rotated tokens remain
/// distinguishable without storing secrets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AuditActor(String);

impl AuditActor {
    /// Derive an actor label from an admin token.
    ///
    /// # Examples
    /// ```
    /// use inventory_admin::domain::AuditActor;
    ///
    /// let actor = AuditActor::from_admin_token("s3cret");
    /// assert!(actor.as_str().starts_with("admin:"));
    /// assert_eq!(actor.as_str().len(), "admin:".len() + 16);
    /// ```
    #[must_use]
    pub fn from_admin_token(token: &str) -> Self {
        let digest = Sha256::digest(token.as_bytes());
        let fingerprint = digest.get(..ACTOR_FINGERPRINT_BYTES).unwrap_or_default();
        Self(format!("admin:{}", hex::encode(fingerprint)))
    }

    /// Actor used by command-line tooling.
    #[must_use]
    pub fn system(name: &str) -> Self {
        Self(format!("system:{name}"))
    }

    /// Stored label.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Audit row about to be appended.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAuditRecord {
    pub auditable_type: String,
    pub auditable_id: i64,
    pub event: AuditEvent,
    pub old_values: Option<Value>,
    pub new_values: Value,
    pub recorded_at: DateTime<Utc>,
}

/// Builds audit records stamped with the current time.
///
/// Used on its own when the append must share a transaction with the
/// mutation, as schema changes do.
#[derive(Clone)]
pub struct AuditRecordBuilder {
    clock: Arc<dyn Clock>,
}

impl AuditRecordBuilder {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Build a record without appending it.
    pub fn prepare(
        &self,
        entity_type: &str,
        entity_id: i64,
        event: AuditEvent,
        old_values: Option<Value>,
        new_values: Value,
    ) -> NewAuditRecord {
        NewAuditRecord {
            auditable_type: entity_type.to_owned(),
            auditable_id: entity_id,
            event,
            old_values,
            new_values,
            recorded_at: self.clock.utc(),
        }
    }

    /// Build a schema-level record: `new_values` is `payload` plus `userId`.
    pub fn prepare_schema_event(
        &self,
        event: AuditEvent,
        payload: Value,
        actor: &AuditActor,
    ) -> NewAuditRecord {
        let mut new_values = match payload {
            Value::Object(map) => map,
            other => {
                let mut map = serde_json::Map::new();
                map.insert("payload".to_owned(), other);
                map
            }
        };
        new_values.insert("userId".to_owned(), Value::String(actor.as_str().to_owned()));
        self.prepare(
            SCHEMA_AUDITABLE_TYPE,
            SCHEMA_ENTITY_ID,
            event,
            None,
            Value::Object(new_values),
        )
    }
}

/// Appends audit records for entity events through an [`AuditRepository`].
///
/// This is the entry point for create, update and delete events on
/// inventory rows. Schema changes do not go through it; their record is
/// built with [`AuditRecordBuilder`] and inserted by the DDL transaction.
#[derive(Clone)]
pub struct AuditRecorder<R: ?Sized> {
    repository: Arc<R>,
    records: AuditRecordBuilder,
}

impl<R: ?Sized> AuditRecorder<R> {
    /// Create a recorder writing through `repository`.
    pub fn new(repository: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            records: AuditRecordBuilder::new(clock),
        }
    }

    /// Record builder sharing this recorder's clock.
    pub fn records(&self) -> &AuditRecordBuilder {
        &self.records
    }
}

impl<R> AuditRecorder<R>
where
    R: AuditRepository + ?Sized,
{
    /// Append one record. Failures are returned, never swallowed.
    ///
    /// # Errors
    /// Propagates [`AuditRepositoryError`] from the repository.
    pub async fn record(
        &self,
        entity_type: &str,
        entity_id: i64,
        event: AuditEvent,
        old_values: Option<Value>,
        new_values: Value,
    ) -> Result<(), AuditRepositoryError> {
        let record = self
            .records
            .prepare(entity_type, entity_id, event, old_values, new_values);
        self.repository.append(&record).await.inspect_err(|err| {
            error!(
                error = %err,
                auditable_type = entity_type,
                event = event.as_str(),
                "audit append failed"
            );
        })
    }
}
