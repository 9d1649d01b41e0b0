//! Scripted completion service and recording report executor.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use inventory_admin::domain::ports::{
    CompletionSource, CompletionSourceError, ReportQuery, ReportQueryError,
};
use inventory_admin::domain::{ReadOnlySelect, SchemaSnapshot, SnapshotColumn};
use serde_json::Value;

/// Completion source answering every prompt with a scripted reply.
#[derive(Debug, Clone)]
pub struct ScriptedCompletion {
    reply: Arc<Mutex<Result<String, CompletionSourceError>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl Default for ScriptedCompletion {
    fn default() -> Self {
        Self {
            reply: Arc::new(Mutex::new(Err(CompletionSourceError::unconfigured()))),
            prompts: Arc::default(),
        }
    }
}

impl ScriptedCompletion {
    pub fn reply_with(&self, text: &str) {
        *self.reply.lock().expect("reply lock") = Ok(text.to_owned());
    }

    pub fn fail_with(&self, error: CompletionSourceError) {
        *self.reply.lock().expect("reply lock") = Err(error);
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompt lock").clone()
    }
}

#[async_trait]
impl CompletionSource for ScriptedCompletion {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionSourceError> {
        self.prompts
            .lock()
            .expect("prompt lock")
            .push(prompt.to_owned());
        self.reply.lock().expect("reply lock").clone()
    }
}

/// Report executor returning canned rows and recording each statement.
#[derive(Debug, Clone, Default)]
pub struct RecordingReportQuery {
    rows: Arc<Mutex<Vec<Value>>>,
    statements: Arc<Mutex<Vec<String>>>,
}

impl RecordingReportQuery {
    pub fn returning(&self, rows: Vec<Value>) {
        *self.rows.lock().expect("rows lock") = rows;
    }

    pub fn statements(&self) -> Vec<String> {
        self.statements.lock().expect("statements lock").clone()
    }
}

#[async_trait]
impl ReportQuery for RecordingReportQuery {
    async fn run(&self, statement: &ReadOnlySelect) -> Result<Vec<Value>, ReportQueryError> {
        self.statements
            .lock()
            .expect("statements lock")
            .push(statement.as_str().to_owned());
        Ok(self.rows.lock().expect("rows lock").clone())
    }
}

/// Snapshot of the tables report prompts are grounded on.
pub fn inventory_snapshot() -> SchemaSnapshot {
    let mut snapshot = SchemaSnapshot::default();
    snapshot.insert_table(
        "areas",
        vec![
            SnapshotColumn::new("id", "integer", false),
            SnapshotColumn::new("nombre", "character varying", false),
        ],
    );
    snapshot.insert_table(
        "inventarios",
        vec![
            SnapshotColumn::new("id", "integer", false),
            SnapshotColumn::new("codigo", "character varying", false),
            SnapshotColumn::new("area_funcional_id", "integer", true),
            SnapshotColumn::new("created_at", "timestamp with time zone", false),
        ],
    );
    snapshot
}
