//! Natural-language report translation and guarded execution.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::domain::report_prompt::build_report_prompt;
use crate::domain::snapshot_service::load_snapshot;
use crate::domain::sql_guard::{DEFAULT_ROW_LIMIT, ReadOnlySelect};
use crate::domain::ports::{
    CompletionSource, CompletionSourceError, ReportCommand, ReportError, ReportQuery,
    ReportQueryError, ReportRows, ReportSource, SnapshotStore, TranslationError,
};

fn map_completion_error(error: CompletionSourceError) -> TranslationError {
    TranslationError::UpstreamUnavailable {
        message: error.to_string(),
    }
}

fn map_query_error(error: ReportQueryError) -> ReportError {
    match error {
        ReportQueryError::Connection { message } => ReportError::Unavailable { message },
        ReportQueryError::Execution { message } => ReportError::Execution { message },
    }
}

/// Report service implementing [`ReportCommand`].
#[derive(Clone)]
pub struct ReportService<S: ?Sized, C: ?Sized, Q: ?Sized> {
    snapshots: Arc<S>,
    completion: Arc<C>,
    query: Arc<Q>,
    row_limit: u32,
}

impl<S: ?Sized, C: ?Sized, Q: ?Sized> ReportService<S, C, Q> {
    /// Create a service with the default row cap.
    pub fn new(snapshots: Arc<S>, completion: Arc<C>, query: Arc<Q>) -> Self {
        Self {
            snapshots,
            completion,
            query,
            row_limit: DEFAULT_ROW_LIMIT,
        }
    }

    /// Override the row cap requested in the prompt and appended to unlimited
    /// statements.
    #[must_use]
    pub fn with_row_limit(mut self, row_limit: u32) -> Self {
        self.row_limit = row_limit;
        self
    }

    fn guard(&self, raw: &str) -> Result<ReadOnlySelect, TranslationError> {
        ReadOnlySelect::from_untrusted(raw, self.row_limit).map_err(|err| {
            warn!(reason = err.kind(), error = %err, "report statement rejected");
            TranslationError::Rejected(err)
        })
    }
}

#[async_trait]
impl<S, C, Q> ReportCommand for ReportService<S, C, Q>
where
    S: SnapshotStore + ?Sized,
    C: CompletionSource + ?Sized,
    Q: ReportQuery + ?Sized,
{
    async fn translate(&self, request: &str) -> Result<ReadOnlySelect, TranslationError> {
        let request = request.trim();
        if request.is_empty() {
            return Err(TranslationError::EmptyRequest);
        }

        let snapshot = load_snapshot(self.snapshots.as_ref()).await?;
        let prompt = build_report_prompt(&snapshot, request, self.row_limit);
        let completion = self
            .completion
            .complete(&prompt)
            .await
            .map_err(map_completion_error)?;
        debug!(raw = %completion, "completion received");

        let statement = self.guard(&completion)?;
        info!(tables = snapshot.table_count(), "report statement generated");
        Ok(statement)
    }

    async fn prepare(&self, source: ReportSource) -> Result<ReadOnlySelect, TranslationError> {
        match source {
            ReportSource::NaturalLanguage(text) => self.translate(&text).await,
            ReportSource::Sql(sql) if sql.trim().is_empty() => Err(TranslationError::EmptyRequest),
            ReportSource::Sql(sql) => self.guard(&sql),
        }
    }

    async fn run(&self, source: ReportSource) -> Result<ReportRows, ReportError> {
        let statement = self.prepare(source).await?;
        let rows = self.query.run(&statement).await.map_err(map_query_error)?;
        info!(rows = rows.len(), "report executed");
        Ok(ReportRows { statement, rows })
    }
}

#[cfg(test)]
#[path = "report_service_tests.rs"]
mod tests;
