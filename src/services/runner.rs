//! Run orchestration: keyword selection, paced sequential searches and batched commits.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::clients::browser::{BrowserError, BrowserSession, SessionLauncher};
use crate::config::Config;
use crate::constants::{NO_KEYWORDS_IN_RANGE, metrics as names};
use crate::domain::{
    FailureKind, IndexRange, Keyword, NewSearchRecord, RunOutcome, RunSummary, SearchOutcome,
};
use crate::services::keyword_source::KeywordSource;
use crate::services::results_service::{ResultStore, StoreError};
use crate::services::search::SearchExecutor;

/// Faults that abort a whole run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Browser(#[from] BrowserError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RunError {
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::Browser(BrowserError::Launch(_)) => FailureKind::BrowserLaunch,
            Self::Browser(_) => FailureKind::BrowserSessionLost,
            Self::Store(_) => FailureKind::Storage,
        }
    }
}

#[async_trait]
pub trait RunService: Send + Sync {
    /// Executes one run over `range`. Never panics or returns raw errors;
    /// every exit path is described by the returned outcome.
    async fn run(&self, range: IndexRange) -> RunOutcome;
}

pub struct SearchRunner<L: SessionLauncher> {
    source: Arc<dyn KeywordSource>,
    launcher: L,
    store: Arc<dyn ResultStore>,
    executor: SearchExecutor,
    pacing: Duration,
    commit_every: usize,
}

impl<L: SessionLauncher> SearchRunner<L> {
    #[must_use]
    pub fn new(
        source: Arc<dyn KeywordSource>,
        launcher: L,
        store: Arc<dyn ResultStore>,
        executor: SearchExecutor,
        pacing: Duration,
        commit_every: usize,
    ) -> Self {
        Self {
            source,
            launcher,
            store,
            executor,
            pacing,
            commit_every: commit_every.max(1),
        }
    }

    pub fn from_config(
        config: &Config,
        source: Arc<dyn KeywordSource>,
        launcher: L,
        store: Arc<dyn ResultStore>,
    ) -> Result<Self> {
        let executor = SearchExecutor::from_config(&config.search)?;
        Ok(Self::new(
            source,
            launcher,
            store,
            executor,
            config.search.pacing(),
            config.search.commit_every,
        ))
    }

    async fn load_keywords(&self, range: IndexRange) -> Vec<Keyword> {
        let source = Arc::clone(&self.source);
        match tokio::task::spawn_blocking(move || source.load(range)).await {
            Ok(keywords) => keywords,
            Err(e) => {
                error!(error = %e, "Keyword loading task failed");
                Vec::new()
            }
        }
    }

    async fn execute(&self, range: IndexRange) -> RunOutcome {
        let keywords = self.load_keywords(range).await;
        if keywords.is_empty() {
            return RunOutcome::Rejected {
                range,
                reason: NO_KEYWORDS_IN_RANGE.to_string(),
            };
        }

        let mut summary = RunSummary::new(range, keywords.len());

        let mut session = match self.launcher.open().await {
            Ok(session) => session,
            Err(e) => {
                error!(error = %e, "Failed to open browser session");
                return RunOutcome::Failed {
                    kind: FailureKind::BrowserLaunch,
                    error: e.to_string(),
                    summary,
                };
            }
        };

        let result = self.iterate(&keywords, &session, &mut summary).await;

        if let Err(e) = session.quit().await {
            warn!(error = %e, "Failed to release browser session");
        }

        match result {
            Ok(()) => {
                info!("Search completed successfully");
                RunOutcome::Completed(summary)
            }
            Err(e) => {
                error!(
                    error = %e,
                    kind = %e.kind(),
                    discarded = summary.discarded,
                    "Error during search process"
                );
                RunOutcome::Failed {
                    kind: e.kind(),
                    error: e.to_string(),
                    summary,
                }
            }
        }
    }

    async fn iterate(
        &self,
        keywords: &[Keyword],
        session: &L::Session,
        summary: &mut RunSummary,
    ) -> Result<(), RunError> {
        let total = keywords.len();
        let mut staged: Vec<NewSearchRecord> = Vec::with_capacity(self.commit_every);

        for (index, keyword) in keywords.iter().enumerate() {
            let position = index + 1;

            if position > 1 {
                info!("Waiting {} seconds before next search...", self.pacing.as_secs());
                tokio::time::sleep(self.pacing).await;
            }

            let outcome = match self.executor.search(keyword, session).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    summary.discarded = staged.len();
                    return Err(e.into());
                }
            };

            metrics::counter!(names::KEYWORD_SEARCHES, "outcome" => outcome.label()).increment(1);
            summary.record(&outcome);

            match outcome {
                SearchOutcome::Found(url) => {
                    staged.push(NewSearchRecord::new(keyword.as_str(), url));
                }
                SearchOutcome::NotFound => {}
                SearchOutcome::Faulted(reason) => {
                    error!("Error processing keyword {}: {}", keyword, reason);
                }
            }

            if position % self.commit_every == 0 {
                self.flush(&mut staged, summary).await?;
            }

            info!("Processed {}/{}: {}", position, total, keyword);
        }

        if total % self.commit_every != 0 {
            self.flush(&mut staged, summary).await?;
        }

        Ok(())
    }

    /// Commits staged records as one batch. On failure the batch stays staged
    /// and is counted as discarded.
    async fn flush(
        &self,
        staged: &mut Vec<NewSearchRecord>,
        summary: &mut RunSummary,
    ) -> Result<(), StoreError> {
        match self.store.insert_batch(staged).await {
            Ok(written) => {
                summary.commits += 1;
                summary.committed += written;
                metrics::counter!(names::RESULT_COMMITS).increment(1);
                staged.clear();
                Ok(())
            }
            Err(e) => {
                summary.discarded = staged.len();
                Err(e)
            }
        }
    }
}

#[async_trait]
impl<L: SessionLauncher + 'static> RunService for SearchRunner<L> {
    async fn run(&self, range: IndexRange) -> RunOutcome {
        let start = Instant::now();
        info!(event = "search_run_started", range = %range, "Starting search with range: {}", range);

        let outcome = self.execute(range).await;

        let elapsed = start.elapsed();
        metrics::counter!(names::SEARCH_RUNS, "outcome" => outcome.label()).increment(1);
        metrics::histogram!(names::RUN_DURATION, "outcome" => outcome.label())
            .record(elapsed.as_secs_f64());

        let summary = outcome.summary().cloned().unwrap_or_default();
        info!(
            event = "search_run_finished",
            outcome = outcome.label(),
            range = %range,
            keywords = summary.keywords,
            processed = summary.processed,
            found = summary.found,
            not_found = summary.not_found,
            faulted = summary.faulted,
            committed = summary.committed,
            commits = summary.commits,
            discarded = summary.discarded,
            duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            "Search run finished"
        );

        outcome
    }
}
