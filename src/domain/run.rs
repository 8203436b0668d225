//! Outcome of one orchestrated run.

use serde::Serialize;

use super::{IndexRange, SearchOutcome};

/// Counters accumulated while a run iterates its keywords.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub range: IndexRange,
    pub keywords: usize,
    pub processed: usize,
    pub found: usize,
    pub not_found: usize,
    pub faulted: usize,
    /// Records durably written to the store.
    pub committed: usize,
    /// Number of batch commits issued.
    pub commits: usize,
    /// Staged records dropped by an aborted run.
    pub discarded: usize,
}

impl RunSummary {
    #[must_use]
    pub fn new(range: IndexRange, keywords: usize) -> Self {
        Self {
            range,
            keywords,
            ..Self::default()
        }
    }

    pub fn record(&mut self, outcome: &SearchOutcome) {
        self.processed += 1;
        match outcome {
            SearchOutcome::Found(_) => self.found += 1,
            SearchOutcome::NotFound => self.not_found += 1,
            SearchOutcome::Faulted(_) => self.faulted += 1,
        }
    }
}

/// Category of a run-level fault. This is what callers outside the process see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    BrowserLaunch,
    BrowserSessionLost,
    Storage,
}

impl FailureKind {
    #[must_use]
    pub const fn describe(&self) -> &'static str {
        match self {
            Self::BrowserLaunch => "browser could not be started",
            Self::BrowserSessionLost => "browser session lost",
            Self::Storage => "storage error",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.describe())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Every keyword was processed and all staged records committed.
    Completed(RunSummary),

    /// The range selected no keywords. No browser session was opened.
    Rejected { range: IndexRange, reason: String },

    /// A run-level fault aborted the run. Uncommitted records were discarded.
    ///
    /// `error` holds the driver or database message for logs and the CLI only.
    Failed {
        kind: FailureKind,
        #[serde(skip)]
        error: String,
        summary: RunSummary,
    },
}

impl RunOutcome {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Completed(_) => "completed",
            Self::Rejected { .. } => "rejected",
            Self::Failed { .. } => "failed",
        }
    }

    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    #[must_use]
    pub const fn summary(&self) -> Option<&RunSummary> {
        match self {
            Self::Completed(summary) | Self::Failed { summary, .. } => Some(summary),
            Self::Rejected { .. } => None,
        }
    }
}
