pub const NO_KEYWORDS_IN_RANGE: &str = "No keywords found in specified range";

/// Where the UI sends the user after a completed run.
pub const RESULTS_PATH: &str = "/results";

pub mod browser {
    use std::time::Duration;

    pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

    /// Flags applied to every launch regardless of configuration.
    pub const BASE_ARGS: &[&str] = &["--no-sandbox", "--disable-dev-shm-usage", "--disable-gpu"];
}

pub mod metrics {
    pub const KEYWORD_SEARCHES: &str = "keyword_searches_total";

    pub const SEARCH_RUNS: &str = "search_runs_total";

    pub const RESULT_COMMITS: &str = "result_commits_total";

    pub const RUN_DURATION: &str = "search_run_duration_seconds";
}
