use std::sync::Arc;

use crate::clients::ChromeLauncher;
use crate::config::Config;
use crate::db::Store;
use crate::domain::{IndexRange, RunOutcome};
use crate::services::{CsvKeywordSource, ResultStore, RunService, SearchRunner, SeaOrmResultStore};

pub async fn cmd_run(config: &Config, range: IndexRange) -> anyhow::Result<()> {
    let store = Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;
    let results: Arc<dyn ResultStore> = Arc::new(SeaOrmResultStore::new(store.clone()));

    let runner = SearchRunner::from_config(
        config,
        Arc::new(CsvKeywordSource::from_config(&config.keywords)),
        ChromeLauncher::new(config.browser.clone()),
        results,
    )?;

    println!("Searching keywords {range}...");
    let outcome = runner.run(range).await;
    store.close().await?;

    match outcome {
        RunOutcome::Completed(summary) => {
            println!("Search completed.");
            println!(
                "  Keywords: {} | Found: {} | Not found: {} | Faulted: {}",
                summary.keywords, summary.found, summary.not_found, summary.faulted
            );
            println!(
                "  Stored {} results in {} commits",
                summary.committed, summary.commits
            );
            Ok(())
        }
        RunOutcome::Rejected { reason, .. } => {
            println!("{reason}");
            Ok(())
        }
        RunOutcome::Failed {
            kind,
            error,
            summary,
        } => {
            println!(
                "Run aborted ({kind}) after {}/{} keywords ({} results stored, {} discarded).",
                summary.processed, summary.keywords, summary.committed, summary.discarded
            );
            anyhow::bail!("Search run failed: {error}")
        }
    }
}
