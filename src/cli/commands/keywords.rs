use crate::config::Config;
use crate::domain::IndexRange;
use crate::services::{CsvKeywordSource, KeywordSource};

pub async fn cmd_keywords(config: &Config, range: IndexRange) -> anyhow::Result<()> {
    let source = CsvKeywordSource::from_config(&config.keywords);
    let keywords = tokio::task::spawn_blocking(move || source.load(range)).await?;

    if keywords.is_empty() {
        println!("No keywords found in range {range}.");
        return Ok(());
    }

    println!("Keywords in range {} ({}):", range, keywords.len());
    println!("{:-<50}", "");
    for (offset, keyword) in keywords.iter().enumerate() {
        println!("{:>5}  {}", range.start + offset, keyword);
    }

    Ok(())
}
