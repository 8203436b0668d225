use crate::config::Config;
use crate::db::Store;
use crate::services::{ResultStore, SeaOrmResultStore, parse_page_query};

pub async fn cmd_results(
    config: &Config,
    page: u64,
    per_page: u64,
    sort_by: &str,
    order: &str,
) -> anyhow::Result<()> {
    let query = parse_page_query(
        Some(&page.to_string()),
        Some(&per_page.to_string()),
        Some(sort_by),
        Some(order),
    )?;

    let store = Store::new(&config.general.database_path).await?;
    let results = SeaOrmResultStore::new(store.clone());
    let listing = results.query(&query).await?;

    if listing.total_records == 0 {
        println!("No results stored yet.");
        store.close().await?;
        return Ok(());
    }

    println!(
        "Results (page {}/{}, {} records, sorted by {} {}):",
        listing.page, listing.total_pages, listing.total_records, listing.sort_by, listing.order
    );
    println!("{:-<80}", "");

    for record in &listing.results {
        println!("{:>5}  {}  {}", record.id, record.created_at, record.keyword);
        println!("       {}", record.url);
    }

    if listing.results.is_empty() {
        println!("(page {} is past the last page)", listing.page);
    }

    store.close().await?;
    Ok(())
}
