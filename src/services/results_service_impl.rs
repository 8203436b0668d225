//! `SeaORM` implementation of the `ResultStore` trait.

use async_trait::async_trait;
use tracing::debug;

use crate::db::Store;
use crate::domain::{NewSearchRecord, PageQuery};
use crate::services::results_service::{ResultPage, ResultStore, StoreError};

pub struct SeaOrmResultStore {
    store: Store,
}

impl SeaOrmResultStore {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ResultStore for SeaOrmResultStore {
    async fn insert_batch(&self, records: &[NewSearchRecord]) -> Result<usize, StoreError> {
        let written = self.store.insert_search_results(records).await?;
        debug!(records = written, "Committed search results");
        Ok(written)
    }

    async fn query(&self, query: &PageQuery) -> Result<ResultPage, StoreError> {
        let (results, total) = self.store.list_search_results(query).await?;
        Ok(ResultPage::new(query, results, total))
    }
}
