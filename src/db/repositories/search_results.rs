use crate::domain::{NewSearchRecord, PageQuery, SortField};
use crate::entities::{prelude::*, search_results};
use anyhow::Result;
use sea_orm::{
    DatabaseConnection, EntityTrait, Order, PaginatorTrait, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};

pub struct SearchResultRepository {
    conn: DatabaseConnection,
}

impl SearchResultRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Appends all records in one transaction. Either every row lands or none does.
    pub async fn insert_batch(&self, records: &[NewSearchRecord]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let models = records.iter().map(|record| search_results::ActiveModel {
            keyword: Set(record.keyword.clone()),
            url: Set(record.url.clone()),
            ..Default::default()
        });

        let txn = self.conn.begin().await?;
        SearchResults::insert_many(models).exec(&txn).await?;
        txn.commit().await?;

        Ok(records.len())
    }

    /// Returns one page of the sorted record set together with the total record count.
    ///
    /// `LIMIT` and `OFFSET` never exceed the record count, so any `per_page` is accepted.
    pub async fn page(&self, query: &PageQuery) -> Result<(Vec<search_results::Model>, u64)> {
        let column = match query.sort_by {
            SortField::Id => search_results::Column::Id,
            SortField::Keyword => search_results::Column::Keyword,
            SortField::Url => search_results::Column::Url,
            SortField::CreatedAt => search_results::Column::CreatedAt,
        };
        let order = if query.order.is_ascending() {
            Order::Asc
        } else {
            Order::Desc
        };

        let mut select = SearchResults::find().order_by(column, order);
        if query.sort_by != SortField::Id {
            select = select.order_by_asc(search_results::Column::Id);
        }

        let total = SearchResults::find().count(&self.conn).await?;
        let offset = query.offset();
        if offset >= total {
            return Ok((Vec::new(), total));
        }

        let items = select
            .offset(offset)
            .limit(query.per_page().min(total - offset))
            .all(&self.conn)
            .await?;

        Ok((items, total))
    }

    pub async fn count(&self) -> Result<u64> {
        let count = SearchResults::find().count(&self.conn).await?;
        Ok(count)
    }
}
