//! Domain service for stored search results.

use serde::Serialize;
use thiserror::Error;

use crate::db::SearchRecord;
use crate::domain::{NewSearchRecord, PageQuery, SortField, SortOrder};

/// Errors raised by the result store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for StoreError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for StoreError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Listing parameters that cannot be turned into a [`PageQuery`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("Invalid page '{0}'. Page must be an integer of 1 or greater")]
    InvalidPage(String),

    #[error("Invalid per_page '{0}'. Must be an integer of 1 or greater")]
    InvalidPerPage(String),

    #[error("{0}")]
    UnknownSortField(String),

    #[error("{0}")]
    UnknownOrder(String),
}

/// Parses raw listing parameters. Absent values take the listing defaults.
pub fn parse_page_query(
    page: Option<&str>,
    per_page: Option<&str>,
    sort_by: Option<&str>,
    order: Option<&str>,
) -> Result<PageQuery, QueryError> {
    let page = match page.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => raw
            .parse::<u64>()
            .ok()
            .filter(|p| *p >= 1)
            .ok_or_else(|| QueryError::InvalidPage(raw.to_string()))?,
        None => 1,
    };

    let per_page = match per_page.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => raw
            .parse::<u64>()
            .ok()
            .filter(|p| *p >= 1)
            .ok_or_else(|| QueryError::InvalidPerPage(raw.to_string()))?,
        None => PageQuery::DEFAULT_PER_PAGE,
    };

    let sort_by = match sort_by.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => raw.parse::<SortField>().map_err(QueryError::UnknownSortField)?,
        None => SortField::default(),
    };

    let order = match order.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => raw.parse::<SortOrder>().map_err(QueryError::UnknownOrder)?,
        None => SortOrder::default(),
    };

    PageQuery::new(page, per_page, sort_by, order).map_err(QueryError::InvalidPage)
}

/// One page of results plus the pagination metadata the listing view needs.
#[derive(Debug, Clone, Serialize)]
pub struct ResultPage {
    pub results: Vec<SearchRecord>,
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
    pub total_records: u64,
    pub sort_by: SortField,
    pub order: SortOrder,
}

impl ResultPage {
    #[must_use]
    pub fn new(query: &PageQuery, results: Vec<SearchRecord>, total_records: u64) -> Self {
        Self {
            results,
            page: query.page(),
            per_page: query.per_page(),
            total_pages: query.total_pages(total_records),
            total_records,
            sort_by: query.sort_by,
            order: query.order,
        }
    }

    #[must_use]
    pub fn empty(query: &PageQuery) -> Self {
        Self::new(query, Vec::new(), 0)
    }
}

/// Append-only store of found URLs.
#[async_trait::async_trait]
pub trait ResultStore: Send + Sync {
    /// Appends all records atomically and returns how many were written.
    ///
    /// An empty batch is a successful no-op.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the batch could not be committed.
    /// No record of the batch is stored in that case.
    async fn insert_batch(&self, records: &[NewSearchRecord]) -> Result<usize, StoreError>;

    /// Sorts the whole record set and returns the requested slice.
    ///
    /// Pages past the end are empty, not an error.
    async fn query(&self, query: &PageQuery) -> Result<ResultPage, StoreError>;
}
