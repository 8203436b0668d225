pub mod keyword_source;
pub use keyword_source::{CsvKeywordSource, KeywordSource};

pub mod search;
pub use search::SearchExecutor;

pub mod results_service;
pub mod results_service_impl;
pub use results_service::{QueryError, ResultPage, ResultStore, StoreError, parse_page_query};
pub use results_service_impl::SeaOrmResultStore;

pub mod runner;
pub use runner::{RunError, RunService, SearchRunner};

#[cfg(test)]
pub(crate) mod fakes;
