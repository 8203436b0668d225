pub use super::search_results::Entity as SearchResults;
