//! Domain types for keyword searches with strong typing.
//!
//! This module provides the value types shared by the keyword source, the
//! search executor, the run orchestrator and the result store. Invariants are
//! enforced at construction so the services can rely on them.

pub mod run;

pub use run::{FailureKind, RunOutcome, RunSummary};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One search term loaded from the keyword file.
///
/// Always non-empty and trimmed. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Keyword(String);

impl Keyword {
    /// Creates a keyword from raw cell text.
    ///
    /// Returns `None` for blank input.
    #[must_use]
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Keyword {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for Keyword {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

/// Half-open selection `[start, end)` over the deduplicated keyword list.
///
/// `end == None` means "to the last keyword".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IndexRange {
    pub start: usize,
    pub end: Option<usize>,
}

impl IndexRange {
    #[must_use]
    pub const fn new(start: usize, end: Option<usize>) -> Self {
        Self { start, end }
    }

    /// Everything from `start` to the last keyword.
    #[must_use]
    pub const fn open(start: usize) -> Self {
        Self { start, end: None }
    }

    /// Clamps both bounds into `[0, len]`.
    ///
    /// Returns `None` when the clamped range is empty.
    #[must_use]
    pub fn clamp(&self, len: usize) -> Option<std::ops::Range<usize>> {
        let start = self.start.min(len);
        let end = self.end.unwrap_or(len).min(len);
        if start >= end { None } else { Some(start..end) }
    }
}

impl fmt::Display for IndexRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end {
            Some(end) => write!(f, "{}..{}", self.start, end),
            None => write!(f, "{}..", self.start),
        }
    }
}

/// Result of one keyword's search round-trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The first result container carried a link.
    Found(String),

    /// No result container appeared, or the first one had no usable link.
    NotFound,

    /// The browser reported a fault for this keyword only.
    Faulted(String),
}

impl SearchOutcome {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Found(_) => "found",
            Self::NotFound => "not_found",
            Self::Faulted(_) => "faulted",
        }
    }
}

/// A found URL staged for insertion. The store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewSearchRecord {
    pub keyword: String,
    pub url: String,
}

impl NewSearchRecord {
    #[must_use]
    pub fn new(keyword: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            url: url.into(),
        }
    }
}

/// Attributes a result listing may be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Id,
    Keyword,
    Url,
    #[default]
    CreatedAt,
}

impl SortField {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Keyword => "keyword",
            Self::Url => "url",
            Self::CreatedAt => "created_at",
        }
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(Self::Id),
            "keyword" => Ok(Self::Keyword),
            "url" => Ok(Self::Url),
            "created_at" => Ok(Self::CreatedAt),
            other => Err(format!(
                "Unknown sort attribute '{other}'. Expected one of: id, keyword, url, created_at"
            )),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort order enumeration to replace boolean blindness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    #[must_use]
    pub const fn is_ascending(&self) -> bool {
        matches!(self, Self::Asc)
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(format!("Unknown sort order '{other}'. Expected asc or desc")),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated listing request. `page` and `per_page` are both at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageQuery {
    page: u64,
    per_page: u64,
    pub sort_by: SortField,
    pub order: SortOrder,
}

impl PageQuery {
    pub const DEFAULT_PER_PAGE: u64 = 10;

    /// Builds a query, rejecting a zero `page` or `per_page`.
    pub fn new(page: u64, per_page: u64, sort_by: SortField, order: SortOrder) -> Result<Self, String> {
        if page == 0 {
            return Err("Invalid page: 0. Page must be 1 or greater".to_string());
        }
        if per_page == 0 {
            return Err("Invalid per_page: 0. Must be 1 or greater".to_string());
        }
        Ok(Self {
            page,
            per_page,
            sort_by,
            order,
        })
    }

    #[must_use]
    pub const fn page(&self) -> u64 {
        self.page
    }

    #[must_use]
    pub const fn per_page(&self) -> u64 {
        self.per_page
    }

    /// Number of records skipped before this page.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.per_page)
    }

    /// `ceil(total_records / per_page)`.
    #[must_use]
    pub const fn total_pages(&self, total_records: u64) -> u64 {
        total_records.div_ceil(self.per_page)
    }
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: Self::DEFAULT_PER_PAGE,
            sort_by: SortField::CreatedAt,
            order: SortOrder::Desc,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_rejects_blank_and_trims() {
        assert!(Keyword::new("").is_none());
        assert!(Keyword::new("   ").is_none());
        assert_eq!(Keyword::new("  青森市  ").unwrap().as_str(), "青森市");
    }

    #[test]
    fn index_range_clamping() {
        assert_eq!(IndexRange::new(0, Some(3)).clamp(10), Some(0..3));
        assert_eq!(IndexRange::open(4).clamp(10), Some(4..10));
        assert_eq!(IndexRange::new(2, Some(50)).clamp(10), Some(2..10));
        assert_eq!(IndexRange::new(12, None).clamp(10), None);
        assert_eq!(IndexRange::new(5, Some(5)).clamp(10), None);
        assert_eq!(IndexRange::new(6, Some(2)).clamp(10), None);
        assert_eq!(IndexRange::open(0).clamp(0), None);
    }

    #[test]
    fn index_range_display() {
        assert_eq!(IndexRange::new(1, Some(4)).to_string(), "1..4");
        assert_eq!(IndexRange::open(3).to_string(), "3..");
    }

    #[test]
    fn sort_field_parsing() {
        assert_eq!("created_at".parse::<SortField>(), Ok(SortField::CreatedAt));
        assert_eq!("keyword".parse::<SortField>(), Ok(SortField::Keyword));
        assert!("password".parse::<SortField>().is_err());
        assert!("Created_At".parse::<SortField>().is_err());
    }

    #[test]
    fn sort_order_parsing() {
        assert_eq!("asc".parse::<SortOrder>(), Ok(SortOrder::Asc));
        assert_eq!("desc".parse::<SortOrder>(), Ok(SortOrder::Desc));
        assert!("sideways".parse::<SortOrder>().is_err());
        assert!(SortOrder::Asc.is_ascending());
        assert!(!SortOrder::Desc.is_ascending());
    }

    #[test]
    fn page_query_math() {
        let query = PageQuery::new(3, 10, SortField::Id, SortOrder::Asc).unwrap();
        assert_eq!(query.offset(), 20);
        assert_eq!(query.total_pages(23), 3);
        assert_eq!(query.total_pages(20), 2);
        assert_eq!(query.total_pages(0), 0);
    }

    #[test]
    fn page_query_validation() {
        assert!(PageQuery::new(0, 10, SortField::Id, SortOrder::Asc).is_err());
        assert!(PageQuery::new(1, 0, SortField::Id, SortOrder::Asc).is_err());
        assert!(PageQuery::new(1, 1001, SortField::Id, SortOrder::Asc).is_ok());
        assert!(PageQuery::new(1, u64::MAX, SortField::Id, SortOrder::Asc).is_ok());

        let huge = PageQuery::new(3, u64::MAX, SortField::Id, SortOrder::Asc).unwrap();
        assert_eq!(huge.offset(), u64::MAX);
        assert_eq!(huge.total_pages(23), 1);
    }

    #[test]
    fn search_outcome_labels() {
        assert_eq!(SearchOutcome::Found("https://a".into()).label(), "found");
        assert_eq!(SearchOutcome::NotFound.label(), "not_found");
        assert_eq!(SearchOutcome::Faulted("boom".into()).label(), "faulted");
    }
}
