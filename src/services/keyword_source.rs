//! Keyword range selection.

use std::collections::HashSet;
use tracing::{error, info, warn};

use crate::clients::keyword_csv::{KeywordCsv, SourceError};
use crate::config::KeywordsConfig;
use crate::domain::{IndexRange, Keyword};

/// Supplies the ordered keyword list a run iterates over.
///
/// Implementors provide the raw column; `load` applies deduplication and
/// range clamping so every source selects keywords the same way.
pub trait KeywordSource: Send + Sync {
    /// Every cell of the keyword column, in source order.
    fn read_keywords(&self) -> Result<Vec<String>, SourceError>;

    /// Unique keywords in first-occurrence order, sliced to `range`.
    ///
    /// A source error or an empty clamped range yields an empty list.
    fn load(&self, range: IndexRange) -> Vec<Keyword> {
        let raw = match self.read_keywords() {
            Ok(raw) => raw,
            Err(e) => {
                error!(error = %e, "Error reading keyword file");
                return Vec::new();
            }
        };

        let unique = unique_keywords(raw);
        info!("Found {} unique keywords", unique.len());

        select_range(unique, range)
    }
}

/// Drops blanks and repeats, keeping the first occurrence of each keyword.
pub fn unique_keywords<I>(raw: I) -> Vec<Keyword>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    raw.into_iter()
        .filter_map(|cell| Keyword::new(&cell))
        .filter(|keyword| seen.insert(keyword.clone()))
        .collect()
}

pub fn select_range(keywords: Vec<Keyword>, range: IndexRange) -> Vec<Keyword> {
    let total = keywords.len();
    let Some(bounds) = range.clamp(total) else {
        warn!(range = %range, total, "Invalid range: no keywords selected");
        return Vec::new();
    };

    info!(
        "Processing keywords from index {} to {} (total: {})",
        bounds.start,
        bounds.end,
        bounds.len()
    );

    keywords
        .into_iter()
        .skip(bounds.start)
        .take(bounds.len())
        .collect()
}

/// Keyword source backed by the configured CSV file.
pub struct CsvKeywordSource {
    csv: KeywordCsv,
}

impl CsvKeywordSource {
    #[must_use]
    pub const fn new(csv: KeywordCsv) -> Self {
        Self { csv }
    }

    #[must_use]
    pub fn from_config(config: &KeywordsConfig) -> Self {
        Self::new(KeywordCsv::from_config(config))
    }
}

impl KeywordSource for CsvKeywordSource {
    fn read_keywords(&self) -> Result<Vec<String>, SourceError> {
        self.csv.read_column()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    struct FixedKeywords(Vec<&'static str>);

    impl KeywordSource for FixedKeywords {
        fn read_keywords(&self) -> Result<Vec<String>, SourceError> {
            Ok(self.0.iter().map(ToString::to_string).collect())
        }
    }

    struct Unreadable;

    impl KeywordSource for Unreadable {
        fn read_keywords(&self) -> Result<Vec<String>, SourceError> {
            Err(SourceError::NotFound("missing.csv".into()))
        }
    }

    fn strings(keywords: &[Keyword]) -> Vec<&str> {
        keywords.iter().map(Keyword::as_str).collect()
    }

    #[test]
    fn dedupes_in_first_occurrence_order() {
        let source = FixedKeywords(vec!["b", "a", "b", "c", "a", " ", ""]);
        assert_eq!(strings(&source.load(IndexRange::open(0))), vec!["b", "a", "c"]);
    }

    #[test]
    fn returns_exactly_end_minus_start() {
        let source = FixedKeywords(vec!["k0", "k1", "k2", "k3", "k4", "k5"]);
        let loaded = source.load(IndexRange::new(1, Some(4)));
        assert_eq!(strings(&loaded), vec!["k1", "k2", "k3"]);
    }

    #[test]
    fn clamps_end_past_the_list() {
        let source = FixedKeywords(vec!["k0", "k1", "k2"]);
        assert_eq!(strings(&source.load(IndexRange::new(1, Some(99)))), vec!["k1", "k2"]);
    }

    #[test]
    fn empty_range_selects_nothing() {
        let source = FixedKeywords(vec!["k0", "k1", "k2"]);
        assert!(source.load(IndexRange::new(2, Some(2))).is_empty());
        assert!(source.load(IndexRange::new(3, None)).is_empty());
        assert!(source.load(IndexRange::new(2, Some(1))).is_empty());
    }

    #[test]
    fn source_error_selects_nothing() {
        assert!(Unreadable.load(IndexRange::open(0)).is_empty());
    }

    #[test]
    fn csv_source_reads_configured_column() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all("施設名\n青森市役所\n弘前市役所\n青森市役所\n".as_bytes())
            .unwrap();

        let config = KeywordsConfig {
            csv_path: file.path().display().to_string(),
            columns: vec!["施設名".to_string()],
            ..KeywordsConfig::default()
        };
        let source = CsvKeywordSource::from_config(&config);

        assert_eq!(
            strings(&source.load(IndexRange::open(0))),
            vec!["青森市役所", "弘前市役所"]
        );
    }
}
