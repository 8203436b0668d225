//! Reader for the tabular keyword file.
//!
//! The file is a CSV with a header row. Its text encoding is not known up
//! front, so every configured encoding is tried in order and the first one
//! that both decodes cleanly and yields the keyword column wins.

use encoding_rs::Encoding;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::KeywordsConfig;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Keyword file not found at {0}")]
    NotFound(PathBuf),

    #[error("Failed to read keyword file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Keyword file could not be read with any encoding ({0})")]
    Undecodable(String),

    #[error("None of the keyword columns {0:?} exist in the keyword file")]
    MissingColumn(Vec<String>),

    #[error("Malformed keyword file: {0}")]
    Csv(#[from] csv::Error),
}

pub struct KeywordCsv {
    path: PathBuf,
    columns: Vec<String>,
    encodings: Vec<&'static Encoding>,
}

impl KeywordCsv {
    #[must_use]
    pub fn new(
        path: impl Into<PathBuf>,
        columns: Vec<String>,
        encodings: Vec<&'static Encoding>,
    ) -> Self {
        Self {
            path: path.into(),
            columns,
            encodings,
        }
    }

    /// Unknown encoding labels are skipped; `Config::validate` rejects them earlier.
    #[must_use]
    pub fn from_config(config: &KeywordsConfig) -> Self {
        let encodings = config
            .encodings
            .iter()
            .filter_map(|label| {
                let encoding = Encoding::for_label(label.as_bytes());
                if encoding.is_none() {
                    warn!(label = %label, "Ignoring unknown keyword file encoding");
                }
                encoding
            })
            .collect();

        Self::new(&config.csv_path, config.columns.clone(), encodings)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every cell of the keyword column, in file order.
    pub fn read_column(&self) -> Result<Vec<String>, SourceError> {
        info!("Reading CSV file from {}", self.path.display());

        if !self.path.exists() {
            return Err(SourceError::NotFound(self.path.clone()));
        }

        let bytes = std::fs::read(&self.path).map_err(|source| SourceError::Io {
            path: self.path.clone(),
            source,
        })?;

        let mut last_error: Option<SourceError> = None;

        for encoding in &self.encodings {
            let (text, had_errors) = encoding.decode_with_bom_removal(&bytes);
            if had_errors {
                warn!("Failed to read CSV with encoding: {}", encoding.name());
                continue;
            }

            match self.parse_column(&text) {
                Ok(values) => {
                    info!("Successfully read CSV with encoding: {}", encoding.name());
                    return Ok(values);
                }
                Err(e) => {
                    warn!(
                        encoding = encoding.name(),
                        error = %e,
                        "Keyword column not readable with this encoding"
                    );
                    if !matches!(e, SourceError::MissingColumn(_)) || last_error.is_none() {
                        last_error = Some(e);
                    }
                }
            }
        }

        Err(self.load_failure(last_error))
    }

    /// Picks the error reported once every encoding has been tried.
    ///
    /// `last_error` is `None` only when no encoding decoded the file. A parse
    /// failure is kept over a missing column.
    fn load_failure(&self, last_error: Option<SourceError>) -> SourceError {
        match last_error {
            Some(SourceError::MissingColumn(_)) => SourceError::MissingColumn(self.columns.clone()),
            Some(e) => e,
            None => {
                let tried: Vec<&str> = self.encodings.iter().map(|e| e.name()).collect();
                SourceError::Undecodable(tried.join(", "))
            }
        }
    }

    fn parse_column(&self, text: &str) -> Result<Vec<String>, SourceError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers = reader.headers()?.clone();
        let index = self
            .columns
            .iter()
            .find_map(|column| headers.iter().position(|h| h == column))
            .ok_or_else(|| SourceError::MissingColumn(self.columns.clone()))?;

        let mut values = Vec::new();
        for record in reader.records() {
            let record = record?;
            if let Some(value) = record.get(index) {
                values.push(value.to_string());
            }
        }

        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_fixture(bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        file.flush().unwrap();
        file
    }

    fn reader(path: &Path, columns: &[&str]) -> KeywordCsv {
        KeywordCsv::new(
            path,
            columns.iter().map(ToString::to_string).collect(),
            vec![encoding_rs::UTF_8, encoding_rs::SHIFT_JIS],
        )
    }

    #[test]
    fn reads_utf8_column() {
        let file = write_fixture("id,施設名\n1,青森市役所\n2,弘前市役所\n".as_bytes());
        let values = reader(file.path(), &["施設名"]).read_column().unwrap();
        assert_eq!(values, vec!["青森市役所", "弘前市役所"]);
    }

    #[test]
    fn strips_utf8_bom() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice("name\nA\n".as_bytes());
        let file = write_fixture(&bytes);
        let values = reader(file.path(), &["name"]).read_column().unwrap();
        assert_eq!(values, vec!["A"]);
    }

    #[test]
    fn falls_back_to_shift_jis() {
        let (encoded, _, had_errors) = encoding_rs::SHIFT_JIS.encode("施設名\n八戸市役所\n");
        assert!(!had_errors);
        let file = write_fixture(&encoded);

        let values = reader(file.path(), &["施設名"]).read_column().unwrap();
        assert_eq!(values, vec!["八戸市役所"]);
    }

    #[test]
    fn first_candidate_column_present_wins() {
        let file = write_fixture(b"other,keyword\nx,alpha\ny,beta\n");
        let values = reader(file.path(), &["missing", "keyword", "other"])
            .read_column()
            .unwrap();
        assert_eq!(values, vec!["alpha", "beta"]);
    }

    #[test]
    fn missing_file_is_reported() {
        let err = reader(Path::new("/nonexistent/keywords.csv"), &["name"])
            .read_column()
            .unwrap_err();
        assert!(matches!(err, SourceError::NotFound(_)));
    }

    #[test]
    fn missing_column_is_reported() {
        let file = write_fixture(b"a,b\n1,2\n");
        let err = reader(file.path(), &["name"]).read_column().unwrap_err();
        assert!(matches!(err, SourceError::MissingColumn(_)));
    }

    #[test]
    fn parse_failure_is_not_reported_as_missing_column() {
        let source = reader(Path::new("keywords.csv"), &["name"]);

        let io = std::io::Error::new(std::io::ErrorKind::InvalidData, "truncated record");
        let err = source.load_failure(Some(SourceError::Csv(csv::Error::from(io))));
        assert!(matches!(err, SourceError::Csv(_)));

        let err = source.load_failure(Some(SourceError::MissingColumn(vec![])));
        assert!(matches!(err, SourceError::MissingColumn(columns) if columns == ["name"]));

        assert!(matches!(source.load_failure(None), SourceError::Undecodable(_)));
    }

    #[test]
    fn undecodable_bytes_are_reported() {
        let file = write_fixture(&[0xFF, 0xFE, 0x80, 0x81, 0xFF]);
        let csv = KeywordCsv::new(file.path(), vec!["name".into()], vec![encoding_rs::UTF_8]);
        assert!(matches!(
            csv.read_column().unwrap_err(),
            SourceError::Undecodable(_)
        ));
    }
}
