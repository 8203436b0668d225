use super::ApiError;
use super::types::{IndexField, StartSearchRequest};
use crate::domain::IndexRange;

/// Parses one index field. Blank or absent values are `None`.
pub fn validate_index(field: Option<&IndexField>, name: &str) -> Result<Option<usize>, ApiError> {
    let invalid = |raw: &dyn std::fmt::Display| {
        ApiError::validation(format!(
            "Invalid {name}: {raw}. Index must be a non-negative integer"
        ))
    };

    match field {
        None => Ok(None),
        Some(IndexField::Number(n)) => usize::try_from(*n).map(Some).map_err(|_| invalid(n)),
        Some(IndexField::Text(text)) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse::<usize>()
                .map(Some)
                .map_err(|_| invalid(&trimmed))
        }
    }
}

/// A missing start means the first keyword; a missing end means the last.
pub fn validate_range(request: &StartSearchRequest) -> Result<IndexRange, ApiError> {
    let start = validate_index(request.start_index.as_ref(), "start_index")?.unwrap_or(0);
    let end = validate_index(request.end_index.as_ref(), "end_index")?;
    Ok(IndexRange::new(start, end))
}
