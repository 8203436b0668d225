use serde::{Deserialize, Serialize};

use crate::domain::RunSummary;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Index fields arrive as text from HTML forms and as numbers from JSON clients.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IndexField {
    Number(i64),
    Text(String),
}

#[derive(Debug, Default, Deserialize)]
pub struct StartSearchRequest {
    #[serde(default)]
    pub start_index: Option<IndexField>,
    #[serde(default)]
    pub end_index: Option<IndexField>,
}

#[derive(Debug, Serialize)]
pub struct StartSearchResponse {
    pub redirect: String,
    pub summary: RunSummary,
}

#[derive(Debug, Default, Deserialize)]
pub struct ResultsParams {
    pub page: Option<String>,
    pub per_page: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub database: bool,
    pub total_records: u64,
}
