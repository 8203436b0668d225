use axum::{Json, extract::State};
use std::sync::Arc;

use super::types::HealthResponse;
use super::{ApiError, ApiResponse, AppState};

pub async fn get_health(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<HealthResponse>>, ApiError> {
    let database = state.store.ping().await.is_ok();
    let total_records = if database {
        state.store.count_search_results().await?
    } else {
        0
    };

    Ok(Json(ApiResponse::success(HealthResponse {
        status: if database { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        database,
        total_records,
    })))
}
