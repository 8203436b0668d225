use axum::{
    Json,
    extract::{Query, State},
};
use std::sync::Arc;

use super::types::ResultsParams;
use super::{ApiError, ApiResponse, AppState};
use crate::services::{ResultPage, parse_page_query};

pub async fn list_results(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ResultsParams>,
) -> Result<Json<ApiResponse<ResultPage>>, ApiError> {
    let query = parse_page_query(
        params.page.as_deref(),
        params.per_page.as_deref(),
        params.sort_by.as_deref(),
        params.order.as_deref(),
    )?;

    let page = state.results.query(&query).await?;
    Ok(Json(ApiResponse::success(page)))
}
