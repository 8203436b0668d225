use axum::{
    Form, Json,
    extract::{FromRequest, Request, State},
    http::header,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::observability::RunContext;
use super::types::{StartSearchRequest, StartSearchResponse};
use super::{ApiError, ApiResponse, AppState, validation};
use crate::constants::RESULTS_PATH;
use crate::domain::RunOutcome;

/// Run parameters from either an HTML form post or a JSON body.
pub struct StartSearchInput(pub StartSearchRequest);

impl<S> FromRequest<S> for StartSearchInput
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/json"));

        if is_json {
            let Json(body) = Json::<StartSearchRequest>::from_request(req, state)
                .await
                .map_err(|e| ApiError::validation(e.body_text()))?;
            Ok(Self(body))
        } else {
            let Form(body) = Form::<StartSearchRequest>::from_request(req, state)
                .await
                .map_err(|e| ApiError::validation(e.body_text()))?;
            Ok(Self(body))
        }
    }
}

/// Runs synchronously and answers once the run has finished.
///
/// The response carries a [`RunContext`] so the request log records the range
/// and how the run ended.
pub async fn start_search(
    State(state): State<Arc<AppState>>,
    StartSearchInput(request): StartSearchInput,
) -> Result<Response, ApiError> {
    let range = validation::validate_range(&request)?;

    let outcome = state.runner.run(range).await;
    let context = RunContext {
        range,
        outcome: outcome.label(),
    };

    let mut response = match outcome {
        RunOutcome::Completed(summary) => Json(ApiResponse::success(StartSearchResponse {
            redirect: RESULTS_PATH.to_string(),
            summary,
        }))
        .into_response(),
        RunOutcome::Rejected { reason, .. } => ApiError::ValidationError(reason).into_response(),
        RunOutcome::Failed { kind, .. } => ApiError::RunFailed(kind).into_response(),
    };
    response.extensions_mut().insert(context);

    Ok(response)
}
