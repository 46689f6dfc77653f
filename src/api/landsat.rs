use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, CurrentUser};
use crate::clients::imagery::SceneSummary;
use crate::services::{FetchRequest, ProcessedPixels, SceneSearchRequest};

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ApiError::validation(rejection.body_text()))
}

/// POST /api/landsat/data
///
/// Fetches the 3×3 pixel window around the point, records it and returns
/// the grid as a bare JSON object.
pub async fn fetch_data(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    payload: Result<Json<FetchRequest>, JsonRejection>,
) -> Result<Json<ProcessedPixels>, ApiError> {
    let request = body(payload)?;

    let processed = state
        .landsat_service()
        .fetch_pixels(user.id, request)
        .await?;

    Ok(Json(processed))
}

/// POST /api/landsat/search
pub async fn search_scenes(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SceneSearchRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<Vec<SceneSummary>>>, ApiError> {
    let request = body(payload)?;

    let scenes = state.landsat_service().search_scenes(request).await?;

    Ok(Json(ApiResponse::success(scenes)))
}
