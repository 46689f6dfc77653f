use axum::{
    Extension, Json,
    extract::{Path, Query, State, rejection::PathRejection},
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::{validate_limit, validate_search_id};
use super::{ApiError, ApiResponse, AppState, CurrentUser};
use crate::services::{SearchDetailDto, SearchDto};

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<u64>,
}

/// GET /api/searches?limit=N
pub async fn list_searches(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<ApiResponse<Vec<SearchDto>>>, ApiError> {
    let limit = query.limit.map(validate_limit).transpose()?;

    let searches = state
        .landsat_service()
        .recent_searches(user.id, limit)
        .await?;

    Ok(Json(ApiResponse::success(searches)))
}

/// GET /api/searches/{id}
pub async fn get_search(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<ApiResponse<SearchDetailDto>>, ApiError> {
    let Path(id) = path.map_err(|rejection| ApiError::validation(rejection.body_text()))?;
    let search_id = validate_search_id(id)?;

    let detail = state
        .landsat_service()
        .search_pixels(user.id, search_id)
        .await?;

    Ok(Json(ApiResponse::success(detail)))
}
