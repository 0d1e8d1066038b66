use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::RecommendationResult,
    services::title_search::SUGGESTION_LIMIT,
};

use super::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct RecommendQuery {
    #[serde(default)]
    pub title: String,
    pub count: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SuggestQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub catalog_size: usize,
}

// Handlers

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy",
            catalog_size: state.recommender.len(),
        }),
    )
}

/// Recommend movies similar to the given title
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<RecommendQuery>,
) -> AppResult<Json<RecommendationResult>> {
    let title = params.title.trim();
    if title.is_empty() {
        return Err(AppError::InvalidInput("Please enter a movie title.".to_string()));
    }

    let count = params
        .count
        .unwrap_or(state.default_recommendations)
        .min(state.max_recommendations);

    tracing::info!(
        request_id = %request_id,
        title = %title,
        count,
        "Processing recommendation request"
    );

    let result = state.recommender.recommend(title, count);

    tracing::info!(
        request_id = %request_id,
        found = result.found,
        returned = result.recommendations.len(),
        suggestions = result.suggestions.len(),
        "Recommendation completed"
    );

    Ok(Json(result))
}

/// Catalog titles spelled closest to the query
pub async fn suggest_titles(
    State(state): State<AppState>,
    Query(params): Query<SuggestQuery>,
) -> Json<Vec<String>> {
    Json(state.recommender.suggest_titles(&params.q, SUGGESTION_LIMIT))
}
