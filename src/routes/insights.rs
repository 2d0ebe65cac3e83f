use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    dto::insights::{RecommendationList, RecommendationRequest, TrendingLocations},
    error::AppResult,
    response::ApiResponse,
    services::insight_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/trending-locations", get(trending_locations))
        .route("/recommendations", post(recommendations))
}

#[utoipa::path(
    get,
    path = "/api/insights/trending-locations",
    responses(
        (status = 200, description = "Up to ten locations, most-listed first", body = ApiResponse<TrendingLocations>)
    ),
    tag = "Insights"
)]
pub async fn trending_locations(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<TrendingLocations>>> {
    let resp = insight_service::trending_locations(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/insights/recommendations",
    request_body = RecommendationRequest,
    responses(
        (status = 200, description = "Top three spaces for the budget and audience", body = ApiResponse<RecommendationList>)
    ),
    tag = "Insights"
)]
pub async fn recommendations(
    State(state): State<AppState>,
    Json(payload): Json<RecommendationRequest>,
) -> AppResult<Json<ApiResponse<RecommendationList>>> {
    let resp = insight_service::recommend_spaces(&state, payload).await?;
    Ok(Json(resp))
}
