use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::spaces::{
        AvailabilityResponse, CreateSpaceRequest, SpaceDetail, SpaceList,
        ToggleAvailabilityRequest, UpdateSpaceRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::AdSpace,
    response::ApiResponse,
    routes::params::SpaceQuery,
    services::space_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_spaces).post(create_space))
        // GET addresses by slug, PUT by id; axum wants one template per segment shape.
        .route("/{key}", get(get_space).put(update_space))
        .route("/{id}/availability", post(toggle_availability))
}

#[utoipa::path(
    get,
    path = "/api/spaces",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("q" = Option<String>, Query, description = "Search over title and description"),
        ("space_type" = Option<String>, Query, description = "billboard, digital_screen, transit, other"),
        ("city" = Option<String>, Query, description = "Filter by city"),
        ("min_price" = Option<i64>, Query, description = "Minimum daily price"),
        ("max_price" = Option<i64>, Query, description = "Maximum daily price"),
        ("sort_by" = Option<String>, Query, description = "created_at, price, title"),
        ("sort_order" = Option<String>, Query, description = "asc, desc")
    ),
    responses(
        (status = 200, description = "List ad spaces", body = ApiResponse<SpaceList>)
    ),
    tag = "Spaces"
)]
pub async fn list_spaces(
    State(state): State<AppState>,
    Query(query): Query<SpaceQuery>,
) -> AppResult<Json<ApiResponse<SpaceList>>> {
    let resp = space_service::list_spaces(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/spaces/{slug}",
    params(
        ("slug" = String, Path, description = "Space slug")
    ),
    responses(
        (status = 200, description = "Space detail with owner, blocked dates and reviews", body = ApiResponse<SpaceDetail>),
        (status = 404, description = "Space not found"),
    ),
    tag = "Spaces"
)]
pub async fn get_space(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<ApiResponse<SpaceDetail>>> {
    let resp = space_service::get_space_by_slug(&state, &slug).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/spaces",
    request_body = CreateSpaceRequest,
    responses(
        (status = 201, description = "List a new space", body = ApiResponse<AdSpace>),
        (status = 400, description = "Missing required fields"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Spaces"
)]
pub async fn create_space(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateSpaceRequest>,
) -> AppResult<Json<ApiResponse<AdSpace>>> {
    let resp = space_service::create_space(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/spaces/{id}",
    params(
        ("id" = Uuid, Path, description = "Space ID")
    ),
    request_body = UpdateSpaceRequest,
    responses(
        (status = 200, description = "Patch title, daily price or address", body = ApiResponse<AdSpace>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Space not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Spaces"
)]
pub async fn update_space(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSpaceRequest>,
) -> AppResult<Json<ApiResponse<AdSpace>>> {
    let resp = space_service::update_space(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/spaces/{id}/availability",
    params(
        ("id" = Uuid, Path, description = "Space ID")
    ),
    request_body = ToggleAvailabilityRequest,
    responses(
        (status = 200, description = "Toggle one blocked date", body = ApiResponse<AvailabilityResponse>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Space not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Spaces"
)]
pub async fn toggle_availability(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ToggleAvailabilityRequest>,
) -> AppResult<Json<ApiResponse<AvailabilityResponse>>> {
    let resp = space_service::toggle_availability(&state, &user, id, payload).await?;
    Ok(Json(resp))
}
