use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, patch, post},
};
use uuid::Uuid;

use crate::{
    dto::admin::{CreateAgencyRequest, DeleteSpaceResponse, UpdateCredentialsRequest, UserList},
    dto::bookings::BookingWithSpaceList,
    error::AppResult,
    middleware::auth::AuthUser,
    models::User,
    response::ApiResponse,
    routes::params::{BookingListQuery, Pagination},
    services::admin_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/agencies", post(create_agency))
        .route("/agencies/{id}/credentials", patch(update_credentials))
        .route("/bookings", get(list_all_bookings))
        .route("/spaces/{id}", delete(delete_space))
}

#[utoipa::path(
    get,
    path = "/api/admin/users",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "All users (admin only)", body = ApiResponse<UserList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_users(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<UserList>>> {
    let resp = admin_service::list_users(&state, &user, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/agencies",
    request_body = CreateAgencyRequest,
    responses(
        (status = 200, description = "Create an agency login", body = ApiResponse<User>),
        (status = 400, description = "Missing fields or username taken"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_agency(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateAgencyRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = admin_service::create_agency(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/admin/agencies/{id}/credentials",
    params(
        ("id" = Uuid, Path, description = "Agency user ID")
    ),
    request_body = UpdateCredentialsRequest,
    responses(
        (status = 200, description = "Rotate agency credentials", body = ApiResponse<User>),
        (status = 400, description = "Missing fields or username taken"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_credentials(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCredentialsRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = admin_service::update_agency_credentials(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/bookings",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("sort_order" = Option<String>, Query, description = "asc, desc")
    ),
    responses(
        (status = 200, description = "All bookings (admin only)", body = ApiResponse<BookingWithSpaceList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_all_bookings(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<BookingListQuery>,
) -> AppResult<Json<ApiResponse<BookingWithSpaceList>>> {
    let resp = admin_service::list_all_bookings(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/spaces/{id}",
    params(
        ("id" = Uuid, Path, description = "Space ID")
    ),
    responses(
        (status = 200, description = "Delete a space and everything referencing it", body = ApiResponse<DeleteSpaceResponse>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_space(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<DeleteSpaceResponse>>> {
    let resp = admin_service::delete_space(&state, &user, id).await?;
    Ok(Json(resp))
}
