use axum::Router;

use crate::state::AppState;

pub mod admin;
pub mod auth;
pub mod bookings;
pub mod cart;
pub mod doc;
pub mod favorites;
pub mod health;
pub mod insights;
pub mod params;
pub mod spaces;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/spaces", spaces::router())
        .nest("/cart", cart::router())
        .nest("/bookings", bookings::router())
        .nest("/favorites", favorites::router())
        .nest("/insights", insights::router())
        .nest("/admin", admin::router())
}
