pub mod admin_service;
pub mod auth_service;
pub mod booking_service;
pub mod cart_service;
pub mod favorite_service;
pub mod insight_service;
pub mod space_service;
