pub mod admin;
pub mod auth;
pub mod bookings;
pub mod cart;
pub mod favorites;
pub mod insights;
pub mod spaces;
