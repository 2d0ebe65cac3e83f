pub mod ad_spaces;
pub mod audit_logs;
pub mod blocked_dates;
pub mod bookings;
pub mod cart_items;
pub mod favorites;
pub mod reviews;
pub mod users;

pub use ad_spaces::Entity as AdSpaces;
pub use audit_logs::Entity as AuditLogs;
pub use blocked_dates::Entity as BlockedDates;
pub use bookings::Entity as Bookings;
pub use cart_items::Entity as CartItems;
pub use favorites::Entity as Favorites;
pub use reviews::Entity as Reviews;
pub use users::Entity as Users;
