use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Booking, SpaceSummary};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    pub contact_name: String,
    pub contact_phone: String,
    pub contact_address: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BookingAction {
    Confirm,
    Reject,
    Cancel,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ManageBookingRequest {
    pub action: BookingAction,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookingList {
    pub items: Vec<Booking>,
}

/// Booking plus the space card it reserves, for advertiser and agency listings.
#[derive(Debug, Serialize, ToSchema)]
pub struct BookingWithSpace {
    pub booking: Booking,
    pub space: SpaceSummary,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookingWithSpaceList {
    pub items: Vec<BookingWithSpace>,
}
