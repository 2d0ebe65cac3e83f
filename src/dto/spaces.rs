use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{AdSpace, Review};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSpaceRequest {
    pub title: String,
    pub space_type: String,
    pub price_per_day: i64,
    pub city: String,
    pub district: Option<String>,
    pub address: Option<String>,
    pub dimensions: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub demographics: Option<Vec<String>>,
    /// Required when an admin lists on behalf of an agency; ignored for agency callers.
    pub owner_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateSpaceRequest {
    pub title: Option<String>,
    pub price_per_day: Option<i64>,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ToggleAvailabilityRequest {
    pub date: NaiveDate,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AvailabilityResponse {
    pub space_id: Uuid,
    pub blocked_dates: Vec<NaiveDate>,
}

#[derive(Serialize, ToSchema)]
pub struct SpaceList {
    pub items: Vec<AdSpace>,
}

/// Owner contact block shown on the public detail page.
#[derive(Debug, Serialize, ToSchema)]
pub struct SpaceOwner {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company_name: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct SpaceDetail {
    pub space: AdSpace,
    pub owner: Option<SpaceOwner>,
    pub blocked_dates: Vec<NaiveDate>,
    pub reviews: Vec<Review>,
}
