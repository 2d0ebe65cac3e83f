use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::SpaceSummary;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    pub space_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartLine {
    pub id: Uuid,
    pub space: SpaceSummary,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: i64,
    pub line_total: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartSummary {
    pub subtotal: i64,
    pub gst: i64,
    pub total: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartList {
    pub items: Vec<CartLine>,
    pub summary: CartSummary,
}
