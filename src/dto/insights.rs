use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::SpaceSummary;

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct TrendingLocations {
    #[schema(value_type = Vec<String>)]
    pub locations: Vec<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RecommendationRequest {
    /// Daily budget in whole rupees.
    pub budget: i64,
    /// Target demographic tags, e.g. "students", "professionals".
    #[serde(default)]
    pub audience: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ScoredSpace {
    pub space: SpaceSummary,
    pub score: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RecommendationList {
    pub items: Vec<ScoredSpace>,
}
