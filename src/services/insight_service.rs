use std::collections::HashMap;

use sea_orm::{EntityTrait, QueryOrder, QuerySelect};

use crate::dto::insights::{RecommendationList, RecommendationRequest, ScoredSpace, TrendingLocations};
use crate::{
    entity::ad_spaces::{Column, Entity as AdSpaces, Model as SpaceModel},
    error::AppResult,
    models::SpaceSummary,
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Fallback entries shown while the marketplace is still thin.
const SEED_LOCATIONS: [&str; 9] = [
    "Kochi, Edappally",
    "Kochi, MG Road",
    "Kochi, Vyttila",
    "Calicut, Mavoor Road",
    "Calicut, Beach Road",
    "Trivandrum, Technopark",
    "Trivandrum, MG Road",
    "Bangalore, Koramangala",
    "Mumbai, Bandra",
];

const TRENDING_LIMIT: usize = 10;
const RECOMMENDATION_LIMIT: usize = 3;

/// Most-listed locations, recomputed on every call. Observed locations rank
/// by frequency; the seed list pads the tail.
pub async fn trending_locations(state: &AppState) -> AppResult<ApiResponse<TrendingLocations>> {
    let rows: Vec<(String, Option<String>)> = AdSpaces::find()
        .select_only()
        .column(Column::City)
        .column(Column::Address)
        .into_tuple()
        .all(&state.orm)
        .await?;

    let locations = rank_locations(rows);
    Ok(ApiResponse::success(
        "Trending locations",
        TrendingLocations { locations },
        None,
    ))
}

/// The campaign wizard: every listed space scored against the stated budget
/// and audience, top three returned.
pub async fn recommend_spaces(
    state: &AppState,
    payload: RecommendationRequest,
) -> AppResult<ApiResponse<RecommendationList>> {
    let spaces = AdSpaces::find()
        .order_by_asc(Column::CreatedAt)
        .all(&state.orm)
        .await?;

    let items = pick_recommendations(spaces, payload.budget, &payload.audience);
    Ok(ApiResponse::success(
        "Recommendations",
        RecommendationList { items },
        Some(Meta::empty()),
    ))
}

fn rank_locations(rows: Vec<(String, Option<String>)>) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for (city, address) in rows {
        // City wins over the street-level address when both are present.
        let loc = if !city.trim().is_empty() {
            city.trim().to_string()
        } else {
            match address {
                Some(a) if !a.trim().is_empty() => a.trim().to_string(),
                _ => continue,
            }
        };
        *counts.entry(loc).or_insert(0) += 1;
    }

    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let mut locations: Vec<String> = Vec::with_capacity(TRENDING_LIMIT);
    for loc in ranked
        .into_iter()
        .map(|(loc, _)| loc)
        .chain(SEED_LOCATIONS.iter().map(|s| s.to_string()))
    {
        if !locations.contains(&loc) {
            locations.push(loc);
        }
        if locations.len() == TRENDING_LIMIT {
            break;
        }
    }
    locations
}

fn pick_recommendations(
    spaces: Vec<SpaceModel>,
    budget: i64,
    audience: &[String],
) -> Vec<ScoredSpace> {
    let mut scored: Vec<ScoredSpace> = spaces
        .into_iter()
        .map(|model| {
            let demographics =
                serde_json::from_value::<Vec<String>>(model.demographics.clone()).unwrap_or_default();
            let score = score_space(model.price_per_day, &demographics, budget, audience);
            ScoredSpace {
                space: SpaceSummary {
                    id: model.id,
                    title: model.title,
                    slug: model.slug,
                    space_type: model.space_type,
                    city: model.city,
                    address: model.address,
                    price_per_day: model.price_per_day,
                    image_url: model.image_url,
                },
                score,
            }
        })
        .collect();

    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored.truncate(RECOMMENDATION_LIMIT);
    scored
}

fn score_space(price_per_day: i64, demographics: &[String], budget: i64, audience: &[String]) -> i32 {
    let mut score = 0;
    if price_per_day <= budget {
        score += 5;
    }
    let matches = demographics
        .iter()
        .filter(|d| audience.contains(d))
        .count() as i32;
    score += matches * 3;
    if matches == 0 && !audience.is_empty() {
        score -= 2;
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn within_budget_outranks_over_budget_at_equal_overlap() {
        let audience = tags(&["students", "professionals"]);
        let affordable = score_space(40_000, &tags(&["students"]), 50_000, &audience);
        let expensive = score_space(90_000, &tags(&["students"]), 50_000, &audience);
        assert!(affordable > expensive);
    }

    #[test]
    fn each_audience_match_adds_three() {
        let audience = tags(&["students", "professionals", "tourists"]);
        let one = score_space(10_000, &tags(&["students"]), 50_000, &audience);
        let two = score_space(10_000, &tags(&["students", "tourists"]), 50_000, &audience);
        assert_eq!(two - one, 3);
    }

    #[test]
    fn stated_audience_with_no_overlap_is_penalized() {
        let audience = tags(&["gen_z"]);
        let missed = score_space(10_000, &tags(&["families"]), 50_000, &audience);
        let neutral = score_space(10_000, &[], 50_000, &[]);
        assert_eq!(missed, neutral - 2);
    }

    #[test]
    fn observed_locations_rank_by_frequency_ahead_of_seeds() {
        let rows = vec![
            ("Kottayam".to_string(), None),
            ("Thrissur".to_string(), None),
            ("Thrissur".to_string(), None),
            ("Thrissur".to_string(), None),
            ("Kottayam".to_string(), None),
        ];
        let ranked = rank_locations(rows);
        assert_eq!(ranked[0], "Thrissur");
        assert_eq!(ranked[1], "Kottayam");
        assert_eq!(ranked.len(), TRENDING_LIMIT);
        // Everything after the observed data comes from the seed list.
        assert!(ranked[2..].iter().all(|l| SEED_LOCATIONS.contains(&l.as_str())));
    }

    #[test]
    fn empty_city_falls_back_to_address_and_dedupes_against_seeds() {
        let rows = vec![
            ("".to_string(), Some("Mumbai, Bandra".to_string())),
            ("".to_string(), Some("Mumbai, Bandra".to_string())),
            ("".to_string(), None),
        ];
        let ranked = rank_locations(rows);
        assert_eq!(ranked[0], "Mumbai, Bandra");
        assert_eq!(
            ranked.iter().filter(|l| l.as_str() == "Mumbai, Bandra").count(),
            1
        );
        assert!(ranked.len() <= TRENDING_LIMIT);
    }
}
