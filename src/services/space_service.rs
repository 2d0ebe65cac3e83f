use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::OnConflict;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::dto::spaces::{
    AvailabilityResponse, CreateSpaceRequest, SpaceDetail, SpaceList, SpaceOwner,
    ToggleAvailabilityRequest, UpdateSpaceRequest,
};
use crate::{
    audit::log_audit,
    entity::{
        ad_spaces::{ActiveModel, Column, Entity as AdSpaces, Model as SpaceModel},
        blocked_dates::{
            ActiveModel as BlockedDateActive, Column as BlockedCol, Entity as BlockedDates,
        },
        reviews::{Column as ReviewCol, Entity as Reviews},
        users::Entity as Users,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_agency_or_admin},
    models::{AdSpace, Review},
    response::{ApiResponse, Meta},
    routes::params::{SortOrder, SpaceQuery, SpaceSortBy},
    state::AppState,
};

const SPACE_TYPES: [&str; 4] = ["billboard", "digital_screen", "transit", "other"];
const DEFAULT_DESCRIPTION: &str = "Newly listed space. Description and images to follow.";

pub async fn list_spaces(state: &AppState, query: SpaceQuery) -> AppResult<ApiResponse<SpaceList>> {
    let (page, limit, offset) = query.pagination.normalize();
    let mut condition = Condition::all();

    if let Some(search) = query.q.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(Column::Title).ilike(pattern.clone()))
                .add(Expr::col(Column::Description).ilike(pattern)),
        );
    }

    if let Some(space_type) = query.space_type.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(Column::SpaceType.eq(space_type.clone()));
    }

    if let Some(city) = query.city.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(Expr::col(Column::City).ilike(format!("%{}%", city)));
    }

    if let Some(min_price) = query.min_price {
        condition = condition.add(Column::PricePerDay.gte(min_price));
    }

    if let Some(max_price) = query.max_price {
        condition = condition.add(Column::PricePerDay.lte(max_price));
    }

    let sort_by = query.sort_by.unwrap_or(SpaceSortBy::CreatedAt);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let sort_col = match sort_by {
        SpaceSortBy::CreatedAt => Column::CreatedAt,
        SpaceSortBy::Price => Column::PricePerDay,
        SpaceSortBy::Title => Column::Title,
    };

    let mut finder = AdSpaces::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(space_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    let data = SpaceList { items };
    Ok(ApiResponse::success("Spaces", data, Some(meta)))
}

pub async fn get_space_by_slug(state: &AppState, slug: &str) -> AppResult<ApiResponse<SpaceDetail>> {
    let space = AdSpaces::find()
        .filter(Column::Slug.eq(slug))
        .one(&state.orm)
        .await?;
    let space = match space {
        Some(s) => s,
        None => return Err(AppError::NotFound),
    };

    let owner = match space.owner_id {
        Some(owner_id) => Users::find_by_id(owner_id)
            .one(&state.orm)
            .await?
            .map(|u| SpaceOwner {
                name: u.name,
                email: u.email,
                phone: u.phone,
                company_name: u.company_name,
            }),
        None => None,
    };

    let blocked_dates = fetch_blocked_dates(state, space.id).await?;

    let reviews = Reviews::find()
        .filter(ReviewCol::SpaceId.eq(space.id))
        .order_by_desc(ReviewCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(review_from_entity)
        .collect();

    let detail = SpaceDetail {
        space: space_from_entity(space),
        owner,
        blocked_dates,
        reviews,
    };
    Ok(ApiResponse::success("Space", detail, None))
}

pub async fn create_space(
    state: &AppState,
    user: &AuthUser,
    payload: CreateSpaceRequest,
) -> AppResult<ApiResponse<AdSpace>> {
    ensure_agency_or_admin(user)?;

    if payload.title.trim().is_empty() || payload.price_per_day <= 0 || payload.city.trim().is_empty()
    {
        return Err(AppError::BadRequest("Missing required fields".to_string()));
    }

    if !SPACE_TYPES.contains(&payload.space_type.as_str()) {
        return Err(AppError::BadRequest(format!(
            "Unknown space type {}",
            payload.space_type
        )));
    }

    // Agencies list under themselves; the admin lists on behalf of an owner.
    let owner_id = if user.role == "admin" {
        match payload.owner_id {
            Some(owner_id) => owner_id,
            None => return Err(AppError::BadRequest("Missing owner".to_string())),
        }
    } else {
        user.user_id
    };

    if Users::find_by_id(owner_id).one(&state.orm).await?.is_none() {
        return Err(AppError::BadRequest("Owner not found".to_string()));
    }

    let id = Uuid::new_v4();
    let slug = derive_slug(&payload.title);
    let description = payload
        .description
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string());
    let demographics = payload.demographics.unwrap_or_default();

    let active = ActiveModel {
        id: Set(id),
        title: Set(payload.title.trim().to_string()),
        slug: Set(slug),
        space_type: Set(payload.space_type),
        description: Set(Some(description)),
        city: Set(payload.city),
        district: Set(payload.district),
        address: Set(payload.address),
        dimensions: Set(payload.dimensions),
        price_per_day: Set(payload.price_per_day),
        image_url: Set(payload.image_url),
        demographics: Set(serde_json::json!(demographics)),
        owner_id: Set(Some(owner_id)),
        created_at: NotSet,
    };
    let space = active.insert(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "space_create",
        Some("ad_spaces"),
        Some(serde_json::json!({ "space_id": space.id, "owner_id": owner_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Space listed",
        space_from_entity(space),
        Some(Meta::empty()),
    ))
}

/// Patches title, daily price and address only; everything else stays put.
pub async fn update_space(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateSpaceRequest,
) -> AppResult<ApiResponse<AdSpace>> {
    let existing = AdSpaces::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(s) => s,
        None => return Err(AppError::NotFound),
    };
    ensure_space_access(user, &existing)?;

    let mut active: ActiveModel = existing.into();
    if let Some(title) = payload.title {
        active.title = Set(title);
    }
    if let Some(price_per_day) = payload.price_per_day {
        if price_per_day <= 0 {
            return Err(AppError::BadRequest("Invalid price".to_string()));
        }
        active.price_per_day = Set(price_per_day);
    }
    if let Some(address) = payload.address {
        active.address = Set(Some(address));
    }

    let space = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "space_update",
        Some("ad_spaces"),
        Some(serde_json::json!({ "space_id": space.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Space updated",
        space_from_entity(space),
        Some(Meta::empty()),
    ))
}

/// Agency self-service: flip a single calendar day between blocked and free.
/// The day is its own keyed row, so two agents toggling different days never
/// clobber each other's changes.
pub async fn toggle_availability(
    state: &AppState,
    user: &AuthUser,
    space_id: Uuid,
    payload: ToggleAvailabilityRequest,
) -> AppResult<ApiResponse<AvailabilityResponse>> {
    let space = AdSpaces::find_by_id(space_id).one(&state.orm).await?;
    let space = match space {
        Some(s) => s,
        None => return Err(AppError::NotFound),
    };
    ensure_space_access(user, &space)?;

    let existing = BlockedDates::find()
        .filter(
            Condition::all()
                .add(BlockedCol::SpaceId.eq(space_id))
                .add(BlockedCol::Day.eq(payload.date)),
        )
        .one(&state.orm)
        .await?;

    let action = match existing {
        Some(row) => {
            BlockedDates::delete_by_id(row.id).exec(&state.orm).await?;
            "availability_unblock"
        }
        None => {
            let active = BlockedDateActive {
                id: Set(Uuid::new_v4()),
                space_id: Set(space_id),
                day: Set(payload.date),
                created_at: NotSet,
            };
            BlockedDates::insert(active)
                .on_conflict(
                    OnConflict::columns([BlockedCol::SpaceId, BlockedCol::Day])
                        .do_nothing()
                        .to_owned(),
                )
                .exec_without_returning(&state.orm)
                .await?;
            "availability_block"
        }
    };

    let blocked_dates = fetch_blocked_dates(state, space_id).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        action,
        Some("blocked_dates"),
        Some(serde_json::json!({ "space_id": space_id, "date": payload.date })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Availability updated",
        AvailabilityResponse {
            space_id,
            blocked_dates,
        },
        Some(Meta::empty()),
    ))
}

async fn fetch_blocked_dates(state: &AppState, space_id: Uuid) -> AppResult<Vec<chrono::NaiveDate>> {
    let days = BlockedDates::find()
        .filter(BlockedCol::SpaceId.eq(space_id))
        .order_by_asc(BlockedCol::Day)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|row| row.day)
        .collect();
    Ok(days)
}

fn ensure_space_access(user: &AuthUser, space: &SpaceModel) -> Result<(), AppError> {
    if user.role == "admin" {
        return Ok(());
    }
    if space.owner_id == Some(user.user_id) {
        return Ok(());
    }
    Err(AppError::Forbidden)
}

fn derive_slug(title: &str) -> String {
    let base: String = title
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    let mut slug = String::with_capacity(base.len());
    for part in base.split('-').filter(|p| !p.is_empty()) {
        if !slug.is_empty() {
            slug.push('-');
        }
        slug.push_str(part);
    }
    slug.truncate(90);
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}", slug, &suffix[..4])
}

pub(crate) fn space_from_entity(model: SpaceModel) -> AdSpace {
    let demographics =
        serde_json::from_value::<Vec<String>>(model.demographics).unwrap_or_default();
    AdSpace {
        id: model.id,
        title: model.title,
        slug: model.slug,
        space_type: model.space_type,
        description: model.description,
        city: model.city,
        district: model.district,
        address: model.address,
        dimensions: model.dimensions,
        price_per_day: model.price_per_day,
        image_url: model.image_url,
        demographics,
        owner_id: model.owner_id,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn review_from_entity(model: crate::entity::reviews::Model) -> Review {
    Review {
        id: model.id,
        space_id: model.space_id,
        user_id: model.user_id,
        rating: model.rating,
        comment: model.comment,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::derive_slug;

    #[test]
    fn slug_lowercases_and_dashes_title() {
        let slug = derive_slug("MG Road Gateway Billboard");
        assert!(slug.starts_with("mg-road-gateway-billboard-"));
    }

    #[test]
    fn slug_collapses_punctuation_runs() {
        let slug = derive_slug("Vyttila  Hub -- Facing North!");
        assert!(slug.starts_with("vyttila-hub-facing-north-"));
    }

    #[test]
    fn slugs_for_the_same_title_differ_by_suffix() {
        let a = derive_slug("Edappally Arch");
        let b = derive_slug("Edappally Arch");
        assert_ne!(a, b);
    }
}
