use chrono::Utc;
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait,
};
use uuid::Uuid;

use crate::dto::admin::{
    CreateAgencyRequest, DeleteSpaceResponse, UpdateCredentialsRequest, UserList,
};
use crate::dto::bookings::{BookingWithSpace, BookingWithSpaceList};
use crate::services::auth_service::hash_password;
use crate::services::booking_service::booking_from_entity;
use crate::{
    audit::log_audit,
    entity::{
        ad_spaces::Entity as AdSpaces,
        blocked_dates::{Column as BlockedCol, Entity as BlockedDates},
        bookings::{Column as BookingCol, Entity as Bookings},
        cart_items::{Column as CartCol, Entity as CartItems},
        favorites::{Column as FavCol, Entity as Favorites},
        reviews::{Column as ReviewCol, Entity as Reviews},
        users::{Column as UserCol, Entity as Users, Model as UserModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{SpaceSummary, User},
    response::{ApiResponse, Meta},
    routes::params::{BookingListQuery, Pagination, SortOrder},
    state::AppState,
};

pub async fn list_users(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<UserList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = pagination.normalize();

    let finder = Users::find().order_by_desc(UserCol::CreatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(user_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Users", UserList { items }, Some(meta)))
}

/// Provision an agency login. The username check is case-insensitive, the
/// unique index backstops the check-then-insert window.
pub async fn create_agency(
    state: &AppState,
    user: &AuthUser,
    payload: CreateAgencyRequest,
) -> AppResult<ApiResponse<User>> {
    ensure_admin(user)?;

    let CreateAgencyRequest {
        username,
        password,
        company_name,
        email,
    } = payload;
    let username = username.trim().to_string();

    if username.is_empty() || password.is_empty() || company_name.trim().is_empty() {
        return Err(AppError::BadRequest("Missing fields".to_string()));
    }

    let taken: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM users WHERE LOWER(username) = LOWER($1)")
            .bind(username.as_str())
            .fetch_one(&state.pool)
            .await?;
    if taken.0 > 0 {
        return Err(AppError::BadRequest("Username already taken".to_string()));
    }

    let email = email
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| format!("{}@adplaze.agency", username.to_lowercase()));
    let password_hash = hash_password(&password)?;
    let id = Uuid::new_v4();

    let agency: User = sqlx::query_as(
        r#"
        INSERT INTO users (id, name, email, password_hash, role, username, company_name)
        VALUES ($1, $2, $3, $4, 'agency', $5, $6)
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(company_name.trim())
    .bind(email)
    .bind(password_hash)
    .bind(username.as_str())
    .bind(company_name.trim())
    .fetch_one(&state.pool)
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "agency_create",
        Some("users"),
        Some(serde_json::json!({ "agency_id": agency.id, "username": username })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        format!("Agency {} created", agency.name),
        agency,
        Some(Meta::empty()),
    ))
}

pub async fn update_agency_credentials(
    state: &AppState,
    user: &AuthUser,
    agency_id: Uuid,
    payload: UpdateCredentialsRequest,
) -> AppResult<ApiResponse<User>> {
    ensure_admin(user)?;

    let UpdateCredentialsRequest { username, password } = payload;
    let username = username.trim().to_string();
    if username.is_empty() || password.is_empty() {
        return Err(AppError::BadRequest("Missing fields".to_string()));
    }

    let existing: Option<User> =
        sqlx::query_as("SELECT * FROM users WHERE id = $1 AND role = 'agency'")
            .bind(agency_id)
            .fetch_optional(&state.pool)
            .await?;
    if existing.is_none() {
        return Err(AppError::NotFound);
    }

    let taken: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM users WHERE LOWER(username) = LOWER($1) AND id != $2",
    )
    .bind(username.as_str())
    .bind(agency_id)
    .fetch_one(&state.pool)
    .await?;
    if taken.0 > 0 {
        return Err(AppError::BadRequest("Username already taken".to_string()));
    }

    let password_hash = hash_password(&password)?;
    let updated: User = sqlx::query_as(
        r#"
        UPDATE users
        SET username = $2, password_hash = $3
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(agency_id)
    .bind(username.as_str())
    .bind(password_hash)
    .fetch_one(&state.pool)
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "agency_credentials_update",
        Some("users"),
        Some(serde_json::json!({ "agency_id": agency_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Credentials updated",
        updated,
        Some(Meta::empty()),
    ))
}

pub async fn list_all_bookings(
    state: &AppState,
    user: &AuthUser,
    query: BookingListQuery,
) -> AppResult<ApiResponse<BookingWithSpaceList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination.normalize();

    let mut condition = Condition::all();
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(BookingCol::Status.eq(status.clone()));
    }

    let total = Bookings::find()
        .filter(condition.clone())
        .count(&state.orm)
        .await? as i64;

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let mut finder = Bookings::find().find_also_related(AdSpaces).filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(BookingCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(BookingCol::CreatedAt),
    };

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .filter_map(|(booking, space)| {
            space.map(|s| BookingWithSpace {
                booking: booking_from_entity(booking),
                space: SpaceSummary {
                    id: s.id,
                    title: s.title,
                    slug: s.slug,
                    space_type: s.space_type,
                    city: s.city,
                    address: s.address,
                    price_per_day: s.price_per_day,
                    image_url: s.image_url,
                },
            })
        })
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Bookings",
        BookingWithSpaceList { items },
        Some(meta),
    ))
}

/// Remove a space and everything that references it, as one transaction.
/// A space with no bookings deletes cleanly; interleaved rows created after
/// the transaction snapshot are caught by the foreign keys.
pub async fn delete_space(
    state: &AppState,
    user: &AuthUser,
    space_id: Uuid,
) -> AppResult<ApiResponse<DeleteSpaceResponse>> {
    ensure_admin(user)?;

    let txn = state.orm.begin().await?;

    let space = AdSpaces::find_by_id(space_id).one(&txn).await?;
    if space.is_none() {
        return Err(AppError::NotFound);
    }

    let bookings_removed = Bookings::delete_many()
        .filter(BookingCol::SpaceId.eq(space_id))
        .exec(&txn)
        .await?
        .rows_affected;

    BlockedDates::delete_many()
        .filter(BlockedCol::SpaceId.eq(space_id))
        .exec(&txn)
        .await?;

    CartItems::delete_many()
        .filter(CartCol::SpaceId.eq(space_id))
        .exec(&txn)
        .await?;

    Favorites::delete_many()
        .filter(FavCol::SpaceId.eq(space_id))
        .exec(&txn)
        .await?;

    Reviews::delete_many()
        .filter(ReviewCol::SpaceId.eq(space_id))
        .exec(&txn)
        .await?;

    AdSpaces::delete_by_id(space_id).exec(&txn).await?;

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "space_delete",
        Some("ad_spaces"),
        Some(serde_json::json!({
            "space_id": space_id,
            "bookings_removed": bookings_removed,
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Space deleted",
        DeleteSpaceResponse { bookings_removed },
        Some(Meta::empty()),
    ))
}

fn user_from_entity(model: UserModel) -> User {
    User {
        id: model.id,
        name: model.name,
        email: model.email,
        phone: model.phone,
        image_url: model.image_url,
        password_hash: model.password_hash,
        role: model.role,
        username: model.username,
        company_name: model.company_name,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
