use uuid::Uuid;

use crate::dto::favorites::{AddFavoriteRequest, FavoriteSpaceList};
use crate::{
    audit::log_audit,
    db::DbPool,
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Favorite, SpaceSummary},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
};

pub async fn list_favorites(
    db: &DbPool,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<FavoriteSpaceList>> {
    let (page, limit, offset) = pagination.normalize();
    let spaces = sqlx::query_as::<_, SpaceSummary>(
        r#"
        SELECT s.id, s.title, s.slug, s.space_type, s.city, s.address,
               s.price_per_day, s.image_url
        FROM favorites f
        JOIN ad_spaces s ON s.id = f.space_id
        WHERE f.user_id = $1
        ORDER BY f.created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(user.user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;

    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM favorites WHERE user_id = $1")
        .bind(user.user_id)
        .fetch_one(db)
        .await?;

    let meta = Meta::new(page, limit, total.0);
    let data = FavoriteSpaceList { items: spaces };
    Ok(ApiResponse::success("OK", data, Some(meta)))
}

pub async fn add_favorite(
    pool: &DbPool,
    user: &AuthUser,
    payload: AddFavoriteRequest,
) -> AppResult<ApiResponse<Favorite>> {
    let space_exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM ad_spaces WHERE id = $1")
        .bind(payload.space_id)
        .fetch_optional(pool)
        .await?;

    if space_exists.is_none() {
        return Err(AppError::BadRequest("Space not found".into()));
    }

    let existing: Option<Favorite> =
        sqlx::query_as("SELECT * FROM favorites WHERE user_id = $1 AND space_id = $2")
            .bind(user.user_id)
            .bind(payload.space_id)
            .fetch_optional(pool)
            .await?;

    let favorite = if let Some(fav) = existing {
        fav
    } else {
        sqlx::query_as::<_, Favorite>(
            r#"
            INSERT INTO favorites (user_id, space_id)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(user.user_id)
        .bind(payload.space_id)
        .fetch_one(pool)
        .await?
    };

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "favorite_add",
        Some("favorites"),
        Some(serde_json::json!({ "space_id": payload.space_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Added to wishlist",
        favorite,
        Some(Meta::empty()),
    ))
}

pub async fn remove_favorite(
    pool: &DbPool,
    user: &AuthUser,
    space_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND space_id = $2")
        .bind(user.user_id)
        .bind(space_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "favorite_remove",
        Some("favorites"),
        Some(serde_json::json!({ "space_id": space_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Removed from wishlist",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
