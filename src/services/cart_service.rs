use chrono::NaiveDate;
use sqlx::FromRow;
use uuid::Uuid;

use crate::dto::cart::{AddToCartRequest, CartLine, CartList, CartSummary};
use crate::{
    audit::log_audit,
    dates::day_count,
    db::DbPool,
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{CartItem, SpaceSummary},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
};

/// GST applied to the cart total at checkout display time. Bookings store the
/// pre-tax line total.
const GST_RATE_PERCENT: i64 = 18;

#[derive(FromRow)]
struct CartSpaceRow {
    cart_id: Uuid,
    start_date: NaiveDate,
    end_date: NaiveDate,
    space_id: Uuid,
    title: String,
    slug: String,
    space_type: String,
    city: String,
    address: Option<String>,
    price_per_day: i64,
    image_url: Option<String>,
}

pub async fn list_cart(
    pool: &DbPool,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<CartList>> {
    let (page, limit, offset) = pagination.normalize();
    let rows = sqlx::query_as::<_, CartSpaceRow>(
        r#"
        SELECT ci.id AS cart_id, ci.start_date, ci.end_date,
               s.id AS space_id, s.title, s.slug, s.space_type, s.city, s.address,
               s.price_per_day, s.image_url
        FROM cart_items ci
        JOIN ad_spaces s ON s.id = ci.space_id
        WHERE ci.user_id = $1
        ORDER BY ci.created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(user.user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM cart_items WHERE user_id = $1")
        .bind(user.user_id)
        .fetch_one(pool)
        .await?;

    // Summary spans the whole cart, not just the page being shown.
    let subtotal: (Option<i64>,) = sqlx::query_as(
        r#"
        SELECT SUM(s.price_per_day * (ci.end_date - ci.start_date + 1))::BIGINT
        FROM cart_items ci
        JOIN ad_spaces s ON s.id = ci.space_id
        WHERE ci.user_id = $1
        "#,
    )
    .bind(user.user_id)
    .fetch_one(pool)
    .await?;

    let items = rows
        .into_iter()
        .map(|row| {
            let days = day_count(row.start_date, row.end_date);
            CartLine {
                id: row.cart_id,
                space: SpaceSummary {
                    id: row.space_id,
                    title: row.title,
                    slug: row.slug,
                    space_type: row.space_type,
                    city: row.city,
                    address: row.address,
                    price_per_day: row.price_per_day,
                    image_url: row.image_url,
                },
                start_date: row.start_date,
                end_date: row.end_date,
                days,
                line_total: row.price_per_day * days,
            }
        })
        .collect();

    let summary = compute_summary(subtotal.0.unwrap_or(0));
    let meta = Meta::new(page, limit, total.0);
    Ok(ApiResponse::success(
        "OK",
        CartList { items, summary },
        Some(meta),
    ))
}

pub async fn add_to_cart(
    pool: &DbPool,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartItem>> {
    if payload.end_date < payload.start_date {
        return Err(AppError::BadRequest(
            "end_date must not precede start_date".to_string(),
        ));
    }

    let space_exist: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM ad_spaces WHERE id = $1")
        .bind(payload.space_id)
        .fetch_optional(pool)
        .await?;
    if space_exist.is_none() {
        return Err(AppError::BadRequest("space not found".to_string()));
    }

    let exist: Option<CartItem> =
        sqlx::query_as("SELECT * FROM cart_items WHERE user_id = $1 AND space_id = $2")
            .bind(user.user_id)
            .bind(payload.space_id)
            .fetch_optional(pool)
            .await?;

    // One line per space: re-adding replaces the date range.
    let cart_item = if let Some(item) = exist {
        sqlx::query_as::<_, CartItem>(
            r#"
            UPDATE cart_items
            SET start_date = $3, end_date = $4
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(item.id)
        .bind(user.user_id)
        .bind(payload.start_date)
        .bind(payload.end_date)
        .fetch_one(pool)
        .await?
    } else {
        sqlx::query_as(
            "INSERT INTO cart_items (user_id, space_id, start_date, end_date) VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(user.user_id)
        .bind(payload.space_id)
        .bind(payload.start_date)
        .bind(payload.end_date)
        .fetch_one(pool)
        .await?
    };

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "cart_update",
        Some("cart_items"),
        Some(serde_json::json!({
            "space_id": payload.space_id,
            "start_date": payload.start_date,
            "end_date": payload.end_date,
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("OK", cart_item, None))
}

pub async fn remove_from_cart(
    pool: &DbPool,
    user: &AuthUser,
    space_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = sqlx::query("DELETE FROM cart_items WHERE space_id = $1 AND user_id = $2")
        .bind(space_id)
        .bind(user.user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "cart_remove",
        Some("cart_items"),
        Some(serde_json::json!({ "space_id": space_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Removed from cart",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

fn compute_summary(subtotal: i64) -> CartSummary {
    let gst = subtotal * GST_RATE_PERCENT / 100;
    CartSummary {
        subtotal,
        gst,
        total: subtotal + gst,
    }
}

#[cfg(test)]
mod tests {
    use super::compute_summary;

    #[test]
    fn summary_applies_the_gst_rate() {
        let summary = compute_summary(10_000);
        assert_eq!(summary.gst, 1_800);
        assert_eq!(summary.total, 11_800);
    }

    #[test]
    fn empty_cart_sums_to_zero() {
        let summary = compute_summary(0);
        assert_eq!(summary.subtotal, 0);
        assert_eq!(summary.gst, 0);
        assert_eq!(summary.total, 0);
    }
}
