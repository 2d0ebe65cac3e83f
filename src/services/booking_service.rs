use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{LockType, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::dto::bookings::{
    BookingAction, BookingList, BookingWithSpace, BookingWithSpaceList, CheckoutRequest,
    ManageBookingRequest,
};
use crate::{
    audit::log_audit,
    dates::{day_count, expand_range},
    entity::{
        ad_spaces::{Column as SpaceCol, Entity as AdSpaces, Model as SpaceModel},
        blocked_dates::{
            ActiveModel as BlockedDateActive, Column as BlockedCol, Entity as BlockedDates,
        },
        bookings::{ActiveModel as BookingActive, Column as BookingCol, Entity as Bookings, Model as BookingModel},
        cart_items::{Column as CartCol, Entity as CartItems},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_agency_or_admin},
    models::{Booking, SpaceSummary},
    response::{ApiResponse, Meta},
    routes::params::{BookingListQuery, SortOrder},
    state::AppState,
};

/// Checkout turns every cart line into its own pending booking, inside one
/// transaction so a half-written cart never reaches the agencies.
pub async fn checkout(
    state: &AppState,
    user: &AuthUser,
    payload: CheckoutRequest,
) -> AppResult<ApiResponse<BookingList>> {
    if payload.contact_name.trim().is_empty() || payload.contact_phone.trim().is_empty() {
        return Err(AppError::BadRequest("Missing contact details".to_string()));
    }

    let txn = state.orm.begin().await?;

    let cart_lines = CartItems::find()
        .filter(CartCol::UserId.eq(user.user_id))
        .order_by_asc(CartCol::CreatedAt)
        .all(&txn)
        .await?;

    if cart_lines.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }

    let mut created: Vec<Booking> = Vec::new();

    for line in &cart_lines {
        let space = AdSpaces::find_by_id(line.space_id)
            .lock(LockType::Update)
            .one(&txn)
            .await?;
        let space = match space {
            Some(s) => s,
            None => {
                return Err(AppError::BadRequest(format!(
                    "Space {} is no longer listed",
                    line.space_id
                )));
            }
        };

        let days = day_count(line.start_date, line.end_date);
        if days == 0 {
            return Err(AppError::BadRequest("Cart has an invalid date range".into()));
        }

        let booking = BookingActive {
            id: Set(Uuid::new_v4()),
            space_id: Set(space.id),
            advertiser_id: Set(user.user_id),
            start_date: Set(line.start_date),
            end_date: Set(line.end_date),
            status: Set("pending".into()),
            total_price: Set(space.price_per_day * days),
            contact_name: Set(payload.contact_name.trim().to_string()),
            contact_phone: Set(payload.contact_phone.trim().to_string()),
            contact_address: Set(payload.contact_address.clone()),
            created_at: NotSet,
            updated_at: NotSet,
        }
        .insert(&txn)
        .await?;

        created.push(booking_from_entity(booking));
    }

    CartItems::delete_many()
        .filter(CartCol::UserId.eq(user.user_id))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "checkout",
        Some("bookings"),
        Some(serde_json::json!({
            "booking_ids": created.iter().map(|b| b.id).collect::<Vec<_>>(),
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Booking request submitted",
        BookingList { items: created },
        Some(Meta::empty()),
    ))
}

pub async fn list_my_bookings(
    state: &AppState,
    user: &AuthUser,
    query: BookingListQuery,
) -> AppResult<ApiResponse<BookingWithSpaceList>> {
    let (page, limit, offset) = query.pagination.normalize();
    let mut condition = Condition::all().add(BookingCol::AdvertiserId.eq(user.user_id));
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(BookingCol::Status.eq(status.clone()));
    }

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);

    let mut finder = Bookings::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(BookingCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(BookingCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .find_also_related(AdSpaces)
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .filter_map(|(booking, space)| {
            space.map(|s| BookingWithSpace {
                booking: booking_from_entity(booking),
                space: summary_from_entity(s),
            })
        })
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Ok",
        BookingWithSpaceList { items },
        Some(meta),
    ))
}

/// Agency view: booking requests against any space the caller owns.
pub async fn list_incoming_bookings(
    state: &AppState,
    user: &AuthUser,
    query: BookingListQuery,
) -> AppResult<ApiResponse<BookingWithSpaceList>> {
    ensure_agency_or_admin(user)?;
    let (page, limit, offset) = query.pagination.normalize();

    let mut condition = Condition::all().add(SpaceCol::OwnerId.eq(user.user_id));
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(BookingCol::Status.eq(status.clone()));
    }

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);

    let mut finder = Bookings::find().find_also_related(AdSpaces).filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(BookingCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(BookingCol::CreatedAt),
    };

    let rows = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let items: Vec<BookingWithSpace> = rows
        .into_iter()
        .filter_map(|(booking, space)| {
            space.map(|s| BookingWithSpace {
                booking: booking_from_entity(booking),
                space: summary_from_entity(s),
            })
        })
        .collect();

    let total = items.len() as i64;
    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Ok",
        BookingWithSpaceList { items },
        Some(meta),
    ))
}

pub async fn get_booking(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<BookingWithSpace>> {
    let found = Bookings::find_by_id(id)
        .find_also_related(AdSpaces)
        .one(&state.orm)
        .await?;
    let (booking, space) = match found {
        Some(pair) => pair,
        None => return Err(AppError::NotFound),
    };
    let space = match space {
        Some(s) => s,
        None => return Err(AppError::NotFound),
    };

    let is_advertiser = booking.advertiser_id == user.user_id;
    let is_owner = space.owner_id == Some(user.user_id);
    if !is_advertiser && !is_owner && user.role != "admin" {
        return Err(AppError::Forbidden);
    }

    Ok(ApiResponse::success(
        "OK",
        BookingWithSpace {
            booking: booking_from_entity(booking),
            space: summary_from_entity(space),
        },
        Some(Meta::empty()),
    ))
}

/// Confirm, reject or cancel a booking. Runs inside a transaction holding a
/// row lock on the booking: confirming blocks the booked days on the space,
/// cancelling releases exactly that range again.
pub async fn manage_booking(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: ManageBookingRequest,
) -> AppResult<ApiResponse<Booking>> {
    let txn = state.orm.begin().await?;

    let booking = Bookings::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let booking = match booking {
        Some(b) => b,
        None => return Err(AppError::NotFound),
    };

    let space = AdSpaces::find_by_id(booking.space_id).one(&txn).await?;
    let space = match space {
        Some(s) => s,
        None => return Err(AppError::NotFound),
    };

    ensure_manage_access(user, &space)?;

    let status = next_status(&booking.status, &payload.action)?;

    match payload.action {
        BookingAction::Confirm => {
            let days: Vec<BlockedDateActive> = expand_range(booking.start_date, booking.end_date)
                .into_iter()
                .map(|day| BlockedDateActive {
                    id: Set(Uuid::new_v4()),
                    space_id: Set(booking.space_id),
                    day: Set(day),
                    created_at: NotSet,
                })
                .collect();
            if !days.is_empty() {
                // A day already blocked elsewhere is left as-is; the unique
                // key keeps concurrent confirmations from double-writing it.
                BlockedDates::insert_many(days)
                    .on_conflict(
                        OnConflict::columns([BlockedCol::SpaceId, BlockedCol::Day])
                            .do_nothing()
                            .to_owned(),
                    )
                    .exec_without_returning(&txn)
                    .await?;
            }
        }
        BookingAction::Cancel => {
            BlockedDates::delete_many()
                .filter(
                    Condition::all()
                        .add(BlockedCol::SpaceId.eq(booking.space_id))
                        .add(BlockedCol::Day.between(booking.start_date, booking.end_date)),
                )
                .exec(&txn)
                .await?;
        }
        BookingAction::Reject => {}
    }

    let mut active: BookingActive = booking.into();
    active.status = Set(status.to_string());
    active.updated_at = Set(Utc::now().into());
    let booking = active.update(&txn).await?;

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        action_audit_name(&payload.action),
        Some("bookings"),
        Some(serde_json::json!({ "booking_id": booking.id, "status": status })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        format!("Booking {}", status),
        booking_from_entity(booking),
        Some(Meta::empty()),
    ))
}

fn ensure_manage_access(user: &AuthUser, space: &SpaceModel) -> Result<(), AppError> {
    if user.role == "admin" {
        return Ok(());
    }
    if user.role == "agency" && space.owner_id == Some(user.user_id) {
        return Ok(());
    }
    Err(AppError::Forbidden)
}

fn next_status(current: &str, action: &BookingAction) -> Result<&'static str, AppError> {
    match (current, action) {
        ("pending", BookingAction::Confirm) => Ok("confirmed"),
        ("pending", BookingAction::Reject) => Ok("rejected"),
        ("confirmed", BookingAction::Cancel) => Ok("cancelled"),
        _ => Err(AppError::BadRequest(format!(
            "Cannot {} a {} booking",
            action_name(action),
            current
        ))),
    }
}

fn action_name(action: &BookingAction) -> &'static str {
    match action {
        BookingAction::Confirm => "confirm",
        BookingAction::Reject => "reject",
        BookingAction::Cancel => "cancel",
    }
}

fn action_audit_name(action: &BookingAction) -> &'static str {
    match action {
        BookingAction::Confirm => "booking_confirm",
        BookingAction::Reject => "booking_reject",
        BookingAction::Cancel => "booking_cancel",
    }
}

pub(crate) fn booking_from_entity(model: BookingModel) -> Booking {
    Booking {
        id: model.id,
        space_id: model.space_id,
        advertiser_id: model.advertiser_id,
        start_date: model.start_date,
        end_date: model.end_date,
        status: model.status,
        total_price: model.total_price,
        contact_name: model.contact_name,
        contact_phone: model.contact_phone,
        contact_address: model.contact_address,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

fn summary_from_entity(model: SpaceModel) -> SpaceSummary {
    SpaceSummary {
        id: model.id,
        title: model.title,
        slug: model.slug,
        space_type: model.space_type,
        city: model.city,
        address: model.address,
        price_per_day: model.price_per_day,
        image_url: model.image_url,
    }
}

#[cfg(test)]
mod tests {
    use super::next_status;
    use crate::dto::bookings::BookingAction;

    #[test]
    fn pending_bookings_can_be_confirmed_or_rejected() {
        assert_eq!(
            next_status("pending", &BookingAction::Confirm).unwrap(),
            "confirmed"
        );
        assert_eq!(
            next_status("pending", &BookingAction::Reject).unwrap(),
            "rejected"
        );
    }

    #[test]
    fn only_confirmed_bookings_can_be_cancelled() {
        assert_eq!(
            next_status("confirmed", &BookingAction::Cancel).unwrap(),
            "cancelled"
        );
        assert!(next_status("pending", &BookingAction::Cancel).is_err());
        assert!(next_status("rejected", &BookingAction::Cancel).is_err());
    }

    #[test]
    fn terminal_states_reject_every_action() {
        for status in ["rejected", "cancelled", "completed"] {
            assert!(next_status(status, &BookingAction::Confirm).is_err());
            assert!(next_status(status, &BookingAction::Reject).is_err());
        }
        assert!(next_status("confirmed", &BookingAction::Confirm).is_err());
    }
}
