use adplaze_api::{
    db::{create_orm_conn, create_pool, run_migrations},
    dto::{
        admin::CreateAgencyRequest,
        bookings::CheckoutRequest,
        cart::AddToCartRequest,
    },
    entity::{
        ad_spaces::ActiveModel as SpaceActive,
        bookings::{Column as BookingCol, Entity as Bookings},
        users::ActiveModel as UserActive,
    },
    middleware::auth::AuthUser,
    services::{admin_service, booking_service, cart_service},
    state::AppState,
};
use chrono::NaiveDate;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, Set, Statement};
use uuid::Uuid;

// Admin flow: provision an agency (usernames unique case-insensitively),
// then delete a booked space and watch its bookings go with it.
#[tokio::test]
async fn agency_provisioning_and_space_delete_flow() -> anyhow::Result<()> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(());
        }
    };

    let state = setup_state(&database_url).await?;
    let admin_id = create_user(&state, "admin", "admin@example.com").await?;
    let admin = AuthUser {
        user_id: admin_id,
        role: "admin".into(),
    };

    let created = admin_service::create_agency(
        &state,
        &admin,
        CreateAgencyRequest {
            username: "PixelPerfect".into(),
            password: "secret123".into(),
            company_name: "Pixel Perfect Media".into(),
            email: None,
        },
    )
    .await?;
    let agency = created.data.unwrap();
    assert_eq!(agency.role, "agency");
    assert_eq!(agency.email, "pixelperfect@adplaze.agency");

    let duplicate = admin_service::create_agency(
        &state,
        &admin,
        CreateAgencyRequest {
            username: "pixelperfect".into(),
            password: "other456".into(),
            company_name: "Copycat Media".into(),
            email: None,
        },
    )
    .await;
    let err = duplicate.err().expect("duplicate username must be rejected");
    assert!(err.to_string().contains("Username already taken"));

    // The rejected create wrote nothing.
    let agencies: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM users WHERE role = 'agency'")
            .fetch_one(&state.pool)
            .await?;
    assert_eq!(agencies.0, 1);

    // Deleting a space removes its bookings with it; an unreferenced space
    // deletes cleanly too.
    let agency_id = create_user(&state, "agency", "agency2@example.com").await?;
    let buyer_a = create_user(&state, "advertiser", "buyer-a@example.com").await?;
    let buyer_b = create_user(&state, "advertiser", "buyer-b@example.com").await?;

    let busy_space = create_space(&state, agency_id, "Busy Hoarding", 1_500).await?;
    let idle_space = create_space(&state, agency_id, "Idle Hoarding", 1_500).await?;

    // Two advertisers book the same space.
    for (buyer, start, end) in [
        (buyer_a, "2025-08-01", "2025-08-02"),
        (buyer_b, "2025-08-10", "2025-08-12"),
    ] {
        let advertiser = AuthUser {
            user_id: buyer,
            role: "advertiser".into(),
        };
        cart_service::add_to_cart(
            &state.pool,
            &advertiser,
            AddToCartRequest {
                space_id: busy_space,
                start_date: date(start),
                end_date: date(end),
            },
        )
        .await?;
        booking_service::checkout(
            &state,
            &advertiser,
            CheckoutRequest {
                contact_name: "Test Buyer".into(),
                contact_phone: "+91 90000 00000".into(),
                contact_address: None,
            },
        )
        .await?;
    }

    let deleted = admin_service::delete_space(&state, &admin, busy_space).await?;
    assert_eq!(deleted.data.unwrap().bookings_removed, 2);

    let remaining = Bookings::find()
        .filter(BookingCol::SpaceId.eq(busy_space))
        .count(&state.orm)
        .await?;
    assert_eq!(remaining, 0);

    // No referencing bookings is not an error.
    let deleted_idle = admin_service::delete_space(&state, &admin, idle_space).await?;
    assert_eq!(deleted_idle.data.unwrap().bookings_removed, 0);

    // Gone means gone.
    assert!(admin_service::delete_space(&state, &admin, idle_space)
        .await
        .is_err());

    Ok(())
}

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let pool = create_pool(database_url).await?;
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;

    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE bookings, blocked_dates, reviews, cart_items, favorites, audit_logs, ad_spaces, users RESTART IDENTITY CASCADE",
    ))
    .await?;

    Ok(AppState { pool, orm })
}

async fn create_user(state: &AppState, role: &str, email: &str) -> anyhow::Result<Uuid> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        name: Set(format!("{role} user")),
        email: Set(email.to_string()),
        phone: Set(None),
        image_url: Set(None),
        password_hash: Set(Some("dummy".into())),
        role: Set(role.into()),
        username: Set(None),
        company_name: Set(None),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(user.id)
}

async fn create_space(
    state: &AppState,
    owner_id: Uuid,
    title: &str,
    price_per_day: i64,
) -> anyhow::Result<Uuid> {
    let id = Uuid::new_v4();
    let space = SpaceActive {
        id: Set(id),
        title: Set(title.to_string()),
        slug: Set(format!("{}-{}", title.to_lowercase().replace(' ', "-"), &id.simple().to_string()[..4])),
        space_type: Set("billboard".into()),
        description: Set(None),
        city: Set("Kochi".into()),
        district: Set(None),
        address: Set(Some("Test Junction".into())),
        dimensions: Set(None),
        price_per_day: Set(price_per_day),
        image_url: Set(None),
        demographics: Set(serde_json::json!([])),
        owner_id: Set(Some(owner_id)),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(space.id)
}
