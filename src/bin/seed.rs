use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use adplaze_api::{config::AppConfig, db::create_pool};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let admin_id = ensure_admin(&pool, "admin@adplaze.in", "admin123").await?;
    let agency_id = ensure_agency(&pool, "metrosigns", "agency123", "Metro Signs & Media").await?;
    let advertiser_id = ensure_advertiser(&pool, "advertiser@example.com", "advertiser123").await?;
    seed_spaces(&pool, agency_id).await?;
    seed_review(&pool, advertiser_id).await?;

    println!("Seed completed. Admin ID: {admin_id}, Agency ID: {agency_id}");
    Ok(())
}

async fn ensure_admin(pool: &sqlx::PgPool, email: &str, password: &str) -> anyhow::Result<Uuid> {
    ensure_user(pool, "Marketplace Admin", email, password, "admin").await
}

async fn ensure_advertiser(
    pool: &sqlx::PgPool,
    email: &str,
    password: &str,
) -> anyhow::Result<Uuid> {
    ensure_user(pool, "Demo Advertiser", email, password, "advertiser").await
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    name: &str,
    email: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let password_hash = hash(password)?;

    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO users (id, name, email, password_hash, role)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .fetch_optional(pool)
    .await?;

    let user_id = match row {
        Some((id,)) => id,
        None => {
            let existing: (Uuid,) = sqlx::query_as("SELECT id FROM users WHERE email = $1")
                .bind(email)
                .fetch_one(pool)
                .await?;
            existing.0
        }
    };

    println!("Ensured user {email} (role={role})");
    Ok(user_id)
}

async fn ensure_agency(
    pool: &sqlx::PgPool,
    username: &str,
    password: &str,
    company_name: &str,
) -> anyhow::Result<Uuid> {
    let password_hash = hash(password)?;
    let email = format!("{username}@adplaze.agency");

    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO users (id, name, email, password_hash, role, username, company_name)
        VALUES ($1, $2, $3, $4, 'agency', $5, $6)
        ON CONFLICT (email) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(company_name)
    .bind(email.as_str())
    .bind(password_hash)
    .bind(username)
    .bind(company_name)
    .fetch_optional(pool)
    .await?;

    let agency_id = match row {
        Some((id,)) => id,
        None => {
            let existing: (Uuid,) = sqlx::query_as("SELECT id FROM users WHERE email = $1")
                .bind(email.as_str())
                .fetch_one(pool)
                .await?;
            existing.0
        }
    };

    println!("Ensured agency {username} ({company_name})");
    Ok(agency_id)
}

async fn seed_spaces(pool: &sqlx::PgPool, owner_id: Uuid) -> anyhow::Result<()> {
    let spaces = vec![
        (
            "Edappally Arch Billboard",
            "edappally-arch-billboard",
            "billboard",
            "Kochi",
            "NH 66 Junction, Edappally",
            "40x20 ft",
            12_000_i64,
            serde_json::json!(["professionals", "families"]),
        ),
        (
            "MG Road Digital Wall",
            "mg-road-digital-wall",
            "digital_screen",
            "Kochi",
            "Opposite Metro Pillar 541, MG Road",
            "20x10 ft",
            18_000,
            serde_json::json!(["professionals", "gen_z", "hnw"]),
        ),
        (
            "Mavoor Road Transit Wrap",
            "mavoor-road-transit-wrap",
            "transit",
            "Calicut",
            "KSRTC stand, Mavoor Road",
            "Bus fleet",
            6_500,
            serde_json::json!(["students", "families"]),
        ),
        (
            "Technopark Gateway Screen",
            "technopark-gateway-screen",
            "digital_screen",
            "Trivandrum",
            "Phase 1 entrance, Technopark",
            "16x9 ft",
            15_000,
            serde_json::json!(["professionals", "gen_z"]),
        ),
    ];

    for (title, slug, space_type, city, address, dimensions, price, demographics) in spaces {
        sqlx::query(
            r#"
            INSERT INTO ad_spaces
                (id, title, slug, space_type, description, city, address, dimensions,
                 price_per_day, demographics, owner_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (slug) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(title)
        .bind(slug)
        .bind(space_type)
        .bind(format!("High-visibility {space_type} placement in {city}."))
        .bind(city)
        .bind(address)
        .bind(dimensions)
        .bind(price)
        .bind(demographics)
        .bind(owner_id)
        .execute(pool)
        .await?;
    }

    println!("Seeded ad spaces");
    Ok(())
}

async fn seed_review(pool: &sqlx::PgPool, user_id: Uuid) -> anyhow::Result<()> {
    let space: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM ad_spaces WHERE slug = 'mg-road-digital-wall'")
            .fetch_optional(pool)
            .await?;
    let Some((space_id,)) = space else {
        return Ok(());
    };

    let existing: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM reviews WHERE space_id = $1 AND user_id = $2")
            .bind(space_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
    if existing.is_some() {
        return Ok(());
    }

    sqlx::query(
        r#"
        INSERT INTO reviews (id, space_id, user_id, rating, comment)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(space_id)
    .bind(user_id)
    .bind(5_i16)
    .bind("Great footfall, campaign numbers were well above plan.")
    .execute(pool)
    .await?;

    println!("Seeded review");
    Ok(())
}

fn hash(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();
    Ok(password_hash)
}
