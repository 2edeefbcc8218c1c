//! Demo data seeding command.
//!
//! Creates a demo user with a printable API token and a handful of catalog
//! products. Safe to re-run: existing demo rows are left alone.

use sqlx::SqlitePool;

use cartwheel_api::config::CatalogConfig;
use cartwheel_api::db;

use super::migrate::MigrateError;

const DEMO_TOKEN: &str = "cw-demo-token";

const DEMO_PRODUCTS: &[(&str, &str, i64, &str)] = &[
    (
        "Linen Shirt",
        "A lightweight summer shirt in washed linen.",
        3499,
        "clothing",
    ),
    (
        "Stoneware Mug",
        "Hand-glazed mug, holds 350ml.",
        1299,
        "kitchen",
    ),
    (
        "Canvas Tote",
        "Heavy-duty tote for groceries and gear.",
        1999,
        "accessories",
    ),
];

/// Seed the database with a demo user and products.
///
/// # Errors
///
/// Returns `MigrateError` if configuration is missing or a query fails.
pub async fn run() -> Result<(), MigrateError> {
    let config = CatalogConfig::from_env()?;
    let pool = db::create_pool(&config.database_url).await?;

    // Migrations must have run before seeding makes sense.
    db::MIGRATOR.run(&pool).await?;

    let token = seed_demo_user(&pool).await?;
    let inserted = seed_demo_products(&pool).await?;

    tracing::info!("Seeded {inserted} products");

    #[allow(clippy::print_stdout)]
    {
        println!("Demo API token: {token}");
        println!("Try: curl -H 'Authorization: Bearer {token}' http://127.0.0.1:8000/products");
    }

    Ok(())
}

/// Create the demo user and token if they don't exist yet.
async fn seed_demo_user(pool: &SqlitePool) -> Result<String, sqlx::Error> {
    let existing: Option<i64> = sqlx::query_scalar("SELECT user_id FROM api_token WHERE token = ?1")
        .bind(DEMO_TOKEN)
        .fetch_optional(pool)
        .await?;

    if existing.is_none() {
        let user_id: i64 = sqlx::query_scalar(
            "INSERT INTO user (first_name, last_name) VALUES ('Demo', 'User') RETURNING id",
        )
        .fetch_one(pool)
        .await?;

        sqlx::query("INSERT INTO api_token (token, user_id) VALUES (?1, ?2)")
            .bind(DEMO_TOKEN)
            .bind(user_id)
            .execute(pool)
            .await?;
    }

    Ok(DEMO_TOKEN.to_string())
}

/// Insert demo products unless the catalog already has rows.
async fn seed_demo_products(pool: &SqlitePool) -> Result<usize, sqlx::Error> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM product")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        return Ok(0);
    }

    for (title, description, price_cents, category) in DEMO_PRODUCTS {
        sqlx::query(
            "INSERT INTO product (title, description, price_cents, category) \
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(title)
        .bind(description)
        .bind(price_cents)
        .bind(category)
        .execute(pool)
        .await?;
    }

    Ok(DEMO_PRODUCTS.len())
}
