use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use storefront_api::{config::AppConfig, db::create_pool};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let admin_id = ensure_user_with_role(&pool, "admin", "admin123", "admin").await?;
    let user_id = ensure_user_with_role(&pool, "shopper", "shopper123", "user").await?;
    seed_catalog(&pool).await?;

    println!("Seed completed. Admin ID: {admin_id}, User ID: {user_id}");
    Ok(())
}

async fn ensure_user_with_role(
    pool: &sqlx::PgPool,
    username: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO users (id, username, password_hash, role)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (username) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(username)
    .bind(password_hash)
    .bind(role)
    .fetch_optional(pool)
    .await?;

    // If the user already exists, fetch the id.
    let user_id = match row {
        Some((id,)) => id,
        None => {
            let existing: (Uuid,) = sqlx::query_as("SELECT id FROM users WHERE username = $1")
                .bind(username)
                .fetch_one(pool)
                .await?;
            existing.0
        }
    };

    // Every user carries exactly one profile.
    sqlx::query("INSERT INTO profiles (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
        .bind(user_id)
        .execute(pool)
        .await?;

    println!("Ensured user {username} (role={role})");
    Ok(user_id)
}

async fn seed_catalog(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let categories = vec![
        ("Apparel", "Hoodies, tees and other wearables"),
        ("Drinkware", "Mugs and bottles"),
        ("Stationery", "Stickers, notebooks and pens"),
    ];

    for (name, desc) in &categories {
        sqlx::query(
            r#"
            INSERT INTO categories (id, name, description)
            VALUES ($1, $2, $3)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(desc)
        .execute(pool)
        .await?;
    }

    let products = vec![
        ("Logo Hoodie", "Apparel", "Warm hoodie for Rustaceans", 550000, 50),
        ("Ferris Mug", "Drinkware", "Coffee tastes better with Ferris", 120000, 100),
        ("Sticker Pack", "Stationery", "Decorate your laptop", 50000, 200),
        ("Crab Tee", "Apparel", "Soft cotton tee", 250000, 75),
    ];

    for (name, category, desc, price, stock) in products {
        let category_id: (Uuid,) = sqlx::query_as("SELECT id FROM categories WHERE name = $1")
            .bind(category)
            .fetch_one(pool)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO products (id, category_id, name, description, price, stock)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(category_id.0)
        .bind(name)
        .bind(desc)
        .bind(price)
        .bind(stock)
        .execute(pool)
        .await?;
    }

    println!("Seeded catalog");
    Ok(())
}
