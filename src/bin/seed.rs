use coffee_pos_api::{
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
    services::auth_service::hash_password,
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    // Ensure migrations are applied.
    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;
    let pool = create_pool(&config.database_url).await?;

    let admin_id = ensure_user(&pool, "admin@coffee.local", "Owner", "admin123", "admin").await?;
    let staff_id = ensure_user(&pool, "staff@coffee.local", "Barista", "staff123", "staff").await?;
    seed_menu(&pool).await?;
    seed_tables(&pool, 8).await?;
    seed_settings(&pool).await?;

    println!("Seed completed. Admin ID: {admin_id}, Staff ID: {staff_id}");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    email: &str,
    name: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password)?;

    let row: (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, name, password_hash, role)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(name)
    .bind(password_hash)
    .bind(role)
    .fetch_one(pool)
    .await?;

    println!("Ensured user {email} (role={role})");
    Ok(row.0)
}

async fn seed_menu(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let menu = vec![
        ("Coffee", vec![("Espresso", 25_000), ("Cappuccino", 35_000), ("Caffe Latte", 38_000)]),
        ("Tea", vec![("Green Tea", 22_000), ("Peach Tea", 28_000)]),
        ("Pastry", vec![("Croissant", 30_000), ("Banana Bread", 27_000)]),
    ];

    for (category, foods) in menu {
        let (category_id,): (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO categories (id, name)
            VALUES ($1, $2)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(category)
        .fetch_one(pool)
        .await?;

        for (name, price) in foods {
            sqlx::query(
                r#"
                INSERT INTO foods (id, name, price, category_id)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (name) DO NOTHING
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(name)
            .bind(price as i64)
            .bind(category_id)
            .execute(pool)
            .await?;
        }
    }

    println!("Seeded menu");
    Ok(())
}

async fn seed_tables(pool: &sqlx::PgPool, count: i32) -> anyhow::Result<()> {
    for number in 1..=count {
        sqlx::query(
            r#"
            INSERT INTO dining_tables (id, number)
            VALUES ($1, $2)
            ON CONFLICT (number) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(number)
        .execute(pool)
        .await?;
    }

    println!("Seeded {count} tables");
    Ok(())
}

async fn seed_settings(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let defaults = [
        ("shop_name", "Coffee House"),
        ("currency", "VND"),
        ("receipt_footer", "Thank you, see you again"),
    ];

    for (key, value) in defaults {
        sqlx::query(
            r#"
            INSERT INTO settings (key, value)
            VALUES ($1, $2)
            ON CONFLICT (key) DO NOTHING
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(pool)
        .await?;
    }

    println!("Seeded settings");
    Ok(())
}
