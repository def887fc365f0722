#![allow(dead_code)]

use chrono::{DateTime, Utc};
use coffee_pos_api::{
    db::{create_orm_conn, create_pool, run_migrations},
    entity::{
        dining_tables::ActiveModel as TableActive, foods::ActiveModel as FoodActive,
        promotions::ActiveModel as PromotionActive, users::ActiveModel as UserActive,
    },
    middleware::auth::AuthUser,
    models::{Role, TableStatus},
    state::AppState,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set, Statement};
use uuid::Uuid;

/// Connects to the test database, or `None` when none is configured.
pub async fn try_setup() -> anyhow::Result<Option<AppState>> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(None);
        }
    };

    let orm = create_orm_conn(&database_url).await?;
    run_migrations(&orm).await?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE bill_items, bills, cart_items, dining_tables, foods, categories, promotions, history, settings, users RESTART IDENTITY CASCADE",
    ))
    .await?;

    let pool = create_pool(&database_url).await?;
    Ok(Some(AppState { pool, orm }))
}

pub async fn create_user(state: &AppState, role: Role, email: &str) -> anyhow::Result<AuthUser> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        name: Set(email.to_string()),
        password_hash: Set("dummy".into()),
        role: Set(role.as_str().into()),
        phone: Set(None),
        image_url: Set(None),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(AuthUser {
        user_id: user.id,
        role,
    })
}

pub async fn create_food(
    state: &AppState,
    name: &str,
    price: i64,
    category_id: Option<Uuid>,
) -> anyhow::Result<Uuid> {
    let food = FoodActive {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        price: Set(price),
        is_available: Set(true),
        category_id: Set(category_id),
        image_url: Set(None),
        sold: Set(0),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(food.id)
}

pub async fn create_table(
    state: &AppState,
    number: i32,
    status: TableStatus,
) -> anyhow::Result<Uuid> {
    let table = TableActive {
        id: Set(Uuid::new_v4()),
        number: Set(number),
        status: Set(status.as_str().to_string()),
        bill_id: Set(None),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(table.id)
}

pub async fn create_promotion(
    state: &AppState,
    code: &str,
    discount_percent: i32,
    expires_at: DateTime<Utc>,
) -> anyhow::Result<()> {
    PromotionActive {
        id: Set(Uuid::new_v4()),
        code: Set(code.to_string()),
        discount_percent: Set(discount_percent),
        expires_at: Set(expires_at.into()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    Ok(())
}
