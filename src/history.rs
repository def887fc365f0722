use uuid::Uuid;

use crate::{db::DbPool, error::AppResult};

/// Append an entry to the `history` collection.
pub async fn record_history(pool: &DbPool, user_id: Option<Uuid>, action: &str) -> AppResult<()> {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO history (id, user_id, action)
        VALUES ($1, $2, $3)
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(action)
    .execute(pool)
    .await?;

    Ok(())
}

/// Best-effort variant used after a mutation has already committed.
pub async fn note(pool: &DbPool, user_id: Option<Uuid>, action: impl AsRef<str>) {
    if let Err(err) = record_history(pool, user_id, action.as_ref()).await {
        tracing::warn!(error = %err, action = action.as_ref(), "history write failed");
    }
}
