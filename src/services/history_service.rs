use chrono::Utc;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};

use crate::{
    dto::history::HistoryList,
    entity::history::{Column as HistoryCol, Entity as History, Model as HistoryModel},
    error::AppResult,
    middleware::auth::AuthUser,
    models,
    response::{ApiResponse, Meta},
    routes::params::{HistoryQuery, Pagination},
    state::AppState,
};

/// Admins may read anyone's entries; staff only ever see their own.
pub async fn list_history(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
    query: HistoryQuery,
) -> AppResult<ApiResponse<HistoryList>> {
    let (page, limit, offset) = pagination.normalize();

    let owner = if user.is_admin() {
        query.user_id
    } else {
        Some(user.user_id)
    };

    let mut finder = History::find();
    if let Some(user_id) = owner {
        finder = finder.filter(HistoryCol::UserId.eq(user_id));
    }
    let finder = finder.order_by_desc(HistoryCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(history_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "History",
        HistoryList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

fn history_from_entity(model: HistoryModel) -> models::History {
    models::History {
        id: model.id,
        user_id: model.user_id,
        action: model.action,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
