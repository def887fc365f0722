use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    dto::history::HistoryList,
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::params::{HistoryQuery, Pagination},
    services::history_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_history))
}

#[utoipa::path(
    get,
    path = "/api/history",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("user_id" = Option<uuid::Uuid>, Query, description = "Admins only: filter by user")
    ),
    responses(
        (status = 200, description = "Action log, newest first", body = ApiResponse<HistoryList>)
    ),
    security(("bearer_auth" = [])),
    tag = "History"
)]
pub async fn list_history(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<ApiResponse<HistoryList>>> {
    let resp = history_service::list_history(&state, &user, pagination, query).await?;
    Ok(Json(resp))
}
