use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    dto::statistics::{DashboardSummary, RevenueQuery, RevenueReport},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::statistics_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/revenue", get(revenue))
        .route("/summary", get(summary))
}

#[utoipa::path(
    get,
    path = "/api/statistics/revenue",
    params(
        ("granularity" = Option<String>, Query, description = "day (default) or month"),
        ("from" = String, Query, description = "First day, YYYY-MM-DD"),
        ("to" = String, Query, description = "Last day, YYYY-MM-DD")
    ),
    responses(
        (status = 200, description = "Paid revenue per bucket (admin only)", body = ApiResponse<RevenueReport>),
        (status = 400, description = "Invalid window"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Statistics"
)]
pub async fn revenue(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<RevenueQuery>,
) -> AppResult<Json<ApiResponse<RevenueReport>>> {
    let resp = statistics_service::revenue(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/statistics/summary",
    responses(
        (status = 200, description = "Today at a glance (admin only)", body = ApiResponse<DashboardSummary>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Statistics"
)]
pub async fn summary(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<DashboardSummary>>> {
    let resp = statistics_service::summary(&state, &user).await?;
    Ok(Json(resp))
}
