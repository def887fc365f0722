use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, put},
};
use uuid::Uuid;

use crate::{
    dto::promotions::{CreatePromotionRequest, PromotionList, UpdatePromotionRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Promotion,
    response::ApiResponse,
    routes::params::PromotionQuery,
    services::promotion_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_promotions).post(create_promotion))
        .route("/code/{code}", get(get_by_code))
        .route("/{id}", put(update_promotion).delete(delete_promotion))
}

#[utoipa::path(
    get,
    path = "/api/promotions",
    params(("active_only" = Option<bool>, Query, description = "Hide expired codes")),
    responses(
        (status = 200, description = "List promotions", body = ApiResponse<PromotionList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Promotions"
)]
pub async fn list_promotions(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<PromotionQuery>,
) -> AppResult<Json<ApiResponse<PromotionList>>> {
    let resp = promotion_service::list_promotions(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/promotions/code/{code}",
    params(("code" = String, Path, description = "Promotion code, case-insensitive")),
    responses(
        (status = 200, description = "Valid promotion", body = ApiResponse<Promotion>),
        (status = 400, description = "Promotion has expired"),
        (status = 404, description = "Unknown code")
    ),
    security(("bearer_auth" = [])),
    tag = "Promotions"
)]
pub async fn get_by_code(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(code): Path<String>,
) -> AppResult<Json<ApiResponse<Promotion>>> {
    let resp = promotion_service::get_by_code(&state, &code).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/promotions",
    request_body = CreatePromotionRequest,
    responses(
        (status = 200, description = "Create promotion (admin only)", body = ApiResponse<Promotion>),
        (status = 409, description = "Code already exists")
    ),
    security(("bearer_auth" = [])),
    tag = "Promotions"
)]
pub async fn create_promotion(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreatePromotionRequest>,
) -> AppResult<Json<ApiResponse<Promotion>>> {
    let resp = promotion_service::create_promotion(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/promotions/{id}",
    params(("id" = Uuid, Path, description = "Promotion ID")),
    request_body = UpdatePromotionRequest,
    responses(
        (status = 200, description = "Update promotion (admin only)", body = ApiResponse<Promotion>),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Promotions"
)]
pub async fn update_promotion(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePromotionRequest>,
) -> AppResult<Json<ApiResponse<Promotion>>> {
    let resp = promotion_service::update_promotion(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/promotions/{id}",
    params(("id" = Uuid, Path, description = "Promotion ID")),
    responses(
        (status = 200, description = "Delete promotion (admin only)"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Promotions"
)]
pub async fn delete_promotion(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = promotion_service::delete_promotion(&state, &user, id).await?;
    Ok(Json(resp))
}
