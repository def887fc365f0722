use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch},
};
use uuid::Uuid;

use crate::{
    dto::foods::{AvailabilityRequest, CreateFoodRequest, FoodList, UpdateFoodRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Food,
    response::ApiResponse,
    routes::params::{BestSellerQuery, FoodQuery, Pagination},
    services::food_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_foods).post(create_food))
        .route("/best-sellers", get(best_sellers))
        .route("/{id}", get(get_food).put(update_food).delete(delete_food))
        .route("/{id}/availability", patch(set_availability))
}

#[utoipa::path(
    get,
    path = "/api/foods",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("q" = Option<String>, Query, description = "Search by name"),
        ("category_id" = Option<Uuid>, Query, description = "Filter by category"),
        ("available" = Option<bool>, Query, description = "Filter by availability"),
        ("sort_by" = Option<String>, Query, description = "name, price, sold, created_at"),
        ("sort_order" = Option<String>, Query, description = "asc, desc")
    ),
    responses(
        (status = 200, description = "Browse the menu", body = ApiResponse<FoodList>)
    ),
    tag = "Foods"
)]
pub async fn list_foods(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
    Query(query): Query<FoodQuery>,
) -> AppResult<Json<ApiResponse<FoodList>>> {
    let resp = food_service::list_foods(&state, pagination, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/foods/best-sellers",
    params(("limit" = Option<u64>, Query, description = "How many, default 5")),
    responses(
        (status = 200, description = "Most sold foods", body = ApiResponse<FoodList>)
    ),
    tag = "Foods"
)]
pub async fn best_sellers(
    State(state): State<AppState>,
    Query(query): Query<BestSellerQuery>,
) -> AppResult<Json<ApiResponse<FoodList>>> {
    let resp = food_service::best_sellers(&state, query.limit).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/foods/{id}",
    params(("id" = Uuid, Path, description = "Food ID")),
    responses(
        (status = 200, description = "Get food", body = ApiResponse<Food>),
        (status = 404, description = "Food not found")
    ),
    tag = "Foods"
)]
pub async fn get_food(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Food>>> {
    let resp = food_service::get_food(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/foods",
    request_body = CreateFoodRequest,
    responses(
        (status = 200, description = "Create food", body = ApiResponse<Food>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Foods"
)]
pub async fn create_food(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateFoodRequest>,
) -> AppResult<Json<ApiResponse<Food>>> {
    let resp = food_service::create_food(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/foods/{id}",
    params(("id" = Uuid, Path, description = "Food ID")),
    request_body = UpdateFoodRequest,
    responses(
        (status = 200, description = "Updated food", body = ApiResponse<Food>),
        (status = 404, description = "Food not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Foods"
)]
pub async fn update_food(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateFoodRequest>,
) -> AppResult<Json<ApiResponse<Food>>> {
    let resp = food_service::update_food(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/foods/{id}/availability",
    params(("id" = Uuid, Path, description = "Food ID")),
    request_body = AvailabilityRequest,
    responses(
        (status = 200, description = "Toggle availability", body = ApiResponse<Food>),
        (status = 404, description = "Food not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Foods"
)]
pub async fn set_availability(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AvailabilityRequest>,
) -> AppResult<Json<ApiResponse<Food>>> {
    let resp = food_service::set_availability(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/foods/{id}",
    params(("id" = Uuid, Path, description = "Food ID")),
    responses(
        (status = 200, description = "Deleted food"),
        (status = 404, description = "Food not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Foods"
)]
pub async fn delete_food(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = food_service::delete_food(&state, &user, id).await?;
    Ok(Json(resp))
}
