use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch, post},
};
use uuid::Uuid;

use crate::{
    dto::bills::{
        AddItemsRequest, ApplyPromotionRequest, BillList, BillWithItems, DiscountRequest,
        OpenBillRequest, UpdateItemRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::params::{BillListQuery, Pagination},
    services::bill_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_bills).post(open_bill))
        .route("/{id}", get(get_bill).delete(delete_bill))
        .route("/{id}/items", post(add_items))
        .route("/{id}/items/{item_id}", patch(update_item).delete(remove_item))
        .route("/{id}/promotion", post(apply_promotion))
        .route("/{id}/discount", patch(set_discount))
        .route("/{id}/processed", post(mark_processed))
        .route("/{id}/checkout", post(checkout))
}

#[utoipa::path(
    get,
    path = "/api/bills",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("paid" = Option<bool>, Query, description = "Filter by paid flag"),
        ("table_id" = Option<Uuid>, Query, description = "Filter by table"),
        ("from" = Option<String>, Query, description = "Created on or after, YYYY-MM-DD"),
        ("to" = Option<String>, Query, description = "Created on or before, YYYY-MM-DD")
    ),
    responses(
        (status = 200, description = "List bills, newest first", body = ApiResponse<BillList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Bills"
)]
pub async fn list_bills(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(pagination): Query<Pagination>,
    Query(query): Query<BillListQuery>,
) -> AppResult<Json<ApiResponse<BillList>>> {
    let resp = bill_service::list_bills(&state, pagination, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/bills",
    request_body = OpenBillRequest,
    responses(
        (status = 200, description = "Open a bill on an empty table", body = ApiResponse<BillWithItems>),
        (status = 400, description = "Table is damaged"),
        (status = 409, description = "Table is occupied")
    ),
    security(("bearer_auth" = [])),
    tag = "Bills"
)]
pub async fn open_bill(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<OpenBillRequest>,
) -> AppResult<Json<ApiResponse<BillWithItems>>> {
    let resp = bill_service::open_bill(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/bills/{id}",
    params(("id" = Uuid, Path, description = "Bill ID")),
    responses(
        (status = 200, description = "Bill with its items", body = ApiResponse<BillWithItems>),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Bills"
)]
pub async fn get_bill(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<BillWithItems>>> {
    let resp = bill_service::get_bill(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/bills/{id}/items",
    params(("id" = Uuid, Path, description = "Bill ID")),
    request_body = AddItemsRequest,
    responses(
        (status = 200, description = "Add or merge items", body = ApiResponse<BillWithItems>),
        (status = 400, description = "Food missing or unavailable, or bill already paid")
    ),
    security(("bearer_auth" = [])),
    tag = "Bills"
)]
pub async fn add_items(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddItemsRequest>,
) -> AppResult<Json<ApiResponse<BillWithItems>>> {
    let resp = bill_service::add_items(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/bills/{id}/items/{item_id}",
    params(
        ("id" = Uuid, Path, description = "Bill ID"),
        ("item_id" = Uuid, Path, description = "Bill item ID")
    ),
    request_body = UpdateItemRequest,
    responses(
        (status = 200, description = "Change quantity, 0 removes", body = ApiResponse<BillWithItems>),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Bills"
)]
pub async fn update_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateItemRequest>,
) -> AppResult<Json<ApiResponse<BillWithItems>>> {
    let resp = bill_service::update_item(&state, &user, id, item_id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/bills/{id}/items/{item_id}",
    params(
        ("id" = Uuid, Path, description = "Bill ID"),
        ("item_id" = Uuid, Path, description = "Bill item ID")
    ),
    responses(
        (status = 200, description = "Remove a line", body = ApiResponse<BillWithItems>),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Bills"
)]
pub async fn remove_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<BillWithItems>>> {
    let resp = bill_service::remove_item(&state, &user, id, item_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/bills/{id}/promotion",
    params(("id" = Uuid, Path, description = "Bill ID")),
    request_body = ApplyPromotionRequest,
    responses(
        (status = 200, description = "Apply a promotion code", body = ApiResponse<BillWithItems>),
        (status = 400, description = "Promotion has expired"),
        (status = 404, description = "Unknown bill or code")
    ),
    security(("bearer_auth" = [])),
    tag = "Bills"
)]
pub async fn apply_promotion(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ApplyPromotionRequest>,
) -> AppResult<Json<ApiResponse<BillWithItems>>> {
    let resp = bill_service::apply_promotion(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/bills/{id}/discount",
    params(("id" = Uuid, Path, description = "Bill ID")),
    request_body = DiscountRequest,
    responses(
        (status = 200, description = "Set a manual discount (admin only)", body = ApiResponse<BillWithItems>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Bills"
)]
pub async fn set_discount(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<DiscountRequest>,
) -> AppResult<Json<ApiResponse<BillWithItems>>> {
    let resp = bill_service::set_discount(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/bills/{id}/processed",
    params(("id" = Uuid, Path, description = "Bill ID")),
    responses(
        (status = 200, description = "Mark as served", body = ApiResponse<BillWithItems>)
    ),
    security(("bearer_auth" = [])),
    tag = "Bills"
)]
pub async fn mark_processed(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<BillWithItems>>> {
    let resp = bill_service::mark_processed(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/bills/{id}/checkout",
    params(("id" = Uuid, Path, description = "Bill ID")),
    responses(
        (status = 200, description = "Pay and free the table", body = ApiResponse<BillWithItems>),
        (status = 400, description = "Bill is empty or already paid")
    ),
    security(("bearer_auth" = [])),
    tag = "Bills"
)]
pub async fn checkout(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<BillWithItems>>> {
    let resp = bill_service::checkout(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/bills/{id}",
    params(("id" = Uuid, Path, description = "Bill ID")),
    responses(
        (status = 200, description = "Drop an unpaid bill"),
        (status = 400, description = "Bill already paid")
    ),
    security(("bearer_auth" = [])),
    tag = "Bills"
)]
pub async fn delete_bill(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = bill_service::delete_bill(&state, &user, id).await?;
    Ok(Json(resp))
}
