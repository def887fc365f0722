use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch},
};
use uuid::Uuid;

use crate::{
    dto::{
        bills::BillWithItems,
        tables::{CreateTableRequest, TableList, TableStatusRequest},
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::Table,
    response::ApiResponse,
    routes::params::TableQuery,
    services::{bill_service, table_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tables).post(create_table))
        .route("/{id}", get(get_table).delete(delete_table))
        .route("/{id}/status", patch(set_status))
        .route("/{id}/bill", get(get_table_bill))
}

#[utoipa::path(
    get,
    path = "/api/tables",
    params(("status" = Option<String>, Query, description = "EMPTY, OCCUPIED or DAMAGED")),
    responses(
        (status = 200, description = "List tables by number", body = ApiResponse<TableList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Tables"
)]
pub async fn list_tables(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<TableQuery>,
) -> AppResult<Json<ApiResponse<TableList>>> {
    let resp = table_service::list_tables(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/tables/{id}",
    params(("id" = Uuid, Path, description = "Table ID")),
    responses(
        (status = 200, description = "Get table", body = ApiResponse<Table>),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Tables"
)]
pub async fn get_table(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Table>>> {
    let resp = table_service::get_table(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/tables/{id}/bill",
    params(("id" = Uuid, Path, description = "Table ID")),
    responses(
        (status = 200, description = "Open bill of the table", body = ApiResponse<BillWithItems>),
        (status = 404, description = "Table is not occupied")
    ),
    security(("bearer_auth" = [])),
    tag = "Tables"
)]
pub async fn get_table_bill(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<BillWithItems>>> {
    let resp = bill_service::get_table_bill(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/tables",
    request_body = CreateTableRequest,
    responses(
        (status = 200, description = "Create table", body = ApiResponse<Table>),
        (status = 409, description = "Number already used")
    ),
    security(("bearer_auth" = [])),
    tag = "Tables"
)]
pub async fn create_table(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateTableRequest>,
) -> AppResult<Json<ApiResponse<Table>>> {
    let resp = table_service::create_table(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/tables/{id}/status",
    params(("id" = Uuid, Path, description = "Table ID")),
    request_body = TableStatusRequest,
    responses(
        (status = 200, description = "Mark damaged or repaired", body = ApiResponse<Table>),
        (status = 400, description = "OCCUPIED cannot be set by hand"),
        (status = 409, description = "Table has an open bill")
    ),
    security(("bearer_auth" = [])),
    tag = "Tables"
)]
pub async fn set_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<TableStatusRequest>,
) -> AppResult<Json<ApiResponse<Table>>> {
    let resp = table_service::set_status(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/tables/{id}",
    params(("id" = Uuid, Path, description = "Table ID")),
    responses(
        (status = 200, description = "Delete table"),
        (status = 409, description = "Table has an open bill")
    ),
    security(("bearer_auth" = [])),
    tag = "Tables"
)]
pub async fn delete_table(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = table_service::delete_table(&state, &user, id).await?;
    Ok(Json(resp))
}
