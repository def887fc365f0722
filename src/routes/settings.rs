use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};

use crate::{
    dto::settings::{PutSettingRequest, SettingList},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Setting,
    response::ApiResponse,
    services::setting_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_settings))
        .route("/{key}", get(get_setting).put(put_setting).delete(delete_setting))
}

#[utoipa::path(
    get,
    path = "/api/settings",
    responses(
        (status = 200, description = "All shop settings", body = ApiResponse<SettingList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Settings"
)]
pub async fn list_settings(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<ApiResponse<SettingList>>> {
    let resp = setting_service::list_settings(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/settings/{key}",
    params(("key" = String, Path, description = "Setting key")),
    responses(
        (status = 200, description = "One setting", body = ApiResponse<Setting>),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Settings"
)]
pub async fn get_setting(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(key): Path<String>,
) -> AppResult<Json<ApiResponse<Setting>>> {
    let resp = setting_service::get_setting(&state, &key).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/settings/{key}",
    params(("key" = String, Path, description = "Setting key")),
    request_body = PutSettingRequest,
    responses(
        (status = 200, description = "Create or replace (admin only)", body = ApiResponse<Setting>),
        (status = 400, description = "Invalid key")
    ),
    security(("bearer_auth" = [])),
    tag = "Settings"
)]
pub async fn put_setting(
    State(state): State<AppState>,
    user: AuthUser,
    Path(key): Path<String>,
    Json(payload): Json<PutSettingRequest>,
) -> AppResult<Json<ApiResponse<Setting>>> {
    let resp = setting_service::put_setting(&state, &user, &key, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/settings/{key}",
    params(("key" = String, Path, description = "Setting key")),
    responses(
        (status = 200, description = "Delete (admin only)"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Settings"
)]
pub async fn delete_setting(
    State(state): State<AppState>,
    user: AuthUser,
    Path(key): Path<String>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = setting_service::delete_setting(&state, &user, &key).await?;
    Ok(Json(resp))
}
