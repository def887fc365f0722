use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{EntityTrait, QueryOrder, Set};

use crate::{
    dto::settings::{PutSettingRequest, SettingList},
    entity::settings::{ActiveModel as SettingActive, Column as SettingCol, Entity as Settings, Model as SettingModel},
    error::{AppError, AppResult},
    history::note,
    middleware::auth::{AuthUser, ensure_admin},
    models::Setting,
    response::{ApiResponse, Meta},
    state::AppState,
};

const MAX_KEY_LEN: usize = 64;

pub async fn list_settings(state: &AppState) -> AppResult<ApiResponse<SettingList>> {
    let items = Settings::find()
        .order_by_asc(SettingCol::Key)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(setting_from_entity)
        .collect();
    Ok(ApiResponse::success("Settings", SettingList { items }, None))
}

pub async fn get_setting(state: &AppState, key: &str) -> AppResult<ApiResponse<Setting>> {
    let setting = Settings::find_by_id(key.to_string()).one(&state.orm).await?;
    let setting = match setting {
        Some(s) => s,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success("Setting", setting_from_entity(setting), None))
}

pub async fn put_setting(
    state: &AppState,
    user: &AuthUser,
    key: &str,
    payload: PutSettingRequest,
) -> AppResult<ApiResponse<Setting>> {
    ensure_admin(user)?;
    validate_key(key)?;

    let active = SettingActive {
        key: Set(key.to_string()),
        value: Set(payload.value),
        updated_at: Set(Utc::now().into()),
    };
    Settings::insert(active)
        .on_conflict(
            OnConflict::column(SettingCol::Key)
                .update_columns([SettingCol::Value, SettingCol::UpdatedAt])
                .to_owned(),
        )
        .exec_without_returning(&state.orm)
        .await?;

    let setting = Settings::find_by_id(key.to_string()).one(&state.orm).await?;
    let setting = match setting {
        Some(s) => s,
        None => return Err(AppError::NotFound),
    };

    note(&state.pool, Some(user.user_id), format!("set config {key}")).await;

    Ok(ApiResponse::success(
        "Setting saved",
        setting_from_entity(setting),
        Some(Meta::empty()),
    ))
}

pub async fn delete_setting(
    state: &AppState,
    user: &AuthUser,
    key: &str,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = Settings::delete_by_id(key.to_string()).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    note(&state.pool, Some(user.user_id), format!("delete config {key}")).await;

    Ok(ApiResponse::done("Deleted"))
}

fn validate_key(key: &str) -> AppResult<()> {
    let valid = !key.is_empty()
        && key.len() <= MAX_KEY_LEN
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-');
    if !valid {
        return Err(AppError::BadRequest("invalid setting key".into()));
    }
    Ok(())
}

fn setting_from_entity(model: SettingModel) -> Setting {
    Setting {
        key: model.key,
        value: model.value,
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setting_keys_are_restricted_to_a_safe_charset() {
        assert!(validate_key("shop.name").is_ok());
        assert!(validate_key("wifi_password").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("has space").is_err());
        assert!(validate_key(&"k".repeat(MAX_KEY_LEN + 1)).is_err());
    }
}
