use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};

use crate::{
    config::jwt_ttl_hours,
    dto::auth::{ChangePasswordRequest, Claims, LoginRequest, LoginResponse},
    entity::users::{ActiveModel as UserActive, Column as UserCol, Entity as Users},
    error::{AppError, AppResult},
    history::note,
    middleware::auth::{AuthUser, jwt_secret},
    models::{Role, User},
    response::{ApiResponse, Meta},
    services::user_service::user_from_entity,
    state::AppState,
};

pub const MIN_PASSWORD_LEN: usize = 6;

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub fn issue_token(user_id: uuid::Uuid, role: Role) -> AppResult<String> {
    let secret = jwt_secret()?;

    let expiration = token_expiry(Utc::now(), jwt_ttl_hours())?;

    let claims = Claims {
        sub: user_id.to_string(),
        role: role.as_str().to_string(),
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

fn token_expiry(now: DateTime<Utc>, ttl_hours: i64) -> AppResult<DateTime<Utc>> {
    TimeDelta::try_hours(ttl_hours)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let LoginRequest { email, password } = payload;
    let user = Users::find()
        .filter(UserCol::Email.eq(email.trim().to_lowercase()))
        .one(&state.orm)
        .await?;

    let user = match user {
        Some(u) => u,
        None => return Err(AppError::BadRequest("Invalid email or password".into())),
    };

    if !verify_password(&password, &user.password_hash)? {
        return Err(AppError::BadRequest("Invalid email or password".into()));
    }

    let user = user_from_entity(user)?;
    let token = issue_token(user.id, user.role)?;

    note(&state.pool, Some(user.id), "user_login").await;

    Ok(ApiResponse::success(
        "Logged in",
        LoginResponse {
            token: format!("Bearer {}", token),
            user,
        },
        Some(Meta::empty()),
    ))
}

pub async fn me(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<User>> {
    let found = Users::find_by_id(user.user_id).one(&state.orm).await?;
    let found = match found {
        Some(u) => u,
        None => return Err(AppError::Unauthorized),
    };
    Ok(ApiResponse::success("Me", user_from_entity(found)?, None))
}

pub async fn change_password(
    state: &AppState,
    user: &AuthUser,
    payload: ChangePasswordRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    if payload.new_password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let existing = Users::find_by_id(user.user_id).one(&state.orm).await?;
    let existing = match existing {
        Some(u) => u,
        None => return Err(AppError::Unauthorized),
    };

    if !verify_password(&payload.old_password, &existing.password_hash)? {
        return Err(AppError::BadRequest("Old password is incorrect".into()));
    }

    let mut active: UserActive = existing.into();
    active.password_hash = Set(hash_password(&payload.new_password)?);
    active.update(&state.orm).await?;

    note(&state.pool, Some(user.user_id), "change password").await;

    Ok(ApiResponse::done("Password changed"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashed_password_verifies_only_the_original() {
        let hash = hash_password("espresso").expect("hash");
        assert!(verify_password("espresso", &hash).expect("verify"));
        assert!(!verify_password("decaf", &hash).expect("verify"));
    }

    #[test]
    fn token_expiry_is_checked() {
        let now = Utc::now();
        let in_a_day = token_expiry(now, 24).expect("expiry");
        assert_eq!(in_a_day - now, TimeDelta::hours(24));
        assert!(token_expiry(now, i64::MAX).is_err());
    }
}
