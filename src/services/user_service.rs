use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    dto::users::{CreateUserRequest, UpdateProfileRequest, UpdateUserRequest, UserList},
    entity::users::{ActiveModel as UserActive, Column as UserCol, Entity as Users, Model as UserModel},
    error::{AppError, AppResult},
    history::note,
    middleware::auth::{AuthUser, ensure_admin},
    models::{Role, User},
    response::{ApiResponse, Meta},
    routes::params::{Pagination, UserQuery},
    services::auth_service::{MIN_PASSWORD_LEN, hash_password},
    state::AppState,
};

pub async fn create_user(
    state: &AppState,
    user: &AuthUser,
    payload: CreateUserRequest,
) -> AppResult<ApiResponse<User>> {
    ensure_admin(user)?;
    let email = payload.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::BadRequest("email is invalid".into()));
    }
    if payload.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let taken = Users::find()
        .filter(UserCol::Email.eq(email.as_str()))
        .one(&state.orm)
        .await?;
    if taken.is_some() {
        return Err(AppError::BadRequest("Email is already taken".to_string()));
    }

    let created = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(email),
        name: Set(payload.name.trim().to_string()),
        password_hash: Set(hash_password(&payload.password)?),
        role: Set(payload.role.as_str().to_string()),
        phone: Set(payload.phone),
        image_url: Set(payload.image_url),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    note(
        &state.pool,
        Some(user.user_id),
        format!("create user {}", created.email),
    )
    .await;

    Ok(ApiResponse::success(
        "User created",
        user_from_entity(created)?,
        Some(Meta::empty()),
    ))
}

pub async fn list_users(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
    query: UserQuery,
) -> AppResult<ApiResponse<UserList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = pagination.normalize();

    let mut condition = Condition::all();
    if let Some(search) = query.q.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(UserCol::Name).ilike(pattern.clone()))
                .add(Expr::col(UserCol::Email).ilike(pattern)),
        );
    }

    let finder = Users::find()
        .filter(condition)
        .order_by_asc(UserCol::Name);
    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(user_from_entity)
        .collect::<AppResult<Vec<_>>>()?;

    Ok(ApiResponse::success(
        "Users",
        UserList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_user(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<ApiResponse<User>> {
    ensure_admin(user)?;
    let found = Users::find_by_id(id).one(&state.orm).await?;
    let found = match found {
        Some(u) => u,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success("User", user_from_entity(found)?, None))
}

pub async fn update_user(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateUserRequest,
) -> AppResult<ApiResponse<User>> {
    ensure_admin(user)?;
    let existing = Users::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(u) => u,
        None => return Err(AppError::NotFound),
    };

    if id == user.user_id && payload.role.is_some_and(|r| r != Role::Admin) {
        return Err(AppError::BadRequest("Cannot demote yourself".into()));
    }

    let mut active: UserActive = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(role) = payload.role {
        active.role = Set(role.as_str().to_string());
    }
    if let Some(phone) = payload.phone {
        active.phone = Set(Some(phone));
    }
    if let Some(image_url) = payload.image_url {
        active.image_url = Set(Some(image_url));
    }
    let updated = active.update(&state.orm).await?;

    note(
        &state.pool,
        Some(user.user_id),
        format!("update user {}", updated.email),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        user_from_entity(updated)?,
        Some(Meta::empty()),
    ))
}

pub async fn update_profile(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateProfileRequest,
) -> AppResult<ApiResponse<User>> {
    let existing = Users::find_by_id(user.user_id).one(&state.orm).await?;
    let existing = match existing {
        Some(u) => u,
        None => return Err(AppError::Unauthorized),
    };

    let mut active: UserActive = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(phone) = payload.phone {
        active.phone = Set(Some(phone));
    }
    if let Some(image_url) = payload.image_url {
        active.image_url = Set(Some(image_url));
    }
    let updated = active.update(&state.orm).await?;

    note(&state.pool, Some(user.user_id), "update profile").await;

    Ok(ApiResponse::success(
        "Profile updated",
        user_from_entity(updated)?,
        Some(Meta::empty()),
    ))
}

pub async fn delete_user(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    if id == user.user_id {
        return Err(AppError::BadRequest("Cannot delete yourself".into()));
    }

    let result = Users::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    note(&state.pool, Some(user.user_id), format!("delete user {id}")).await;

    Ok(ApiResponse::done("Deleted"))
}

pub(crate) fn user_from_entity(model: UserModel) -> AppResult<User> {
    Ok(User {
        id: model.id,
        email: model.email,
        name: model.name,
        role: model.role.parse()?,
        phone: model.phone,
        image_url: model.image_url,
        created_at: model.created_at.with_timezone(&Utc),
    })
}
