use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::{
    dto::promotions::{CreatePromotionRequest, PromotionList, UpdatePromotionRequest},
    entity::promotions::{ActiveModel as PromotionActive, Column as PromotionCol, Entity as Promotions, Model as PromotionModel},
    error::{AppError, AppResult},
    history::note,
    middleware::auth::{AuthUser, ensure_admin},
    models::Promotion,
    response::{ApiResponse, Meta},
    routes::params::PromotionQuery,
    state::AppState,
};

pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

pub async fn list_promotions(
    state: &AppState,
    query: PromotionQuery,
) -> AppResult<ApiResponse<PromotionList>> {
    let mut finder = Promotions::find();
    if query.active_only.unwrap_or(false) {
        let now: sea_orm::prelude::DateTimeWithTimeZone = Utc::now().into();
        finder = finder.filter(PromotionCol::ExpiresAt.gt(now));
    }
    let items = finder
        .order_by_asc(PromotionCol::ExpiresAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(promotion_from_entity)
        .collect();
    Ok(ApiResponse::success("Promotions", PromotionList { items }, None))
}

/// Looks a code up for the checkout screen. Expired codes are rejected.
pub async fn get_by_code(state: &AppState, code: &str) -> AppResult<ApiResponse<Promotion>> {
    let promotion = find_active_promotion(&state.orm, code).await?;
    Ok(ApiResponse::success("Promotion", promotion, None))
}

pub async fn create_promotion(
    state: &AppState,
    user: &AuthUser,
    payload: CreatePromotionRequest,
) -> AppResult<ApiResponse<Promotion>> {
    ensure_admin(user)?;
    let code = normalize_code(&payload.code);
    if code.is_empty() {
        return Err(AppError::BadRequest("code must not be empty".into()));
    }
    validate_percent(payload.discount_percent)?;

    let taken = Promotions::find()
        .filter(PromotionCol::Code.eq(code.as_str()))
        .one(&state.orm)
        .await?;
    if taken.is_some() {
        return Err(AppError::Conflict(format!("promotion {code} already exists")));
    }

    let promotion = PromotionActive {
        id: Set(Uuid::new_v4()),
        code: Set(code),
        discount_percent: Set(payload.discount_percent),
        expires_at: Set(payload.expires_at.into()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    note(
        &state.pool,
        Some(user.user_id),
        format!("create promotion {}", promotion.code),
    )
    .await;

    Ok(ApiResponse::success(
        "Promotion created",
        promotion_from_entity(promotion),
        Some(Meta::empty()),
    ))
}

pub async fn update_promotion(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdatePromotionRequest,
) -> AppResult<ApiResponse<Promotion>> {
    ensure_admin(user)?;
    let existing = Promotions::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    let mut active: PromotionActive = existing.into();
    if let Some(percent) = payload.discount_percent {
        validate_percent(percent)?;
        active.discount_percent = Set(percent);
    }
    if let Some(expires_at) = payload.expires_at {
        active.expires_at = Set(expires_at.into());
    }
    let promotion = active.update(&state.orm).await?;

    note(
        &state.pool,
        Some(user.user_id),
        format!("update promotion {}", promotion.code),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        promotion_from_entity(promotion),
        Some(Meta::empty()),
    ))
}

pub async fn delete_promotion(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = Promotions::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    note(&state.pool, Some(user.user_id), format!("delete promotion {id}")).await;

    Ok(ApiResponse::done("Deleted"))
}

pub(crate) async fn find_active_promotion<C>(conn: &C, code: &str) -> AppResult<Promotion>
where
    C: ConnectionTrait,
{
    let promotion = Promotions::find()
        .filter(PromotionCol::Code.eq(normalize_code(code)))
        .one(conn)
        .await?;
    let promotion = match promotion {
        Some(p) => promotion_from_entity(p),
        None => return Err(AppError::NotFound),
    };
    if !promotion.is_active_at(Utc::now()) {
        return Err(AppError::BadRequest("Promotion has expired".into()));
    }
    Ok(promotion)
}

fn validate_percent(percent: i32) -> AppResult<()> {
    if !(1..=100).contains(&percent) {
        return Err(AppError::BadRequest(
            "discount_percent must be between 1 and 100".into(),
        ));
    }
    Ok(())
}

fn promotion_from_entity(model: PromotionModel) -> Promotion {
    Promotion {
        id: model.id,
        code: model.code,
        discount_percent: model.discount_percent,
        expires_at: model.expires_at.with_timezone(&Utc),
        created_at: model.created_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_trimmed_and_upper_cased() {
        assert_eq!(normalize_code("  latte10 "), "LATTE10");
    }

    #[test]
    fn percent_must_be_within_one_and_hundred() {
        assert!(validate_percent(0).is_err());
        assert!(validate_percent(1).is_ok());
        assert!(validate_percent(100).is_ok());
        assert!(validate_percent(101).is_err());
    }
}
