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
    dto::foods::{AvailabilityRequest, CreateFoodRequest, FoodList, UpdateFoodRequest},
    entity::{
        categories::Entity as Categories,
        foods::{ActiveModel, Column, Entity as Foods, Model as FoodModel},
    },
    error::{AppError, AppResult},
    history::note,
    middleware::auth::{AuthUser, ensure_admin},
    models::{Food, MAX_PRICE},
    response::{ApiResponse, Meta},
    routes::params::{FoodQuery, FoodSortBy, Pagination, SortOrder},
    state::AppState,
};

const DEFAULT_BEST_SELLERS: u64 = 5;

pub async fn list_foods(
    state: &AppState,
    pagination: Pagination,
    query: FoodQuery,
) -> AppResult<ApiResponse<FoodList>> {
    let (page, limit, offset) = pagination.normalize();
    let mut condition = Condition::all();

    if let Some(search) = query.q.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(Expr::col(Column::Name).ilike(pattern));
    }
    if let Some(category_id) = query.category_id {
        condition = condition.add(Column::CategoryId.eq(category_id));
    }
    if let Some(available) = query.available {
        condition = condition.add(Column::IsAvailable.eq(available));
    }

    let sort_by = query.sort_by.unwrap_or(FoodSortBy::Name);
    let sort_order = query.sort_order.unwrap_or(match sort_by {
        FoodSortBy::Name => SortOrder::Asc,
        _ => SortOrder::Desc,
    });
    let sort_col = match sort_by {
        FoodSortBy::CreatedAt => Column::CreatedAt,
        FoodSortBy::Price => Column::Price,
        FoodSortBy::Name => Column::Name,
        FoodSortBy::Sold => Column::Sold,
    };

    let mut finder = Foods::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(food_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Foods", FoodList { items }, Some(meta)))
}

pub async fn best_sellers(state: &AppState, limit: Option<u64>) -> AppResult<ApiResponse<FoodList>> {
    let limit = limit.unwrap_or(DEFAULT_BEST_SELLERS).clamp(1, 50);
    let items = Foods::find()
        .filter(Column::Sold.gt(0))
        .order_by_desc(Column::Sold)
        .order_by_asc(Column::Name)
        .limit(limit)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(food_from_entity)
        .collect();
    Ok(ApiResponse::success("Best sellers", FoodList { items }, None))
}

pub async fn get_food(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Food>> {
    let result = Foods::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(food_from_entity);
    let result = match result {
        Some(f) => f,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success("Food", result, None))
}

pub async fn create_food(
    state: &AppState,
    user: &AuthUser,
    payload: CreateFoodRequest,
) -> AppResult<ApiResponse<Food>> {
    ensure_admin(user)?;
    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::BadRequest("name must not be empty".into()));
    }
    validate_price(payload.price)?;
    if let Some(category_id) = payload.category_id {
        ensure_category_exists(state, category_id).await?;
    }
    let taken = Foods::find()
        .filter(Column::Name.eq(name.as_str()))
        .one(&state.orm)
        .await?;
    if taken.is_some() {
        return Err(AppError::Conflict(format!("{name} is already on the menu")));
    }

    let food = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        price: Set(payload.price),
        is_available: Set(payload.is_available.unwrap_or(true)),
        category_id: Set(payload.category_id),
        image_url: Set(payload.image_url),
        sold: Set(0),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    note(
        &state.pool,
        Some(user.user_id),
        format!("create food {}", food.name),
    )
    .await;

    Ok(ApiResponse::success(
        "Food created",
        food_from_entity(food),
        Some(Meta::empty()),
    ))
}

pub async fn update_food(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateFoodRequest,
) -> AppResult<ApiResponse<Food>> {
    ensure_admin(user)?;
    let existing = Foods::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(f) => f,
        None => return Err(AppError::NotFound),
    };

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(price) = payload.price {
        validate_price(price)?;
        active.price = Set(price);
    }
    if let Some(category_id) = payload.category_id {
        ensure_category_exists(state, category_id).await?;
        active.category_id = Set(Some(category_id));
    }
    if let Some(image_url) = payload.image_url {
        active.image_url = Set(Some(image_url));
    }
    if let Some(is_available) = payload.is_available {
        active.is_available = Set(is_available);
    }

    let food = active.update(&state.orm).await?;

    note(
        &state.pool,
        Some(user.user_id),
        format!("update food {}", food.name),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        food_from_entity(food),
        Some(Meta::empty()),
    ))
}

pub async fn set_availability(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: AvailabilityRequest,
) -> AppResult<ApiResponse<Food>> {
    update_food(
        state,
        user,
        id,
        UpdateFoodRequest {
            name: None,
            price: None,
            category_id: None,
            image_url: None,
            is_available: Some(payload.is_available),
        },
    )
    .await
}

pub async fn delete_food(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = Foods::delete_by_id(id).exec(&state.orm).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    note(&state.pool, Some(user.user_id), format!("delete food {id}")).await;

    Ok(ApiResponse::done("Deleted"))
}

fn validate_price(price: i64) -> AppResult<()> {
    if !(0..=MAX_PRICE).contains(&price) {
        return Err(AppError::BadRequest(format!(
            "price must be between 0 and {MAX_PRICE}"
        )));
    }
    Ok(())
}

async fn ensure_category_exists(state: &AppState, id: Uuid) -> AppResult<()> {
    if Categories::find_by_id(id).one(&state.orm).await?.is_none() {
        return Err(AppError::BadRequest("category not found".into()));
    }
    Ok(())
}

pub(crate) fn food_from_entity(model: FoodModel) -> Food {
    Food {
        id: model.id,
        name: model.name,
        price: model.price,
        is_available: model.is_available,
        category_id: model.category_id,
        image_url: model.image_url,
        sold: model.sold,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_bounds() {
        assert!(validate_price(-1).is_err());
        assert!(validate_price(0).is_ok());
        assert!(validate_price(MAX_PRICE).is_ok());
        assert!(validate_price(MAX_PRICE + 1).is_err());
        assert!(validate_price(i64::MAX).is_err());
    }
}
