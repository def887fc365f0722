use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{LockType, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QuerySelect, Set,
    TransactionTrait,
};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    dto::{
        bills::{BillLineRequest, BillWithItems},
        cart::{AddToCartRequest, CartItemDto, CartList, PlaceOrderRequest, UpdateCartRequest},
    },
    entity::{
        cart_items::{ActiveModel as CartActive, Column as CartCol, Entity as CartItems},
        dining_tables::Entity as DiningTables,
        foods::Entity as Foods,
    },
    error::{AppError, AppResult},
    history::note,
    middleware::auth::AuthUser,
    models::{BillTotals, CartItem, validate_quantity},
    response::{ApiResponse, Meta},
    services::bill_service::{
        add_lines, bill_with_items, lock_unpaid_bill, open_bill_on_table, refresh_totals,
    },
    state::AppState,
};

#[derive(FromRow)]
struct CartWithFoodRow {
    cart_id: Uuid,
    quantity: i32,
    food_id: Uuid,
    name: String,
    price: i64,
    is_available: bool,
}

pub async fn list_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CartList>> {
    let rows = sqlx::query_as::<_, CartWithFoodRow>(
        r#"
        SELECT ci.id AS cart_id, ci.quantity,
               f.id AS food_id, f.name, f.price, f.is_available
        FROM cart_items ci
        JOIN foods f ON f.id = ci.food_id
        WHERE ci.user_id = $1
        ORDER BY ci.created_at ASC
        "#,
    )
    .bind(user.user_id)
    .fetch_all(&state.pool)
    .await?;

    let items: Vec<CartItemDto> = rows
        .into_iter()
        .map(|row| CartItemDto {
            id: row.cart_id,
            food_id: row.food_id,
            name: row.name,
            price: row.price,
            is_available: row.is_available,
            quantity: row.quantity,
        })
        .collect();
    let total = cart_total(&items)?;

    let meta = Meta::single_page(items.len());
    Ok(ApiResponse::success("OK", CartList { items, total }, Some(meta)))
}

/// One line per (user, food); adding again replaces the quantity.
pub async fn add_to_cart(
    state: &AppState,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartItem>> {
    validate_quantity(payload.quantity)?;

    let food = Foods::find_by_id(payload.food_id).one(&state.orm).await?;
    match food {
        None => return Err(AppError::BadRequest("food not found".to_string())),
        Some(f) if !f.is_available => {
            return Err(AppError::BadRequest(format!("{} is not available", f.name)));
        }
        Some(_) => {}
    }

    let line = CartActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        food_id: Set(payload.food_id),
        quantity: Set(payload.quantity),
        created_at: NotSet,
    };
    CartItems::insert(line)
        .on_conflict(
            OnConflict::columns([CartCol::UserId, CartCol::FoodId])
                .update_column(CartCol::Quantity)
                .to_owned(),
        )
        .exec_without_returning(&state.orm)
        .await?;

    let cart_item = match find_line(state, user.user_id, payload.food_id).await? {
        Some(item) => item,
        None => return Err(AppError::NotFound),
    };

    Ok(ApiResponse::success(
        "OK",
        cart_item_from_entity(cart_item),
        None,
    ))
}

pub async fn update_quantity(
    state: &AppState,
    user: &AuthUser,
    food_id: Uuid,
    payload: UpdateCartRequest,
) -> AppResult<ApiResponse<CartItem>> {
    validate_quantity(payload.quantity)?;
    let existing = find_line(state, user.user_id, food_id).await?;
    let existing = match existing {
        Some(item) => item,
        None => return Err(AppError::NotFound),
    };

    let mut active: CartActive = existing.into();
    active.quantity = Set(payload.quantity);
    let cart_item = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "OK",
        cart_item_from_entity(cart_item),
        None,
    ))
}

pub async fn remove_from_cart(
    state: &AppState,
    user: &AuthUser,
    food_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = CartItems::delete_many()
        .filter(
            Condition::all()
                .add(CartCol::UserId.eq(user.user_id))
                .add(CartCol::FoodId.eq(food_id)),
        )
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    Ok(ApiResponse::done("Removed from cart"))
}

pub async fn clear_cart(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = CartItems::delete_many()
        .filter(CartCol::UserId.eq(user.user_id))
        .exec(&state.orm)
        .await?;

    Ok(ApiResponse::success(
        "Cart cleared",
        serde_json::json!({ "removed": result.rows_affected }),
        Some(Meta::empty()),
    ))
}

/// Moves the whole cart onto the table's bill, opening one when the table is empty.
pub async fn place_order(
    state: &AppState,
    user: &AuthUser,
    payload: PlaceOrderRequest,
) -> AppResult<ApiResponse<BillWithItems>> {
    let txn = state.orm.begin().await?;

    let lines: Vec<BillLineRequest> = CartItems::find()
        .filter(CartCol::UserId.eq(user.user_id))
        .lock(LockType::Update)
        .all(&txn)
        .await?
        .into_iter()
        .map(|item| BillLineRequest {
            food_id: item.food_id,
            quantity: item.quantity,
        })
        .collect();
    if lines.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }

    let table = DiningTables::find_by_id(payload.table_id).one(&txn).await?;
    let table = match table {
        Some(t) => t,
        None => return Err(AppError::NotFound),
    };

    let bill = match table.bill_id {
        Some(bill_id) => lock_unpaid_bill(&txn, bill_id).await?,
        None => open_bill_on_table(&txn, table.id, user.user_id).await?,
    };

    add_lines(&txn, bill.id, &lines).await?;
    let bill = refresh_totals(&txn, bill).await?;
    let data = bill_with_items(&txn, bill).await?;

    CartItems::delete_many()
        .filter(CartCol::UserId.eq(user.user_id))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    note(
        &state.pool,
        Some(user.user_id),
        format!(
            "place order of {} item(s) on table {}",
            lines.len(),
            data.bill.table_number
        ),
    )
    .await;

    Ok(ApiResponse::success(
        "Order placed",
        data,
        Some(Meta::empty()),
    ))
}

fn cart_total(items: &[CartItemDto]) -> AppResult<i64> {
    let totals = BillTotals::compute(items.iter().map(|item| (item.price, item.quantity)), 0)?;
    Ok(totals.subtotal)
}

async fn find_line(
    state: &AppState,
    user_id: Uuid,
    food_id: Uuid,
) -> AppResult<Option<crate::entity::cart_items::Model>> {
    let item = CartItems::find()
        .filter(
            Condition::all()
                .add(CartCol::UserId.eq(user_id))
                .add(CartCol::FoodId.eq(food_id)),
        )
        .one(&state.orm)
        .await?;
    Ok(item)
}

fn cart_item_from_entity(model: crate::entity::cart_items::Model) -> CartItem {
    CartItem {
        id: model.id,
        user_id: model.user_id,
        food_id: model.food_id,
        quantity: model.quantity,
        created_at: model.created_at.with_timezone(&chrono::Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cart_total_multiplies_price_by_quantity() {
        let line = |price, quantity| CartItemDto {
            id: Uuid::new_v4(),
            food_id: Uuid::new_v4(),
            name: "Cappuccino".into(),
            price,
            is_available: true,
            quantity,
        };
        assert_eq!(cart_total(&[line(30_000, 2), line(15_000, 1)]).expect("total"), 75_000);
        assert_eq!(cart_total(&[]).expect("total"), 0);
    }

    #[test]
    fn cart_total_rejects_overflow() {
        let line = CartItemDto {
            id: Uuid::new_v4(),
            food_id: Uuid::new_v4(),
            name: "Gold Leaf Latte".into(),
            price: i64::MAX,
            is_available: true,
            quantity: 2,
        };
        assert!(matches!(cart_total(&[line]), Err(AppError::BadRequest(_))));
    }
}
