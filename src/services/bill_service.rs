use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    dto::bills::{
        AddItemsRequest, ApplyPromotionRequest, BillLineRequest, BillList, BillWithItems,
        DiscountRequest, OpenBillRequest, UpdateItemRequest,
    },
    entity::{
        bill_items::{ActiveModel as BillItemActive, Column as BillItemCol, Entity as BillItems, Model as BillItemModel},
        bills::{ActiveModel as BillActive, Column as BillCol, Entity as Bills, Model as BillModel},
        dining_tables::{ActiveModel as TableActive, Entity as DiningTables},
        foods::{Column as FoodCol, Entity as Foods},
    },
    error::{AppError, AppResult},
    history::note,
    middleware::auth::{AuthUser, ensure_admin},
    models::{Bill, BillItem, BillTotals, TableStatus, validate_quantity},
    response::{ApiResponse, Meta},
    routes::params::{BillListQuery, Pagination},
    services::{promotion_service::find_active_promotion, statistics_service::{day_end, day_start}},
    state::AppState,
};

pub async fn open_bill(
    state: &AppState,
    user: &AuthUser,
    payload: OpenBillRequest,
) -> AppResult<ApiResponse<BillWithItems>> {
    let txn = state.orm.begin().await?;
    let bill = open_bill_on_table(&txn, payload.table_id, user.user_id).await?;
    txn.commit().await?;

    note(
        &state.pool,
        Some(user.user_id),
        format!("open bill for table {}", bill.table_number),
    )
    .await;

    Ok(ApiResponse::success(
        "Bill opened",
        BillWithItems {
            bill: bill_from_entity(bill),
            items: Vec::new(),
        },
        Some(Meta::empty()),
    ))
}

pub async fn get_bill(state: &AppState, id: Uuid) -> AppResult<ApiResponse<BillWithItems>> {
    let bill = Bills::find_by_id(id).one(&state.orm).await?;
    let bill = match bill {
        Some(b) => b,
        None => return Err(AppError::NotFound),
    };
    let data = bill_with_items(&state.orm, bill).await?;
    Ok(ApiResponse::success("Bill", data, Some(Meta::empty())))
}

/// The bill currently attached to a table.
pub async fn get_table_bill(
    state: &AppState,
    table_id: Uuid,
) -> AppResult<ApiResponse<BillWithItems>> {
    let table = DiningTables::find_by_id(table_id).one(&state.orm).await?;
    let bill_id = match table.and_then(|t| t.bill_id) {
        Some(id) => id,
        None => return Err(AppError::NotFound),
    };
    get_bill(state, bill_id).await
}

pub async fn list_bills(
    state: &AppState,
    pagination: Pagination,
    query: BillListQuery,
) -> AppResult<ApiResponse<BillList>> {
    let (page, limit, offset) = pagination.normalize();

    let mut condition = Condition::all();
    if let Some(paid) = query.paid {
        condition = condition.add(BillCol::IsPaid.eq(paid));
    }
    if let Some(table_id) = query.table_id {
        condition = condition.add(BillCol::TableId.eq(table_id));
    }
    if let Some(from) = query.from {
        condition = condition.add(BillCol::CreatedAt.gte(day_start(from).fixed_offset()));
    }
    if let Some(to) = query.to {
        condition = condition.add(BillCol::CreatedAt.lt(day_end(to)?.fixed_offset()));
    }

    let finder = Bills::find()
        .filter(condition)
        .order_by_desc(BillCol::CreatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(bill_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Bills",
        BillList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn add_items(
    state: &AppState,
    user: &AuthUser,
    bill_id: Uuid,
    payload: AddItemsRequest,
) -> AppResult<ApiResponse<BillWithItems>> {
    if payload.items.is_empty() {
        return Err(AppError::BadRequest("items must not be empty".into()));
    }

    let txn = state.orm.begin().await?;
    let bill = lock_unpaid_bill(&txn, bill_id).await?;
    add_lines(&txn, bill.id, &payload.items).await?;
    let bill = refresh_totals(&txn, bill).await?;
    let data = bill_with_items(&txn, bill).await?;
    txn.commit().await?;

    note(
        &state.pool,
        Some(user.user_id),
        format!(
            "add {} item(s) to bill of table {}",
            payload.items.len(),
            data.bill.table_number
        ),
    )
    .await;

    Ok(ApiResponse::success("Items added", data, Some(Meta::empty())))
}

/// Sets the quantity of one line; zero removes it.
pub async fn update_item(
    state: &AppState,
    user: &AuthUser,
    bill_id: Uuid,
    item_id: Uuid,
    payload: UpdateItemRequest,
) -> AppResult<ApiResponse<BillWithItems>> {
    if payload.quantity != 0 {
        validate_quantity(payload.quantity)?;
    }

    let txn = state.orm.begin().await?;
    let bill = lock_unpaid_bill(&txn, bill_id).await?;
    let item = find_item(&txn, bill.id, item_id).await?;

    if payload.quantity == 0 {
        BillItems::delete_by_id(item.id).exec(&txn).await?;
    } else {
        let mut active: BillItemActive = item.into();
        active.quantity = Set(payload.quantity);
        active.update(&txn).await?;
    }

    let bill = refresh_totals(&txn, bill).await?;
    let data = bill_with_items(&txn, bill).await?;
    txn.commit().await?;

    note(
        &state.pool,
        Some(user.user_id),
        format!("change item quantity on table {}", data.bill.table_number),
    )
    .await;

    Ok(ApiResponse::success("Item updated", data, Some(Meta::empty())))
}

pub async fn remove_item(
    state: &AppState,
    user: &AuthUser,
    bill_id: Uuid,
    item_id: Uuid,
) -> AppResult<ApiResponse<BillWithItems>> {
    update_item(state, user, bill_id, item_id, UpdateItemRequest { quantity: 0 }).await
}

pub async fn apply_promotion(
    state: &AppState,
    user: &AuthUser,
    bill_id: Uuid,
    payload: ApplyPromotionRequest,
) -> AppResult<ApiResponse<BillWithItems>> {
    let txn = state.orm.begin().await?;
    let bill = lock_unpaid_bill(&txn, bill_id).await?;
    let promotion = find_active_promotion(&txn, &payload.code).await?;

    let mut active: BillActive = bill.into();
    active.discount = Set(promotion.discount_percent);
    active.promotion_code = Set(Some(promotion.code.clone()));
    let bill = active.update(&txn).await?;
    let bill = refresh_totals(&txn, bill).await?;
    let data = bill_with_items(&txn, bill).await?;
    txn.commit().await?;

    note(
        &state.pool,
        Some(user.user_id),
        format!(
            "apply promotion {} to table {}",
            promotion.code, data.bill.table_number
        ),
    )
    .await;

    Ok(ApiResponse::success(
        "Promotion applied",
        data,
        Some(Meta::empty()),
    ))
}

/// Manual discount; clears any promotion code.
pub async fn set_discount(
    state: &AppState,
    user: &AuthUser,
    bill_id: Uuid,
    payload: DiscountRequest,
) -> AppResult<ApiResponse<BillWithItems>> {
    ensure_admin(user)?;
    if !(0..=100).contains(&payload.discount) {
        return Err(AppError::BadRequest(
            "discount must be between 0 and 100".into(),
        ));
    }

    let txn = state.orm.begin().await?;
    let bill = lock_unpaid_bill(&txn, bill_id).await?;
    let mut active: BillActive = bill.into();
    active.discount = Set(payload.discount);
    active.promotion_code = Set(None);
    let bill = active.update(&txn).await?;
    let bill = refresh_totals(&txn, bill).await?;
    let data = bill_with_items(&txn, bill).await?;
    txn.commit().await?;

    note(
        &state.pool,
        Some(user.user_id),
        format!(
            "set discount {}% on table {}",
            payload.discount, data.bill.table_number
        ),
    )
    .await;

    Ok(ApiResponse::success("Discount set", data, Some(Meta::empty())))
}

/// Flags the bill as prepared and served.
pub async fn mark_processed(
    state: &AppState,
    user: &AuthUser,
    bill_id: Uuid,
) -> AppResult<ApiResponse<BillWithItems>> {
    let txn = state.orm.begin().await?;
    let bill = lock_unpaid_bill(&txn, bill_id).await?;
    let mut active: BillActive = bill.into();
    active.is_processed = Set(true);
    active.updated_at = Set(Utc::now().into());
    let bill = active.update(&txn).await?;
    let data = bill_with_items(&txn, bill).await?;
    txn.commit().await?;

    note(
        &state.pool,
        Some(user.user_id),
        format!("processed bill of table {}", data.bill.table_number),
    )
    .await;

    Ok(ApiResponse::success(
        "Bill processed",
        data,
        Some(Meta::empty()),
    ))
}

/// Pays the bill, frees its table and credits the sold counters.
pub async fn checkout(
    state: &AppState,
    user: &AuthUser,
    bill_id: Uuid,
) -> AppResult<ApiResponse<BillWithItems>> {
    let txn = state.orm.begin().await?;
    let bill = lock_unpaid_bill(&txn, bill_id).await?;

    let items = BillItems::find()
        .filter(BillItemCol::BillId.eq(bill.id))
        .all(&txn)
        .await?;
    if items.is_empty() {
        return Err(AppError::BadRequest("Bill has no items".into()));
    }

    for item in &items {
        Foods::update_many()
            .col_expr(
                FoodCol::Sold,
                Expr::col(FoodCol::Sold).add(i64::from(item.quantity)),
            )
            .filter(FoodCol::Id.eq(item.food_id))
            .exec(&txn)
            .await?;
    }

    let totals = BillTotals::compute(items.iter().map(|i| (i.price, i.quantity)), bill.discount)?;
    let now = Utc::now();
    let mut active: BillActive = bill.into();
    active.subtotal = Set(totals.subtotal);
    active.total = Set(totals.total);
    active.is_paid = Set(true);
    active.paid_at = Set(Some(now.into()));
    active.updated_at = Set(now.into());
    let bill = active.update(&txn).await?;

    release_table(&txn, &bill).await?;
    txn.commit().await?;

    note(
        &state.pool,
        Some(user.user_id),
        format!(
            "checkout table {} total {}",
            bill.table_number, bill.total
        ),
    )
    .await;

    Ok(ApiResponse::success(
        "Checkout success",
        BillWithItems {
            bill: bill_from_entity(bill),
            items: items.into_iter().map(bill_item_from_entity).collect(),
        },
        Some(Meta::empty()),
    ))
}

/// Drops an unpaid bill and frees its table. Paid bills are kept for revenue.
pub async fn delete_bill(
    state: &AppState,
    user: &AuthUser,
    bill_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let txn = state.orm.begin().await?;
    let bill = lock_unpaid_bill(&txn, bill_id).await?;
    release_table(&txn, &bill).await?;
    Bills::delete_by_id(bill.id).exec(&txn).await?;
    txn.commit().await?;

    note(
        &state.pool,
        Some(user.user_id),
        format!("delete bill of table {}", bill.table_number),
    )
    .await;

    Ok(ApiResponse::done("Deleted"))
}

/// Attaches a fresh bill to an empty table; the table becomes occupied.
pub(crate) async fn open_bill_on_table<C>(
    conn: &C,
    table_id: Uuid,
    created_by: Uuid,
) -> AppResult<BillModel>
where
    C: ConnectionTrait,
{
    let table = DiningTables::find_by_id(table_id)
        .lock(LockType::Update)
        .one(conn)
        .await?;
    let table = match table {
        Some(t) => t,
        None => return Err(AppError::NotFound),
    };

    let status: TableStatus = table.status.parse()?;
    status.ensure_can_open_bill()?;
    if table.bill_id.is_some() {
        return Err(AppError::Conflict("Table is occupied".into()));
    }

    let bill = BillActive {
        id: Set(Uuid::new_v4()),
        table_id: Set(Some(table.id)),
        table_number: Set(table.number),
        discount: Set(0),
        promotion_code: Set(None),
        subtotal: Set(0),
        total: Set(0),
        is_paid: Set(false),
        is_processed: Set(false),
        created_by: Set(Some(created_by)),
        created_at: NotSet,
        updated_at: NotSet,
        paid_at: Set(None),
    }
    .insert(conn)
    .await?;

    let mut active: TableActive = table.into();
    active.status = Set(TableStatus::Occupied.as_str().to_string());
    active.bill_id = Set(Some(bill.id));
    active.update(conn).await?;

    Ok(bill)
}

/// Adds lines to a bill, merging quantities per food and snapshotting name and price.
pub(crate) async fn add_lines<C>(conn: &C, bill_id: Uuid, lines: &[BillLineRequest]) -> AppResult<()>
where
    C: ConnectionTrait,
{
    for line in lines {
        validate_quantity(line.quantity)?;

        let food = Foods::find_by_id(line.food_id).one(conn).await?;
        let food = match food {
            Some(f) => f,
            None => return Err(AppError::BadRequest("food not found".to_string())),
        };
        if !food.is_available {
            return Err(AppError::BadRequest(format!(
                "{} is not available",
                food.name
            )));
        }

        let existing = BillItems::find()
            .filter(
                Condition::all()
                    .add(BillItemCol::BillId.eq(bill_id))
                    .add(BillItemCol::FoodId.eq(food.id)),
            )
            .one(conn)
            .await?;

        match existing {
            Some(item) => {
                let quantity = item
                    .quantity
                    .checked_add(line.quantity)
                    .ok_or_else(|| AppError::BadRequest("amount out of range".into()))?;
                validate_quantity(quantity)?;
                let mut active: BillItemActive = item.into();
                active.quantity = Set(quantity);
                active.update(conn).await?;
            }
            None => {
                BillItemActive {
                    id: Set(Uuid::new_v4()),
                    bill_id: Set(bill_id),
                    food_id: Set(food.id),
                    name: Set(food.name),
                    price: Set(food.price),
                    quantity: Set(line.quantity),
                }
                .insert(conn)
                .await?;
            }
        }
    }
    Ok(())
}

/// Recomputes subtotal and total from the stored lines.
pub(crate) async fn refresh_totals<C>(conn: &C, bill: BillModel) -> AppResult<BillModel>
where
    C: ConnectionTrait,
{
    let items = BillItems::find()
        .filter(BillItemCol::BillId.eq(bill.id))
        .all(conn)
        .await?;
    let totals = BillTotals::compute(items.iter().map(|i| (i.price, i.quantity)), bill.discount)?;

    let mut active: BillActive = bill.into();
    active.subtotal = Set(totals.subtotal);
    active.total = Set(totals.total);
    active.updated_at = Set(Utc::now().into());
    Ok(active.update(conn).await?)
}

pub(crate) async fn lock_unpaid_bill<C>(conn: &C, id: Uuid) -> AppResult<BillModel>
where
    C: ConnectionTrait,
{
    let bill = Bills::find_by_id(id)
        .lock(LockType::Update)
        .one(conn)
        .await?;
    let bill = match bill {
        Some(b) => b,
        None => return Err(AppError::NotFound),
    };
    if bill.is_paid {
        return Err(AppError::BadRequest("Bill already paid".into()));
    }
    Ok(bill)
}

pub(crate) async fn bill_with_items<C>(conn: &C, bill: BillModel) -> AppResult<BillWithItems>
where
    C: ConnectionTrait,
{
    let items = BillItems::find()
        .filter(BillItemCol::BillId.eq(bill.id))
        .order_by_asc(BillItemCol::Name)
        .all(conn)
        .await?
        .into_iter()
        .map(bill_item_from_entity)
        .collect();
    Ok(BillWithItems {
        bill: bill_from_entity(bill),
        items,
    })
}

async fn find_item<C>(conn: &C, bill_id: Uuid, item_id: Uuid) -> AppResult<BillItemModel>
where
    C: ConnectionTrait,
{
    let item = BillItems::find()
        .filter(
            Condition::all()
                .add(BillItemCol::Id.eq(item_id))
                .add(BillItemCol::BillId.eq(bill_id)),
        )
        .one(conn)
        .await?;
    match item {
        Some(i) => Ok(i),
        None => Err(AppError::NotFound),
    }
}

/// Back to EMPTY, only if the table still points at this bill.
async fn release_table<C>(conn: &C, bill: &BillModel) -> AppResult<()>
where
    C: ConnectionTrait,
{
    let Some(table_id) = bill.table_id else {
        return Ok(());
    };
    let table = DiningTables::find_by_id(table_id)
        .lock(LockType::Update)
        .one(conn)
        .await?;
    if let Some(table) = table.filter(|t| t.bill_id == Some(bill.id)) {
        let mut active: TableActive = table.into();
        active.status = Set(TableStatus::Empty.as_str().to_string());
        active.bill_id = Set(None);
        active.update(conn).await?;
    }
    Ok(())
}

pub(crate) fn bill_from_entity(model: BillModel) -> Bill {
    Bill {
        id: model.id,
        table_id: model.table_id,
        table_number: model.table_number,
        discount: model.discount,
        promotion_code: model.promotion_code,
        subtotal: model.subtotal,
        total: model.total,
        is_paid: model.is_paid,
        is_processed: model.is_processed,
        created_by: model.created_by,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
        paid_at: model.paid_at.map(|dt| dt.with_timezone(&Utc)),
    }
}

fn bill_item_from_entity(model: BillItemModel) -> BillItem {
    BillItem {
        id: model.id,
        bill_id: model.bill_id,
        food_id: model.food_id,
        name: model.name,
        price: model.price,
        quantity: model.quantity,
    }
}
