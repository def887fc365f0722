use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::{
    dto::tables::{CreateTableRequest, TableList, TableStatusRequest},
    entity::dining_tables::{ActiveModel as TableActive, Column as TableCol, Entity as DiningTables, Model as TableModel},
    error::{AppError, AppResult},
    history::note,
    middleware::auth::{AuthUser, ensure_admin},
    models::{Table, TableStatus},
    response::{ApiResponse, Meta},
    routes::params::TableQuery,
    state::AppState,
};

pub async fn list_tables(state: &AppState, query: TableQuery) -> AppResult<ApiResponse<TableList>> {
    let mut finder = DiningTables::find();
    if let Some(status) = query.status {
        finder = finder.filter(TableCol::Status.eq(status.as_str()));
    }
    let items = finder
        .order_by_asc(TableCol::Number)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(table_from_entity)
        .collect::<AppResult<Vec<_>>>()?;
    Ok(ApiResponse::success("Tables", TableList { items }, None))
}

pub async fn get_table(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Table>> {
    let table = DiningTables::find_by_id(id).one(&state.orm).await?;
    let table = match table {
        Some(t) => t,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success("Table", table_from_entity(table)?, None))
}

pub async fn create_table(
    state: &AppState,
    user: &AuthUser,
    payload: CreateTableRequest,
) -> AppResult<ApiResponse<Table>> {
    ensure_admin(user)?;
    if payload.number <= 0 {
        return Err(AppError::BadRequest("table number must be positive".into()));
    }
    let taken = DiningTables::find()
        .filter(TableCol::Number.eq(payload.number))
        .one(&state.orm)
        .await?;
    if taken.is_some() {
        return Err(AppError::Conflict(format!(
            "table {} already exists",
            payload.number
        )));
    }

    let table = TableActive {
        id: Set(Uuid::new_v4()),
        number: Set(payload.number),
        status: Set(TableStatus::Empty.as_str().to_string()),
        bill_id: Set(None),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    note(
        &state.pool,
        Some(user.user_id),
        format!("create table {}", table.number),
    )
    .await;

    Ok(ApiResponse::success(
        "Table created",
        table_from_entity(table)?,
        Some(Meta::empty()),
    ))
}

/// Marks a table damaged or repaired. Occupancy only changes through bills.
pub async fn set_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: TableStatusRequest,
) -> AppResult<ApiResponse<Table>> {
    ensure_admin(user)?;
    let txn = state.orm.begin().await?;

    let table = DiningTables::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let table = match table {
        Some(t) => t,
        None => return Err(AppError::NotFound),
    };

    let current: TableStatus = table.status.parse()?;
    current.ensure_manual_transition(payload.status, table.bill_id.is_some())?;

    let mut active: TableActive = table.into();
    active.status = Set(payload.status.as_str().to_string());
    let table = active.update(&txn).await?;
    txn.commit().await?;

    note(
        &state.pool,
        Some(user.user_id),
        format!("table {} marked {}", table.number, payload.status),
    )
    .await;

    Ok(ApiResponse::success(
        "Table updated",
        table_from_entity(table)?,
        Some(Meta::empty()),
    ))
}

pub async fn delete_table(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let table = DiningTables::find_by_id(id).one(&state.orm).await?;
    let table = match table {
        Some(t) => t,
        None => return Err(AppError::NotFound),
    };
    if table.bill_id.is_some() {
        return Err(AppError::Conflict("Table has an open bill".into()));
    }

    DiningTables::delete_by_id(id).exec(&state.orm).await?;

    note(
        &state.pool,
        Some(user.user_id),
        format!("delete table {}", table.number),
    )
    .await;

    Ok(ApiResponse::done("Deleted"))
}

pub(crate) fn table_from_entity(model: TableModel) -> AppResult<Table> {
    Ok(Table {
        id: model.id,
        number: model.number,
        status: model.status.parse()?,
        bill_id: model.bill_id,
        created_at: model.created_at.with_timezone(&Utc),
    })
}
