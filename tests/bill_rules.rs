mod common;

use chrono::{Duration, Utc};
use coffee_pos_api::{
    dto::{
        bills::{
            AddItemsRequest, ApplyPromotionRequest, BillLineRequest, DiscountRequest,
            OpenBillRequest, UpdateItemRequest,
        },
        cart::AddToCartRequest,
        categories::CategoryRequest,
    },
    entity::{bills::Entity as Bills, dining_tables::Entity as DiningTables, foods::Entity as Foods},
    error::AppError,
    models::{MAX_QUANTITY, Role, TableStatus},
    services::{bill_service, cart_service, category_service},
};
use sea_orm::EntityTrait;
use uuid::Uuid;

fn line(food_id: Uuid, quantity: i32) -> AddItemsRequest {
    AddItemsRequest {
        items: vec![BillLineRequest { food_id, quantity }],
    }
}

// Table guards, line edits, discounts, deletion and category detach, in one run
// so the shared database is only reset once.
#[tokio::test]
async fn bill_rules_hold_at_service_level() -> anyhow::Result<()> {
    let Some(state) = common::try_setup().await? else {
        return Ok(());
    };

    let staff = common::create_user(&state, Role::Staff, "staff@example.com").await?;
    let admin = common::create_user(&state, Role::Admin, "admin@example.com").await?;
    let espresso = common::create_food(&state, "Espresso", 25_000, None).await?;
    let cake = common::create_food(&state, "Cheesecake", 30_000, None).await?;
    let damaged = common::create_table(&state, 1, TableStatus::Damaged).await?;
    let table_id = common::create_table(&state, 2, TableStatus::Empty).await?;

    // Bills only open on empty tables.
    let on_damaged =
        bill_service::open_bill(&state, &staff, OpenBillRequest { table_id: damaged }).await;
    assert!(matches!(on_damaged, Err(AppError::BadRequest(_))));

    let bill = bill_service::open_bill(&state, &staff, OpenBillRequest { table_id })
        .await?
        .data
        .expect("bill");
    let bill_id = bill.bill.id;
    let on_occupied = bill_service::open_bill(&state, &staff, OpenBillRequest { table_id }).await;
    assert!(matches!(on_occupied, Err(AppError::Conflict(_))));

    // Lines merge per food; zero removes a line and totals follow.
    bill_service::add_items(&state, &staff, bill_id, line(espresso, 2)).await?;
    bill_service::add_items(&state, &staff, bill_id, line(cake, 1)).await?;
    let merged = bill_service::add_items(&state, &staff, bill_id, line(espresso, 1))
        .await?
        .data
        .expect("bill");
    assert_eq!(merged.items.len(), 2);
    assert_eq!(merged.bill.subtotal, 105_000);

    let cake_line = merged
        .items
        .iter()
        .find(|item| item.food_id == cake)
        .expect("cake line")
        .id;
    let trimmed = bill_service::update_item(
        &state,
        &staff,
        bill_id,
        cake_line,
        UpdateItemRequest { quantity: 0 },
    )
    .await?
    .data
    .expect("bill");
    assert_eq!(trimmed.items.len(), 1);
    assert_eq!(trimmed.items[0].quantity, 3);
    assert_eq!(trimmed.bill.subtotal, 75_000);
    assert_eq!(trimmed.bill.total, 75_000);

    // Quantities are bounded, both per request and after merging.
    let too_many = bill_service::add_items(&state, &staff, bill_id, line(espresso, MAX_QUANTITY + 1)).await;
    assert!(matches!(too_many, Err(AppError::BadRequest(_))));
    let merged_too_many =
        bill_service::add_items(&state, &staff, bill_id, line(espresso, MAX_QUANTITY)).await;
    assert!(matches!(merged_too_many, Err(AppError::BadRequest(_))));
    let unchanged = bill_service::get_bill(&state, bill_id).await?.data.expect("bill");
    assert_eq!(unchanged.items[0].quantity, 3);

    let cart_too_many = cart_service::add_to_cart(
        &state,
        &staff,
        AddToCartRequest {
            food_id: espresso,
            quantity: i32::MAX,
        },
    )
    .await;
    assert!(matches!(cart_too_many, Err(AppError::BadRequest(_))));

    // Promotions must be live; manual discounts are admin-only and replace the code.
    common::create_promotion(&state, "OLD5", 5, Utc::now() - Duration::days(1)).await?;
    common::create_promotion(&state, "TEA20", 20, Utc::now() + Duration::days(1)).await?;
    let expired = bill_service::apply_promotion(
        &state,
        &staff,
        bill_id,
        ApplyPromotionRequest {
            code: "old5".into(),
        },
    )
    .await;
    assert!(matches!(expired, Err(AppError::BadRequest(_))));

    let promoted = bill_service::apply_promotion(
        &state,
        &staff,
        bill_id,
        ApplyPromotionRequest {
            code: "tea20".into(),
        },
    )
    .await?
    .data
    .expect("bill");
    assert_eq!(promoted.bill.promotion_code.as_deref(), Some("TEA20"));
    assert_eq!(promoted.bill.total, 60_000);

    let by_staff =
        bill_service::set_discount(&state, &staff, bill_id, DiscountRequest { discount: 5 }).await;
    assert!(matches!(by_staff, Err(AppError::Forbidden)));
    let above_hundred =
        bill_service::set_discount(&state, &admin, bill_id, DiscountRequest { discount: 101 }).await;
    assert!(matches!(above_hundred, Err(AppError::BadRequest(_))));

    let manual = bill_service::set_discount(&state, &admin, bill_id, DiscountRequest { discount: 5 })
        .await?
        .data
        .expect("bill");
    assert_eq!(manual.bill.discount, 5);
    assert_eq!(manual.bill.promotion_code, None);
    assert_eq!(manual.bill.total, 71_250);

    // Deleting an unpaid bill frees its table.
    bill_service::delete_bill(&state, &staff, bill_id).await?;
    assert!(Bills::find_by_id(bill_id).one(&state.orm).await?.is_none());
    let table = DiningTables::find_by_id(table_id).one(&state.orm).await?.expect("table");
    assert_eq!(table.status, "EMPTY");
    assert_eq!(table.bill_id, None);

    // Paid bills stay.
    let paid_id = bill_service::open_bill(&state, &staff, OpenBillRequest { table_id })
        .await?
        .data
        .expect("bill")
        .bill
        .id;
    bill_service::add_items(&state, &staff, paid_id, line(espresso, 1)).await?;
    bill_service::checkout(&state, &staff, paid_id).await?;
    let delete_paid = bill_service::delete_bill(&state, &staff, paid_id).await;
    assert!(matches!(delete_paid, Err(AppError::BadRequest(_))));
    assert!(Bills::find_by_id(paid_id).one(&state.orm).await?.is_some());

    // Removing a category keeps its foods on the menu, uncategorized.
    let pastry = category_service::create_category(
        &state,
        &admin,
        CategoryRequest {
            name: "Pastry".into(),
        },
    )
    .await?
    .data
    .expect("category");
    let croissant = common::create_food(&state, "Croissant", 30_000, Some(pastry.id)).await?;
    category_service::delete_category(&state, &admin, pastry.id).await?;
    let croissant = Foods::find_by_id(croissant).one(&state.orm).await?.expect("food");
    assert_eq!(croissant.category_id, None);

    Ok(())
}
