mod common;

use chrono::{Duration, Utc};
use coffee_pos_api::{
    dto::{
        bills::ApplyPromotionRequest,
        cart::{AddToCartRequest, PlaceOrderRequest},
        statistics::{Granularity, RevenueQuery},
    },
    entity::{dining_tables::Entity as DiningTables, foods::Entity as Foods},
    error::AppError,
    models::{Role, TableStatus},
    services::{bill_service, cart_service, statistics_service},
};
use sea_orm::EntityTrait;

// Staff drafts an order in the cart, places it on a table, applies a code and checks out;
// the admin then sees the payment in the revenue report.
#[tokio::test]
async fn cart_to_checkout_flow_updates_table_menu_and_revenue() -> anyhow::Result<()> {
    let Some(state) = common::try_setup().await? else {
        return Ok(());
    };

    let staff = common::create_user(&state, Role::Staff, "staff@example.com").await?;
    let admin = common::create_user(&state, Role::Admin, "admin@example.com").await?;

    let cappuccino = common::create_food(&state, "Cappuccino", 35_000, None).await?;
    let croissant = common::create_food(&state, "Croissant", 30_000, None).await?;
    let table_id = common::create_table(&state, 4, TableStatus::Empty).await?;
    common::create_promotion(&state, "LATTE10", 10, Utc::now() + Duration::days(7)).await?;

    // Adding the same food twice keeps a single line with the latest quantity.
    for quantity in [1, 2] {
        cart_service::add_to_cart(
            &state,
            &staff,
            AddToCartRequest {
                food_id: cappuccino,
                quantity,
            },
        )
        .await?;
    }
    cart_service::add_to_cart(
        &state,
        &staff,
        AddToCartRequest {
            food_id: croissant,
            quantity: 1,
        },
    )
    .await?;
    let cart = cart_service::list_cart(&state, &staff).await?.data.expect("cart");
    assert_eq!(cart.items.len(), 2);
    assert_eq!(cart.total, 100_000);

    let placed = cart_service::place_order(&state, &staff, PlaceOrderRequest { table_id })
        .await?
        .data
        .expect("bill");
    assert_eq!(placed.bill.subtotal, 100_000);
    assert_eq!(placed.bill.total, 100_000);
    assert!(!placed.bill.is_paid);

    let table_row = DiningTables::find_by_id(table_id).one(&state.orm).await?.expect("table");
    assert_eq!(table_row.status, "OCCUPIED");
    assert_eq!(table_row.bill_id, Some(placed.bill.id));

    let cart = cart_service::list_cart(&state, &staff).await?.data.expect("cart");
    assert!(cart.items.is_empty(), "placing the order empties the cart");

    // A second round lands on the same bill.
    cart_service::add_to_cart(
        &state,
        &staff,
        AddToCartRequest {
            food_id: croissant,
            quantity: 1,
        },
    )
    .await?;
    let merged = cart_service::place_order(&state, &staff, PlaceOrderRequest { table_id })
        .await?
        .data
        .expect("bill");
    assert_eq!(merged.bill.id, placed.bill.id);
    assert_eq!(merged.items.len(), 2);
    assert_eq!(merged.bill.subtotal, 130_000);

    let discounted = bill_service::apply_promotion(
        &state,
        &staff,
        placed.bill.id,
        ApplyPromotionRequest {
            code: " latte10 ".into(),
        },
    )
    .await?
    .data
    .expect("bill");
    assert_eq!(discounted.bill.discount, 10);
    assert_eq!(discounted.bill.promotion_code.as_deref(), Some("LATTE10"));
    assert_eq!(discounted.bill.total, 117_000);

    let paid = bill_service::checkout(&state, &staff, placed.bill.id)
        .await?
        .data
        .expect("bill");
    assert!(paid.bill.is_paid);
    assert!(paid.bill.paid_at.is_some());
    assert_eq!(paid.bill.total, 117_000);

    let table_row = DiningTables::find_by_id(table_id).one(&state.orm).await?.expect("table");
    assert_eq!(table_row.status, "EMPTY");
    assert_eq!(table_row.bill_id, None);

    let croissant_row = Foods::find_by_id(croissant).one(&state.orm).await?.expect("food");
    assert_eq!(croissant_row.sold, 2);

    // Paid bills are frozen.
    let again = bill_service::checkout(&state, &staff, placed.bill.id).await;
    assert!(matches!(again, Err(AppError::BadRequest(_))));

    let today = Utc::now().date_naive();
    let query = || RevenueQuery {
        granularity: Some(Granularity::Day),
        from: today,
        to: today,
    };
    let forbidden = statistics_service::revenue(&state, &staff, query()).await;
    assert!(matches!(forbidden, Err(AppError::Forbidden)));

    let report = statistics_service::revenue(&state, &admin, query())
        .await?
        .data
        .expect("report");
    assert_eq!(report.buckets.len(), 1);
    assert_eq!(report.total_bills, 1);
    assert_eq!(report.total_revenue, 117_000.0);

    Ok(())
}
