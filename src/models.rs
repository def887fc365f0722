use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Staff,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Staff => "staff",
        }
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "staff" => Ok(Role::Staff),
            _ => Err(AppError::BadRequest("Invalid role".into())),
        }
    }
}

/// Occupancy of a physical table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TableStatus {
    Empty,
    Occupied,
    Damaged,
}

impl TableStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableStatus::Empty => "EMPTY",
            TableStatus::Occupied => "OCCUPIED",
            TableStatus::Damaged => "DAMAGED",
        }
    }

    /// A bill can only be attached to an empty table.
    pub fn ensure_can_open_bill(self) -> Result<(), AppError> {
        match self {
            TableStatus::Empty => Ok(()),
            TableStatus::Occupied => Err(AppError::Conflict("Table is occupied".into())),
            TableStatus::Damaged => Err(AppError::BadRequest("Table is damaged".into())),
        }
    }

    /// Manual status changes. `OCCUPIED` is only reachable through a bill.
    pub fn ensure_manual_transition(self, next: TableStatus, has_bill: bool) -> Result<(), AppError> {
        if next == TableStatus::Occupied {
            return Err(AppError::BadRequest(
                "OCCUPIED is set by opening a bill".into(),
            ));
        }
        if has_bill || self == TableStatus::Occupied {
            return Err(AppError::Conflict("Table has an open bill".into()));
        }
        Ok(())
    }
}

impl fmt::Display for TableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TableStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EMPTY" => Ok(TableStatus::Empty),
            "OCCUPIED" => Ok(TableStatus::Occupied),
            "DAMAGED" => Ok(TableStatus::Damaged),
            other => Err(AppError::Internal(anyhow::anyhow!(
                "unknown table status {other}"
            ))),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub phone: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Food {
    pub id: Uuid,
    pub name: String,
    pub price: i64,
    pub is_available: bool,
    pub category_id: Option<Uuid>,
    pub image_url: Option<String>,
    pub sold: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Table {
    pub id: Uuid,
    pub number: i32,
    pub status: TableStatus,
    pub bill_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Bill {
    pub id: Uuid,
    pub table_id: Option<Uuid>,
    pub table_number: i32,
    pub discount: i32,
    pub promotion_code: Option<String>,
    pub subtotal: i64,
    pub total: i64,
    pub is_paid: bool,
    pub is_processed: bool,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BillItem {
    pub id: Uuid,
    pub bill_id: Uuid,
    pub food_id: Uuid,
    pub name: String,
    pub price: i64,
    pub quantity: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CartItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub food_id: Uuid,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Promotion {
    pub id: Uuid,
    pub code: String,
    pub discount_percent: i32,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Promotion {
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct History {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub action: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Setting {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

/// Largest accepted unit price, in minor units.
pub const MAX_PRICE: i64 = 1_000_000_000_000;
/// Largest quantity a single bill or cart line may hold.
pub const MAX_QUANTITY: i32 = 10_000;

pub fn validate_quantity(quantity: i32) -> Result<(), AppError> {
    if !(1..=MAX_QUANTITY).contains(&quantity) {
        return Err(AppError::BadRequest(format!(
            "quantity must be between 1 and {MAX_QUANTITY}"
        )));
    }
    Ok(())
}

fn out_of_range() -> AppError {
    AppError::BadRequest("amount out of range".into())
}

/// Subtotal and discounted total of a bill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BillTotals {
    pub subtotal: i64,
    pub total: i64,
}

impl BillTotals {
    /// `discount` is a percentage; the discount amount rounds down.
    pub fn compute<I>(lines: I, discount: i32) -> Result<Self, AppError>
    where
        I: IntoIterator<Item = (i64, i32)>,
    {
        let mut subtotal: i64 = 0;
        for (price, quantity) in lines {
            let line = price
                .checked_mul(i64::from(quantity))
                .ok_or_else(out_of_range)?;
            subtotal = subtotal.checked_add(line).ok_or_else(out_of_range)?;
        }
        let discount = i64::from(discount.clamp(0, 100));
        let amount_off = subtotal.checked_mul(discount).ok_or_else(out_of_range)? / 100;
        let total = subtotal.checked_sub(amount_off).ok_or_else(out_of_range)?;
        Ok(Self { subtotal, total })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_sum_lines_then_apply_discount() {
        let totals = BillTotals::compute([(25_000, 2), (18_000, 1)], 10).expect("totals");
        assert_eq!(totals.subtotal, 68_000);
        assert_eq!(totals.total, 61_200);
    }

    #[test]
    fn discount_amount_rounds_down() {
        let totals = BillTotals::compute([(999, 1)], 15).expect("totals");
        // 15% of 999 is 149.85, so 149 is taken off.
        assert_eq!(totals.total, 850);
    }

    #[test]
    fn empty_bill_is_zero() {
        let totals = BillTotals::compute(std::iter::empty(), 50).expect("totals");
        assert_eq!(totals, BillTotals { subtotal: 0, total: 0 });
    }

    #[test]
    fn full_discount_makes_bill_free() {
        let totals = BillTotals::compute([(40_000, 3)], 100).expect("totals");
        assert_eq!(totals.total, 0);
    }

    #[test]
    fn largest_accepted_line_still_totals() {
        let totals =
            BillTotals::compute([(MAX_PRICE, MAX_QUANTITY), (MAX_PRICE, MAX_QUANTITY)], 100)
                .expect("totals");
        assert_eq!(totals.subtotal, 2 * MAX_PRICE * i64::from(MAX_QUANTITY));
        assert_eq!(totals.total, 0);
    }

    #[test]
    fn overflowing_amounts_are_rejected() {
        let line = BillTotals::compute([(5_000_000_000_000_000_000, 2)], 0);
        assert!(matches!(line, Err(AppError::BadRequest(_))));

        let sum = BillTotals::compute([(i64::MAX, 1), (1, 1)], 0);
        assert!(matches!(sum, Err(AppError::BadRequest(_))));

        let discount = BillTotals::compute([(i64::MAX / 2, 1)], 50);
        assert!(matches!(discount, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn quantity_bounds() {
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_QUANTITY).is_ok());
        assert!(validate_quantity(MAX_QUANTITY + 1).is_err());
        assert!(validate_quantity(i32::MAX).is_err());
    }

    #[test]
    fn only_empty_tables_accept_a_bill() {
        assert!(TableStatus::Empty.ensure_can_open_bill().is_ok());
        assert!(matches!(
            TableStatus::Occupied.ensure_can_open_bill(),
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(
            TableStatus::Damaged.ensure_can_open_bill(),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn occupied_is_never_set_by_hand() {
        assert!(
            TableStatus::Empty
                .ensure_manual_transition(TableStatus::Occupied, false)
                .is_err()
        );
        assert!(
            TableStatus::Empty
                .ensure_manual_transition(TableStatus::Damaged, false)
                .is_ok()
        );
        assert!(
            TableStatus::Damaged
                .ensure_manual_transition(TableStatus::Empty, false)
                .is_ok()
        );
        assert!(
            TableStatus::Occupied
                .ensure_manual_transition(TableStatus::Damaged, true)
                .is_err()
        );
    }

    #[test]
    fn table_status_round_trips_through_its_column_value() {
        for status in [TableStatus::Empty, TableStatus::Occupied, TableStatus::Damaged] {
            assert_eq!(status.as_str().parse::<TableStatus>().ok(), Some(status));
        }
        assert!("BROKEN".parse::<TableStatus>().is_err());
    }

    #[test]
    fn promotion_expires_at_its_deadline() {
        let now = Utc::now();
        let promo = Promotion {
            id: Uuid::new_v4(),
            code: "LATTE10".into(),
            discount_percent: 10,
            expires_at: now,
            created_at: now,
        };
        assert!(!promo.is_active_at(now));
        assert!(promo.is_active_at(now - chrono::Duration::seconds(1)));
    }
}
