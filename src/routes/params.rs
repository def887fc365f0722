use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::TableStatus;

pub const MAX_PER_PAGE: i64 = 100;
/// Keeps `(page - 1) * per_page` inside `i64`.
pub const MAX_PAGE: i64 = i64::MAX / MAX_PER_PAGE;

/// Read as its own `Query` extractor next to the filter structs below.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).clamp(1, MAX_PAGE);
        let per_page = self.per_page.unwrap_or(20).clamp(1, MAX_PER_PAGE);
        let offset = (page - 1) * per_page;
        (page, per_page, offset)
    }
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FoodSortBy {
    CreatedAt,
    Price,
    Name,
    Sold,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct FoodQuery {
    pub q: Option<String>,
    pub category_id: Option<Uuid>,
    pub available: Option<bool>,
    pub sort_by: Option<FoodSortBy>,
    pub sort_order: Option<SortOrder>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct BillListQuery {
    pub paid: Option<bool>,
    pub table_id: Option<Uuid>,
    /// Inclusive, on `created_at`.
    pub from: Option<NaiveDate>,
    /// Inclusive, on `created_at`.
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct TableQuery {
    pub status: Option<TableStatus>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UserQuery {
    pub q: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct HistoryQuery {
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct PromotionQuery {
    pub active_only: Option<bool>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct BestSellerQuery {
    pub limit: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults_to_first_page_of_twenty() {
        assert_eq!(Pagination::default().normalize(), (1, 20, 0));
    }

    #[test]
    fn pagination_clamps_out_of_range_values() {
        let p = Pagination {
            page: Some(0),
            per_page: Some(500),
        };
        assert_eq!(p.normalize(), (1, 100, 0));

        let p = Pagination {
            page: Some(3),
            per_page: Some(10),
        };
        assert_eq!(p.normalize(), (3, 10, 20));
    }

    #[test]
    fn huge_page_number_does_not_overflow_offset() {
        let p = Pagination {
            page: Some(i64::MAX),
            per_page: Some(100),
        };
        let (page, per_page, offset) = p.normalize();
        assert_eq!(page, MAX_PAGE);
        assert_eq!(per_page, 100);
        assert_eq!(offset, (MAX_PAGE - 1) * 100);
    }
}
