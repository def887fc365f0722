use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Day,
    Month,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RevenueQuery {
    pub granularity: Option<Granularity>,
    pub from: NaiveDate,
    pub to: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RevenueBucket {
    /// Day, or first day of the month for monthly buckets.
    pub date: NaiveDate,
    pub revenue: f64,
    pub bills: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RevenueReport {
    pub granularity: Granularity,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub buckets: Vec<RevenueBucket>,
    pub total_revenue: f64,
    pub total_bills: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardSummary {
    pub today_revenue: f64,
    pub today_bills: i64,
    pub open_bills: i64,
    pub occupied_tables: i64,
    pub total_tables: i64,
}
