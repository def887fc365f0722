use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveTime, Utc};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use sqlx::FromRow;

use crate::{
    dto::statistics::{DashboardSummary, Granularity, RevenueBucket, RevenueQuery, RevenueReport},
    entity::{
        bills::{Column as BillCol, Entity as Bills},
        dining_tables::{Column as TableCol, Entity as DiningTables},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::TableStatus,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub const MAX_DAY_BUCKETS: usize = 366;
pub const MAX_MONTH_BUCKETS: usize = 120;

/// A bill as seen by the revenue report.
#[derive(Debug, Clone, FromRow)]
pub struct RevenueRow {
    pub total: i64,
    pub is_paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
}

pub fn day_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Exclusive upper bound of a day, i.e. the start of the next one.
pub fn day_end(date: NaiveDate) -> AppResult<DateTime<Utc>> {
    date.checked_add_days(Days::new(1))
        .map(day_start)
        .ok_or_else(|| AppError::BadRequest("date out of range".into()))
}

pub fn bucket_key(date: NaiveDate, granularity: Granularity) -> NaiveDate {
    match granularity {
        Granularity::Day => date,
        Granularity::Month => date.with_day(1).unwrap_or(date),
    }
}

/// Every bucket of the window, zero-filled and in date order.
pub fn empty_buckets(
    granularity: Granularity,
    from: NaiveDate,
    to: NaiveDate,
) -> AppResult<BTreeMap<NaiveDate, RevenueBucket>> {
    if from > to {
        return Err(AppError::BadRequest("from must not be after to".into()));
    }

    let limit = match granularity {
        Granularity::Day => MAX_DAY_BUCKETS,
        Granularity::Month => MAX_MONTH_BUCKETS,
    };

    let mut buckets = BTreeMap::new();
    let last = bucket_key(to, granularity);
    let mut cursor = bucket_key(from, granularity);
    loop {
        if buckets.len() == limit {
            return Err(AppError::BadRequest(format!(
                "window is limited to {limit} buckets"
            )));
        }
        buckets.insert(
            cursor,
            RevenueBucket {
                date: cursor,
                revenue: 0.0,
                bills: 0,
            },
        );
        if cursor >= last {
            break;
        }
        let next = match granularity {
            Granularity::Day => cursor.checked_add_days(Days::new(1)),
            Granularity::Month => cursor.checked_add_months(Months::new(1)),
        };
        cursor = next.ok_or_else(|| AppError::BadRequest("date out of range".into()))?;
    }
    Ok(buckets)
}

/// Single pass over the fetched bills: unpaid or out-of-window rows are skipped.
pub fn build_report<I>(
    granularity: Granularity,
    from: NaiveDate,
    to: NaiveDate,
    rows: I,
) -> AppResult<RevenueReport>
where
    I: IntoIterator<Item = RevenueRow>,
{
    let mut buckets = empty_buckets(granularity, from, to)?;

    for row in rows {
        if !row.is_paid {
            continue;
        }
        let Some(paid_at) = row.paid_at else {
            continue;
        };
        let paid_on = paid_at.date_naive();
        if paid_on < from || paid_on > to {
            continue;
        }
        if let Some(bucket) = buckets.get_mut(&bucket_key(paid_on, granularity)) {
            bucket.revenue += row.total as f64;
            bucket.bills += 1;
        }
    }

    let buckets: Vec<RevenueBucket> = buckets.into_values().collect();
    let total_revenue = buckets.iter().map(|b| b.revenue).sum();
    let total_bills = buckets.iter().map(|b| b.bills).sum();

    Ok(RevenueReport {
        granularity,
        from,
        to,
        buckets,
        total_revenue,
        total_bills,
    })
}

pub async fn revenue(
    state: &AppState,
    user: &AuthUser,
    query: RevenueQuery,
) -> AppResult<ApiResponse<RevenueReport>> {
    ensure_admin(user)?;
    let granularity = query.granularity.unwrap_or(Granularity::Day);
    // Validate the window before touching the database.
    empty_buckets(granularity, query.from, query.to)?;

    let rows = fetch_paid_between(state, query.from, query.to).await?;
    tracing::debug!(rows = rows.len(), ?granularity, "revenue window fetched");

    let report = build_report(granularity, query.from, query.to, rows)?;
    Ok(ApiResponse::success("Revenue", report, Some(Meta::empty())))
}

pub async fn summary(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<DashboardSummary>> {
    ensure_admin(user)?;
    let today = Utc::now().date_naive();
    let rows = fetch_paid_between(state, today, today).await?;
    let report = build_report(Granularity::Day, today, today, rows)?;

    let open_bills = Bills::find()
        .filter(BillCol::IsPaid.eq(false))
        .count(&state.orm)
        .await? as i64;
    let occupied_tables = DiningTables::find()
        .filter(TableCol::Status.eq(TableStatus::Occupied.as_str()))
        .count(&state.orm)
        .await? as i64;
    let total_tables = DiningTables::find().count(&state.orm).await? as i64;

    Ok(ApiResponse::success(
        "Summary",
        DashboardSummary {
            today_revenue: report.total_revenue,
            today_bills: report.total_bills,
            open_bills,
            occupied_tables,
            total_tables,
        },
        Some(Meta::empty()),
    ))
}

async fn fetch_paid_between(
    state: &AppState,
    from: NaiveDate,
    to: NaiveDate,
) -> AppResult<Vec<RevenueRow>> {
    let start = day_start(from);
    let end = day_end(to)?;
    let rows = sqlx::query_as::<_, RevenueRow>(
        r#"
        SELECT total, is_paid, paid_at
        FROM bills
        WHERE paid_at >= $1 AND paid_at < $2
        "#,
    )
    .bind(start)
    .bind(end)
    .fetch_all(&state.pool)
    .await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn paid(on: NaiveDate, hour: u32, total: i64) -> RevenueRow {
        RevenueRow {
            total,
            is_paid: true,
            paid_at: Some(day_start(on) + chrono::Duration::hours(i64::from(hour))),
        }
    }

    #[test]
    fn day_window_is_zero_filled() {
        let report = build_report(
            Granularity::Day,
            date(2024, 3, 1),
            date(2024, 3, 3),
            Vec::new(),
        )
        .expect("report");
        let dates: Vec<NaiveDate> = report.buckets.iter().map(|b| b.date).collect();
        assert_eq!(dates, vec![date(2024, 3, 1), date(2024, 3, 2), date(2024, 3, 3)]);
        assert!(report.buckets.iter().all(|b| b.revenue == 0.0 && b.bills == 0));
        assert_eq!(report.total_revenue, 0.0);
    }

    #[test]
    fn paid_bills_land_in_their_day() {
        let rows = vec![
            paid(date(2024, 3, 1), 9, 45_000),
            paid(date(2024, 3, 1), 23, 5_000),
            paid(date(2024, 3, 3), 12, 20_000),
        ];
        let report =
            build_report(Granularity::Day, date(2024, 3, 1), date(2024, 3, 3), rows).expect("report");

        assert_eq!(report.buckets[0].revenue, 50_000.0);
        assert_eq!(report.buckets[0].bills, 2);
        assert_eq!(report.buckets[1].revenue, 0.0);
        assert_eq!(report.buckets[2].revenue, 20_000.0);
        assert_eq!(report.total_revenue, 70_000.0);
        assert_eq!(report.total_bills, 3);
    }

    #[test]
    fn unpaid_and_out_of_window_rows_are_ignored() {
        let mut unpaid = paid(date(2024, 3, 2), 10, 99_000);
        unpaid.is_paid = false;
        let no_timestamp = RevenueRow {
            total: 1_000,
            is_paid: true,
            paid_at: None,
        };
        let rows = vec![
            unpaid,
            no_timestamp,
            paid(date(2024, 2, 29), 10, 7_000),
            paid(date(2024, 3, 2), 10, 12_000),
        ];
        let report =
            build_report(Granularity::Day, date(2024, 3, 1), date(2024, 3, 2), rows).expect("report");
        assert_eq!(report.total_revenue, 12_000.0);
        assert_eq!(report.total_bills, 1);
    }

    #[test]
    fn month_buckets_key_on_first_day() {
        let rows = vec![
            paid(date(2024, 1, 31), 8, 10_000),
            paid(date(2024, 2, 14), 8, 25_000),
            paid(date(2024, 2, 29), 8, 5_000),
        ];
        let report = build_report(
            Granularity::Month,
            date(2024, 1, 15),
            date(2024, 3, 10),
            rows,
        )
        .expect("report");

        let dates: Vec<NaiveDate> = report.buckets.iter().map(|b| b.date).collect();
        assert_eq!(dates, vec![date(2024, 1, 1), date(2024, 2, 1), date(2024, 3, 1)]);
        assert_eq!(report.buckets[0].revenue, 10_000.0);
        assert_eq!(report.buckets[1].revenue, 30_000.0);
        assert_eq!(report.buckets[1].bills, 2);
        assert_eq!(report.buckets[2].revenue, 0.0);
    }

    #[test]
    fn reversed_window_is_rejected() {
        let err = empty_buckets(Granularity::Day, date(2024, 3, 2), date(2024, 3, 1));
        assert!(matches!(err, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn last_representable_date_does_not_overflow() {
        let buckets = empty_buckets(Granularity::Day, NaiveDate::MAX, NaiveDate::MAX).expect("buckets");
        assert_eq!(buckets.len(), 1);
        let months = empty_buckets(Granularity::Month, NaiveDate::MAX, NaiveDate::MAX).expect("buckets");
        assert_eq!(months.len(), 1);
        assert!(matches!(day_end(NaiveDate::MAX), Err(AppError::BadRequest(_))));
        assert_eq!(day_end(date(2024, 2, 29)).expect("end"), day_start(date(2024, 3, 1)));
    }

    #[test]
    fn oversized_window_is_rejected() {
        assert!(empty_buckets(Granularity::Day, date(2023, 1, 1), date(2023, 12, 31)).is_ok());
        assert!(empty_buckets(Granularity::Day, date(2023, 1, 1), date(2024, 12, 31)).is_err());
        assert!(empty_buckets(Granularity::Month, date(2000, 1, 1), date(2020, 1, 1)).is_err());
    }
}
