use crate::analyzers::aggregate::{
    PEAK_HOUR_COUNT, city_revenue, daily_revenue, day_of_month_quantity, day_type_quantity,
    event_comparison, hourly_revenue, month_hour_revenue, month_product_quantity,
    monthly_revenue, peak_hour_trend, peak_hours, product_quantity, product_share,
    state_revenue, top_product, top_product_per_month, weekday_quantity,
};
use crate::analyzers::growth::{growth_leader, product_growth};
use crate::analyzers::types::SalesReport;
use crate::config::EventCalendar;
use crate::errors::AggregateError;
use crate::features::DerivedRecord;
use chrono::Utc;
use tracing::{info, warn};

/// Runs every aggregation over `records` and collects the results.
///
/// # Errors
///
/// Returns [`AggregateError::EmptyDataset`] when there are no records. A
/// missing growth leader is not an error; it is logged and left empty.
#[tracing::instrument(skip_all, fields(records = records.len()))]
pub fn analyze(
    records: &[DerivedRecord],
    calendar: &EventCalendar,
) -> Result<SalesReport, AggregateError> {
    if records.is_empty() {
        return Err(AggregateError::EmptyDataset {
            query: "sales report",
        });
    }

    let month_product = month_product_quantity(records);
    let top_product_per_month = top_product_per_month(&month_product)?;

    let product_growth = product_growth(&month_product);
    let growth_leader = match growth_leader(&product_growth) {
        Ok(leader) => Some(leader),
        Err(e) => {
            warn!(error = %e, "No growth leader");
            None
        }
    };
    let growth_leader_series = growth_leader
        .as_ref()
        .map(|leader| month_product.column(&leader.product))
        .unwrap_or_default();

    let daily = daily_revenue(records, calendar);
    let event_comparison = event_comparison(&daily);

    let report = SalesReport {
        generated_at: Utc::now(),
        record_count: records.len(),
        total_revenue: records.iter().map(|r| r.revenue).sum(),
        total_quantity: records.iter().map(|r| r.quantity).sum(),

        monthly_revenue: monthly_revenue(records),
        hourly_revenue: hourly_revenue(records),
        month_hour_revenue: month_hour_revenue(records),
        peak_hours: peak_hours(records, PEAK_HOUR_COUNT),
        peak_hour_trend: peak_hour_trend(records, PEAK_HOUR_COUNT),

        city_revenue: city_revenue(records),
        state_revenue: state_revenue(records),

        product_quantity: product_quantity(records),
        product_share_percent: product_share(records),
        top_product: top_product(records)?,
        month_product_quantity: month_product,
        top_product_per_month,

        day_of_month_quantity: day_of_month_quantity(records),
        weekday_quantity: weekday_quantity(records),
        day_type_quantity: day_type_quantity(records),

        daily_revenue: daily,
        event_comparison,

        product_growth,
        growth_leader,
        growth_leader_series,
    };

    info!(
        total_revenue = report.total_revenue,
        top_product = %report.top_product.product,
        cities = report.city_revenue.len(),
        "Report computed"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::test_support::record;

    #[test]
    fn test_analyze_empty_fails() {
        let err = analyze(&[], &EventCalendar::default()).unwrap_err();
        assert!(matches!(err, AggregateError::EmptyDataset { .. }));
    }

    #[test]
    fn test_analyze_single_month_has_no_growth_leader() {
        let records = vec![
            record("A", 2.0, 10.0, "01/05/19 08:00", "1 Main St, Boston, MA 02108"),
            record("A", 1.0, 10.0, "01/05/19 09:00", "1 Main St, Boston, MA 02108"),
        ];
        let report = analyze(&records, &EventCalendar::default()).unwrap();

        assert_eq!(report.record_count, 2);
        assert_eq!(report.monthly_revenue[&1], 30.0);
        assert_eq!(report.city_revenue["Boston"], 30.0);
        assert_eq!(report.top_product.product, "A");
        assert_eq!(report.top_product.quantity, 3.0);
        assert!(report.growth_leader.is_none());
        assert!(report.growth_leader_series.is_empty());
    }

    #[test]
    fn test_analyze_totals_are_conserved() {
        let records = vec![
            record("A", 2.0, 10.0, "01/05/19 08:00", "1 Main St, Boston, MA 02108"),
            record("B", 3.0, 1.5, "02/06/19 12:00", "5 Elm St, Dallas, TX 75001"),
            record("A", 1.0, 10.0, "02/07/19 13:00", "9 Oak St, Austin, TX 73301"),
        ];
        let report = analyze(&records, &EventCalendar::default()).unwrap();

        let monthly: f64 = report.monthly_revenue.values().sum();
        let by_city: f64 = report.city_revenue.values().sum();
        let by_hour: f64 = report.hourly_revenue.values().sum();
        assert!((monthly - report.total_revenue).abs() < 1e-9);
        assert!((by_city - report.total_revenue).abs() < 1e-9);
        assert!((by_hour - report.total_revenue).abs() < 1e-9);

        let leader = report.growth_leader.as_ref().unwrap();
        assert_eq!(leader.product, "A");
        assert_eq!(leader.average_growth_percent, -50.0);
        assert_eq!(report.growth_leader_series, vec![(1, Some(2.0)), (2, Some(1.0))]);
    }
}
