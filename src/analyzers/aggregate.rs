//! Grouping queries over derived sales records.
//!
//! Each query reads the record slice independently and returns its own
//! container. None of them depends on another query's output except where a
//! parameter makes that explicit.

use std::collections::BTreeMap;

use crate::analyzers::types::{
    DailyRevenue, DayTypeTotals, EventComparison, GroupStats, Pivot, ProductQuantity,
};
use crate::analyzers::utility::{argmax, mean, stddev, sum_by, top_n};
use crate::config::EventCalendar;
use crate::errors::AggregateError;
use crate::features::DerivedRecord;

/// Number of busiest hours tracked month by month.
pub const PEAK_HOUR_COUNT: usize = 5;

pub fn monthly_revenue(records: &[DerivedRecord]) -> BTreeMap<u32, f64> {
    sum_by(records, |r| r.month, |r| r.revenue)
}

pub fn hourly_revenue(records: &[DerivedRecord]) -> BTreeMap<u32, f64> {
    sum_by(records, |r| r.hour, |r| r.revenue)
}

/// Revenue by month (rows) and hour of day (columns).
pub fn month_hour_revenue(records: &[DerivedRecord]) -> Pivot<u32, u32> {
    Pivot::from_sums(sum_by(records, |r| (r.month, r.hour), |r| r.revenue))
}

/// The `n` hours of the day with the highest total revenue, busiest first.
pub fn peak_hours(records: &[DerivedRecord], n: usize) -> Vec<u32> {
    top_n(&hourly_revenue(records), n)
        .into_iter()
        .map(|(hour, _)| hour)
        .collect()
}

/// Month by hour revenue restricted to the `n` busiest hours.
pub fn peak_hour_trend(records: &[DerivedRecord], n: usize) -> Pivot<u32, u32> {
    let hours = peak_hours(records, n);
    let busy: Vec<DerivedRecord> = records
        .iter()
        .filter(|r| hours.contains(&r.hour))
        .cloned()
        .collect();
    month_hour_revenue(&busy)
}

pub fn city_revenue(records: &[DerivedRecord]) -> BTreeMap<String, f64> {
    sum_by(records, |r| r.city.clone(), |r| r.revenue)
}

pub fn state_revenue(records: &[DerivedRecord]) -> BTreeMap<String, f64> {
    sum_by(records, |r| r.state.clone(), |r| r.revenue)
}

pub fn product_quantity(records: &[DerivedRecord]) -> BTreeMap<String, f64> {
    sum_by(records, |r| r.product.clone(), |r| r.quantity)
}

/// Each product's percentage of the total quantity sold.
pub fn product_share(records: &[DerivedRecord]) -> BTreeMap<String, f64> {
    let totals = product_quantity(records);
    let overall: f64 = totals.values().sum();
    if overall == 0.0 {
        return totals.into_keys().map(|p| (p, 0.0)).collect();
    }
    totals
        .into_iter()
        .map(|(product, quantity)| (product, quantity / overall * 100.0))
        .collect()
}

/// The product with the highest total quantity.
pub fn top_product(records: &[DerivedRecord]) -> Result<ProductQuantity, AggregateError> {
    let totals = product_quantity(records);
    argmax(&totals)
        .map(|(product, quantity)| ProductQuantity {
            product: product.clone(),
            quantity,
        })
        .ok_or(AggregateError::EmptyDataset {
            query: "top product by quantity",
        })
}

/// Quantity by month (rows) and product (columns).
pub fn month_product_quantity(records: &[DerivedRecord]) -> Pivot<u32, String> {
    Pivot::from_sums(sum_by(
        records,
        |r| (r.month, r.product.clone()),
        |r| r.quantity,
    ))
}

/// Best-selling product of each month in a month by product matrix.
///
/// Only observed cells compete.
pub fn top_product_per_month(
    matrix: &Pivot<u32, String>,
) -> Result<BTreeMap<u32, ProductQuantity>, AggregateError> {
    if matrix.is_empty() {
        return Err(AggregateError::EmptyDataset {
            query: "top product per month",
        });
    }

    let mut winners = BTreeMap::new();
    for (month, cells) in matrix.rows.iter().zip(&matrix.cells) {
        let observed: BTreeMap<&String, f64> = matrix
            .columns
            .iter()
            .zip(cells)
            .filter_map(|(product, cell)| cell.map(|q| (product, q)))
            .collect();

        if let Some((product, quantity)) = argmax(&observed) {
            winners.insert(
                *month,
                ProductQuantity {
                    product: (*product).clone(),
                    quantity,
                },
            );
        }
    }
    Ok(winners)
}

pub fn day_of_month_quantity(records: &[DerivedRecord]) -> BTreeMap<u32, f64> {
    sum_by(records, |r| r.day_of_month, |r| r.quantity)
}

/// Quantity by weekday, 0 = Monday.
pub fn weekday_quantity(records: &[DerivedRecord]) -> BTreeMap<u32, f64> {
    sum_by(records, |r| r.weekday, |r| r.quantity)
}

pub fn day_type_quantity(records: &[DerivedRecord]) -> DayTypeTotals {
    records
        .iter()
        .fold(DayTypeTotals::default(), |mut totals, r| {
            if r.is_weekend {
                totals.weekend += r.quantity;
            } else {
                totals.weekday += r.quantity;
            }
            totals
        })
}

/// Revenue per calendar day, each day flagged against `calendar`.
pub fn daily_revenue(records: &[DerivedRecord], calendar: &EventCalendar) -> Vec<DailyRevenue> {
    sum_by(records, |r| r.calendar_date, |r| r.revenue)
        .into_iter()
        .map(|(date, revenue)| DailyRevenue {
            date,
            revenue,
            is_special_event: calendar.contains(date),
            event: calendar.name(date).map(str::to_string),
        })
        .collect()
}

fn group_stats(values: &[f64]) -> GroupStats {
    let avg = mean(values);
    GroupStats {
        days: values.len(),
        mean: avg,
        stddev: avg.map(|m| stddev(values, m)),
    }
}

/// Compares mean daily revenue on special-event days with normal days.
pub fn event_comparison(daily: &[DailyRevenue]) -> EventComparison {
    let (events, normal): (Vec<&DailyRevenue>, Vec<&DailyRevenue>) =
        daily.iter().partition(|d| d.is_special_event);

    let revenue = |days: Vec<&DailyRevenue>| days.iter().map(|d| d.revenue).collect::<Vec<_>>();

    EventComparison {
        special_event: group_stats(&revenue(events)),
        normal: group_stats(&revenue(normal)),
    }
}
