//! Result types produced by the aggregation queries.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// A two-key aggregation laid out as a matrix.
///
/// Rows and columns are sorted. A cell is `None` when no record had that
/// key pair, which is distinct from an observed total of zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pivot<R, C> {
    pub rows: Vec<R>,
    pub columns: Vec<C>,
    pub cells: Vec<Vec<Option<f64>>>,
}

impl<R: Ord + Clone, C: Ord + Clone> Pivot<R, C> {
    /// Lays out per-pair totals as a matrix.
    pub fn from_sums(sums: BTreeMap<(R, C), f64>) -> Self {
        let rows: Vec<R> = {
            let mut rows: Vec<R> = sums.keys().map(|(r, _)| r.clone()).collect();
            rows.dedup();
            rows
        };
        let columns: Vec<C> = {
            let mut columns: Vec<C> = sums.keys().map(|(_, c)| c.clone()).collect();
            columns.sort();
            columns.dedup();
            columns
        };

        let mut cells = vec![vec![None; columns.len()]; rows.len()];
        for ((r, c), value) in sums {
            if let (Ok(i), Ok(j)) = (rows.binary_search(&r), columns.binary_search(&c)) {
                cells[i][j] = Some(value);
            }
        }

        Self {
            rows,
            columns,
            cells,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Observed total for a key pair.
    pub fn get(&self, row: &R, column: &C) -> Option<f64> {
        let i = self.rows.binary_search(row).ok()?;
        let j = self.columns.binary_search(column).ok()?;
        self.cells[i][j]
    }

    /// Sum of the observed cells in `row`.
    pub fn row_total(&self, row: &R) -> f64 {
        self.rows
            .binary_search(row)
            .map(|i| self.cells[i].iter().flatten().sum())
            .unwrap_or(0.0)
    }

    /// Every row's cell for `column`, in row order.
    pub fn column(&self, column: &C) -> Vec<(R, Option<f64>)> {
        match self.columns.binary_search(column) {
            Ok(j) => self
                .rows
                .iter()
                .zip(&self.cells)
                .map(|(r, cells)| (r.clone(), cells[j]))
                .collect(),
            Err(_) => Vec::new(),
        }
    }
}

/// A product with its summed quantity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductQuantity {
    pub product: String,
    pub quantity: f64,
}

/// Quantity sold on weekdays and on weekends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DayTypeTotals {
    pub weekday: f64,
    pub weekend: f64,
}

/// Revenue for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyRevenue {
    pub date: NaiveDate,
    pub revenue: f64,
    pub is_special_event: bool,
    /// Calendar name of the event, when the day is one.
    pub event: Option<String>,
}

/// Descriptive statistics over a group of daily revenue totals.
///
/// `mean` and `stddev` are `None` when the group has no days.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct GroupStats {
    pub days: usize,
    pub mean: Option<f64>,
    pub stddev: Option<f64>,
}

/// Daily revenue on special-event days versus all other days.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct EventComparison {
    pub special_event: GroupStats,
    pub normal: GroupStats,
}

/// Percent change in a product's quantity between two consecutive months.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyChange {
    pub from_month: u32,
    pub to_month: u32,
    pub percent: f64,
}

/// A product's mean month-over-month growth.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRate {
    pub product: String,
    pub average_growth_percent: f64,
}

/// Month-over-month quantity growth for every product.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductGrowth {
    /// Defined transitions per product; products without one are absent.
    pub changes: BTreeMap<String, Vec<MonthlyChange>>,
    /// Mean of each product's transitions.
    pub average_rates: BTreeMap<String, f64>,
    /// Highest average rates, best first.
    pub top: Vec<ProductRate>,
}

/// Every aggregation over one derived record set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesReport {
    pub generated_at: DateTime<Utc>,
    pub record_count: usize,
    pub total_revenue: f64,
    pub total_quantity: f64,

    pub monthly_revenue: BTreeMap<u32, f64>,
    pub hourly_revenue: BTreeMap<u32, f64>,
    pub month_hour_revenue: Pivot<u32, u32>,
    pub peak_hours: Vec<u32>,
    pub peak_hour_trend: Pivot<u32, u32>,

    pub city_revenue: BTreeMap<String, f64>,
    pub state_revenue: BTreeMap<String, f64>,

    pub product_quantity: BTreeMap<String, f64>,
    pub product_share_percent: BTreeMap<String, f64>,
    pub top_product: ProductQuantity,
    pub month_product_quantity: Pivot<u32, String>,
    pub top_product_per_month: BTreeMap<u32, ProductQuantity>,

    pub day_of_month_quantity: BTreeMap<u32, f64>,
    pub weekday_quantity: BTreeMap<u32, f64>,
    pub day_type_quantity: DayTypeTotals,

    pub daily_revenue: Vec<DailyRevenue>,
    pub event_comparison: EventComparison,

    pub product_growth: ProductGrowth,
    pub growth_leader: Option<ProductRate>,
    /// Monthly quantities of the growth leader; `None` marks months without sales.
    pub growth_leader_series: Vec<(u32, Option<f64>)>,
}
