//! Month-over-month quantity growth per product.
//!
//! Works on the month by product matrix. A transition between two adjacent
//! months of the matrix counts only when the product has observed sales in
//! both and the earlier month is non-zero. Months without data are never
//! read as zero here, so intermittent products are not credited with
//! infinite or -100% swings.

use std::collections::BTreeMap;

use crate::analyzers::types::{MonthlyChange, Pivot, ProductGrowth, ProductRate};
use crate::analyzers::utility::{argmax, mean, top_n};
use crate::errors::AggregateError;

/// Number of products listed in the growth ranking.
pub const TOP_GROWTH_COUNT: usize = 5;

/// Defined month-over-month changes for one product column.
pub fn monthly_changes(matrix: &Pivot<u32, String>, product: &String) -> Vec<MonthlyChange> {
    let series = matrix.column(product);

    series
        .windows(2)
        .filter_map(|pair| {
            let (from_month, previous) = pair[0];
            let (to_month, current) = pair[1];
            match (previous, current) {
                (Some(prev), Some(cur)) if prev != 0.0 => Some(MonthlyChange {
                    from_month,
                    to_month,
                    percent: (cur - prev) / prev * 100.0,
                }),
                _ => None,
            }
        })
        .collect()
}

/// Average growth for every product that has at least one defined change.
pub fn product_growth(matrix: &Pivot<u32, String>) -> ProductGrowth {
    let mut changes = BTreeMap::new();
    let mut average_rates = BTreeMap::new();

    for product in &matrix.columns {
        let product_changes = monthly_changes(matrix, product);
        let percents: Vec<f64> = product_changes.iter().map(|c| c.percent).collect();

        if let Some(avg) = mean(&percents) {
            average_rates.insert(product.clone(), avg);
            changes.insert(product.clone(), product_changes);
        }
    }

    let top = top_n(&average_rates, TOP_GROWTH_COUNT)
        .into_iter()
        .map(|(product, average_growth_percent)| ProductRate {
            product,
            average_growth_percent,
        })
        .collect();

    ProductGrowth {
        changes,
        average_rates,
        top,
    }
}

/// The product with the highest average growth.
pub fn growth_leader(growth: &ProductGrowth) -> Result<ProductRate, AggregateError> {
    argmax(&growth.average_rates)
        .map(|(product, rate)| ProductRate {
            product: product.clone(),
            average_growth_percent: rate,
        })
        .ok_or(AggregateError::NoGrowthData)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(entries: &[(u32, &str, f64)]) -> Pivot<u32, String> {
        Pivot::from_sums(
            entries
                .iter()
                .map(|(m, p, q)| ((*m, p.to_string()), *q))
                .collect(),
        )
    }

    #[test]
    fn test_changes_between_observed_months() {
        let m = matrix(&[(1, "A", 10.0), (2, "A", 20.0), (3, "A", 15.0)]);
        let changes = monthly_changes(&m, &"A".to_string());
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].from_month, 1);
        assert_eq!(changes[0].to_month, 2);
        assert_eq!(changes[0].percent, 100.0);
        assert_eq!(changes[1].percent, -25.0);

        let growth = product_growth(&m);
        assert_eq!(growth.average_rates["A"], 37.5);
    }

    #[test]
    fn test_product_only_in_one_month_has_no_rate() {
        // B sells only in month 3; A keeps months 1..3 in the matrix.
        let m = matrix(&[
            (1, "A", 10.0),
            (2, "A", 10.0),
            (3, "A", 10.0),
            (3, "B", 7.0),
        ]);

        assert_eq!(m.get(&2, &"B".to_string()), None);
        assert!(monthly_changes(&m, &"B".to_string()).is_empty());

        let growth = product_growth(&m);
        assert!(!growth.average_rates.contains_key("B"));
        assert_eq!(growth.average_rates["A"], 0.0);
    }

    #[test]
    fn test_gap_month_breaks_transition() {
        let m = matrix(&[
            (1, "A", 10.0),
            (2, "B", 1.0),
            (3, "A", 20.0),
            (4, "A", 30.0),
        ]);
        let changes = monthly_changes(&m, &"A".to_string());
        assert_eq!(changes.len(), 1);
        assert_eq!((changes[0].from_month, changes[0].to_month), (3, 4));
        assert_eq!(changes[0].percent, 50.0);
    }

    #[test]
    fn test_zero_base_month_is_skipped() {
        let m = matrix(&[(1, "A", 0.0), (2, "A", 5.0), (3, "A", 10.0)]);
        let changes = monthly_changes(&m, &"A".to_string());
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].percent, 100.0);
    }

    #[test]
    fn test_leader_and_ranking() {
        let m = matrix(&[
            (1, "A", 10.0),
            (2, "A", 20.0),
            (1, "B", 10.0),
            (2, "B", 5.0),
            (1, "C", 10.0),
            (2, "C", 20.0),
        ]);
        let growth = product_growth(&m);
        let leader = growth_leader(&growth).unwrap();
        assert_eq!(leader.product, "A");
        assert_eq!(leader.average_growth_percent, 100.0);

        let ranked: Vec<&str> = growth.top.iter().map(|r| r.product.as_str()).collect();
        assert_eq!(ranked, vec!["A", "C", "B"]);
    }

    #[test]
    fn test_leader_without_data() {
        let m = matrix(&[(1, "A", 10.0)]);
        let growth = product_growth(&m);
        assert!(growth.average_rates.is_empty());
        assert_eq!(growth_leader(&growth), Err(AggregateError::NoGrowthData));
    }
}
