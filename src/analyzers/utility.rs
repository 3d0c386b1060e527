use std::collections::BTreeMap;

/// Computes the arithmetic mean of a slice of values. Returns `None` for empty input.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Computes the population standard deviation given a pre-computed mean.
/// Returns 0.0 for empty input.
pub fn stddev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;

    variance.sqrt()
}

/// Sums `measure` over `items`, grouped by `key`.
pub fn sum_by<T, K, F, M>(items: &[T], key: F, measure: M) -> BTreeMap<K, f64>
where
    K: Ord,
    F: Fn(&T) -> K,
    M: Fn(&T) -> f64,
{
    let mut totals = BTreeMap::new();
    for item in items {
        *totals.entry(key(item)).or_insert(0.0) += measure(item);
    }
    totals
}

/// Key with the largest value. Ties go to the smallest key.
pub fn argmax<K>(totals: &BTreeMap<K, f64>) -> Option<(&K, f64)> {
    let mut best: Option<(&K, f64)> = None;
    for (key, &value) in totals {
        match best {
            Some((_, current)) if value <= current => {}
            _ => best = Some((key, value)),
        }
    }
    best
}

/// The `n` largest entries, largest first. Ties keep key order.
pub fn top_n<K: Clone>(totals: &BTreeMap<K, f64>, n: usize) -> Vec<(K, f64)> {
    let mut entries: Vec<(K, f64)> = totals.iter().map(|(k, v)| (k.clone(), *v)).collect();
    entries.sort_by(|a, b| b.1.total_cmp(&a.1));
    entries.truncate(n);
    entries
}
