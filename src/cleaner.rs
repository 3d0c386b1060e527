//! Row validation and type coercion.
//!
//! Rows are filtered in three passes, each of which can only remove rows:
//! incomplete rows, rows whose quantity or unit price is not numeric, and
//! rows whose order date does not parse. Dropped rows are counted, not
//! reported as errors.

use std::path::Path;

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{debug, info};

use crate::errors::SchemaError;
use crate::loader::{RawDataset, RawRecord};
use crate::schema::{ColumnIndex, ORDER_DATETIME_FORMAT};

/// A row whose quantity, unit price and order date are well typed.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanRecord {
    /// `None` when the input has no order id column.
    pub order_id: Option<String>,
    pub product: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub ordered_at: NaiveDateTime,
    pub shipping_address: String,
}

/// How many rows each cleaning pass removed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CleaningSummary {
    pub input_rows: usize,
    pub dropped_incomplete: usize,
    pub dropped_non_numeric: usize,
    pub dropped_bad_timestamp: usize,
    pub output_rows: usize,
}

impl CleaningSummary {
    pub fn dropped(&self) -> usize {
        self.dropped_incomplete + self.dropped_non_numeric + self.dropped_bad_timestamp
    }
}

/// Parses a numeric cell. Non-finite values are rejected.
pub fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses an order timestamp in `MM/DD/YY HH:MM` form.
pub fn parse_order_datetime(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, ORDER_DATETIME_FORMAT).ok()
}

/// Filters and types the loaded rows.
///
/// # Errors
///
/// Fails only if the combined header lacks a required column, which the
/// loader already rules out for data read from disk.
#[tracing::instrument(skip_all, fields(rows = dataset.len()))]
pub fn clean(dataset: &RawDataset) -> Result<(Vec<CleanRecord>, CleaningSummary), SchemaError> {
    let index = ColumnIndex::resolve(Path::new("<combined>"), &dataset.columns)?;
    let width = dataset.columns.len();

    let mut summary = CleaningSummary {
        input_rows: dataset.len(),
        ..Default::default()
    };

    // Pass 1: every column must be present, not just the ones used later.
    let complete: Vec<&RawRecord> = dataset
        .records
        .iter()
        .filter(|r| r.is_complete(width))
        .collect();
    summary.dropped_incomplete = dataset.len() - complete.len();

    // Pass 2: numeric coercion.
    let numeric: Vec<(&RawRecord, f64, f64)> = complete
        .into_iter()
        .filter_map(|r| {
            let quantity = r.get(index.quantity).and_then(parse_number);
            let unit_price = r.get(index.unit_price).and_then(parse_number);
            match (quantity, unit_price) {
                (Some(q), Some(p)) => Some((r, q, p)),
                _ => {
                    summary.dropped_non_numeric += 1;
                    None
                }
            }
        })
        .collect();

    // Pass 3: timestamp parsing.
    let records: Vec<CleanRecord> = numeric
        .into_iter()
        .filter_map(|(r, quantity, unit_price)| {
            let Some(ordered_at) = r.get(index.ordered_at).and_then(parse_order_datetime) else {
                summary.dropped_bad_timestamp += 1;
                return None;
            };
            Some(CleanRecord {
                order_id: index.order_id.and_then(|i| r.get(i)).map(str::to_string),
                product: r.get(index.product).unwrap_or_default().to_string(),
                quantity,
                unit_price,
                ordered_at,
                shipping_address: r.get(index.shipping_address).unwrap_or_default().to_string(),
            })
        })
        .collect();

    summary.output_rows = records.len();

    debug!(?summary, "Cleaning passes complete");
    info!(
        kept = summary.output_rows,
        dropped = summary.dropped(),
        "Dataset cleaned"
    );

    Ok((records, summary))
}
