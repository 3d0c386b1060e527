//! Per-row derived fields: calendar parts, location, revenue and flags.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::{Serialize, Serializer};
use tracing::{debug, info, warn};

use crate::address::{AddressError, parse_address};
use crate::cleaner::CleanRecord;
use crate::config::EventCalendar;
use crate::schema::ORDER_DATETIME_FORMAT;

/// A clean record plus everything the aggregations group by.
///
/// Field names serialize to the input headers so an exported file can be
/// loaded again.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedRecord {
    #[serde(rename = "ID de Pedido", skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(rename = "Producto")]
    pub product: String,
    #[serde(rename = "Cantidad Pedida")]
    pub quantity: f64,
    #[serde(rename = "Precio Unitario")]
    pub unit_price: f64,
    #[serde(rename = "Fecha de Pedido", serialize_with = "serialize_ordered_at")]
    pub ordered_at: NaiveDateTime,
    #[serde(rename = "Dirección de Envio")]
    pub shipping_address: String,

    #[serde(rename = "Mes")]
    pub month: u32,
    #[serde(rename = "Hora")]
    pub hour: u32,
    /// 0 = Monday.
    #[serde(rename = "Día de la Semana")]
    pub weekday: u32,
    #[serde(rename = "Día del Mes")]
    pub day_of_month: u32,
    #[serde(rename = "Ciudad")]
    pub city: String,
    #[serde(rename = "Estado")]
    pub state: String,
    #[serde(rename = "Total_Ventas")]
    pub revenue: f64,
    #[serde(rename = "Es Fin de Semana")]
    pub is_weekend: bool,
    #[serde(rename = "Fecha")]
    pub calendar_date: NaiveDate,
    #[serde(rename = "Es Evento Especial")]
    pub is_special_event: bool,
}

fn serialize_ordered_at<S: Serializer>(value: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(&value.format(ORDER_DATETIME_FORMAT))
}

impl DerivedRecord {
    /// Derives every field of `record`.
    ///
    /// Only the address can fail to derive; the rest is total over clean
    /// records.
    pub fn from_clean(record: CleanRecord, calendar: &EventCalendar) -> Result<Self, AddressError> {
        let address = parse_address(&record.shipping_address)?;

        let ordered_at = record.ordered_at;
        let weekday = ordered_at.weekday().num_days_from_monday();
        let calendar_date = ordered_at.date();

        Ok(Self {
            month: ordered_at.month(),
            hour: ordered_at.hour(),
            weekday,
            day_of_month: ordered_at.day(),
            city: address.city,
            state: address.state,
            revenue: record.quantity * record.unit_price,
            is_weekend: weekday >= 5,
            calendar_date,
            is_special_event: calendar.contains(calendar_date),
            order_id: record.order_id,
            product: record.product,
            quantity: record.quantity,
            unit_price: record.unit_price,
            ordered_at,
            shipping_address: record.shipping_address,
        })
    }
}

/// Rows lost during derivation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DerivationSummary {
    pub input_rows: usize,
    pub malformed_addresses: usize,
    pub output_rows: usize,
}

/// Derives all records. Rows with an unparseable address are dropped.
#[tracing::instrument(skip_all, fields(rows = records.len(), events = calendar.len()))]
pub fn derive_features(
    records: Vec<CleanRecord>,
    calendar: &EventCalendar,
) -> (Vec<DerivedRecord>, DerivationSummary) {
    let mut summary = DerivationSummary {
        input_rows: records.len(),
        ..Default::default()
    };

    let derived: Vec<DerivedRecord> = records
        .into_iter()
        .filter_map(|record| {
            let address = record.shipping_address.clone();
            match DerivedRecord::from_clean(record, calendar) {
                Ok(derived) => Some(derived),
                Err(e) => {
                    debug!(address = %address, error = %e, "Dropping row with malformed address");
                    summary.malformed_addresses += 1;
                    None
                }
            }
        })
        .collect();

    summary.output_rows = derived.len();

    if summary.malformed_addresses > 0 {
        warn!(
            dropped = summary.malformed_addresses,
            "Rows dropped for malformed shipping addresses"
        );
    }
    info!(rows = summary.output_rows, "Features derived");

    (derived, summary)
}
