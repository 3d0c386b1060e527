//! Presentation of pipeline results.
//!
//! Supports a plain-text summary, JSON export of the full report, and CSV
//! export of the derived records.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use csv::WriterBuilder;
use serde::Serialize;
use tracing::{debug, info};

use crate::analyzers::types::{GroupStats, SalesReport};
use crate::features::DerivedRecord;
use crate::pipeline::PipelineReport;

// Category labels match the upstream sales reports.
const WEEKDAY_LABELS: [&str; 7] = [
    "Lunes",
    "Martes",
    "Miércoles",
    "Jueves",
    "Viernes",
    "Sábado",
    "Domingo",
];

const MONTH_LABELS: [&str; 12] = [
    "Enero",
    "Febrero",
    "Marzo",
    "Abril",
    "Mayo",
    "Junio",
    "Julio",
    "Agosto",
    "Septiembre",
    "Octubre",
    "Noviembre",
    "Diciembre",
];

const UNKNOWN_LABEL: &str = "Desconocido";
const WEEKDAY_TYPE_LABEL: &str = "Laborable";
const WEEKEND_TYPE_LABEL: &str = "Fin de Semana";
const SPECIAL_EVENT_LABEL: &str = "Eventos Especiales";
const NORMAL_DAY_LABEL: &str = "Días Normales";

/// Display label for a 0-based weekday (0 = Monday).
pub fn weekday_label(weekday: u32) -> &'static str {
    WEEKDAY_LABELS
        .get(weekday as usize)
        .copied()
        .unwrap_or(UNKNOWN_LABEL)
}

/// Display label for a 1-based month.
pub fn month_label(month: u32) -> &'static str {
    month
        .checked_sub(1)
        .and_then(|i| MONTH_LABELS.get(i as usize))
        .copied()
        .unwrap_or(UNKNOWN_LABEL)
}

/// Formats a number with thousands separators and fixed decimals.
pub fn format_amount(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::new();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && formatted.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "-"
    } else {
        ""
    };
    match frac_part {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}

fn write_series<K, F>(out: &mut String, title: &str, series: &BTreeMap<K, f64>, label: F, decimals: usize)
where
    F: Fn(&K) -> String,
{
    let _ = writeln!(out, "\n{title}");
    for (key, value) in series {
        let _ = writeln!(out, "  {:<24} {:>16}", label(key), format_amount(*value, decimals));
    }
}

fn write_group(out: &mut String, label: &str, stats: &GroupStats) {
    let mean = stats
        .mean
        .map(|m| format!("${}", format_amount(m, 2)))
        .unwrap_or_else(|| "n/a".to_string());
    let _ = writeln!(out, "  {:<24} {:>16} over {} day(s)", label, mean, stats.days);
}

/// Renders the text summary of a sales report.
pub fn render_report(report: &SalesReport) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Sales report: {} records, revenue ${}, {} units",
        report.record_count,
        format_amount(report.total_revenue, 2),
        format_amount(report.total_quantity, 0)
    );

    write_series(
        &mut out,
        "Revenue by month ($)",
        &report.monthly_revenue,
        |m| month_label(*m).to_string(),
        2,
    );
    write_series(
        &mut out,
        "Revenue by hour of day ($)",
        &report.hourly_revenue,
        |h| format!("{h:02}:00"),
        2,
    );
    let peak: Vec<String> = report.peak_hours.iter().map(|h| format!("{h:02}:00")).collect();
    let _ = writeln!(out, "\nBusiest hours: {}", peak.join(", "));

    write_series(&mut out, "Revenue by city ($)", &report.city_revenue, |c| c.clone(), 2);
    write_series(&mut out, "Revenue by state ($)", &report.state_revenue, |s| s.clone(), 2);

    let _ = writeln!(
        out,
        "\nBest-selling product: {} with {} units",
        report.top_product.product,
        format_amount(report.top_product.quantity, 0)
    );
    let _ = writeln!(out, "\nBest-selling product by month");
    for (month, winner) in &report.top_product_per_month {
        let _ = writeln!(
            out,
            "  {:<24} {} ({} units)",
            month_label(*month),
            winner.product,
            format_amount(winner.quantity, 0)
        );
    }

    write_series(
        &mut out,
        "Units by day of month",
        &report.day_of_month_quantity,
        |d| d.to_string(),
        0,
    );
    write_series(
        &mut out,
        "Units by weekday",
        &report.weekday_quantity,
        |w| weekday_label(*w).to_string(),
        0,
    );
    let _ = writeln!(out, "\nUnits by day type");
    let _ = writeln!(
        out,
        "  {:<24} {:>16}",
        WEEKDAY_TYPE_LABEL,
        format_amount(report.day_type_quantity.weekday, 0)
    );
    let _ = writeln!(
        out,
        "  {:<24} {:>16}",
        WEEKEND_TYPE_LABEL,
        format_amount(report.day_type_quantity.weekend, 0)
    );

    let _ = writeln!(out, "\nMean daily revenue");
    write_group(&mut out, SPECIAL_EVENT_LABEL, &report.event_comparison.special_event);
    write_group(&mut out, NORMAL_DAY_LABEL, &report.event_comparison.normal);
    for day in report.daily_revenue.iter().filter(|d| d.is_special_event) {
        let _ = writeln!(
            out,
            "    {} {:<22} {:>14}",
            day.date,
            day.event.as_deref().unwrap_or(SPECIAL_EVENT_LABEL),
            format!("${}", format_amount(day.revenue, 2))
        );
    }

    match &report.growth_leader {
        Some(leader) => {
            let _ = writeln!(
                out,
                "\nFastest-growing product: {} with an average of {:.2}% per month",
                leader.product, leader.average_growth_percent
            );
        }
        None => {
            let _ = writeln!(out, "\nFastest-growing product: not enough monthly data");
        }
    }
    if !report.product_growth.top.is_empty() {
        let _ = writeln!(out, "\nTop products by average monthly growth");
        for rate in &report.product_growth.top {
            let _ = writeln!(out, "  {:<40} {:>9.2}%", rate.product, rate.average_growth_percent);
        }
    }

    out
}

/// Renders the input summary followed by the report.
pub fn render_summary(run: &PipelineReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Input files");
    for source in &run.sources {
        let _ = writeln!(out, "  {} ({} rows)", source.path.display(), source.rows);
    }
    let _ = writeln!(
        out,
        "Rows: {} loaded, {} after cleaning, {} analyzed\n",
        run.cleaning.input_rows, run.cleaning.output_rows, run.derivation.output_rows
    );

    out.push_str(&render_report(&run.report));
    out
}

/// Writes `value` as pretty-printed JSON to `path`.
pub fn write_json(path: &Path, value: &impl Serialize) -> Result<()> {
    let body = serde_json::to_string_pretty(value)?;
    std::fs::write(path, body).with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), "JSON report written");
    Ok(())
}

/// Writes derived records to a CSV file at `path`, replacing any existing file.
pub fn write_records(path: &Path, records: &[DerivedRecord]) -> Result<()> {
    debug!(path = %path.display(), rows = records.len(), "Writing CSV records");

    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(file);

    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    info!(path = %path.display(), rows = records.len(), "Records exported");
    Ok(())
}
