//! Load → clean → derive → analyze, run once over an input directory.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::analyzers::analyzer::analyze;
use crate::analyzers::types::SalesReport;
use crate::cleaner::{CleaningSummary, clean};
use crate::config::EventCalendar;
use crate::features::{DerivationSummary, DerivedRecord, derive_features};
use crate::loader::{LoadOutcome, SourceFile, load_directory};

/// Records ready for aggregation, plus what happened to the input on the way.
#[derive(Debug, Clone)]
pub struct PreparedData {
    pub sources: Vec<SourceFile>,
    pub cleaning: CleaningSummary,
    pub derivation: DerivationSummary,
    pub records: Vec<DerivedRecord>,
}

/// Everything a run produces.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub sources: Vec<SourceFile>,
    pub cleaning: CleaningSummary,
    pub derivation: DerivationSummary,
    pub report: SalesReport,
}

/// Loads, cleans and derives every record under `data_dir`.
///
/// Returns `Ok(None)` when the directory holds no input files.
#[tracing::instrument(skip_all, fields(data_dir = %data_dir.display()))]
pub fn prepare(data_dir: &Path, calendar: &EventCalendar) -> Result<Option<PreparedData>> {
    let dataset = match load_directory(data_dir)? {
        LoadOutcome::NoInput => {
            info!("No CSV files found in the input directory");
            return Ok(None);
        }
        LoadOutcome::Loaded(dataset) => dataset,
    };

    let (clean_records, cleaning) = clean(&dataset)?;
    let (records, derivation) = derive_features(clean_records, calendar);

    Ok(Some(PreparedData {
        sources: dataset.sources,
        cleaning,
        derivation,
        records,
    }))
}

/// Runs the whole pipeline over `data_dir`.
///
/// Returns `Ok(None)` when there is no input. Fails if input exists but no
/// row survives cleaning.
pub fn run(data_dir: &Path, calendar: &EventCalendar) -> Result<Option<PipelineReport>> {
    let Some(prepared) = prepare(data_dir, calendar)? else {
        return Ok(None);
    };

    let report = analyze(&prepared.records, calendar).with_context(|| {
        format!(
            "{} of {} rows survived cleaning",
            prepared.records.len(),
            prepared.cleaning.input_rows
        )
    })?;

    Ok(Some(PipelineReport {
        sources: prepared.sources,
        cleaning: prepared.cleaning,
        derivation: prepared.derivation,
        report,
    }))
}
