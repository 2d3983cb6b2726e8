use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::cleaning::{self, CleaningOutcome};
use crate::config::AnalysisConfig;
use crate::correlation::{self, CorrelatedPair, CorrelationMatrix};
use crate::errors::Result;
use crate::loader;
use crate::quality::{self, QualityReport};
use crate::summary::{self, ColumnSummary};
use crate::table::{ObservationTable, MODULE_COLUMNS};
use crate::timeseries::{self, Decomposition, Resampled, ResampleFrequency};
use crate::wind::{self, WindSector};
use crate::cleaning_impact::{self, CleaningImpact};

/// Columns shown on the resampled overview chart.
const RESAMPLE_COLUMNS: [&str; 4] = ["GHI", "DNI", "DHI", "Tamb"];

/// Everything the dashboard layer consumes for one location, as plain data.
#[derive(Debug, Serialize)]
pub struct LocationReport {
    pub location: String,
    pub rows: usize,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub cleaning: CleaningOutcome,
    pub summary: BTreeMap<String, ColumnSummary>,
    pub quality: QualityReport,
    pub resampled: Resampled,
    pub decomposition: BTreeMap<String, Decomposition>,
    pub cleaning_impact: Vec<CleaningImpact>,
    pub correlation: CorrelationMatrix,
    pub top_pairs: Vec<CorrelatedPair>,
    pub wind: Vec<WindSector>,
}

/// Run the full analysis for one location file. Analyzer failures abort this
/// location only; other locations run independently.
pub fn run_location(path: &Path, config: &AnalysisConfig) -> Result<LocationReport> {
    let started = Instant::now();
    let location = location_name(path);

    let mut table = loader::load_table(path, &location)?;
    let outcome = cleaning::clean(&mut table, config);
    let report = analyze(table, outcome, config)?;

    info!(
        location = report.location.as_str(),
        rows = report.rows,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "location pipeline complete"
    );
    Ok(report)
}

/// Analyzer fan-out over an already-cleaned table.
pub fn analyze(
    table: ObservationTable,
    outcome: CleaningOutcome,
    config: &AnalysisConfig,
) -> Result<LocationReport> {
    let summary = summary::summarize(&table);
    let quality = quality::check(&table, &outcome.flags);
    let resampled = timeseries::resample(&table, &RESAMPLE_COLUMNS, config.resample_frequency);

    // Decomposition runs on daily means of the module series so a
    // month-of-days seasonal period stays tractable at minute resolution.
    let module_daily = timeseries::resample(&table, &MODULE_COLUMNS, ResampleFrequency::Daily);
    let mut decomposition = BTreeMap::new();
    for name in MODULE_COLUMNS {
        let values = &module_daily.series[name];
        decomposition.insert(
            name.to_string(),
            timeseries::decompose(values, config.seasonal_period)?,
        );
    }

    let cleaning_impact = cleaning_impact::analyze(&table, config.test_kind)?;
    let correlation = correlation::correlation_matrix(&table);
    let top_pairs = correlation::top_pairs(&correlation, config.top_pairs);
    let wind = wind::wind_rose(&table, config.wind_sectors);

    Ok(LocationReport {
        location: table.location.clone(),
        rows: table.len(),
        start: table.timestamps.first().copied(),
        end: table.timestamps.last().copied(),
        cleaning: outcome,
        summary,
        quality,
        resampled,
        decomposition,
        cleaning_impact,
        correlation,
        top_pairs,
        wind,
    })
}

/// Mean irradiance per site, the one place locations are compared. Built from
/// independent per-location reports, never from merged tables.
#[derive(Debug, Clone, Serialize)]
pub struct LocationSolarMeans {
    pub location: String,
    pub ghi: f64,
    pub dni: f64,
    pub dhi: f64,
}

pub fn compare_locations(reports: &[LocationReport]) -> Vec<LocationSolarMeans> {
    reports
        .iter()
        .map(|report| {
            let mean_of = |name: &str| {
                report
                    .summary
                    .get(name)
                    .map(|s| s.mean)
                    .unwrap_or(f64::NAN)
            };
            LocationSolarMeans {
                location: report.location.clone(),
                ghi: mean_of("GHI"),
                dni: mean_of("DNI"),
                dhi: mean_of("DHI"),
            }
        })
        .collect()
}

/// Display name from a file path: `sierra_leone.csv` becomes `Sierra Leone`.
pub fn location_name(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unknown".to_string());
    stem.split(['_', '-', ' '])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
