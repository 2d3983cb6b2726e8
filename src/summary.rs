use std::collections::BTreeMap;

use serde::Serialize;

use crate::stats;
use crate::table::ObservationTable;

/// Per-column aggregate in the shape of a `describe()` row. Fields are NaN
/// when the column holds no finite values.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ColumnSummary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub min: f64,
    pub q1: f64,
    pub q3: f64,
    pub max: f64,
}

pub fn summarize_column(values: &[f64]) -> ColumnSummary {
    let sorted = stats::sorted_finite(values);
    ColumnSummary {
        count: sorted.len(),
        mean: stats::mean(&sorted),
        median: stats::median(&sorted),
        std: stats::sample_std(&sorted),
        min: sorted.first().copied().unwrap_or(f64::NAN),
        q1: stats::percentile(&sorted, 25.0),
        q3: stats::percentile(&sorted, 75.0),
        max: sorted.last().copied().unwrap_or(f64::NAN),
    }
}

pub fn summarize(table: &ObservationTable) -> BTreeMap<String, ColumnSummary> {
    table
        .numeric_columns()
        .map(|(name, values)| (name.to_string(), summarize_column(values)))
        .collect()
}
