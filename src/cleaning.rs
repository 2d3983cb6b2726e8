use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::{debug, info};

use crate::config::{AnalysisConfig, OutlierMethod};
use crate::stats;
use crate::table::{ObservationTable, IRRADIANCE_COLUMNS};

/// Advisory outlier annotations: row index to the set of columns flagged
/// there. Flagged rows are never removed; nighttime zeros and clear-sky peaks
/// can both be legitimate.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OutlierFlags {
    rows: BTreeMap<usize, BTreeSet<String>>,
}

impl OutlierFlags {
    pub fn flag(&mut self, row: usize, column: &str) {
        self.rows.entry(row).or_default().insert(column.to_string());
    }

    pub fn columns_for(&self, row: usize) -> Option<&BTreeSet<String>> {
        self.rows.get(&row)
    }

    pub fn flagged_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self, column: &str) -> usize {
        self.rows.values().filter(|cols| cols.contains(column)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CleaningOutcome {
    pub comments_dropped: bool,
    /// Negative irradiance readings clipped to zero, per column.
    pub clipped: BTreeMap<String, usize>,
    pub flags: OutlierFlags,
}

/// Preprocess a loaded table in place: drop an entirely empty Comments
/// column, clip negative irradiance to zero, and flag outliers per numeric
/// column. The clipping pass is idempotent.
pub fn clean(table: &mut ObservationTable, config: &AnalysisConfig) -> CleaningOutcome {
    let comments_dropped = drop_empty_comments(table);

    let mut clipped = BTreeMap::new();
    for name in IRRADIANCE_COLUMNS {
        let column = table.column_mut(name).expect("irradiance column exists");
        let mut count = 0usize;
        for value in column.iter_mut() {
            if value.is_finite() && *value < 0.0 {
                *value = 0.0;
                count += 1;
            }
        }
        if count > 0 {
            debug!(column = name, count, "clipped negative irradiance values");
        }
        clipped.insert(name.to_string(), count);
    }

    let flags = flag_outliers(table, config);
    info!(
        location = table.location.as_str(),
        comments_dropped,
        flagged_rows = flags.flagged_rows(),
        "cleaning stage complete"
    );

    CleaningOutcome {
        comments_dropped,
        clipped,
        flags,
    }
}

fn drop_empty_comments(table: &mut ObservationTable) -> bool {
    let all_empty = table
        .comments
        .as_ref()
        .is_some_and(|comments| comments.iter().all(|c| c.is_none()));
    if all_empty {
        table.comments = None;
    }
    all_empty
}

fn flag_outliers(table: &ObservationTable, config: &AnalysisConfig) -> OutlierFlags {
    let mut flags = OutlierFlags::default();

    for (name, values) in table.numeric_columns() {
        match config.outlier_method {
            OutlierMethod::Iqr => {
                let sorted = stats::sorted_finite(values);
                // Quartiles are meaningless for a handful of points.
                if sorted.len() < 4 {
                    continue;
                }
                let q1 = stats::percentile(&sorted, 25.0);
                let q3 = stats::percentile(&sorted, 75.0);
                let iqr = q3 - q1;
                let low = q1 - config.iqr_multiplier * iqr;
                let high = q3 + config.iqr_multiplier * iqr;
                for (row, &v) in values.iter().enumerate() {
                    if v.is_finite() && (v < low || v > high) {
                        flags.flag(row, name);
                    }
                }
            }
            OutlierMethod::ZScore => {
                let finite = stats::finite(values);
                let mean = stats::mean(&finite);
                let std = stats::sample_std(&finite);
                if !(std > 0.0) {
                    continue;
                }
                for (row, &v) in values.iter().enumerate() {
                    if v.is_finite() && ((v - mean) / std).abs() > config.zscore_threshold {
                        flags.flag(row, name);
                    }
                }
            }
        }
    }

    flags
}
