use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use tracing::{debug, info};

use crate::errors::{AnalysisError, Result};
use crate::table::{
    ObservationTable, CLEANING_COLUMN, COMMENTS_COLUMN, NUMERIC_COLUMNS, NUMERIC_COLUMN_COUNT,
    TIMESTAMP_COLUMN,
};

const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M", "%Y-%m-%d %H:%M:%S"];

/// Read one location's CSV export into an observation table.
///
/// The header must carry every expected column except Comments, which is
/// optional. Timestamps must parse and be strictly increasing; numeric fields
/// may be empty (recorded as NaN) but not malformed.
pub fn load_table(path: &Path, location: &str) -> Result<ObservationTable> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    let index: HashMap<&str, usize> = headers
        .iter()
        .enumerate()
        .map(|(i, name)| (name, i))
        .collect();

    let timestamp_idx = require(&index, TIMESTAMP_COLUMN)?;
    let cleaning_idx = require(&index, CLEANING_COLUMN)?;
    let mut numeric_idx = [0usize; NUMERIC_COLUMN_COUNT];
    for (slot, name) in numeric_idx.iter_mut().zip(NUMERIC_COLUMNS) {
        *slot = require(&index, name)?;
    }
    let comments_idx = index.get(COMMENTS_COLUMN).copied();
    if comments_idx.is_none() {
        debug!(location, "input has no Comments column");
    }

    let mut table = ObservationTable::new(location);
    let mut previous: Option<DateTime<Utc>> = None;

    for (i, record) in reader.records().enumerate() {
        let record = record?;
        // Data starts on line 2, after the header.
        let row = i + 2;

        let raw_ts = field(&record, timestamp_idx);
        let timestamp = parse_timestamp(raw_ts, row)?;
        if let Some(prev) = previous {
            if timestamp <= prev {
                return Err(AnalysisError::Parse {
                    row,
                    column: TIMESTAMP_COLUMN.to_string(),
                    value: raw_ts.to_string(),
                    message: format!("timestamps must be strictly increasing (previous {prev})"),
                });
            }
        }
        previous = Some(timestamp);

        let mut values = [f64::NAN; NUMERIC_COLUMN_COUNT];
        for (value, (&idx, name)) in values
            .iter_mut()
            .zip(numeric_idx.iter().zip(NUMERIC_COLUMNS))
        {
            *value = parse_numeric(field(&record, idx), name, row)?;
        }

        let cleaning = parse_cleaning(field(&record, cleaning_idx), row)?;
        let comment = comments_idx
            .map(|idx| field(&record, idx))
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        table.push_row(timestamp, values, cleaning, comment);
    }

    info!(location, rows = table.len(), "loaded observation table");
    Ok(table)
}

fn require(index: &HashMap<&str, usize>, column: &str) -> Result<usize> {
    index.get(column).copied().ok_or_else(|| AnalysisError::Schema {
        column: column.to_string(),
    })
}

fn field<'a>(record: &'a csv::StringRecord, idx: usize) -> &'a str {
    record.get(idx).unwrap_or("")
}

fn parse_timestamp(value: &str, row: usize) -> Result<DateTime<Utc>> {
    for format in TIMESTAMP_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    Err(AnalysisError::Parse {
        row,
        column: TIMESTAMP_COLUMN.to_string(),
        value: value.to_string(),
        message: format!("expected format '{}'", TIMESTAMP_FORMATS[0]),
    })
}

fn parse_numeric(value: &str, column: &str, row: usize) -> Result<f64> {
    if value.is_empty() {
        return Ok(f64::NAN);
    }
    value.parse::<f64>().map_err(|e| AnalysisError::Parse {
        row,
        column: column.to_string(),
        value: value.to_string(),
        message: e.to_string(),
    })
}

fn parse_cleaning(value: &str, row: usize) -> Result<bool> {
    match value {
        "" | "0" => Ok(false),
        "1" => Ok(true),
        other => match other.parse::<f64>() {
            Ok(v) if v == 0.0 => Ok(false),
            Ok(v) if v == 1.0 => Ok(true),
            _ => Err(AnalysisError::Parse {
                row,
                column: CLEANING_COLUMN.to_string(),
                value: value.to_string(),
                message: "expected 0 or 1".to_string(),
            }),
        },
    }
}
