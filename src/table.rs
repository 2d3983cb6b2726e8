use chrono::{DateTime, Utc};

pub const TIMESTAMP_COLUMN: &str = "Timestamp";
pub const CLEANING_COLUMN: &str = "Cleaning";
pub const COMMENTS_COLUMN: &str = "Comments";

/// Measurement columns carried as f64 series, in header order.
pub const NUMERIC_COLUMNS: [&str; 16] = [
    "GHI", "DNI", "DHI", "ModA", "ModB", "Tamb", "RH", "WS", "WSgust", "WSstdev", "WD", "WDstdev",
    "BP", "Precipitation", "TModA", "TModB",
];

pub const NUMERIC_COLUMN_COUNT: usize = NUMERIC_COLUMNS.len();

/// Irradiance columns clipped to zero during cleaning.
pub const IRRADIANCE_COLUMNS: [&str; 3] = ["GHI", "DNI", "DHI"];

/// Sensor-module columns compared around cleaning events.
pub const MODULE_COLUMNS: [&str; 2] = ["ModA", "ModB"];

pub fn column_index(name: &str) -> Option<usize> {
    NUMERIC_COLUMNS.iter().position(|&c| c == name)
}

/// One location's observations in columnar form.
///
/// Numeric series are dense `Vec<f64>` parallel to `timestamps`, with NaN
/// marking a missing reading; every consumer filters non-finite values.
#[derive(Debug, Clone)]
pub struct ObservationTable {
    pub location: String,
    pub timestamps: Vec<DateTime<Utc>>,
    columns: Vec<Vec<f64>>,
    pub cleaning: Vec<bool>,
    /// `None` once the cleaning stage has dropped an entirely empty column.
    pub comments: Option<Vec<Option<String>>>,
}

impl ObservationTable {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            timestamps: Vec::new(),
            columns: vec![Vec::new(); NUMERIC_COLUMN_COUNT],
            cleaning: Vec::new(),
            comments: Some(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn push_row(
        &mut self,
        timestamp: DateTime<Utc>,
        values: [f64; NUMERIC_COLUMN_COUNT],
        cleaning: bool,
        comment: Option<String>,
    ) {
        self.timestamps.push(timestamp);
        for (column, value) in self.columns.iter_mut().zip(values) {
            column.push(value);
        }
        self.cleaning.push(cleaning);
        if let Some(comments) = self.comments.as_mut() {
            comments.push(comment);
        }
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        column_index(name).map(|i| self.columns[i].as_slice())
    }

    pub(crate) fn column_mut(&mut self, name: &str) -> Option<&mut Vec<f64>> {
        column_index(name).map(|i| &mut self.columns[i])
    }

    /// Iterate numeric columns in header order.
    pub fn numeric_columns(&self) -> impl Iterator<Item = (&'static str, &[f64])> {
        NUMERIC_COLUMNS
            .iter()
            .zip(self.columns.iter())
            .map(|(&name, values)| (name, values.as_slice()))
    }
}
