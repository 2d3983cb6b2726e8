use std::collections::BTreeMap;

use serde::Serialize;

use crate::cleaning::OutlierFlags;
use crate::table::{ObservationTable, COMMENTS_COLUMN};

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ColumnQuality {
    pub missing: usize,
    pub outliers: usize,
    pub zeros: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct QualityReport {
    pub rows: usize,
    pub columns: BTreeMap<String, ColumnQuality>,
}

/// Missing / outlier / zero counts per column. Pure function of the cleaned
/// table and the flag set from the cleaning stage.
pub fn check(table: &ObservationTable, flags: &OutlierFlags) -> QualityReport {
    let mut columns = BTreeMap::new();

    for (name, values) in table.numeric_columns() {
        let missing = values.iter().filter(|v| !v.is_finite()).count();
        let zeros = values.iter().filter(|&&v| v == 0.0).count();
        columns.insert(
            name.to_string(),
            ColumnQuality {
                missing,
                outliers: flags.column_count(name),
                zeros,
            },
        );
    }

    // Comments is free text; a dropped column counts as entirely missing.
    let comments_missing = match table.comments.as_ref() {
        Some(comments) => comments.iter().filter(|c| c.is_none()).count(),
        None => table.len(),
    };
    columns.insert(
        COMMENTS_COLUMN.to_string(),
        ColumnQuality {
            missing: comments_missing,
            ..ColumnQuality::default()
        },
    );

    QualityReport {
        rows: table.len(),
        columns,
    }
}
