use serde::Serialize;
use tracing::debug;

use crate::errors::{AnalysisError, Result};
use crate::stats::{self, TTest, TestKind};
use crate::table::{ObservationTable, MODULE_COLUMNS};

#[derive(Debug, Clone, Copy, Serialize)]
pub struct GroupStats {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
}

fn group_stats(values: &[f64]) -> GroupStats {
    GroupStats {
        count: values.len(),
        mean: stats::mean(values),
        std: stats::sample_std(values),
    }
}

/// Mean reading over the rows following one cleaning event, up to the next.
#[derive(Debug, Clone, Serialize)]
pub struct SegmentStats {
    pub event_row: usize,
    pub rows: usize,
    pub mean: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CleaningImpact {
    pub column: String,
    pub pre: GroupStats,
    pub post: GroupStats,
    pub test: TTest,
    pub segments: Vec<SegmentStats>,
}

/// Compare module readings before and after cleaning events.
///
/// The first Cleaning=1 row is the partition boundary: that row and everything
/// before it form the pre group, everything after it the post group. A
/// two-sample test per module column quantifies the shift; per-event segment
/// means are reported alongside for inspection.
pub fn analyze(table: &ObservationTable, kind: TestKind) -> Result<Vec<CleaningImpact>> {
    let first_event = table
        .cleaning
        .iter()
        .position(|&c| c)
        .ok_or(AnalysisError::InsufficientSample {
            group: "post-cleaning",
            got: 0,
        })?;
    let events: Vec<usize> = table
        .cleaning
        .iter()
        .enumerate()
        .filter_map(|(row, &c)| c.then_some(row))
        .collect();
    debug!(
        location = table.location.as_str(),
        events = events.len(),
        "partitioning on cleaning flag"
    );

    let mut results = Vec::with_capacity(MODULE_COLUMNS.len());
    for name in MODULE_COLUMNS {
        let values = table.column(name).expect("module column exists");
        let pre = stats::finite(&values[..=first_event]);
        let post = stats::finite(&values[first_event + 1..]);

        if pre.len() < 2 {
            return Err(AnalysisError::InsufficientSample {
                group: "pre-cleaning",
                got: pre.len(),
            });
        }
        if post.len() < 2 {
            return Err(AnalysisError::InsufficientSample {
                group: "post-cleaning",
                got: post.len(),
            });
        }

        let segments = events
            .iter()
            .enumerate()
            .map(|(i, &event_row)| {
                let end = events.get(i + 1).copied().unwrap_or(table.len());
                let segment = stats::finite(&values[event_row + 1..end]);
                SegmentStats {
                    event_row,
                    rows: segment.len(),
                    mean: stats::mean(&segment),
                }
            })
            .collect();

        results.push(CleaningImpact {
            column: name.to_string(),
            pre: group_stats(&pre),
            post: group_stats(&post),
            test: stats::two_sample_t(&pre, &post, kind),
            segments,
        });
    }

    Ok(results)
}
