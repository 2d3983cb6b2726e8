use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::errors::{AnalysisError, Result};
use crate::table::ObservationTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ResampleFrequency {
    Daily,
    Monthly,
}

/// Mean-resampled series over a calendar grid, in chronological order.
/// The index holds the period start (the day, or the first of the month).
#[derive(Debug, Clone, Serialize)]
pub struct Resampled {
    pub frequency: ResampleFrequency,
    pub index: Vec<NaiveDate>,
    pub series: BTreeMap<String, Vec<f64>>,
}

/// Group rows by calendar period and take the mean of finite values per
/// column. Periods with no finite observations for a column yield NaN.
pub fn resample(
    table: &ObservationTable,
    columns: &[&str],
    frequency: ResampleFrequency,
) -> Resampled {
    let mut index: Vec<NaiveDate> = Vec::new();
    let mut sums: Vec<Vec<f64>> = vec![Vec::new(); columns.len()];
    let mut counts: Vec<Vec<usize>> = vec![Vec::new(); columns.len()];

    for (row, timestamp) in table.timestamps.iter().enumerate() {
        let date = timestamp.date_naive();
        let key = match frequency {
            ResampleFrequency::Daily => date,
            ResampleFrequency::Monthly => date.with_day(1).expect("day 1 is always valid"),
        };
        // Timestamps are strictly increasing, so periods arrive in order.
        if index.last() != Some(&key) {
            index.push(key);
            for (s, c) in sums.iter_mut().zip(counts.iter_mut()) {
                s.push(0.0);
                c.push(0);
            }
        }
        for (i, &name) in columns.iter().enumerate() {
            if let Some(values) = table.column(name) {
                let v = values[row];
                if v.is_finite() {
                    *sums[i].last_mut().expect("period pushed above") += v;
                    *counts[i].last_mut().expect("period pushed above") += 1;
                }
            }
        }
    }

    let series = columns
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let means = sums[i]
                .iter()
                .zip(&counts[i])
                .map(|(&sum, &count)| if count > 0 { sum / count as f64 } else { f64::NAN })
                .collect();
            (name.to_string(), means)
        })
        .collect();

    Resampled {
        frequency,
        index,
        series,
    }
}

/// Additive trend/seasonal/residual decomposition, aligned to the input.
#[derive(Debug, Clone, Serialize)]
pub struct Decomposition {
    pub period: usize,
    pub trend: Vec<f64>,
    pub seasonal: Vec<f64>,
    pub residual: Vec<f64>,
}

/// Classical additive decomposition: centered moving-average trend (even
/// periods weight the window endpoints by half), per-phase seasonal means
/// re-centered to zero, residual as the remainder. Requires at least two full
/// seasonal cycles.
pub fn decompose(values: &[f64], period: usize) -> Result<Decomposition> {
    let n = values.len();
    let needed = 2 * period.max(2);
    if period < 2 || n < needed {
        return Err(AnalysisError::InsufficientData { needed, got: n });
    }

    let half = period / 2;
    let mut trend = vec![f64::NAN; n];
    for i in half..n - half {
        let t = if period % 2 == 1 {
            values[i - half..=i + half].iter().sum::<f64>() / period as f64
        } else {
            let mut acc = 0.5 * values[i - half] + 0.5 * values[i + half];
            acc += values[i - half + 1..i + half].iter().sum::<f64>();
            acc / period as f64
        };
        trend[i] = t;
    }

    // Seasonal component: mean detrended value per phase, centered so the
    // seasonal means sum to zero over one cycle.
    let mut phase_sums = vec![0.0; period];
    let mut phase_counts = vec![0usize; period];
    for i in 0..n {
        let detrended = values[i] - trend[i];
        if detrended.is_finite() {
            phase_sums[i % period] += detrended;
            phase_counts[i % period] += 1;
        }
    }
    let mut phase_means: Vec<f64> = phase_sums
        .iter()
        .zip(&phase_counts)
        .map(|(&sum, &count)| if count > 0 { sum / count as f64 } else { f64::NAN })
        .collect();
    let finite_means: Vec<f64> = phase_means.iter().copied().filter(|v| v.is_finite()).collect();
    let level = crate::stats::mean(&finite_means);
    if level.is_finite() {
        for m in phase_means.iter_mut() {
            *m -= level;
        }
    }

    let seasonal: Vec<f64> = (0..n).map(|i| phase_means[i % period]).collect();
    let residual: Vec<f64> = (0..n)
        .map(|i| values[i] - trend[i] - seasonal[i])
        .collect();

    Ok(Decomposition {
        period,
        trend,
        seasonal,
        residual,
    })
}
