//! Shared numeric kernels. All functions tolerate NaN inputs by filtering
//! non-finite values; an empty (or all-NaN) input yields NaN.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

pub fn finite(values: &[f64]) -> Vec<f64> {
    values.iter().copied().filter(|v| v.is_finite()).collect()
}

pub fn sorted_finite(values: &[f64]) -> Vec<f64> {
    let mut out = finite(values);
    out.sort_by(|a, b| a.total_cmp(b));
    out
}

/// Mean of an already-filtered slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample variance (n - 1 denominator) of an already-filtered slice.
pub fn sample_variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / (values.len() - 1) as f64
}

pub fn sample_std(values: &[f64]) -> f64 {
    sample_variance(values).sqrt()
}

/// Linearly interpolated percentile of a sorted slice, p in [0, 100].
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    if sorted.len() == 1 {
        return sorted[0];
    }
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        sorted[lo] + (rank - lo as f64) * (sorted[hi] - sorted[lo])
    }
}

pub fn median(sorted: &[f64]) -> f64 {
    percentile(sorted, 50.0)
}

/// Pearson correlation over pairwise-complete observations. NaN when fewer
/// than two complete pairs remain or either side has zero variance.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y.iter())
        .filter(|(a, b)| a.is_finite() && b.is_finite())
        .map(|(&a, &b)| (a, b))
        .collect();
    if pairs.len() < 2 {
        return f64::NAN;
    }
    let n = pairs.len() as f64;
    let mx = pairs.iter().map(|(a, _)| a).sum::<f64>() / n;
    let my = pairs.iter().map(|(_, b)| b).sum::<f64>() / n;
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (a, b) in &pairs {
        sxy += (a - mx) * (b - my);
        sxx += (a - mx) * (a - mx);
        syy += (b - my) * (b - my);
    }
    if sxx == 0.0 || syy == 0.0 {
        return f64::NAN;
    }
    sxy / (sxx * syy).sqrt()
}

/// Two-sample test variant. Welch does not assume equal variances; Student
/// pools them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TestKind {
    Welch,
    Student,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct TTest {
    pub statistic: f64,
    pub df: f64,
    pub p_value: f64,
}

/// Two-sample t-test on already-filtered slices; callers guarantee at least
/// two observations per group. Degenerate variance yields NaN statistics, the
/// same convention scipy follows.
pub fn two_sample_t(a: &[f64], b: &[f64], kind: TestKind) -> TTest {
    let (na, nb) = (a.len() as f64, b.len() as f64);
    let (ma, mb) = (mean(a), mean(b));
    let (va, vb) = (sample_variance(a), sample_variance(b));

    let (statistic, df) = match kind {
        TestKind::Welch => {
            let se2 = va / na + vb / nb;
            let t = (ma - mb) / se2.sqrt();
            let df = se2 * se2
                / ((va / na) * (va / na) / (na - 1.0) + (vb / nb) * (vb / nb) / (nb - 1.0));
            (t, df)
        }
        TestKind::Student => {
            let df = na + nb - 2.0;
            let pooled = ((na - 1.0) * va + (nb - 1.0) * vb) / df;
            let t = (ma - mb) / (pooled * (1.0 / na + 1.0 / nb)).sqrt();
            (t, df)
        }
    };

    // Two constant groups with different means give an infinite statistic;
    // report certainty rather than a NaN from the degenerate df.
    let p_value = if statistic.is_infinite() {
        0.0
    } else {
        match StudentsT::new(0.0, 1.0, df) {
            Ok(dist) if statistic.is_finite() => 2.0 * (1.0 - dist.cdf(statistic.abs())),
            _ => f64::NAN,
        }
    };

    TTest {
        statistic,
        df,
        p_value,
    }
}
