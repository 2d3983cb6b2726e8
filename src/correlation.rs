use serde::Serialize;

use crate::stats;
use crate::table::ObservationTable;

/// Pairwise Pearson correlations over the numeric columns. Symmetric;
/// zero-variance columns produce NaN entries, diagonal included.
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        Some(self.values[i][j])
    }
}

pub fn correlation_matrix(table: &ObservationTable) -> CorrelationMatrix {
    let columns: Vec<(&str, &[f64])> = table.numeric_columns().collect();
    let n = columns.len();
    let mut values = vec![vec![f64::NAN; n]; n];

    for i in 0..n {
        for j in i..n {
            let r = stats::pearson(columns[i].1, columns[j].1);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix {
        columns: columns.iter().map(|(name, _)| name.to_string()).collect(),
        values,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CorrelatedPair {
    pub first: String,
    pub second: String,
    pub r: f64,
}

/// Top-N distinct pairs by |r|, ties broken by column-name lexical order.
/// NaN correlations (constant columns, too few complete pairs) are skipped.
pub fn top_pairs(matrix: &CorrelationMatrix, n: usize) -> Vec<CorrelatedPair> {
    let mut pairs: Vec<CorrelatedPair> = Vec::new();
    for i in 0..matrix.columns.len() {
        for j in i + 1..matrix.columns.len() {
            let r = matrix.values[i][j];
            if !r.is_finite() {
                continue;
            }
            let (mut first, mut second) = (matrix.columns[i].clone(), matrix.columns[j].clone());
            if second < first {
                std::mem::swap(&mut first, &mut second);
            }
            pairs.push(CorrelatedPair { first, second, r });
        }
    }
    pairs.sort_by(|a, b| {
        b.r.abs()
            .total_cmp(&a.r.abs())
            .then_with(|| a.first.cmp(&b.first))
            .then_with(|| a.second.cmp(&b.second))
    });
    pairs.truncate(n);
    pairs
}
