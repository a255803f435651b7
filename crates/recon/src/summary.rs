use std::fmt;

use serde::Serialize;

use crate::matrix::ReconciledMatrix;
use crate::model::Substituent;

/// Which axis of the matrix a summary was taken along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Effect {
    /// One row: a fixed proximal substituent across every distal one.
    Distal,
    /// One column: a fixed distal substituent across every proximal one.
    Proximal,
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Distal => write!(f, "Distal effect"),
            Self::Proximal => write!(f, "Proximal effect"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRecord {
    pub substituent: Substituent,
    pub mean: f64,
    /// Sample standard deviation; `None` with fewer than two values.
    pub std_dev: Option<f64>,
    pub min: f64,
    pub max: f64,
    pub effect: Effect,
}

/// Descriptive statistics of a non-empty series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats {
    pub count: usize,
    pub mean: f64,
    pub std_dev: Option<f64>,
    pub min: f64,
    pub max: f64,
}

pub fn describe(values: &[f64]) -> Option<Stats> {
    if values.is_empty() {
        return None;
    }
    let n = values.len();
    let mean = values.iter().sum::<f64>() / n as f64;
    let std_dev = (n > 1).then(|| {
        let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
        (ss / (n - 1) as f64).sqrt()
    });
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    Some(Stats { count: n, mean, std_dev, min, max })
}

/// Summarise every row (distal effect) and every column (proximal effect).
///
/// Rows follow the matrix's display order; columns come back in descending
/// key order. Values are not rounded.
pub fn summarize(matrix: &ReconciledMatrix) -> (Vec<SummaryRecord>, Vec<SummaryRecord>) {
    let record = |substituent: &Substituent, values: &[f64], effect| {
        describe(values).map(|s| SummaryRecord {
            substituent: substituent.clone(),
            mean: s.mean,
            std_dev: s.std_dev,
            min: s.min,
            max: s.max,
            effect,
        })
    };

    let distal = matrix
        .rows()
        .into_iter()
        .filter_map(|row| record(row, matrix.row_values(row)?, Effect::Distal))
        .collect();

    let proximal = matrix
        .columns()
        .iter()
        .rev()
        .filter_map(|column| record(column, &matrix.column_values(column)?, Effect::Proximal))
        .collect();

    (distal, proximal)
}
