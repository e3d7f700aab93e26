//! Reductions used by the reports. Empty input yields NaN.

use ndarray::Array2;

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (ddof = 0)
pub fn std(values: &[f64]) -> f64 {
    sum_sq_dev(values).map_or(f64::NAN, |(ss, n)| (ss / n as f64).sqrt())
}

/// Sample variance (ddof = 1); NaN below two values
pub fn variance(values: &[f64]) -> f64 {
    match sum_sq_dev(values) {
        Some((ss, n)) if n > 1 => ss / (n - 1) as f64,
        _ => f64::NAN,
    }
}

fn sum_sq_dev(values: &[f64]) -> Option<(f64, usize)> {
    if values.is_empty() {
        return None;
    }
    let m = mean(values);
    Some((values.iter().map(|v| (v - m).powi(2)).sum(), values.len()))
}

/// Column `j` of `m` as an owned vector
pub fn column(m: &Array2<f64>, j: usize) -> Vec<f64> {
    m.column(j).to_vec()
}

pub fn column_means(m: &Array2<f64>, cols: std::ops::Range<usize>) -> Vec<f64> {
    cols.map(|j| mean(&column(m, j))).collect()
}

pub fn column_stds(m: &Array2<f64>, cols: std::ops::Range<usize>) -> Vec<f64> {
    cols.map(|j| std(&column(m, j))).collect()
}
