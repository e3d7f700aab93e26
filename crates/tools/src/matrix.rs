//! Plain-text numeric matrices (eddy outputs, b-values, SNR summaries)

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{bail, Context, Result};
use ndarray::{Array1, Array2};

/// Read a whitespace-separated matrix, skipping `skip_header` leading lines.
///
/// Blank lines are ignored. Every row must have the same number of columns.
pub fn load_matrix(path: &Path, skip_header: usize) -> Result<Array2<f64>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut cols: Option<usize> = None;
    let mut rows = 0_usize;
    let mut data = Vec::new();
    for (idx, line) in reader.lines().enumerate().skip(skip_header) {
        let line_no = idx + 1;
        let line = line.with_context(|| format!("{}: line {line_no}: read failed", path.display()))?;
        if line.trim().is_empty() {
            continue;
        }
        let before = data.len();
        for token in line.split_whitespace() {
            let value = token.parse::<f64>().with_context(|| {
                format!("{}: line {line_no}: invalid number '{token}'", path.display())
            })?;
            data.push(value);
        }
        let width = data.len() - before;
        match cols {
            None => cols = Some(width),
            Some(expected) if expected != width => bail!(
                "{}: line {line_no}: expected {expected} columns but got {width}",
                path.display()
            ),
            Some(_) => {}
        }
        rows += 1;
    }

    let Some(cols) = cols else {
        bail!("{}: no numeric rows", path.display());
    };
    Array2::from_shape_vec((rows, cols), data)
        .with_context(|| format!("{}: inconsistent matrix shape", path.display()))
}

/// Read every number of a file in order, whatever its row layout.
pub fn load_vector(path: &Path) -> Result<Array1<f64>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let values = text
        .split_whitespace()
        .map(|token| {
            token
                .parse::<f64>()
                .with_context(|| format!("{}: invalid number '{token}'", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;
    if values.is_empty() {
        bail!("{}: no numbers found", path.display());
    }
    Ok(Array1::from(values))
}

/// Fail unless `m` has at least `rows` rows and `cols` columns.
pub fn require_shape(m: &Array2<f64>, rows: usize, cols: usize, what: &str) -> Result<()> {
    let (r, c) = m.dim();
    if r < rows || c < cols {
        bail!("{what}: expected at least {rows}x{cols} values, got {r}x{c}");
    }
    Ok(())
}
