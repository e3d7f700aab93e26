//! Shared last step of every report: draw the figure, then append the metrics.

use anyhow::{anyhow, Context, Result};
use dwiqc_table::{append_record, AppendOutcome, MetricRecord};
use log::info;

use crate::config::ReportOutputs;
use crate::figure::{render_figure, Figure};

/// Metrics and figure computed for one subject
#[derive(Debug, Clone)]
pub struct Report {
    pub record: MetricRecord,
    pub figure: Figure,
}

/// Render the figure and append the record to the group table.
///
/// The table is only touched once the figure has been written.
pub fn finish(report: &Report, outputs: &ReportOutputs) -> Result<AppendOutcome> {
    info!("Creating figure {}", outputs.figure.display());
    render_figure(&report.figure, &outputs.figure)
        .map_err(|e| anyhow!("failed to render figure {}: {e}", outputs.figure.display()))?;
    info!("figure saved");

    let outcome = append_record(&outputs.table, &report.record)
        .with_context(|| format!("failed to update {}", outputs.table.display()))?;
    info!(
        "{} now holds {} row(s){}",
        outputs.table.display(),
        outcome.rows,
        if outcome.added_columns.is_empty() {
            String::new()
        } else {
            format!(", new columns: {}", outcome.added_columns.join(", "))
        }
    );
    Ok(outcome)
}
