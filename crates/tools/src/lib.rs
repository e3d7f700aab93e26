//! Per-subject QC reports for diffusion MRI preprocessing.
//!
//! Each report loads the outputs of the preprocessing tool, reduces them to
//! scalar metrics and per-volume series, draws a one-page figure and appends
//! the metrics to the group table (see [`dwiqc_table`]).

pub mod config;
pub mod dtifit;
pub mod figure;
pub mod matrix;
pub mod motion;
pub mod outliers;
pub mod report;
pub mod stats;
pub mod volume;
