//! Eddy outlier report

use anyhow::{bail, Result};
use dwiqc_table::MetricRecord;
use log::{info, warn};
use ndarray::{Array1, Array2, ArrayD};

use crate::config::OutlierInputs;
use crate::figure::{Figure, Panel};
use crate::matrix::{load_matrix, load_vector, require_shape};
use crate::report::Report;
use crate::stats::{column, column_stds, mean};
use crate::volume::{load_volume_nd, masked_volume_mean_squares};

/// b-values above this count as diffusion weighted
pub const DIFFUSION_WEIGHTED_B: f64 = 100.0;

#[derive(Debug, Clone)]
pub struct OutlierData {
    /// `nvols × nslices`, non-zero where a slice was replaced
    pub outlier_map: Array2<f64>,
    pub outlier_stdev_map: Array2<f64>,
    pub params: Array2<f64>,
    pub bvals: Array1<f64>,
    pub mask: ArrayD<f64>,
    /// First row: b0 SNR mean and std
    pub cnr_eddy: Option<Array2<f64>>,
    pub eddy_residuals: Option<ArrayD<f64>>,
}

impl OutlierData {
    pub fn load(inputs: &OutlierInputs) -> Result<Self> {
        info!("Loading files...");
        let data = Self {
            outlier_map: load_matrix(&inputs.outlier_map, 1)?,
            outlier_stdev_map: load_matrix(&inputs.outlier_stdev_map, 1)?,
            params: load_matrix(&inputs.params, 0)?,
            bvals: load_vector(&inputs.bvals)?,
            mask: load_volume_nd(&inputs.mask, 3)?,
            cnr_eddy: inputs.cnr_eddy.as_deref().map(|p| load_matrix(p, 0)).transpose()?,
            eddy_residuals: inputs
                .eddy_residuals
                .as_deref()
                .map(|p| load_volume_nd(p, 4))
                .transpose()?,
        };
        require_shape(&data.params, 1, 9, "eddy parameters")?;
        if data.outlier_map.dim() != data.outlier_stdev_map.dim() {
            warn!(
                "outlier map is {:?} but the n-stdev map is {:?}",
                data.outlier_map.dim(),
                data.outlier_stdev_map.dim()
            );
        }
        Ok(data)
    }
}

/// Percentage of diffusion-weighted slices flagged as outliers
pub fn total_outliers(outlier_map: &Array2<f64>, bvals: &Array1<f64>) -> Result<f64> {
    let weighted = bvals.iter().filter(|&&b| b > DIFFUSION_WEIGHTED_B).count();
    if weighted == 0 {
        bail!("no diffusion-weighted volumes (b > {DIFFUSION_WEIGHTED_B}) in the b-values");
    }
    let nonzero = outlier_map.iter().filter(|&&v| v != 0.0).count();
    Ok(100.0 * nonzero as f64 / (weighted * outlier_map.ncols()) as f64)
}

/// Mean squared residual per volume inside the brain mask
pub fn residuals_per_volume(residuals: &ArrayD<f64>, mask: &ArrayD<f64>) -> Result<Vec<f64>> {
    masked_volume_mean_squares(residuals, mask)
}

pub fn outlier_record(data: &OutlierData, subject: &str) -> Result<MetricRecord> {
    let ec_std = column_stds(&data.params, 6..9);
    let mut record = MetricRecord::for_subject(subject)?;
    record
        .insert("EC_LinearTerm(x)(std)", ec_std[0])?
        .insert("EC_LinearTerm(y)(std)", ec_std[1])?
        .insert("EC_LinearTerm(z)(std)", ec_std[2])?
        .insert("Total_Outliers", total_outliers(&data.outlier_map, &data.bvals)?)?;

    if let Some(cnr) = &data.cnr_eddy {
        record.insert("Average_SNR(b<100)", cnr[[0, 0]])?;
    }
    if let Some(res) = &data.eddy_residuals {
        let per_volume = residuals_per_volume(res, &data.mask)?;
        record.insert("Mean_Eddy_Residuals", mean(&per_volume).abs())?;
    }
    Ok(record)
}

pub fn outlier_figure(data: &OutlierData, subject: &str) -> Result<Figure> {
    let mut figure = Figure::for_subject("Outlier", subject);
    let nslices = data.outlier_map.ncols() as f64;

    let per_volume: Vec<f64> = data
        .outlier_map
        .rows()
        .into_iter()
        .map(|r| 100.0 * r.iter().filter(|&&v| v != 0.0).count() as f64 / nslices)
        .collect();
    figure.push(
        Panel::new("% Outliers per volume", "DWI Volume", "% outliers").with_series("outliers", per_volume),
    );

    let max_stdev: Vec<f64> = data
        .outlier_stdev_map
        .rows()
        .into_iter()
        .map(|r| r.iter().fold(0.0_f64, |acc, v| acc.max(v.abs())))
        .collect();
    figure.push(
        Panel::new("Outliers (max std off the mean slice diff)", "DWI Volume", "No. std.")
            .with_series("max |n-stdev|", max_stdev),
    );

    figure.push(
        Panel::new("Eddy current linear terms", "DWI Volume", "Hz/mm")
            .with_xyz(column(&data.params, 6), column(&data.params, 7), column(&data.params, 8)),
    );

    if let Some(res) = &data.eddy_residuals {
        figure.push(
            Panel::new("Eddy residuals", "DWI Volume", "Mean squared residual")
                .with_series("brain", residuals_per_volume(res, &data.mask)?),
        );
    }
    Ok(figure)
}

/// Compute the outlier metrics and figure for one subject.
pub fn build_report(data: &OutlierData, subject: &str) -> Result<Report> {
    let record = outlier_record(data, subject)?;
    let figure = outlier_figure(data, subject)?;
    Ok(Report { record, figure })
}
