//! Eddy motion report: within-volume (slice-to-volume) and volume-to-volume motion.

use anyhow::{bail, Result};
use dwiqc_table::MetricRecord;
use log::info;
use ndarray::{s, Array1, Array2, Axis};

use crate::config::MotionInputs;
use crate::figure::{Figure, Panel};
use crate::matrix::{load_matrix, load_vector, require_shape};
use crate::report::Report;
use crate::stats::{column, column_means, mean, variance};

/// Loaded eddy motion outputs
#[derive(Debug, Clone)]
pub struct MotionData {
    /// Rows `i*nslices..(i+1)*nslices` belong to volume `i`; columns 0..3 mm, 3..6 radians
    pub s2v: Array2<f64>,
    /// Absolute and relative RMS displacement per volume
    pub rms: Array2<f64>,
    pub restricted_rms: Array2<f64>,
    pub params: Array2<f64>,
    pub bvals: Array1<f64>,
}

impl MotionData {
    pub fn load(inputs: &MotionInputs) -> Result<Self> {
        info!("Loading files...");
        let data = Self {
            s2v: load_matrix(&inputs.s2v, 0)?,
            rms: load_matrix(&inputs.rms, 0)?,
            restricted_rms: load_matrix(&inputs.restricted_rms, 0)?,
            params: load_matrix(&inputs.params, 0)?,
            bvals: load_vector(&inputs.bvals)?,
        };
        require_shape(&data.s2v, 1, 6, "movement over time")?;
        require_shape(&data.rms, 1, 2, "movement RMS")?;
        require_shape(&data.restricted_rms, 1, 2, "restricted movement RMS")?;
        require_shape(&data.params, 1, 6, "eddy parameters")?;
        Ok(data)
    }

    pub fn nvols(&self) -> usize {
        self.bvals.len()
    }
}

/// Per-volume sample variance (n-1) of each s2v column, rotations in degrees.
///
/// Returns an `nvols × 6` matrix.
pub fn within_volume_variance(s2v: &Array2<f64>, nslices: usize, nvols: usize) -> Result<Array2<f64>> {
    if nslices < 2 {
        bail!("at least 2 slices per volume are needed, got {nslices}");
    }
    let needed = nvols * nslices;
    if s2v.nrows() < needed || s2v.ncols() < 6 {
        bail!(
            "movement over time has shape {}x{}, expected at least {needed}x6 for {nvols} volumes of {nslices} slices",
            s2v.nrows(),
            s2v.ncols()
        );
    }

    let mut s2v = s2v.slice(s![..needed, ..6]).to_owned();
    s2v.slice_mut(s![.., 3..6]).mapv_inplace(f64::to_degrees);

    let mut var = Array2::<f64>::zeros((nvols, 6));
    for (i, mut row) in var.axis_iter_mut(Axis(0)).enumerate() {
        let block = s2v.slice(s![i * nslices..(i + 1) * nslices, ..]);
        for j in 0..6 {
            row[j] = variance(&block.column(j).to_vec());
        }
    }
    Ok(var)
}

/// `Sub`, volume-to-volume means and average RMS displacements
pub fn motion_record(data: &MotionData, subject: &str) -> Result<MetricRecord> {
    let means = column_means(&data.params, 0..6);
    let mut record = MetricRecord::for_subject(subject)?;
    record
        .insert("Mean_Vol2Vol_Translations(x)", means[0])?
        .insert("Mean_Vol2Vol_Translations(y)", means[1])?
        .insert("Mean_Vol2Vol_Translations(z)", means[2])?
        .insert("Mean_Vol2Vol_Rotations(x)", means[3])?
        .insert("Mean_Vol2Vol_Rotations(y)", means[4])?
        .insert("Mean_Vol2Vol_Rotations(z)", means[5])?
        .insert("Average_Absolute_Motion", mean(&column(&data.rms, 0)))?
        .insert("Average_Relative_Motion", mean(&column(&data.rms, 1)))?
        .insert("Average_Absolute_Restricted_Motion", mean(&column(&data.restricted_rms, 0)))?
        .insert("Average_Relative_Restricted_Motion", mean(&column(&data.restricted_rms, 1)))?;
    Ok(record)
}

fn xyz(m: &Array2<f64>, first: usize, f: impl Fn(f64) -> f64) -> [Vec<f64>; 3] {
    [0, 1, 2].map(|k| m.column(first + k).iter().map(|&v| f(v)).collect())
}

fn displacement_panel(title: &str, m: &Array2<f64>) -> Panel {
    let abs = column(m, 0);
    let rel = column(m, 1);
    Panel::new(title, "Volumes", "Displacement [mm]")
        .with_series(format!("Absolute ({:.3})", mean(&abs)), abs)
        .with_series(format!("Relative ({:.3})", mean(&rel)), rel)
}

pub fn motion_figure(data: &MotionData, s2v_var: &Array2<f64>, subject: &str) -> Figure {
    let mut figure = Figure::for_subject("Motion", subject);

    let [x, y, z] = xyz(s2v_var, 0, f64::sqrt);
    figure.push(
        Panel::new("Eddy estimated within volume translations (mm)", "Volumes", "Std translation [mm]")
            .with_xyz(x, y, z),
    );
    let [x, y, z] = xyz(s2v_var, 3, f64::sqrt);
    figure.push(
        Panel::new("Eddy estimated within volume rotations (deg)", "Volumes", "Std rotation [deg]")
            .with_xyz(x, y, z),
    );
    let [x, y, z] = xyz(&data.params, 0, |v| v);
    figure.push(
        Panel::new("Eddy estimated volume to volume translations (mm)", "Volumes", "Translation [mm]")
            .with_xyz(x, y, z),
    );
    let [x, y, z] = xyz(&data.params, 3, f64::to_degrees);
    figure.push(
        Panel::new("Eddy estimated volume to volume rotations (deg)", "Volumes", "Rotation [deg]")
            .with_xyz(x, y, z),
    );
    figure.push(displacement_panel("Displacement", &data.rms));
    figure.push(displacement_panel("Restricted Motion", &data.restricted_rms));
    figure
}

/// Compute the motion metrics and figure for one subject.
pub fn build_report(data: &MotionData, nslices: usize, subject: &str) -> Result<Report> {
    let s2v_var = within_volume_variance(&data.s2v, nslices, data.nvols())?;
    info!("Creating dataframe...");
    let record = motion_record(data, subject)?;
    let figure = motion_figure(data, &s2v_var, subject);
    Ok(Report { record, figure })
}
