//! Tensor-fit report: SNR/CNR summaries, FA/MD per tissue and per-volume signal.

use anyhow::{bail, Result};
use dwiqc_table::MetricRecord;
use log::info;
use ndarray::{Array1, Array2, ArrayD};

use crate::config::DtifitInputs;
use crate::figure::{Figure, Panel};
use crate::matrix::{load_matrix, load_vector, require_shape};
use crate::report::Report;
use crate::volume::{load_volume_nd, masked_mean, masked_volume_means, masked_volume_stds};

#[derive(Debug, Clone)]
pub struct DtifitData {
    pub fa: ArrayD<f64>,
    pub md: ArrayD<f64>,
    /// Tensor-fit residuals, 4-D
    pub residuals: ArrayD<f64>,
    /// b0 SNR mean and std
    pub tsnr: Array1<f64>,
    /// Per-volume WM contrast (column 0) and noise (column 1)
    pub cnr_wm: Array2<f64>,
    pub bvals: Array1<f64>,
    pub data: ArrayD<f64>,
    pub wm: ArrayD<f64>,
    pub gm: Option<ArrayD<f64>>,
    pub csf: Option<ArrayD<f64>>,
}

impl DtifitData {
    pub fn load(inputs: &DtifitInputs) -> Result<Self> {
        info!("Loading files...");
        let data = Self {
            fa: load_volume_nd(&inputs.fa(), 3)?,
            md: load_volume_nd(&inputs.md(), 3)?,
            residuals: load_volume_nd(&inputs.residuals(), 4)?,
            tsnr: load_vector(&inputs.tsnr())?,
            cnr_wm: load_matrix(&inputs.cnr_wm(), 0)?,
            bvals: load_vector(&inputs.bvals)?,
            data: load_volume_nd(&inputs.data, 4)?,
            wm: load_volume_nd(&inputs.wm_mask, 3)?,
            gm: inputs.gm_mask.as_deref().map(|p| load_volume_nd(p, 3)).transpose()?,
            csf: inputs.csf_mask.as_deref().map(|p| load_volume_nd(p, 3)).transpose()?,
        };
        require_shape(&data.cnr_wm, 1, 2, "WM CNR")?;
        Ok(data)
    }

    /// Tissue masks present, WM first
    pub fn rois(&self) -> Vec<(&'static str, &ArrayD<f64>)> {
        let mut rois = vec![("WM", &self.wm)];
        if let Some(gm) = &self.gm {
            rois.push(("GM", gm));
        }
        if let Some(csf) = &self.csf {
            rois.push(("CSF", csf));
        }
        rois
    }
}

pub fn dtifit_record(data: &DtifitData, subject: &str) -> Result<MetricRecord> {
    let mut record = MetricRecord::for_subject(subject)?;
    record.insert("Average_SNR(b<100)", data.tsnr[0])?;
    for (name, mask) in data.rois() {
        record
            .insert(&format!("Mean_FA_{name}"), masked_mean(&data.fa, mask)?.abs())?
            .insert(&format!("Mean_MD_{name}"), masked_mean(&data.md, mask)?.abs())?;
    }
    Ok(record)
}

/// Contrast over noise per volume
pub fn cnr_per_volume(cnr_wm: &Array2<f64>) -> Vec<f64> {
    cnr_wm.rows().into_iter().map(|r| r[0] / r[1]).collect()
}

pub fn dtifit_figure(data: &DtifitData, subject: &str) -> Result<Figure> {
    let nvols = data.bvals.len();
    if data.data.ndim() == 4 && data.data.shape()[3] != nvols {
        bail!("data has {} volumes but there are {nvols} b-values", data.data.shape()[3]);
    }

    let snr_std = data.tsnr.get(1).copied().unwrap_or(f64::NAN);
    let mut figure = Figure::for_subject("DTIFIT", subject);
    figure.push(
        Panel::new(format!("CNR in WM (b0 SNR {:.2} +/- {snr_std:.2})", data.tsnr[0]), "DWI Volume", "CNR")
            .with_series("WM", cnr_per_volume(&data.cnr_wm)),
    );

    let residual: Vec<f64> =
        masked_volume_means(&data.residuals, &data.wm)?.into_iter().map(f64::abs).collect();
    let spread = masked_volume_stds(&data.residuals, &data.wm)?;
    figure.push(
        Panel::new("Residual [a.u.]", "DWI Volume", "Residual")
            .with_series("WM", residual)
            .with_series("WM std", spread),
    );

    let mut signal = Panel::new("Mean signal per ROI", "DWI Volume", "Signal [-]");
    let mut log_signal = Panel::new("Log mean signal per ROI", "DWI Volume", "log(Signal)");
    for (name, mask) in data.rois() {
        let means = masked_volume_means(&data.data, mask)?;
        log_signal = log_signal.with_series(name, means.iter().map(|v| v.ln()).collect());
        signal = signal.with_series(name, means);
    }
    figure.push(log_signal);
    figure.push(signal);
    Ok(figure)
}

/// Compute the tensor-fit metrics and figure for one subject.
pub fn build_report(data: &DtifitData, subject: &str) -> Result<Report> {
    let record = dtifit_record(data, subject)?;
    let figure = dtifit_figure(data, subject)?;
    Ok(Report { record, figure })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dwiqc_table::Cell;
    use ndarray::{array, Array3, Array4};

    fn mask(voxel: usize) -> ArrayD<f64> {
        let mut m = Array3::<f64>::zeros((3, 1, 1));
        m[[voxel, 0, 0]] = 1.0;
        m.into_dyn()
    }

    fn data() -> DtifitData {
        let fa = Array3::from_shape_vec((3, 1, 1), vec![0.5, 0.2, 0.05]).unwrap().into_dyn();
        let md = Array3::from_shape_vec((3, 1, 1), vec![-0.0007, 0.0009, 0.003]).unwrap().into_dyn();
        let mut residuals = Array4::<f64>::zeros((3, 1, 1, 2));
        residuals[[0, 0, 0, 0]] = -2.0;
        residuals[[0, 0, 0, 1]] = 3.0;
        let mut dwi = Array4::<f64>::zeros((3, 1, 1, 2));
        for v in 0..3 {
            dwi[[v, 0, 0, 0]] = 1000.0;
            dwi[[v, 0, 0, 1]] = 500.0 / (v + 1) as f64;
        }
        DtifitData {
            fa,
            md,
            residuals: residuals.into_dyn(),
            tsnr: array![21.5, 3.25],
            cnr_wm: array![[10.0, 2.0], [3.0, 1.5]],
            bvals: array![0.0, 1000.0],
            data: dwi.into_dyn(),
            wm: mask(0),
            gm: None,
            csf: None,
        }
    }

    #[test]
    fn test_record_wm_only() {
        let record = dtifit_record(&data(), "sub-01").unwrap();
        let names: Vec<&str> = record.names().collect();
        assert_eq!(names, ["Sub", "Average_SNR(b<100)", "Mean_FA_WM", "Mean_MD_WM"]);
        assert_eq!(record.get("Average_SNR(b<100)"), Some(&Cell::Number(21.5)));
        assert_eq!(record.get("Mean_FA_WM"), Some(&Cell::Number(0.5)));
        assert_eq!(record.get("Mean_MD_WM"), Some(&Cell::Number(0.0007)));
    }

    #[test]
    fn test_record_with_tissue_masks() {
        let mut d = data();
        d.csf = Some(mask(2));
        let names: Vec<String> =
            dtifit_record(&d, "sub-01").unwrap().names().map(str::to_string).collect();
        assert_eq!(names, ["Sub", "Average_SNR(b<100)", "Mean_FA_WM", "Mean_MD_WM", "Mean_FA_CSF", "Mean_MD_CSF"]);

        d.gm = Some(mask(1));
        let record = dtifit_record(&d, "sub-01").unwrap();
        assert_eq!(record.len(), 8);
        assert_eq!(record.get("Mean_FA_GM"), Some(&Cell::Number(0.2)));
        assert_eq!(record.get("Mean_MD_CSF"), Some(&Cell::Number(0.003)));
    }

    #[test]
    fn test_mask_shape_mismatch() {
        let mut d = data();
        d.wm = Array3::<f64>::ones((2, 1, 1)).into_dyn();
        assert!(dtifit_record(&d, "sub-01").is_err());
    }

    #[test]
    fn test_figure_panels() {
        let mut d = data();
        d.gm = Some(mask(1));
        let figure = dtifit_figure(&d, "sub-01").unwrap();
        assert_eq!(figure.panels.len(), 4);
        assert_eq!(figure.panels[0].series[0].values, [5.0, 2.0]);
        assert_eq!(figure.panels[1].series[0].values, [2.0, 3.0]);
        assert_eq!(figure.panels[1].series[1].values, [0.0, 0.0]);
        let signal = figure.panel("Mean signal per ROI").unwrap();
        assert_eq!(signal.series.len(), 2);
        assert_eq!(signal.series[1].label, "GM");
        assert_eq!(signal.series[1].values, [1000.0, 250.0]);
        let log_signal = figure.panel("Log mean signal per ROI").unwrap();
        assert!((log_signal.series[0].values[0] - 1000f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_residual_spread_in_wm() {
        let mut d = data();
        let mut wm = Array3::<f64>::zeros((3, 1, 1));
        wm[[0, 0, 0]] = 1.0;
        wm[[1, 0, 0]] = 1.0;
        d.wm = wm.into_dyn();
        let mut residuals = Array4::<f64>::zeros((3, 1, 1, 2));
        residuals[[0, 0, 0, 0]] = -2.0;
        residuals[[0, 0, 0, 1]] = 3.0;
        residuals[[1, 0, 0, 0]] = 4.0;
        residuals[[1, 0, 0, 1]] = 1.0;
        d.residuals = residuals.into_dyn();

        let figure = dtifit_figure(&d, "sub-01").unwrap();
        let residual = figure.panel("Residual [a.u.]").unwrap();
        assert_eq!(residual.series[0].values, [1.0, 2.0]);
        assert_eq!(residual.series[1].label, "WM std");
        assert_eq!(residual.series[1].values, [3.0, 1.0]);
    }

    #[test]
    fn test_figure_rejects_volume_count_mismatch() {
        let mut d = data();
        d.bvals = array![0.0, 1000.0, 2000.0];
        assert!(dtifit_figure(&d, "sub-01").is_err());
    }
}
