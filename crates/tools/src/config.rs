//! Report inputs and outputs

use std::path::PathBuf;

/// Where a report writes and whom it is about
#[derive(Debug, Clone)]
pub struct ReportOutputs {
    /// Subject identifier, written to the `Sub` column
    pub subject: String,
    /// Per-subject figure (SVG)
    pub figure: PathBuf,
    /// Group QC table the metrics are appended to
    pub table: PathBuf,
}

/// Eddy motion report inputs
#[derive(Debug, Clone)]
pub struct MotionInputs {
    /// Movement over time, one row per slice group (`*.eddy_movement_over_time`)
    pub s2v: PathBuf,
    /// Volume-to-volume RMS displacement, absolute and relative
    pub rms: PathBuf,
    /// Restricted RMS displacement, absolute and relative
    pub restricted_rms: PathBuf,
    /// Eddy parameters, one row per volume
    pub params: PathBuf,
    /// Slices (or multiband slice groups) per volume in the s2v file
    pub nslices: usize,
    pub bvals: PathBuf,
}

/// Eddy outlier report inputs
#[derive(Debug, Clone)]
pub struct OutlierInputs {
    /// Outlier map (`*.eddy_outlier_map`), volumes × slices of 0/1
    pub outlier_map: PathBuf,
    /// Outlier n-stdev map (`*.eddy_outlier_n_stdev_map`)
    pub outlier_stdev_map: PathBuf,
    pub params: PathBuf,
    pub bvals: PathBuf,
    /// Binary brain mask
    pub mask: PathBuf,
    /// SNR/CNR summary after eddy; first row holds the b0 SNR mean and std
    pub cnr_eddy: Option<PathBuf>,
    /// Eddy residuals, 4-D
    pub eddy_residuals: Option<PathBuf>,
}

/// Tensor-fit report inputs
#[derive(Debug, Clone)]
pub struct DtifitInputs {
    /// QC directory holding `dtifit/`, `tsnr_orig.txt` and `cnrwm.txt`
    pub qc_dir: PathBuf,
    pub wm_mask: PathBuf,
    pub bvals: PathBuf,
    /// Diffusion-weighted data, 4-D
    pub data: PathBuf,
    pub gm_mask: Option<PathBuf>,
    pub csf_mask: Option<PathBuf>,
}

impl DtifitInputs {
    fn dtifit_dir(&self) -> PathBuf {
        self.qc_dir.join("dtifit")
    }

    pub fn fa(&self) -> PathBuf {
        self.dtifit_dir().join("dtifit_FA.nii.gz")
    }

    pub fn md(&self) -> PathBuf {
        self.dtifit_dir().join("dtifit_MD.nii.gz")
    }

    pub fn residuals(&self) -> PathBuf {
        self.dtifit_dir().join("dtifit_residuals.nii.gz")
    }

    /// Mean and std of the b0 SNR
    pub fn tsnr(&self) -> PathBuf {
        self.qc_dir.join("tsnr_orig.txt")
    }

    /// Per-volume WM contrast and noise
    pub fn cnr_wm(&self) -> PathBuf {
        self.qc_dir.join("cnrwm.txt")
    }
}
