//! NIfTI volumes and masked reductions

use std::path::Path;

use anyhow::{bail, Context, Result};
use ndarray::{ArrayD, Axis};
use nifti::{IntoNdArray, NiftiObject, ReaderOptions};

use crate::stats::mean;

/// Load a `.nii` / `.nii.gz` image as `f64`, scaling applied.
pub fn load_volume(path: &Path) -> Result<ArrayD<f64>> {
    let obj = ReaderOptions::new()
        .read_file(path)
        .with_context(|| format!("failed to read NIfTI {}", path.display()))?;
    obj.into_volume()
        .into_ndarray::<f64>()
        .with_context(|| format!("failed to convert {} to an array", path.display()))
}

/// Load a volume that must have exactly `ndim` dimensions.
pub fn load_volume_nd(path: &Path, ndim: usize) -> Result<ArrayD<f64>> {
    let volume = load_volume(path)?;
    if volume.ndim() != ndim {
        bail!("{}: expected a {ndim}-D image, got shape {:?}", path.display(), volume.shape());
    }
    Ok(volume)
}

/// Voxel values of `volume` where `mask > 0`
pub fn masked_values(volume: &ArrayD<f64>, mask: &ArrayD<f64>) -> Result<Vec<f64>> {
    if volume.shape() != mask.shape() {
        bail!("mask shape {:?} does not match image shape {:?}", mask.shape(), volume.shape());
    }
    Ok(volume.iter().zip(mask.iter()).filter(|&(_, m)| *m > 0.0).map(|(v, _)| *v).collect())
}

/// Mean of `volume` inside the mask
pub fn masked_mean(volume: &ArrayD<f64>, mask: &ArrayD<f64>) -> Result<f64> {
    Ok(mean(&masked_values(volume, mask)?))
}

fn per_volume(
    data: &ArrayD<f64>,
    mask: &ArrayD<f64>,
    reduce: impl Fn(&[f64]) -> f64,
) -> Result<Vec<f64>> {
    if data.ndim() != 4 || data.shape()[..3] != *mask.shape() {
        bail!(
            "cannot index 4-D data of shape {:?} with a mask of shape {:?}",
            data.shape(),
            mask.shape()
        );
    }
    let nvols = data.shape()[3];
    let mut out = Vec::with_capacity(nvols);
    for t in 0..nvols {
        let vol = data.index_axis(Axis(3), t);
        let values: Vec<f64> =
            vol.iter().zip(mask.iter()).filter(|&(_, m)| *m > 0.0).map(|(v, _)| *v).collect();
        out.push(reduce(&values));
    }
    Ok(out)
}

/// Per-volume mean of 4-D `data` inside a 3-D mask
pub fn masked_volume_means(data: &ArrayD<f64>, mask: &ArrayD<f64>) -> Result<Vec<f64>> {
    per_volume(data, mask, mean)
}

/// Per-volume standard deviation of 4-D `data` inside a 3-D mask
pub fn masked_volume_stds(data: &ArrayD<f64>, mask: &ArrayD<f64>) -> Result<Vec<f64>> {
    per_volume(data, mask, crate::stats::std)
}

/// Per-volume mean of squared values inside a 3-D mask
pub fn masked_volume_mean_squares(data: &ArrayD<f64>, mask: &ArrayD<f64>) -> Result<Vec<f64>> {
    per_volume(data, mask, |values| {
        let squares: Vec<f64> = values.iter().map(|v| v * v).collect();
        mean(&squares)
    })
}
