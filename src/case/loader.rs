//! Case loading.
//!
//! The default loader expects one directory per case under the data root:
//!
//! ```text
//! <data_path>/
//!   case_00000/
//!     imaging.nii.gz
//!     segmentation.nii.gz
//!   case_00001/
//!     ...
//! ```
//!
//! Uncompressed `.nii` files are accepted as well. 3D images get a trailing
//! channel axis of length 1; 4D images are used as stored.

use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};

use ndarray::{Array4, ArrayD, Axis, Ix3, Ix4};
use nifti::{InMemNiftiObject, IntoNdArray, NiftiObject, ReaderOptions};
use tracing::debug;

use crate::error::{IoError, VolumeError};
use crate::volume::{to_class_indices, LabelVolume, Volume};

/// File stem of the scan inside a case directory.
pub const IMAGING_STEM: &str = "imaging";

/// File stem of the segmentation inside a case directory.
pub const SEGMENTATION_STEM: &str = "segmentation";

const NIFTI_EXTENSIONS: [&str; 2] = ["nii.gz", "nii"];

/// A loaded case.
#[derive(Debug, Clone)]
pub struct LoadedCase {
    pub volume: Volume,

    /// Present when labels were requested
    pub labels: Option<LabelVolume>,
}

/// Source of case data.
///
/// Implementations own the data location; the pipeline only passes case ids.
pub trait CaseLoader {
    /// Load the scan of `case_id` and, if `load_labels`, its segmentation.
    fn load(&self, case_id: &str, load_labels: bool) -> Result<LoadedCase, IoError>;
}

/// Reads cases stored as NIfTI files.
#[derive(Debug, Clone)]
pub struct NiftiCaseLoader {
    data_path: PathBuf,
}

impl NiftiCaseLoader {
    pub fn new(data_path: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
        }
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    /// Directory holding the files of one case.
    pub fn case_dir(&self, case_id: &str) -> PathBuf {
        self.data_path.join(case_id)
    }

    /// Locate `<stem>.nii.gz` or `<stem>.nii` inside the case directory.
    pub fn image_path(&self, case_id: &str, stem: &str) -> Result<PathBuf, IoError> {
        let dir = self.case_dir(case_id);
        NIFTI_EXTENSIONS
            .iter()
            .map(|ext| dir.join(format!("{}.{}", stem, ext)))
            .find(|path| path.is_file())
            .ok_or_else(|| IoError::NotFound(dir.join(stem).display().to_string()))
    }
}

impl CaseLoader for NiftiCaseLoader {
    fn load(&self, case_id: &str, load_labels: bool) -> Result<LoadedCase, IoError> {
        let dir = self.case_dir(case_id);
        if !dir.is_dir() {
            return Err(IoError::NotFound(dir.display().to_string()));
        }

        let volume = read_volume(&self.image_path(case_id, IMAGING_STEM)?)?;
        let labels = if load_labels {
            Some(read_labels(&self.image_path(case_id, SEGMENTATION_STEM)?)?)
        } else {
            None
        };

        debug!(case_id, shape = ?volume.shape(), labels = labels.is_some(), "loaded case");
        Ok(LoadedCase { volume, labels })
    }
}

/// Read a NIfTI scan as `f32` voxels.
pub fn read_volume(path: &Path) -> Result<Volume, IoError> {
    let data = open(path)?
        .into_volume()
        .into_ndarray::<f32>()
        .map_err(|e| nifti_error(path, e))?;
    to_volume(data).map_err(|e| nifti_error(path, e))
}

/// Read a NIfTI segmentation as `u8` class indices.
///
/// Values are decoded as `f64` first so that stored values outside `0..=255`
/// are rejected instead of wrapping.
pub fn read_labels(path: &Path) -> Result<LabelVolume, IoError> {
    let data = open(path)?
        .into_volume()
        .into_ndarray::<f64>()
        .map_err(|e| nifti_error(path, e))?;
    let values = to_volume(data).map_err(|e| nifti_error(path, e))?;
    to_class_indices(&values).map_err(|source| IoError::InvalidLabels {
        path: path.display().to_string(),
        source,
    })
}

/// Bring a 3D or 4D array into `(x, y, z, channel)` layout.
pub fn to_volume<T>(data: ArrayD<T>) -> Result<Array4<T>, VolumeError> {
    match data.ndim() {
        3 => Ok(data.into_dimensionality::<Ix3>()?.insert_axis(Axis(3))),
        4 => Ok(data.into_dimensionality::<Ix4>()?),
        n => Err(VolumeError::UnsupportedDimensionality(n)),
    }
}

/// List case directories under `data_path`, sorted by name.
///
/// Hidden entries and plain files are skipped.
pub fn discover_cases(data_path: &Path) -> Result<Vec<String>, IoError> {
    if !data_path.is_dir() {
        return Err(IoError::NotFound(data_path.display().to_string()));
    }

    let mut cases = Vec::new();
    for entry in fs::read_dir(data_path)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if !name.starts_with('.') {
                cases.push(name.to_string());
            }
        }
    }
    cases.sort();
    Ok(cases)
}

fn open(path: &Path) -> Result<InMemNiftiObject, IoError> {
    ReaderOptions::new()
        .read_file(path)
        .map_err(|e| nifti_error(path, e))
}

fn nifti_error(path: &Path, err: impl Display) -> IoError {
    IoError::Nifti {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}
