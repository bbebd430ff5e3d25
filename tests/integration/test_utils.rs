//! Test utilities for integration tests.
//!
//! Fixtures are written as real NIfTI files into a temporary data root laid
//! out the way [`NiftiCaseLoader`](mri_prep::NiftiCaseLoader) expects.

use std::fs;
use std::path::PathBuf;

use ndarray::{s, Array3};
use nifti::writer::WriterOptions;
use tempfile::TempDir;

// =============================================================================
// Volumes
// =============================================================================

/// A volume whose voxel value encodes its position.
pub fn ramp_volume(shape: (usize, usize, usize)) -> Array3<f32> {
    let (_, ny, nz) = shape;
    Array3::from_shape_fn(shape, |(x, y, z)| (x * ny * nz + y * nz + z) as f32)
}

/// Labels with class 1 in the low corner cube of side `extent` and 0 elsewhere.
pub fn corner_labels(shape: (usize, usize, usize), extent: usize) -> Array3<u8> {
    let mut labels = Array3::<u8>::zeros(shape);
    labels.slice_mut(s![..extent, ..extent, ..extent]).fill(1);
    labels
}

// =============================================================================
// Data Root
// =============================================================================

/// A temporary data root holding case directories.
pub struct DataRoot {
    dir: TempDir,
}

impl DataRoot {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    /// Directory for outputs, next to the cases.
    pub fn output(&self) -> PathBuf {
        self.dir.path().join("prepared")
    }

    fn case_dir(&self, case_id: &str) -> PathBuf {
        let dir = self.dir.path().join("cases").join(case_id);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Root that holds only case directories.
    pub fn cases_path(&self) -> PathBuf {
        self.dir.path().join("cases")
    }

    /// Write `imaging.nii.gz` for a case.
    pub fn write_imaging(&self, case_id: &str, volume: &Array3<f32>) -> PathBuf {
        let path = self.case_dir(case_id).join("imaging.nii.gz");
        WriterOptions::new(&path).write_nifti(volume).unwrap();
        path
    }

    /// Write `segmentation.nii.gz` for a case.
    pub fn write_segmentation(&self, case_id: &str, labels: &Array3<u8>) -> PathBuf {
        let path = self.case_dir(case_id).join("segmentation.nii.gz");
        WriterOptions::new(&path).write_nifti(labels).unwrap();
        path
    }

    /// Write `segmentation.nii.gz` stored as 16-bit signed integers.
    pub fn write_segmentation_i16(&self, case_id: &str, labels: &Array3<i16>) -> PathBuf {
        let path = self.case_dir(case_id).join("segmentation.nii.gz");
        WriterOptions::new(&path).write_nifti(labels).unwrap();
        path
    }

    /// Write an uncompressed `imaging.nii` for a case.
    pub fn write_imaging_uncompressed(&self, case_id: &str, volume: &Array3<f32>) -> PathBuf {
        let path = self.case_dir(case_id).join("imaging.nii");
        WriterOptions::new(&path).write_nifti(volume).unwrap();
        path
    }

    /// Write a full training case.
    pub fn write_case(&self, case_id: &str, volume: &Array3<f32>, labels: &Array3<u8>) {
        self.write_imaging(case_id, volume);
        self.write_segmentation(case_id, labels);
    }
}
