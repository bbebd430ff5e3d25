//! Persistence of processed cases.
//!
//! [`NpyCaseStore`] lays batches out as one `.npy` file per batch:
//!
//! ```text
//! <root>/
//!   case_index.json
//!   case_00000/
//!     volume_0000.npy     (batch, x, y, z, channel)           f32
//!     label_0000.npy      (batch, x, y, z, channel, classes)  f32
//!     volume_0001.npy
//!     ...
//! ```

use std::fmt::Display;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use ndarray_npy::{read_npy, write_npy};
use tracing::debug;

use crate::error::IoError;
use crate::volume::{Batch, EncodedBatch};

use super::index::CaseIndex;

/// File name of the saved case index inside the store root.
pub const INDEX_FILE_NAME: &str = "case_index.json";

/// Output of the pipeline for one case.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedCase {
    /// Spatial shape of the source volume
    pub volume_shape: [usize; 3],

    /// Windows per spatial axis
    pub grid_counts: [usize; 3],

    /// Patches produced by the slicer
    pub sliced_patches: usize,

    /// Patches left after filtering and augmentation
    pub patch_count: usize,

    /// Volume batches, in patch order
    pub volume_batches: Vec<Batch<f32>>,

    /// One-hot label batches, aligned with `volume_batches` (training only)
    pub label_batches: Option<Vec<EncodedBatch>>,
}

impl ProcessedCase {
    /// Number of batches.
    pub fn steps(&self) -> usize {
        self.volume_batches.len()
    }
}

/// Destination for processed cases.
pub trait CaseStore {
    /// Persist all batches of one case.
    fn persist(&self, case_id: &str, case: &ProcessedCase) -> Result<(), IoError>;
}

/// Stores batches as `.npy` files, one directory per case.
#[derive(Debug, Clone)]
pub struct NpyCaseStore {
    root: PathBuf,
}

impl NpyCaseStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn case_dir(&self, case_id: &str) -> PathBuf {
        self.root.join(case_id)
    }

    pub fn volume_batch_path(&self, case_id: &str, batch: usize) -> PathBuf {
        self.case_dir(case_id).join(format!("volume_{:04}.npy", batch))
    }

    pub fn label_batch_path(&self, case_id: &str, batch: usize) -> PathBuf {
        self.case_dir(case_id).join(format!("label_{:04}.npy", batch))
    }

    pub fn index_path(&self) -> PathBuf {
        self.root.join(INDEX_FILE_NAME)
    }

    /// Read one volume batch back.
    pub fn read_volume_batch(&self, case_id: &str, batch: usize) -> Result<Batch<f32>, IoError> {
        read_batch(&self.volume_batch_path(case_id, batch))
    }

    /// Read one encoded label batch back.
    pub fn read_label_batch(&self, case_id: &str, batch: usize) -> Result<EncodedBatch, IoError> {
        read_batch(&self.label_batch_path(case_id, batch))
    }

    /// Write the case index as JSON into the store root.
    pub fn save_index(&self, index: &CaseIndex) -> Result<PathBuf, IoError> {
        fs::create_dir_all(&self.root)?;
        let path = self.index_path();
        let writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(writer, index).map_err(|e| IoError::Index(e.to_string()))?;
        Ok(path)
    }

    /// Load a case index previously written by [`save_index`](Self::save_index).
    pub fn load_index(&self) -> Result<CaseIndex, IoError> {
        let path = self.index_path();
        if !path.is_file() {
            return Err(IoError::NotFound(path.display().to_string()));
        }
        let reader = BufReader::new(File::open(&path)?);
        serde_json::from_reader(reader).map_err(|e| IoError::Index(e.to_string()))
    }
}

impl CaseStore for NpyCaseStore {
    fn persist(&self, case_id: &str, case: &ProcessedCase) -> Result<(), IoError> {
        let dir = self.case_dir(case_id);
        // Batches from an earlier run with other settings would be left behind
        if dir.exists() {
            fs::remove_dir_all(&dir)?;
        }
        fs::create_dir_all(&dir)?;

        for (i, batch) in case.volume_batches.iter().enumerate() {
            let path = self.volume_batch_path(case_id, i);
            write_npy(&path, batch).map_err(|e| npy_error(&path, e))?;
        }
        if let Some(label_batches) = &case.label_batches {
            for (i, batch) in label_batches.iter().enumerate() {
                let path = self.label_batch_path(case_id, i);
                write_npy(&path, batch).map_err(|e| npy_error(&path, e))?;
            }
        }

        debug!(case_id, steps = case.steps(), dir = %dir.display(), "persisted case");
        Ok(())
    }
}

fn read_batch<T: ndarray_npy::ReadNpyExt>(path: &Path) -> Result<T, IoError> {
    if !path.is_file() {
        return Err(IoError::NotFound(path.display().to_string()));
    }
    read_npy(path).map_err(|e| npy_error(path, e))
}

fn npy_error(path: &Path, err: impl Display) -> IoError {
    IoError::Npy {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}
