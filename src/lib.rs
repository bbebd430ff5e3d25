//! # mri-prep
//!
//! Patch extraction, augmentation and batching for 3D MRI segmentation data.
//!
//! Full volumes are cut into fixed-size, optionally overlapping patches,
//! optionally filtered and augmented, grouped into batches and persisted per
//! case. A flat index maps every global batch number back to the case that
//! produced it, so a data loader can address batches by position.
//!
//! ## Features
//!
//! - **Full coverage slicing**: every voxel lands in at least one patch
//! - **Paired transforms**: volume and label patches stay index-aligned through
//!   filtering and augmentation
//! - **NIfTI input**: KiTS-style case directories via the `nifti` crate
//! - **NPY output**: one `.npy` file per batch plus a JSON case index
//!
//! ## Architecture
//!
//! - [`volume`] - Array type aliases and intensity scaling
//! - [`patch`] - Patch grid, slicing, blank filtering and augmentation
//! - [`batch`] - Batching and one-hot label encoding
//! - [`case`] - Case loading, persistence and the case index
//! - [`pipeline`] - The [`Preprocessor`] tying the layers together
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use mri_prep::{Mode, NiftiCaseLoader, NpyCaseStore, PipelineConfig, Preprocessor};
//!
//! fn main() -> Result<(), mri_prep::PrepError> {
//!     let config = PipelineConfig::new("/data/kits")
//!         .with_patch_size([48, 128, 128])
//!         .with_batch_size(4)
//!         .with_skip_blanks(true);
//!
//!     let loader = NiftiCaseLoader::new(&config.data_path);
//!     let store = NpyCaseStore::new("/data/prepared");
//!     let preprocessor = Preprocessor::new(config, loader, store)?;
//!
//!     let index = preprocessor.preprocess_cases(["case_00000"], Mode::Training)?;
//!     preprocessor.store().save_index(&index)?;
//!     Ok(())
//! }
//! ```

pub mod batch;
pub mod case;
pub mod config;
pub mod error;
pub mod patch;
pub mod pipeline;
pub mod volume;

// Re-export commonly used types
pub use batch::{batch_steps, create_batches, one_hot};
pub use case::{
    discover_cases, BatchLocation, CaseIndex, CaseLoader, CaseStore, CaseSummary, LoadedCase,
    NiftiCaseLoader, NpyCaseStore, ProcessedCase,
};
pub use config::{Cli, Command, InspectConfig, LocateConfig, PipelineConfig, PrepareConfig};
pub use error::{ConfigError, IoError, PrepError, VolumeError};
pub use patch::{
    remove_blanks, slice_volume, Augmentation, PatchGrid, PatchPairs, Reflection, Rotation,
};
pub use pipeline::{CaseReport, Mode, Preprocessor};
pub use volume::{scale_volume_values, Batch, EncodedBatch, LabelVolume, Patch, Volume};
