//! Case layer.
//!
//! A case is one patient scan identified by an opaque id. This module holds
//! the seams to the outside world and the index handed to data loaders:
//!
//! - [`CaseLoader`] / [`NiftiCaseLoader`]: case id → volume (+ labels)
//! - [`CaseStore`] / [`NpyCaseStore`]: persists a [`ProcessedCase`]
//! - [`CaseIndex`]: global batch number → owning case

mod index;
mod loader;
mod store;

pub use index::{BatchLocation, CaseIndex, CaseSummary};
pub use loader::{
    discover_cases, read_labels, read_volume, to_volume, CaseLoader, LoadedCase, NiftiCaseLoader,
    IMAGING_STEM, SEGMENTATION_STEM,
};
pub use store::{CaseStore, NpyCaseStore, ProcessedCase, INDEX_FILE_NAME};
