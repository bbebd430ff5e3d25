//! Pipeline orchestration.
//!
//! [`Preprocessor`] drives one case at a time through the patch and batch
//! layers and folds the per-case [`CaseSummary`](crate::case::CaseSummary)
//! values into a [`CaseIndex`](crate::case::CaseIndex).
//!
//! # Components
//!
//! - [`Preprocessor`]: loader → slicer → filter/augment → batcher → store
//! - [`Mode`]: training (labels) or prediction (volume only)
//! - [`CaseReport`]: serializable shapes and counts for one case

mod preprocessor;

pub use preprocessor::{CaseReport, Mode, Preprocessor};
