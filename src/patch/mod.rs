//! Patch layer.
//!
//! This module cuts volumes into fixed-size patches and prepares the patch
//! sequences for batching:
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐
//! │    Volume    │   │ Label Volume │
//! └──────┬───────┘   └──────┬───────┘
//!        │   PatchGrid      │
//!        ▼   slice_volume   ▼
//! ┌─────────────────────────────────┐
//! │           PatchPairs            │
//! │   remove_blanks  (optional)     │
//! │   Augmentation   (optional)     │
//! └─────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`PatchGrid`]: per-axis windows and their row-major combination
//! - [`slice_volume`]: copies every grid region out of an array
//! - [`PatchPairs`]: index-aligned volume/label patch sequences
//! - [`remove_blanks`]: drops pairs whose labels are all background
//! - [`Augmentation`]: strategy trait implemented by [`Rotation`] and
//!   [`Reflection`]

mod augment;
mod grid;
mod pairs;

pub use augment::{rot90, Augmentation, Reflection, Rotation, ROTATION_AXES};
pub use grid::{axis_windows, slice_volume, validate_patch_geometry, PatchGrid};
pub use pairs::{is_blank, remove_blanks, PatchPairs};
