//! Grouping patches into batches.

use ndarray::{stack, ArrayView4, Axis};

use crate::error::VolumeError;
use crate::volume::{Batch, Patch};

/// Number of batches needed for `patch_count` patches.
///
/// Compute this once from the volume patches and reuse it for the label
/// patches so that volume and label batches line up.
///
/// # Panics
///
/// Panics if `batch_size` is zero. [`PipelineConfig::validate`] rejects that
/// configuration before any batching happens.
///
/// [`PipelineConfig::validate`]: crate::config::PipelineConfig::validate
pub fn batch_steps(patch_count: usize, batch_size: usize) -> usize {
    patch_count.div_ceil(batch_size)
}

/// Stack consecutive patches into `steps` batches along a new leading axis.
///
/// Every batch but the last holds `batch_size` patches; the last one takes
/// whatever remains. Batch order mirrors patch order.
///
/// # Errors
///
/// - [`VolumeError::Shape`] if `steps` asks for more batches than the patches
///   can fill, or if the patches do not share one shape
pub fn create_batches<T: Clone>(
    patches: &[Patch<T>],
    batch_size: usize,
    steps: usize,
) -> Result<Vec<Batch<T>>, VolumeError> {
    let mut batches = Vec::with_capacity(steps);

    for step in 0..steps {
        let start = step * batch_size;
        if start >= patches.len() {
            return Err(VolumeError::Shape(format!(
                "batch {} starts at patch {} but only {} patches exist",
                step,
                start,
                patches.len()
            )));
        }
        let end = (start + batch_size).min(patches.len());

        let views: Vec<ArrayView4<'_, T>> =
            patches[start..end].iter().map(|p| p.view()).collect();
        batches.push(stack(Axis(0), &views)?);
    }

    Ok(batches)
}
