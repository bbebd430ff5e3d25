//! One-hot encoding of label batches.

use ndarray::Array6;

use crate::error::VolumeError;
use crate::volume::{Batch, EncodedBatch};

/// Encode a batch of class indices as one-hot vectors.
///
/// The output has the input's shape plus a trailing axis of length `classes`;
/// exactly one entry along that axis is `1.0` for every voxel.
///
/// # Errors
///
/// Returns [`VolumeError::ClassOutOfRange`] on the first voxel whose class is
/// not below `classes`.
pub fn one_hot(batch: &Batch<u8>, classes: usize) -> Result<EncodedBatch, VolumeError> {
    let (n, x, y, z, c) = batch.dim();
    let mut encoded = Array6::<f32>::zeros((n, x, y, z, c, classes));

    for ((i, j, k, l, m), &class) in batch.indexed_iter() {
        if usize::from(class) >= classes {
            return Err(VolumeError::ClassOutOfRange { class, classes });
        }
        encoded[[i, j, k, l, m, usize::from(class)]] = 1.0;
    }

    Ok(encoded)
}
