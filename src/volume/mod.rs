//! Volume types and intensity scaling.
//!
//! Every array in the pipeline carries three spatial axes followed by a
//! channel axis: `(x, y, z, channel)`. Patches keep that layout, batches add a
//! leading batch axis and one-hot encoded label batches add a trailing class
//! axis.

mod labels;
mod scale;

use ndarray::{Array4, Array5, Array6};

pub use labels::to_class_indices;
pub use scale::scale_volume_values;

/// Number of spatial axes in a volume.
pub const SPATIAL_DIMS: usize = 3;

/// An MRI scan, `(x, y, z, channel)`.
pub type Volume = Array4<f32>;

/// Per-voxel class indices matching a [`Volume`].
pub type LabelVolume = Array4<u8>;

/// A fixed-size sub-array cut from a volume or label volume.
pub type Patch<T> = Array4<T>;

/// Patches stacked along a leading batch axis.
pub type Batch<T> = Array5<T>;

/// A label batch with a trailing one-hot class axis.
pub type EncodedBatch = Array6<f32>;

/// Spatial extents of a 4D array (drops the channel axis).
pub fn spatial_shape<T>(array: &Array4<T>) -> [usize; SPATIAL_DIMS] {
    let (x, y, z, _) = array.dim();
    [x, y, z]
}
