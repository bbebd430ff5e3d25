//! Patch grid computation and slicing.
//!
//! A grid is computed independently per spatial axis and then combined in
//! row-major order (x varies slowest, z fastest):
//!
//! ```text
//! extent = 10, patch = 4, overlap = 1  →  stride = 3
//!
//!   0         3         6     8  10
//!   ├─────────┼─────────┼─────┼──┤
//!   [ 0 .. 4 )
//!             [ 3 .. 7 )
//!                       [ 6 .. 10 )
//! ```
//!
//! When the next window would run past the far edge it is clamped so that it
//! ends exactly at the edge, overlapping its predecessor by more than the
//! configured amount. An axis shorter than the patch yields a single window
//! spanning the whole axis.

use std::ops::Range;

use ndarray::{s, Array4};

use crate::error::{ConfigError, VolumeError};
use crate::volume::{spatial_shape, Patch, SPATIAL_DIMS};

/// Check that every axis has a positive patch extent and a positive stride.
pub fn validate_patch_geometry(
    patch_size: [usize; SPATIAL_DIMS],
    overlap: [usize; SPATIAL_DIMS],
) -> Result<(), ConfigError> {
    if patch_size.contains(&0) {
        return Err(ConfigError::ZeroPatchSize { patch_size });
    }
    for axis in 0..SPATIAL_DIMS {
        if overlap[axis] >= patch_size[axis] {
            return Err(ConfigError::OverlapTooLarge {
                axis,
                overlap: overlap[axis],
                patch_size: patch_size[axis],
            });
        }
    }
    Ok(())
}

/// Compute the windows along a single axis.
///
/// Callers must ensure `overlap < patch`.
pub fn axis_windows(extent: usize, patch: usize, overlap: usize) -> Vec<Range<usize>> {
    let stride = patch - overlap;
    let steps = extent.saturating_sub(overlap).div_ceil(stride).max(1);

    (0..steps)
        .map(|i| {
            let start = i * stride;
            if start + patch > extent {
                extent.saturating_sub(patch)..extent
            } else {
                start..start + patch
            }
        })
        .collect()
}

/// The set of patch windows covering one volume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchGrid {
    shape: [usize; SPATIAL_DIMS],
    windows: [Vec<Range<usize>>; SPATIAL_DIMS],
}

impl PatchGrid {
    /// Compute the grid for a volume of the given spatial shape.
    pub fn new(
        shape: [usize; SPATIAL_DIMS],
        patch_size: [usize; SPATIAL_DIMS],
        overlap: [usize; SPATIAL_DIMS],
    ) -> Result<Self, ConfigError> {
        validate_patch_geometry(patch_size, overlap)?;

        let windows =
            [0, 1, 2].map(|axis| axis_windows(shape[axis], patch_size[axis], overlap[axis]));

        Ok(Self { shape, windows })
    }

    /// Spatial shape this grid was computed for.
    pub fn shape(&self) -> [usize; SPATIAL_DIMS] {
        self.shape
    }

    /// Windows along one axis, in scan order.
    pub fn windows(&self, axis: usize) -> &[Range<usize>] {
        &self.windows[axis]
    }

    /// Number of windows along each axis.
    pub fn counts(&self) -> [usize; SPATIAL_DIMS] {
        [
            self.windows[0].len(),
            self.windows[1].len(),
            self.windows[2].len(),
        ]
    }

    /// Total number of patches.
    pub fn len(&self) -> usize {
        self.counts().iter().product()
    }

    /// Always false, every axis has at least one window.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Spatial shape shared by every patch of this grid.
    pub fn patch_shape(&self) -> [usize; SPATIAL_DIMS] {
        [0, 1, 2].map(|axis| self.windows[axis][0].len())
    }

    /// Iterate patch regions in row-major order.
    pub fn regions(&self) -> impl Iterator<Item = [Range<usize>; SPATIAL_DIMS]> + '_ {
        self.windows[0].iter().flat_map(move |x| {
            self.windows[1].iter().flat_map(move |y| {
                self.windows[2]
                    .iter()
                    .map(move |z| [x.clone(), y.clone(), z.clone()])
            })
        })
    }
}

/// Cut an array into the patches described by `grid`.
///
/// The channel axis is copied whole into every patch.
///
/// # Errors
///
/// Returns [`VolumeError::ShapeMismatch`] if the array's spatial shape differs
/// from the one the grid was computed for.
pub fn slice_volume<T: Clone>(
    array: &Array4<T>,
    grid: &PatchGrid,
) -> Result<Vec<Patch<T>>, VolumeError> {
    let shape = spatial_shape(array);
    if shape != grid.shape() {
        return Err(VolumeError::ShapeMismatch {
            volume: grid.shape().to_vec(),
            labels: shape.to_vec(),
        });
    }

    Ok(grid
        .regions()
        .map(|[x, y, z]| array.slice(s![x, y, z, ..]).to_owned())
        .collect())
}
