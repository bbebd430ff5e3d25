//! Patch augmentation stages.
//!
//! Each stage reads the current pairs and appends its synthetic pairs to the
//! end, leaving the existing pairs untouched. Volume and label patches of a
//! pair always go through the same transform.

use ndarray::Axis;
use tracing::debug;

use crate::volume::Patch;

use super::PatchPairs;

/// Spatial axes spanning the rotation plane (y and z).
pub const ROTATION_AXES: (usize, usize) = (1, 2);

/// A transform that grows a patch sequence under the pairing contract.
pub trait Augmentation {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Append augmented copies to `pairs`.
    fn apply(&self, pairs: &mut PatchPairs);
}

/// Rotate a patch by `k` quarter turns in the plane spanned by `axes`.
///
/// Rotation direction is from the first axis towards the second: for a 2x2
/// plane `[[1, 2], [3, 4]]` one quarter turn gives `[[2, 4], [1, 3]]`. The
/// result is in standard layout.
pub fn rot90<T: Clone>(patch: &Patch<T>, k: usize, axes: (usize, usize)) -> Patch<T> {
    let (a, b) = axes;
    let mut view = patch.view();
    match k % 4 {
        0 => {}
        1 => {
            view.invert_axis(Axis(b));
            view.swap_axes(a, b);
        }
        2 => {
            view.invert_axis(Axis(a));
            view.invert_axis(Axis(b));
        }
        _ => {
            view.swap_axes(a, b);
            view.invert_axis(Axis(b));
        }
    }
    view.as_standard_layout().into_owned()
}

/// Appends 90°, 180° and 270° rotated copies of every pair.
///
/// With `n` input pairs the output holds `4n` pairs: the originals followed by
/// one block of `n` per rotation, in increasing angle.
#[derive(Debug, Clone)]
pub struct Rotation {
    axes: (usize, usize),
}

impl Rotation {
    pub fn new() -> Self {
        Self {
            axes: ROTATION_AXES,
        }
    }

    pub fn axes(&self) -> (usize, usize) {
        self.axes
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Self::new()
    }
}

impl Augmentation for Rotation {
    fn name(&self) -> &'static str {
        "rotation"
    }

    fn apply(&self, pairs: &mut PatchPairs) {
        let mut rotated = PatchPairs::default();
        for k in 1..4 {
            for (volume, label) in pairs.volumes().iter().zip(pairs.labels()) {
                rotated.push(rot90(volume, k, self.axes), rot90(label, k, self.axes));
            }
        }
        debug!(added = rotated.len(), "rotated patches");
        pairs.append(rotated);
    }
}

/// Reflection stage.
///
/// Currently leaves the pairs unchanged; reflected copies would be appended
/// the same way [`Rotation`] appends its blocks.
#[derive(Debug, Clone, Default)]
pub struct Reflection;

impl Augmentation for Reflection {
    fn name(&self) -> &'static str {
        "reflection"
    }

    fn apply(&self, _pairs: &mut PatchPairs) {}
}
