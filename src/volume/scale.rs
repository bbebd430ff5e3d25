//! Min-max intensity scaling.

use crate::error::VolumeError;

use super::Volume;

/// Rescale every voxel into `[0, 1]` using the volume's own extrema.
///
/// `output = (input - min) / (max - min)`
///
/// # Errors
///
/// - [`VolumeError::Empty`] if the volume has no voxels
/// - [`VolumeError::NonFinite`] if any voxel is NaN or infinite
/// - [`VolumeError::ConstantVolume`] if min equals max
pub fn scale_volume_values(volume: Volume) -> Result<Volume, VolumeError> {
    if volume.is_empty() {
        return Err(VolumeError::Empty);
    }

    let (min, max) = volume
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });

    // f32::min/max skip NaN, so check every voxel rather than the extrema
    if !min.is_finite() || !max.is_finite() || volume.iter().any(|v| v.is_nan()) {
        return Err(VolumeError::NonFinite);
    }
    if min == max {
        return Err(VolumeError::ConstantVolume { value: min });
    }

    let range = max - min;
    Ok(volume.mapv_into(|v| (v - min) / range))
}
