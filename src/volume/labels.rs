//! Narrowing of stored segmentation values to class indices.

use ndarray::Array4;

use crate::error::VolumeError;

use super::LabelVolume;

/// Convert stored label values into `u8` class indices.
///
/// Segmentations are often stored as wider integers or floats. Every value
/// must be an integer in `0..=255`; anything else is reported with its
/// stored value instead of being wrapped into a valid-looking class.
///
/// # Errors
///
/// Returns [`VolumeError::InvalidLabel`] for the first value that is negative,
/// above 255, fractional or not finite.
pub fn to_class_indices(values: &Array4<f64>) -> Result<LabelVolume, VolumeError> {
    if let Some(&value) = values.iter().find(|&&v| !is_class_index(v)) {
        return Err(VolumeError::InvalidLabel { value });
    }
    Ok(values.mapv(|v| v as u8))
}

fn is_class_index(value: f64) -> bool {
    (0.0..=f64::from(u8::MAX)).contains(&value) && value.fract() == 0.0
}
