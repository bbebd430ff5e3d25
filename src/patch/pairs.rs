//! Index-aligned volume/label patch sequences and blank-patch filtering.

use crate::error::VolumeError;
use crate::volume::Patch;

/// Volume patches and their label patches, kept index-aligned.
///
/// The i-th volume patch and the i-th label patch always describe the same
/// spatial region (or the same transform of it). Every mutating method keeps
/// both sequences the same length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatchPairs {
    volumes: Vec<Patch<f32>>,
    labels: Vec<Patch<u8>>,
}

impl PatchPairs {
    /// Pair up two patch sequences produced by the same slicing pass.
    ///
    /// # Errors
    ///
    /// Returns [`VolumeError::ShapeMismatch`] if the sequences differ in
    /// length or if any pair differs in spatial shape.
    pub fn new(volumes: Vec<Patch<f32>>, labels: Vec<Patch<u8>>) -> Result<Self, VolumeError> {
        if volumes.len() != labels.len() {
            return Err(VolumeError::ShapeMismatch {
                volume: vec![volumes.len()],
                labels: vec![labels.len()],
            });
        }
        for (volume, label) in volumes.iter().zip(&labels) {
            if volume.shape()[..3] != label.shape()[..3] {
                return Err(VolumeError::ShapeMismatch {
                    volume: volume.shape().to_vec(),
                    labels: label.shape().to_vec(),
                });
            }
        }
        Ok(Self { volumes, labels })
    }

    pub fn len(&self) -> usize {
        self.volumes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }

    pub fn volumes(&self) -> &[Patch<f32>] {
        &self.volumes
    }

    pub fn labels(&self) -> &[Patch<u8>] {
        &self.labels
    }

    /// Append one pair at the end.
    pub fn push(&mut self, volume: Patch<f32>, label: Patch<u8>) {
        self.volumes.push(volume);
        self.labels.push(label);
    }

    /// Append all pairs of `other` at the end, preserving their order.
    pub fn append(&mut self, other: PatchPairs) {
        self.volumes.extend(other.volumes);
        self.labels.extend(other.labels);
    }

    /// Keep only the pairs whose label patch satisfies `keep`.
    ///
    /// Survivors keep their relative order.
    pub fn retain_by_label<F>(&mut self, mut keep: F)
    where
        F: FnMut(&Patch<u8>) -> bool,
    {
        let (volumes, labels): (Vec<_>, Vec<_>) = std::mem::take(&mut self.volumes)
            .into_iter()
            .zip(std::mem::take(&mut self.labels))
            .filter(|(_, label)| keep(label))
            .unzip();
        self.volumes = volumes;
        self.labels = labels;
    }

    /// Split back into the two sequences.
    pub fn into_parts(self) -> (Vec<Patch<f32>>, Vec<Patch<u8>>) {
        (self.volumes, self.labels)
    }
}

/// True if every voxel of the label patch equals `background_class`.
pub fn is_blank(label: &Patch<u8>, background_class: u8) -> bool {
    label.iter().all(|&class| class == background_class)
}

/// Drop every pair whose label patch is uniformly background.
///
/// Returns the number of pairs removed.
pub fn remove_blanks(pairs: &mut PatchPairs, background_class: u8) -> usize {
    let before = pairs.len();
    pairs.retain_by_label(|label| !is_blank(label, background_class));
    before - pairs.len()
}
