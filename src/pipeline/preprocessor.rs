//! Per-case orchestration.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                          Preprocessor                             │
//! │  ┌────────────────────────────────────────────────────────────┐  │
//! │  │                     process_case()                         │  │
//! │  │  1. Load case          5. Filter + augment (training)      │  │
//! │  │  2. Check shapes       6. Batch volume (+ labels)          │  │
//! │  │  3. Scale (optional)   7. One-hot labels (training)        │  │
//! │  │  4. Slice              8. Persist, then summarize          │  │
//! │  └────────────────────────────────────────────────────────────┘  │
//! │           │                                        │             │
//! │           ▼                                        ▼             │
//! │    ┌────────────┐                          ┌─────────────┐       │
//! │    │ CaseLoader │                          │  CaseStore  │       │
//! │    └────────────┘                          └─────────────┘       │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::batch::{batch_steps, create_batches, one_hot};
use crate::case::{CaseIndex, CaseLoader, CaseStore, CaseSummary, ProcessedCase};
use crate::config::{check_rotation_plane, PipelineConfig};
use crate::error::{ConfigError, IoError, PrepError, VolumeError};
use crate::patch::{
    remove_blanks, slice_volume, Augmentation, PatchGrid, PatchPairs, Reflection, Rotation,
};
use crate::volume::{scale_volume_values, spatial_shape, EncodedBatch, SPATIAL_DIMS};

// =============================================================================
// Mode
// =============================================================================

/// Which branch of the pipeline to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Labels are loaded, filtered, augmented and one-hot encoded
    Training,

    /// Only the volume is sliced and batched
    Prediction,
}

impl Mode {
    pub fn from_training_flag(training: bool) -> Self {
        if training {
            Mode::Training
        } else {
            Mode::Prediction
        }
    }

    pub fn is_training(self) -> bool {
        self == Mode::Training
    }
}

// =============================================================================
// Case Report
// =============================================================================

/// Shapes and counts of one processed case, without the array data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseReport {
    pub case_id: String,
    pub mode: Mode,
    pub volume_shape: [usize; SPATIAL_DIMS],
    pub grid_counts: [usize; SPATIAL_DIMS],
    pub sliced_patches: usize,
    pub patch_count: usize,
    pub steps: usize,

    /// Shape of the first volume batch, if any
    pub volume_batch_shape: Option<Vec<usize>>,

    /// Shape of the first encoded label batch, if any
    pub label_batch_shape: Option<Vec<usize>>,
}

impl CaseReport {
    pub fn new(case_id: impl Into<String>, mode: Mode, case: &ProcessedCase) -> Self {
        Self {
            case_id: case_id.into(),
            mode,
            volume_shape: case.volume_shape,
            grid_counts: case.grid_counts,
            sliced_patches: case.sliced_patches,
            patch_count: case.patch_count,
            steps: case.steps(),
            volume_batch_shape: case.volume_batches.first().map(|b| b.shape().to_vec()),
            label_batch_shape: case
                .label_batches
                .as_ref()
                .and_then(|batches| batches.first())
                .map(|b| b.shape().to_vec()),
        }
    }
}

// =============================================================================
// Preprocessor
// =============================================================================

/// Runs the patch pipeline over cases and builds the case index.
///
/// # Type Parameters
///
/// * `L` - Where cases are read from
/// * `S` - Where processed cases are written to
///
/// # Example
///
/// ```ignore
/// use mri_prep::case::{NiftiCaseLoader, NpyCaseStore};
/// use mri_prep::config::PipelineConfig;
/// use mri_prep::pipeline::{Mode, Preprocessor};
///
/// let config = PipelineConfig::new("/data/kits").with_batch_size(4);
/// let loader = NiftiCaseLoader::new(&config.data_path);
/// let store = NpyCaseStore::new("/data/prepared");
/// let preprocessor = Preprocessor::new(config, loader, store)?;
///
/// let index = preprocessor.preprocess_cases(["case_00000", "case_00001"], Mode::Training)?;
/// ```
pub struct Preprocessor<L, S> {
    config: PipelineConfig,
    loader: L,
    store: S,
    augmentations: Vec<Box<dyn Augmentation>>,
}

impl<L: CaseLoader, S> Preprocessor<L, S> {
    /// Validate the configuration and assemble the augmentation stages.
    ///
    /// Stages run in the order rotation, reflection.
    pub fn new(config: PipelineConfig, loader: L, store: S) -> Result<Self, PrepError> {
        config.validate()?;

        let mut augmentations: Vec<Box<dyn Augmentation>> = Vec::new();
        if config.rotation {
            augmentations.push(Box::new(Rotation::new()));
        }
        if config.reflection {
            augmentations.push(Box::new(Reflection));
        }

        Ok(Self {
            config,
            loader,
            store,
            augmentations,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Names of the active augmentation stages, in run order.
    pub fn augmentation_names(&self) -> Vec<&'static str> {
        self.augmentations.iter().map(|a| a.name()).collect()
    }

    /// Run the pipeline for one case without persisting it.
    pub fn prepare_case(&self, case_id: &str, mode: Mode) -> Result<ProcessedCase, PrepError> {
        let config = &self.config;
        let loaded = self.loader.load(case_id, mode.is_training())?;

        let labels = match (mode, loaded.labels) {
            (Mode::Training, None) => {
                let missing = format!("segmentation for case {}", case_id);
                return Err(IoError::NotFound(missing).into());
            }
            (Mode::Training, Some(labels)) => Some(labels),
            (Mode::Prediction, _) => None,
        };

        let volume_shape = spatial_shape(&loaded.volume);
        if let Some(labels) = &labels {
            let label_shape = spatial_shape(labels);
            if label_shape != volume_shape {
                return Err(VolumeError::ShapeMismatch {
                    volume: volume_shape.to_vec(),
                    labels: label_shape.to_vec(),
                }
                .into());
            }
        }

        let volume = if config.scale_input_values {
            scale_volume_values(loaded.volume)?
        } else {
            loaded.volume
        };

        let grid = PatchGrid::new(volume_shape, config.patch_size, config.overlap)?;
        if mode.is_training() && config.rotation {
            check_rotation_plane(grid.patch_shape())?;
        }

        let volume_patches = slice_volume(&volume, &grid)?;
        drop(volume);
        let sliced_patches = volume_patches.len();
        debug!(case_id, counts = ?grid.counts(), patches = sliced_patches, "sliced volume");

        let (volume_patches, label_patches) = match labels {
            Some(labels) => {
                let label_patches = slice_volume(&labels, &grid)?;
                drop(labels);
                let pairs = self.filter_and_augment(
                    case_id,
                    PatchPairs::new(volume_patches, label_patches)?,
                );
                let (volumes, labels) = pairs.into_parts();
                (volumes, Some(labels))
            }
            None => (volume_patches, None),
        };

        let patch_count = volume_patches.len();
        if patch_count == 0 {
            warn!(case_id, "no patches left after filtering");
        }

        let steps = batch_steps(patch_count, config.batch_size);
        let volume_batches = create_batches(&volume_patches, config.batch_size, steps)?;
        drop(volume_patches);

        let label_batches = match label_patches {
            Some(patches) => {
                let batches = create_batches(&patches, config.batch_size, steps)?;
                let encoded = batches
                    .iter()
                    .map(|batch| one_hot(batch, config.classes))
                    .collect::<Result<Vec<EncodedBatch>, _>>()?;
                Some(encoded)
            }
            None => None,
        };
        debug!(case_id, steps, batch_size = config.batch_size, "batched patches");

        Ok(ProcessedCase {
            volume_shape,
            grid_counts: grid.counts(),
            sliced_patches,
            patch_count,
            volume_batches,
            label_batches,
        })
    }

    fn filter_and_augment(&self, case_id: &str, mut pairs: PatchPairs) -> PatchPairs {
        if self.config.skip_blanks {
            let removed = remove_blanks(&mut pairs, self.config.background_class);
            debug!(case_id, removed, kept = pairs.len(), "removed blank patches");
        }
        for stage in &self.augmentations {
            stage.apply(&mut pairs);
            debug!(case_id, stage = stage.name(), patches = pairs.len(), "augmented");
        }
        pairs
    }
}

impl<L: CaseLoader, S: CaseStore> Preprocessor<L, S> {
    /// Process every case in order and return the combined index.
    ///
    /// The first failing case aborts the pass. Cases persisted before the
    /// failure keep their artifacts.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DuplicateCase`] before any case is processed if
    /// an id appears more than once.
    pub fn preprocess_cases<I, C>(&self, cases: I, mode: Mode) -> Result<CaseIndex, PrepError>
    where
        I: IntoIterator<Item = C>,
        C: AsRef<str>,
    {
        let cases: Vec<C> = cases.into_iter().collect();
        let mut seen = HashSet::with_capacity(cases.len());
        for case_id in &cases {
            if !seen.insert(case_id.as_ref()) {
                return Err(ConfigError::DuplicateCase(case_id.as_ref().to_string()).into());
            }
        }

        let mut index = CaseIndex::new();
        for case_id in &cases {
            let summary = self.process_case(case_id.as_ref(), mode)?;
            index.extend(std::iter::once(summary));
        }
        info!(batches = index.len(), "preprocessing complete");
        Ok(index)
    }

    /// Prepare one case, persist it and return its batch count.
    pub fn process_case(&self, case_id: &str, mode: Mode) -> Result<CaseSummary, PrepError> {
        let case = self.prepare_case(case_id, mode)?;
        self.store.persist(case_id, &case)?;

        info!(
            case_id,
            patches = case.patch_count,
            steps = case.steps(),
            "processed case"
        );
        Ok(CaseSummary::new(case_id, case.steps()))
    }
}

// =============================================================================
// Tests
// =============================================================================
