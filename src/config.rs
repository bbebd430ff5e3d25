//! Configuration for mri-prep.
//!
//! Two layers:
//! - [`PipelineConfig`]: library-level settings consumed by the
//!   [`Preprocessor`](crate::pipeline::Preprocessor)
//! - [`Cli`]: command-line arguments via clap, with environment variables
//!   under the `MRI_` prefix
//!
//! # Environment Variables
//!
//! - `MRI_DATA_PATH` - Root directory holding one directory per case
//! - `MRI_OUTPUT` - Directory receiving batches and the case index
//! - `MRI_PATCH_SIZE` - Patch extents, e.g. `48,128,128`
//! - `MRI_OVERLAP` - Overlap per axis, e.g. `0,0,0`
//! - `MRI_BATCH_SIZE` - Patches per batch (default: 1)
//! - `MRI_CLASSES` - Number of segmentation classes (default: 3)
//! - `MRI_SCALE` - Scale voxel values into [0, 1]
//! - `MRI_ROTATION` / `MRI_REFLECTION` - Augmentation stages
//! - `MRI_SKIP_BLANKS` - Drop patches whose labels are all background

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::patch::{validate_patch_geometry, ROTATION_AXES};
use crate::volume::SPATIAL_DIMS;

// =============================================================================
// Default Values
// =============================================================================

/// Default patch extents (x, y, z).
pub const DEFAULT_PATCH_SIZE: [usize; SPATIAL_DIMS] = [48, 128, 128];

/// Default overlap between neighbouring patches.
pub const DEFAULT_OVERLAP: [usize; SPATIAL_DIMS] = [0, 0, 0];

/// Default number of patches per batch.
pub const DEFAULT_BATCH_SIZE: usize = 1;

/// Default class count (background, kidney, tumor).
pub const DEFAULT_CLASSES: usize = 3;

/// Default background class.
pub const DEFAULT_BACKGROUND_CLASS: u8 = 0;

/// Highest class count a `u8` label volume can address.
pub const MAX_CLASSES: usize = 256;

// =============================================================================
// Pipeline Configuration
// =============================================================================

/// Settings for one preprocessing pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Root directory holding the cases
    pub data_path: PathBuf,

    /// Min-max scale each volume into [0, 1]
    pub scale_input_values: bool,

    /// Patch extents per spatial axis
    pub patch_size: [usize; SPATIAL_DIMS],

    /// Voxels shared with the neighbouring patch, per spatial axis
    pub overlap: [usize; SPATIAL_DIMS],

    /// Patches per batch
    pub batch_size: usize,

    /// Width of the one-hot label encoding
    pub classes: usize,

    /// Append 90/180/270 degree rotations (training only)
    pub rotation: bool,

    /// Run the reflection stage (training only)
    pub reflection: bool,

    /// Drop patches whose labels are all background (training only)
    pub skip_blanks: bool,

    /// Class treated as background by the blank filter
    pub background_class: u8,
}

impl PipelineConfig {
    /// Create a configuration with default settings.
    pub fn new(data_path: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
            scale_input_values: false,
            patch_size: DEFAULT_PATCH_SIZE,
            overlap: DEFAULT_OVERLAP,
            batch_size: DEFAULT_BATCH_SIZE,
            classes: DEFAULT_CLASSES,
            rotation: false,
            reflection: false,
            skip_blanks: false,
            background_class: DEFAULT_BACKGROUND_CLASS,
        }
    }

    pub fn with_patch_size(mut self, patch_size: [usize; SPATIAL_DIMS]) -> Self {
        self.patch_size = patch_size;
        self
    }

    pub fn with_overlap(mut self, overlap: [usize; SPATIAL_DIMS]) -> Self {
        self.overlap = overlap;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_classes(mut self, classes: usize) -> Self {
        self.classes = classes;
        self
    }

    pub fn with_scaling(mut self, enabled: bool) -> Self {
        self.scale_input_values = enabled;
        self
    }

    pub fn with_rotation(mut self, enabled: bool) -> Self {
        self.rotation = enabled;
        self
    }

    pub fn with_reflection(mut self, enabled: bool) -> Self {
        self.reflection = enabled;
        self
    }

    pub fn with_skip_blanks(mut self, enabled: bool) -> Self {
        self.skip_blanks = enabled;
        self
    }

    pub fn with_background_class(mut self, class: u8) -> Self {
        self.background_class = class;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_patch_geometry(self.patch_size, self.overlap)?;

        if self.batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }

        if self.classes == 0 || self.classes > MAX_CLASSES {
            return Err(ConfigError::InvalidClassCount(self.classes));
        }

        if usize::from(self.background_class) >= self.classes {
            return Err(ConfigError::BackgroundOutOfRange {
                background: self.background_class,
                classes: self.classes,
            });
        }

        if self.rotation {
            check_rotation_plane(self.patch_size)?;
        }

        Ok(())
    }
}

/// Rotation keeps patch shapes only when the rotation plane is square.
pub fn check_rotation_plane(patch_shape: [usize; SPATIAL_DIMS]) -> Result<(), ConfigError> {
    let (a, b) = ROTATION_AXES;
    if patch_shape[a] != patch_shape[b] {
        return Err(ConfigError::NonSquareRotationPlane {
            axes: ROTATION_AXES,
            first: patch_shape[a],
            second: patch_shape[b],
        });
    }
    Ok(())
}

// =============================================================================
// CLI Arguments
// =============================================================================

/// mri-prep - Patch extraction and batching for 3D MRI segmentation.
#[derive(Parser, Debug, Clone)]
#[command(name = "mri-prep")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Slice, augment and batch cases and write them to the output directory.
    Prepare(PrepareConfig),

    /// Run the pipeline on one case and report shapes and counts without writing.
    Inspect(InspectConfig),

    /// Resolve a global batch number using a saved case index.
    Locate(LocateConfig),
}

/// Pipeline options shared by `prepare` and `inspect`.
#[derive(Args, Debug, Clone)]
pub struct PipelineArgs {
    /// Root directory holding one directory per case.
    #[arg(long, env = "MRI_DATA_PATH")]
    pub data_path: PathBuf,

    /// Patch extents per spatial axis (x,y,z).
    #[arg(long, env = "MRI_PATCH_SIZE", value_delimiter = ',', default_values_t = DEFAULT_PATCH_SIZE)]
    pub patch_size: Vec<usize>,

    /// Overlap between neighbouring patches per spatial axis (x,y,z).
    #[arg(long, env = "MRI_OVERLAP", value_delimiter = ',', default_values_t = DEFAULT_OVERLAP)]
    pub overlap: Vec<usize>,

    /// Patches per batch.
    #[arg(short, long, env = "MRI_BATCH_SIZE", default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Number of segmentation classes.
    #[arg(long, env = "MRI_CLASSES", default_value_t = DEFAULT_CLASSES)]
    pub classes: usize,

    /// Scale voxel values of every volume into [0, 1].
    #[arg(long, env = "MRI_SCALE")]
    pub scale: bool,

    /// Append 90/180/270 degree rotated patches (training only).
    #[arg(long, env = "MRI_ROTATION")]
    pub rotation: bool,

    /// Run the reflection augmentation stage (training only).
    #[arg(long, env = "MRI_REFLECTION")]
    pub reflection: bool,

    /// Drop patches whose labels contain only background (training only).
    #[arg(long, env = "MRI_SKIP_BLANKS")]
    pub skip_blanks: bool,

    /// Class treated as background by --skip-blanks.
    #[arg(long, env = "MRI_BACKGROUND_CLASS", default_value_t = DEFAULT_BACKGROUND_CLASS)]
    pub background_class: u8,
}

impl PipelineArgs {
    /// Build and validate the library configuration.
    pub fn to_pipeline_config(&self) -> Result<PipelineConfig, ConfigError> {
        let config = PipelineConfig::new(&self.data_path)
            .with_patch_size(per_axis("patch_size", &self.patch_size)?)
            .with_overlap(per_axis("overlap", &self.overlap)?)
            .with_batch_size(self.batch_size)
            .with_classes(self.classes)
            .with_scaling(self.scale)
            .with_rotation(self.rotation)
            .with_reflection(self.reflection)
            .with_skip_blanks(self.skip_blanks)
            .with_background_class(self.background_class);
        config.validate()?;
        Ok(config)
    }
}

fn per_axis(name: &'static str, values: &[usize]) -> Result<[usize; SPATIAL_DIMS], ConfigError> {
    values.try_into().map_err(|_| ConfigError::AxisCount {
        name,
        got: values.len(),
    })
}

/// Arguments of the `prepare` subcommand.
#[derive(Args, Debug, Clone)]
pub struct PrepareConfig {
    #[command(flatten)]
    pub pipeline: PipelineArgs,

    /// Directory receiving the batches and case_index.json.
    #[arg(short, long, env = "MRI_OUTPUT")]
    pub output: PathBuf,

    /// Case ids to process (comma-separated). Defaults to every case directory.
    #[arg(long, value_delimiter = ',')]
    pub cases: Option<Vec<String>>,

    /// Load segmentations and produce one-hot label batches.
    #[arg(long)]
    pub training: bool,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

/// Arguments of the `inspect` subcommand.
#[derive(Args, Debug, Clone)]
pub struct InspectConfig {
    #[command(flatten)]
    pub pipeline: PipelineArgs,

    /// Case to inspect.
    pub case_id: String,

    /// Run the training branch (labels, filtering, augmentation).
    #[arg(long)]
    pub training: bool,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

/// Arguments of the `locate` subcommand.
#[derive(Args, Debug, Clone)]
pub struct LocateConfig {
    /// Output directory of a previous `prepare` run.
    #[arg(short, long, env = "MRI_OUTPUT")]
    pub output: PathBuf,

    /// Global batch number to resolve.
    pub batch: usize,
}

// =============================================================================
// Tests
// =============================================================================
