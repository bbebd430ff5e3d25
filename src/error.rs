use thiserror::Error;

/// I/O errors raised while loading cases or persisting batches
#[derive(Debug, Clone, Error)]
pub enum IoError {
    /// Case directory or image file does not exist
    #[error("Case not found: {0}")]
    NotFound(String),

    /// The NIfTI reader rejected the file
    #[error("NIfTI error in {path}: {message}")]
    Nifti { path: String, message: String },

    /// Reading or writing a `.npy` batch failed
    #[error("NPY error in {path}: {message}")]
    Npy { path: String, message: String },

    /// A segmentation file holds values that are not class indices
    #[error("Invalid labels in {path}: {source}")]
    InvalidLabels { path: String, source: VolumeError },

    /// The case index could not be serialized or parsed
    #[error("Case index error: {0}")]
    Index(String),

    /// Filesystem error (directory creation, listing, etc.)
    #[error("Filesystem error: {0}")]
    Filesystem(String),
}

impl From<std::io::Error> for IoError {
    fn from(err: std::io::Error) -> Self {
        IoError::Filesystem(err.to_string())
    }
}

/// Invalid pipeline configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A patch extent of zero along an axis
    #[error("Patch size must be positive on every axis, got {patch_size:?}")]
    ZeroPatchSize { patch_size: [usize; 3] },

    /// Overlap must leave a positive stride
    #[error("Overlap {overlap} on axis {axis} must be smaller than patch size {patch_size}")]
    OverlapTooLarge {
        axis: usize,
        overlap: usize,
        patch_size: usize,
    },

    /// Per-axis option with the wrong number of values
    #[error("{name} needs one value per spatial axis (3), got {got}")]
    AxisCount { name: &'static str, got: usize },

    /// The same case id was requested more than once in one pass
    #[error("Case {0} is listed more than once")]
    DuplicateCase(String),

    /// Batches must hold at least one patch
    #[error("Batch size must be greater than 0")]
    ZeroBatchSize,

    /// Class count outside of what a `u8` label can address
    #[error("Class count must be between 1 and 256, got {0}")]
    InvalidClassCount(usize),

    /// Background class is not one of the configured classes
    #[error("Background class {background} is out of range for {classes} classes")]
    BackgroundOutOfRange { background: u8, classes: usize },

    /// Rotating in a non-square plane would change the patch shape
    #[error(
        "Rotation requires equal patch extents on axes {axes:?}, got {first} and {second}"
    )]
    NonSquareRotationPlane {
        axes: (usize, usize),
        first: usize,
        second: usize,
    },
}

/// Errors raised by the array transforms
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VolumeError {
    /// Volume and label volume disagree on their spatial shape
    #[error("Shape mismatch: volume is {volume:?}, labels are {labels:?}")]
    ShapeMismatch {
        volume: Vec<usize>,
        labels: Vec<usize>,
    },

    /// Min-max scaling of a volume with a single value
    #[error("Cannot scale a constant volume (every voxel is {value})")]
    ConstantVolume { value: f32 },

    /// Min-max scaling encountered NaN or infinity
    #[error("Cannot scale a volume containing non-finite values")]
    NonFinite,

    /// Operation on an array without any voxels
    #[error("Volume has no voxels")]
    Empty,

    /// Stored segmentation value is not a class index in `0..=255`
    #[error("Label value {value} is not a class index in 0..=255")]
    InvalidLabel { value: f64 },

    /// Label voxel holds a class the encoder cannot represent
    #[error("Class index {class} is out of range for {classes} classes")]
    ClassOutOfRange { class: u8, classes: usize },

    /// Image is neither 3D nor 4D
    #[error("Unsupported dimensionality: expected 3 or 4 axes, got {0}")]
    UnsupportedDimensionality(usize),

    /// ndarray rejected a reshape or stack
    #[error("Shape error: {0}")]
    Shape(String),
}

impl From<ndarray::ShapeError> for VolumeError {
    fn from(err: ndarray::ShapeError) -> Self {
        VolumeError::Shape(err.to_string())
    }
}

/// Top-level error for a preprocessing pass
#[derive(Debug, Clone, Error)]
pub enum PrepError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Volume error: {0}")]
    Volume(#[from] VolumeError),

    #[error("I/O error: {0}")]
    Io(#[from] IoError),
}
