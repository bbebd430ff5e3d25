//! Batch layer.
//!
//! - [`batch_steps`] and [`create_batches`] group patches into fixed-size
//!   batches along a new leading axis
//! - [`one_hot`] encodes label batches for training

mod batcher;
mod encoder;

pub use batcher::{batch_steps, create_batches};
pub use encoder::one_hot;
