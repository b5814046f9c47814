//! Coordinate transformers mapping destination pixels to source pixels.

pub mod approx;
pub mod transform;

pub use approx::ApproxTransformer;
pub use transform::{PointBatch, ProjTransformer, Transformer, INVALID_PIXEL};
