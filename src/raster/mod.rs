//! In-memory rasters and their resampling.

mod buffer;
mod color;
pub mod resample;
mod types;
pub mod window;

pub use buffer::{Raster, RasterData};
pub use color::{ColorMap, Palette, Rgba};
pub use resample::{resample, ResampleAlg, ResampleStats};
pub use types::{PixelEncoding, RasterType, RawKind};
pub use window::transform_map_to_source;
