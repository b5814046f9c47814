//! On-the-fly raster reprojection and resampling for map rendering.
//!
//! Draws a georeferenced source raster into a map image that may use a
//! different coordinate system and resolution. Only the part of the source
//! covering the map is read, at a resolution matched to the map, and every
//! map pixel is then filled with a nearest neighbour, bilinear or area
//! weighted average sample.
//!
//! ## Use
//!
//! ```
//! use mapresample::dataset::MemDataset;
//! use mapresample::raster::{PixelEncoding, Raster, RawKind};
//! use mapresample::resample::{MapRaster, ResampleContext, ResampleOutcome, SourceLayer};
//! use mapresample::resample_to_map;
//!
//! # fn main() -> mapresample::errors::Result<()> {
//! let samples = (0..64 * 64).map(|i| (i % 1000) as i16).collect();
//! let source = Raster::from_raw((64, 64), 1, samples)?;
//! let layer = SourceLayer::new(
//!     MemDataset::new(source),
//!     [0.0, 1.0, 0.0, 64.0, 0.0, -1.0],
//!     None,
//! );
//!
//! let encoding = PixelEncoding::Raw { kind: RawKind::Int16, bands: 1 };
//! let mut map = MapRaster {
//!     raster: Raster::blank((16, 16), encoding, None)?,
//!     geo_transform: [0.0, 4.0, 0.0, 64.0, 0.0, -4.0],
//!     srs: None,
//! };
//! let outcome = resample_to_map(&ResampleContext::default(), &mut map, &layer)?;
//! assert!(matches!(outcome, ResampleOutcome::Resampled(_)));
//! # Ok(())
//! # }
//! ```

#![crate_name = "mapresample"]
#![crate_type = "lib"]

pub mod alg;
pub mod dataset;
pub mod errors;
mod geo_transform;
pub mod options;
pub mod raster;
pub mod resample;
pub mod spatial_ref;
#[cfg(test)]
pub(crate) mod test_utils;

pub use geo_transform::{GeoTransform, GeoTransformEx};
pub use resample::{resample_to_map, MapRaster, ResampleContext, ResampleOutcome, SourceLayer};

#[cfg(test)]
fn assert_almost_eq(a: f64, b: f64) {
    let diff: f64 = b - a;
    assert!(diff.abs() < 1e-9, "{a} != {b}");
}
