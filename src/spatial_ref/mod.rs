//! Coordinate reference systems and the conversions between them.

mod srs;
mod transform;

pub use srs::SpatialRef;
pub use transform::CoordTransform;
