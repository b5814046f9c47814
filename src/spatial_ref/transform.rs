use proj4rs::transform::transform;

use crate::errors::{ResampleError, Result};
use crate::spatial_ref::SpatialRef;

/// Value stored in place of a coordinate that could not be converted.
pub(crate) const HUGE_VAL: f64 = f64::INFINITY;

#[derive(Debug, Clone)]
/// Defines a coordinate transformation from one [`SpatialRef`] to another.
///
/// Geographic coordinates are exchanged in radians on both sides.
pub struct CoordTransform {
    source: SpatialRef,
    target: SpatialRef,
}

impl CoordTransform {
    /// Constructs a new transformation from `source` to `target`.
    pub fn new(source: &SpatialRef, target: &SpatialRef) -> CoordTransform {
        CoordTransform {
            source: source.clone(),
            target: target.clone(),
        }
    }

    /// Like [`CoordTransform::new`], but parses private copies of both systems.
    pub fn new_isolated(source: &SpatialRef, target: &SpatialRef) -> Result<CoordTransform> {
        Ok(CoordTransform {
            source: source.isolated()?,
            target: target.isolated()?,
        })
    }

    pub fn source(&self) -> &SpatialRef {
        &self.source
    }

    pub fn target(&self) -> &SpatialRef {
        &self.target
    }

    /// Transform coordinates in place.
    ///
    /// Points that cannot be converted are set to `f64::INFINITY` on both axes.
    /// When no point of a non-empty batch converts, the batch as a whole is
    /// reported as failed with [`ResampleError::InvalidCoordinateRange`].
    ///
    /// # Arguments
    /// * `x` - slice of x coordinates
    /// * `y` - slice of y coordinates (must match x in length)
    pub fn transform_coords(&self, x: &mut [f64], y: &mut [f64]) -> Result<()> {
        if x.len() != y.len() {
            return Err(ResampleError::BadArgument(format!(
                "transform coordinate slices have different lengths: {} != {}",
                x.len(),
                y.len()
            )));
        }

        let mut converted = 0;
        let mut last_error = None;
        for (px, py) in x.iter_mut().zip(y.iter_mut()) {
            if !px.is_finite() || !py.is_finite() {
                *px = HUGE_VAL;
                *py = HUGE_VAL;
                continue;
            }
            let mut point = (*px, *py, 0.0);
            match transform(self.source.proj(), self.target.proj(), &mut point) {
                Ok(()) if point.0.is_finite() && point.1.is_finite() => {
                    *px = point.0;
                    *py = point.1;
                    converted += 1;
                }
                Ok(()) => {
                    *px = HUGE_VAL;
                    *py = HUGE_VAL;
                }
                Err(e) => {
                    *px = HUGE_VAL;
                    *py = HUGE_VAL;
                    last_error = Some(format!("{e:?}"));
                }
            }
        }

        if converted == 0 && !x.is_empty() {
            return Err(ResampleError::InvalidCoordinateRange {
                from: self.source.authority(),
                to: self.target.authority(),
                msg: last_error,
            });
        }
        Ok(())
    }
}
