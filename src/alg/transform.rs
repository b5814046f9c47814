use tracing::debug;

use crate::errors::Result;
use crate::geo_transform::{GeoTransform, GeoTransformEx};
use crate::spatial_ref::{CoordTransform, SpatialRef};

/// Pixel position assigned to points that failed to transform, so that an
/// unchecked lookup still lands outside any raster.
pub const INVALID_PIXEL: f64 = -1.0;

/// Maps a batch of points from one pixel/line space into another.
///
/// Implementations transform `x` and `y` in place and set `success[i]` for
/// every point. Coordinates of failed points carry no meaning. An `Err` means
/// the batch failed as a whole, in which case every flag is `false`.
pub trait Transformer {
    fn transform(&self, x: &mut [f64], y: &mut [f64], success: &mut [bool]) -> Result<()>;
}

impl<T: Transformer + ?Sized> Transformer for &T {
    fn transform(&self, x: &mut [f64], y: &mut [f64], success: &mut [bool]) -> Result<()> {
        (**self).transform(x, y, success)
    }
}

/// Owned coordinate batch exchanged with a [`Transformer`].
#[derive(Debug, Clone, Default)]
pub struct PointBatch {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub success: Vec<bool>,
}

impl PointBatch {
    pub fn new(len: usize) -> Self {
        PointBatch {
            x: vec![0.0; len],
            y: vec![0.0; len],
            success: vec![false; len],
        }
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Fills the batch with the points `(x0 + i, y)` of a single scanline.
    pub fn fill_scanline(&mut self, x0: f64, y: f64) {
        for (i, (px, py)) in self.x.iter_mut().zip(self.y.iter_mut()).enumerate() {
            *px = x0 + i as f64;
            *py = y;
        }
    }

    /// Runs `transformer` over the whole batch. A batch-wide failure leaves
    /// every point flagged as failed and is not propagated.
    pub fn transform_with<T: Transformer>(&mut self, transformer: &T) {
        if let Err(e) = transformer.transform(&mut self.x, &mut self.y, &mut self.success) {
            debug!(error = %e, points = self.len(), "batch transform failed");
            self.success.iter_mut().for_each(|s| *s = false);
        }
    }
}

/// Transforms destination raster pixels into source raster pixels, going
/// through the destination and source georeferenced spaces and, when the two
/// coordinate systems differ, a reprojection.
#[derive(Debug, Clone)]
pub struct ProjTransformer {
    reprojection: Option<CoordTransform>,
    src_is_geographic: bool,
    inv_src_geo_transform: GeoTransform,
    dst_is_geographic: bool,
    dst_geo_transform: GeoTransform,
}

impl ProjTransformer {
    /// Builds the transformer. No reprojection is performed when either system
    /// is missing or both are the same.
    ///
    /// With `isolated`, the transformer parses private copies of both
    /// coordinate systems instead of sharing the caller's.
    ///
    /// Fails if the source geotransform cannot be inverted.
    pub fn new(
        src_srs: Option<&SpatialRef>,
        src_geo_transform: &GeoTransform,
        dst_srs: Option<&SpatialRef>,
        dst_geo_transform: &GeoTransform,
        isolated: bool,
    ) -> Result<Self> {
        let reprojection = match (src_srs, dst_srs) {
            (Some(src), Some(dst)) if src.differs(dst) => Some(if isolated {
                CoordTransform::new_isolated(dst, src)?
            } else {
                CoordTransform::new(dst, src)
            }),
            _ => None,
        };
        let (src_is_geographic, dst_is_geographic) = match &reprojection {
            Some(ct) => (ct.target().is_geographic(), ct.source().is_geographic()),
            None => (false, false),
        };

        Ok(ProjTransformer {
            reprojection,
            src_is_geographic,
            inv_src_geo_transform: src_geo_transform.invert()?,
            dst_is_geographic,
            dst_geo_transform: *dst_geo_transform,
        })
    }

    /// Returns `true` if a coordinate system conversion takes place.
    pub fn reprojects(&self) -> bool {
        self.reprojection.is_some()
    }
}

impl Transformer for ProjTransformer {
    fn transform(&self, x: &mut [f64], y: &mut [f64], success: &mut [bool]) -> Result<()> {
        for ((px, py), ok) in x.iter_mut().zip(y.iter_mut()).zip(success.iter_mut()) {
            (*px, *py) = self.dst_geo_transform.apply(*px, *py);
            *ok = true;
        }

        if let Some(reprojection) = &self.reprojection {
            if self.dst_is_geographic {
                x.iter_mut().for_each(|v| *v = v.to_radians());
                y.iter_mut().for_each(|v| *v = v.to_radians());
            }

            if let Err(e) = reprojection.transform_coords(x, y) {
                success.iter_mut().for_each(|s| *s = false);
                x.iter_mut().for_each(|v| *v = INVALID_PIXEL);
                y.iter_mut().for_each(|v| *v = INVALID_PIXEL);
                return Err(e);
            }

            for ((px, py), ok) in x.iter().zip(y.iter()).zip(success.iter_mut()) {
                if px.is_infinite() || py.is_infinite() {
                    *ok = false;
                }
            }

            if self.src_is_geographic {
                for ((px, py), ok) in x.iter_mut().zip(y.iter_mut()).zip(success.iter()) {
                    if *ok {
                        *px = px.to_degrees();
                        *py = py.to_degrees();
                    }
                }
            }
        }

        for ((px, py), ok) in x.iter_mut().zip(y.iter_mut()).zip(success.iter()) {
            if *ok {
                (*px, *py) = self.inv_src_geo_transform.apply(*px, *py);
            } else {
                *px = INVALID_PIXEL;
                *py = INVALID_PIXEL;
            }
        }

        Ok(())
    }
}
