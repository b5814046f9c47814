use crate::errors;
use crate::errors::ResampleError;

/// Determinants smaller than this are treated as singular.
const DET_EPSILON: f64 = 1e-15;

/// An affine transform.
///
/// A six-element array storing the coefficients of an [affine transform]
/// used in mapping coordinates between pixel/line `(P, L)` (raster) space,
/// and `(Xp,Yp)` (projection/[`crate::spatial_ref::SpatialRef`]) space.
///
/// # Interpretation
///
/// A `GeoTransform`'s components have the following meanings:
///
///   * `GeoTransform[0]`: x-coordinate of the upper-left corner of the upper-left pixel.
///   * `GeoTransform[1]`: W-E pixel resolution (pixel width).
///   * `GeoTransform[2]`: row rotation (typically zero).
///   * `GeoTransform[3]`: y-coordinate of the upper-left corner of the upper-left pixel.
///   * `GeoTransform[4]`: column rotation (typically zero).
///   * `GeoTransform[5]`: N-S pixel resolution (pixel height), negative value for a North-up image.
///
/// so that
///
/// ```text
/// Xp = gt[0] + P * gt[1] + L * gt[2]
/// Yp = gt[3] + P * gt[4] + L * gt[5]
/// ```
///
/// # Usage
///  *  [`apply`](GeoTransformEx::apply): perform a `(P,L) -> (Xp,Yp)` transformation
///  *  [`invert`](GeoTransformEx::invert):  construct the inverse transformation coefficients
///     for computing `(Xp,Yp) -> (P,L)` transformations
///
/// # Example
///
/// ```rust
/// # fn main() -> mapresample::errors::Result<()> {
/// use mapresample::{GeoTransform, GeoTransformEx};
/// let transform: GeoTransform = [768269.0, 1.0, 0.0, 4057292.0, 0.0, -1.0];
/// let (x, y) = transform.apply(0.0, 0.0);
/// assert_eq!((x, y), (768269.0, 4057292.0));
/// let inverse = transform.invert()?;
/// let (p, l) = inverse.apply(x, y);
/// assert_eq!((p, l), (0.0, 0.0));
/// # Ok(())
/// # }
/// ```
///
/// [affine transform]: https://en.wikipedia.org/wiki/Affine_transformation
pub type GeoTransform = [f64; 6];

/// Extension methods on [`GeoTransform`]
pub trait GeoTransformEx {
    /// Apply GeoTransform to x/y coordinate.
    fn apply(&self, pixel: f64, line: f64) -> (f64, f64);

    /// Invert a [`GeoTransform`].
    ///
    /// The inverse is computed in closed form from the adjoint and the
    /// determinant of the linear part, assuming an implicit `[0 0 1]` last row.
    /// Fails with [`ResampleError::DegenerateTransform`] when the determinant
    /// is smaller than `1e-15` in magnitude.
    fn invert(&self) -> errors::Result<GeoTransform>;

    /// Nominal size of a pixel along the x axis, `sqrt(gt[1]² + gt[2]²)`.
    fn nominal_cell_size(&self) -> f64;

    /// Transform for a sub-window starting at pixel `(x_off, y_off)` whose pixels
    /// are `scale` times larger than the original ones.
    fn windowed(&self, x_off: f64, y_off: f64, scale: f64) -> GeoTransform;
}

impl GeoTransformEx for GeoTransform {
    fn apply(&self, pixel: f64, line: f64) -> (f64, f64) {
        (
            self[0] + self[1] * pixel + self[2] * line,
            self[3] + self[4] * pixel + self[5] * line,
        )
    }

    fn invert(&self) -> errors::Result<GeoTransform> {
        let det = self[1] * self[5] - self[2] * self[4];
        if det.abs() < DET_EPSILON {
            return Err(ResampleError::DegenerateTransform { gt: *self });
        }
        let inv_det = 1.0 / det;

        Ok([
            (self[2] * self[3] - self[0] * self[5]) * inv_det,
            self[5] * inv_det,
            -self[2] * inv_det,
            (-self[1] * self[3] + self[0] * self[4]) * inv_det,
            -self[4] * inv_det,
            self[1] * inv_det,
        ])
    }

    fn nominal_cell_size(&self) -> f64 {
        self[1].hypot(self[2])
    }

    fn windowed(&self, x_off: f64, y_off: f64, scale: f64) -> GeoTransform {
        [
            self[0] + self[1] * x_off + self[2] * y_off,
            self[1] * scale,
            self[2] * scale,
            self[3] + self[4] * x_off + self[5] * y_off,
            self[4] * scale,
            self[5] * scale,
        ]
    }
}
