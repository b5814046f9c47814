//! Synthetic transformers and raster builders shared by the unit tests.

use crate::alg::transform::Transformer;
use crate::errors::Result;
use crate::raster::{Raster, RasterType, Rgba};

/// Maps destination pixel `(x, y)` to source pixel `(x * scale_x + offset_x, y * scale_y + offset_y)`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ScaleTransformer {
    pub scale_x: f64,
    pub scale_y: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl ScaleTransformer {
    pub fn identity() -> Self {
        Self::scale(1.0, 1.0)
    }

    pub fn scale(scale_x: f64, scale_y: f64) -> Self {
        ScaleTransformer {
            scale_x,
            scale_y,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }

    pub fn offset(mut self, offset_x: f64, offset_y: f64) -> Self {
        self.offset_x = offset_x;
        self.offset_y = offset_y;
        self
    }
}

impl Transformer for ScaleTransformer {
    fn transform(&self, x: &mut [f64], y: &mut [f64], success: &mut [bool]) -> Result<()> {
        for ((px, py), ok) in x.iter_mut().zip(y.iter_mut()).zip(success.iter_mut()) {
            *px = *px * self.scale_x + self.offset_x;
            *py = *py * self.scale_y + self.offset_y;
            *ok = true;
        }
        Ok(())
    }
}

/// Fails roughly `percent`% of the points, chosen by hashing the input
/// coordinates so that the same point always fails.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FlakyTransformer<T> {
    pub inner: T,
    pub percent: u64,
}

impl<T> FlakyTransformer<T> {
    pub fn new(inner: T, percent: u64) -> Self {
        FlakyTransformer { inner, percent }
    }

    pub fn fails(&self, x: f64, y: f64) -> bool {
        // splitmix64 finalizer
        let mut z = x.to_bits() ^ y.to_bits().rotate_left(29);
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^= z >> 31;
        z % 100 < self.percent
    }
}

impl<T: Transformer> Transformer for FlakyTransformer<T> {
    fn transform(&self, x: &mut [f64], y: &mut [f64], success: &mut [bool]) -> Result<()> {
        let failing: Vec<bool> = x.iter().zip(y.iter()).map(|(px, py)| self.fails(*px, *py)).collect();
        self.inner.transform(x, y, success)?;
        for (((px, py), ok), fail) in x.iter_mut().zip(y.iter_mut()).zip(success.iter_mut()).zip(failing) {
            if fail {
                *ok = false;
                *px = -1.0;
                *py = -1.0;
            }
        }
        Ok(())
    }
}

/// A raw raster whose band `b` holds `1 + b * 1000 + x + y * width`.
pub(crate) fn ramp<T: RasterType>(size: (usize, usize), bands: usize) -> Raster {
    let (width, height) = size;
    let samples = (0..bands)
        .flat_map(|b| (0..width * height).map(move |i| T::from_f64((1 + b * 1000 + i) as f64)))
        .collect();
    Raster::from_raw::<T>(size, bands, samples).unwrap()
}

/// An opaque true-color raster with a distinct color per pixel.
pub(crate) fn rgba_ramp(size: (usize, usize)) -> Raster {
    let pixels = (0..size.0 * size.1)
        .map(|i| Rgba::opaque((i % 256) as u8, (i / 256) as u8, 200))
        .collect();
    Raster::from_rgba(size, pixels).unwrap()
}

/// Assert that two `f64` expressions differ by less than `epsilon` (default 1e-9).
macro_rules! assert_near {
    ($left:expr, $right:expr) => {
        $crate::test_utils::assert_near!($left, $right, epsilon = 1e-9)
    };
    ($left:expr, $right:expr, epsilon = $ep:expr) => {
        assert!(
            ($left - $right).abs() < $ep,
            "|{} - {}| = {} is greater than epsilon {:.4e}",
            $left,
            $right,
            ($left - $right).abs(),
            $ep
        )
    };
}

pub(crate) use assert_near;
