//! Per-encoding pixel operations shared by the resampling kernels.
//!
//! Kernels only deal with coordinates and weights; reading, accumulating and
//! writing samples is delegated to a [`PixelOps`] chosen once per call.
//! Offsets are linear pixel offsets (`x + y * width`) into the source and
//! destination rasters.

use crate::raster::{ColorMap, RasterType, RawKind, Rgba};

/// Coverage above which a true-color result is written fully opaque.
pub(crate) const OPAQUE_COVERAGE: f64 = 0.99;

/// Weighted sums of the sample channels contributing to one output pixel.
#[derive(Debug, Clone)]
pub(crate) struct Accumulator {
    sums: Vec<f64>,
    weight_sum: f64,
}

impl Accumulator {
    pub fn new(channels: usize) -> Self {
        Accumulator {
            sums: vec![0.0; channels],
            weight_sum: 0.0,
        }
    }

    pub fn clear(&mut self) {
        self.sums.iter_mut().for_each(|s| *s = 0.0);
        self.weight_sum = 0.0;
    }

    pub fn weight_sum(&self) -> f64 {
        self.weight_sum
    }

    fn add(&mut self, weight: f64, values: impl IntoIterator<Item = f64>) {
        for (sum, value) in self.sums.iter_mut().zip(values) {
            *sum += weight * value;
        }
        self.weight_sum += weight;
    }

    /// Weighted mean of `channel`. Only meaningful with a non-zero weight sum.
    fn mean(&self, channel: usize) -> f64 {
        self.sums[channel] / self.weight_sum
    }
}

pub(crate) trait PixelOps {
    /// Number of channels an [`Accumulator`] needs for this encoding.
    fn channels(&self) -> usize;

    /// Copies one source pixel to the destination, returning the number of
    /// samples actually written.
    fn copy(&mut self, src: usize, dst: usize) -> usize;

    /// Adds the source pixel with `weight`, unless it is nodata or transparent.
    fn accumulate(&self, src: usize, weight: f64, acc: &mut Accumulator);

    /// Writes the normalized accumulation, `coverage` being the fraction of
    /// the footprint that received valid samples. Returns the number of
    /// samples written.
    fn store(&mut self, dst: usize, acc: &Accumulator, coverage: f64) -> usize;
}

pub(crate) struct PaletteOps<'a> {
    src: &'a [u8],
    transparent: Option<u8>,
    dst: &'a mut [u8],
    cmap: &'a ColorMap,
}

impl<'a> PaletteOps<'a> {
    pub fn new(src: &'a [u8], transparent: Option<u8>, dst: &'a mut [u8], cmap: &'a ColorMap) -> Self {
        PaletteOps {
            src,
            transparent,
            dst,
            cmap,
        }
    }
}

impl PixelOps for PaletteOps<'_> {
    fn channels(&self) -> usize {
        1
    }

    fn copy(&mut self, src: usize, dst: usize) -> usize {
        self.copy_index(self.src[src], dst)
    }

    fn accumulate(&self, src: usize, weight: f64, acc: &mut Accumulator) {
        let index = self.src[src];
        if Some(index) != self.transparent {
            acc.add(weight, [index as f64]);
        }
    }

    fn store(&mut self, dst: usize, acc: &Accumulator, _coverage: f64) -> usize {
        let index = u8::from_f64(acc.mean(0));
        self.copy_index(index, dst)
    }
}

impl PaletteOps<'_> {
    fn copy_index(&mut self, index: u8, dst: usize) -> usize {
        match self.cmap[index as usize] {
            Some(mapped) => {
                self.dst[dst] = mapped;
                1
            }
            None => 0,
        }
    }
}

pub(crate) struct RgbaOps<'a> {
    src: &'a [Rgba],
    dst: &'a mut [Rgba],
}

impl<'a> RgbaOps<'a> {
    pub fn new(src: &'a [Rgba], dst: &'a mut [Rgba]) -> Self {
        RgbaOps { src, dst }
    }
}

impl PixelOps for RgbaOps<'_> {
    fn channels(&self) -> usize {
        3
    }

    fn copy(&mut self, src: usize, dst: usize) -> usize {
        let value = self.src[src];
        if value.is_transparent() {
            return 0;
        }
        self.dst[dst] = if value.is_opaque() {
            value
        } else {
            value.blend_over(self.dst[dst])
        };
        1
    }

    fn accumulate(&self, src: usize, weight: f64, acc: &mut Accumulator) {
        let value = self.src[src];
        if !value.is_transparent() {
            acc.add(weight, [value.r as f64, value.g as f64, value.b as f64]);
        }
    }

    fn store(&mut self, dst: usize, acc: &Accumulator, coverage: f64) -> usize {
        let (r, g, b) = (
            u8::from_f64(acc.mean(0)),
            u8::from_f64(acc.mean(1)),
            u8::from_f64(acc.mean(2)),
        );
        self.dst[dst] = if coverage > OPAQUE_COVERAGE {
            Rgba::opaque(r, g, b)
        } else {
            let alpha = u8::from_f64(coverage * 255.0);
            Rgba::new(r, g, b, alpha).blend_over(self.dst[dst])
        };
        1
    }
}

/// Band-major raw samples. Every band of a pixel is copied or averaged
/// together; only band 0 decides whether a sample is nodata when averaging.
pub(crate) struct RawOps<'a, T> {
    src: &'a [T],
    src_plane: usize,
    dst: &'a mut [T],
    dst_plane: usize,
    bands: usize,
    nodata: Option<T>,
}

impl<'a, T: RasterType> RawOps<'a, T> {
    pub fn new(src: &'a [T], dst: &'a mut [T], bands: usize, nodata: Option<f64>) -> Self {
        let src_plane = src.len() / bands.max(1);
        let dst_plane = dst.len() / bands.max(1);
        RawOps {
            src,
            src_plane,
            dst,
            dst_plane,
            bands,
            nodata: nodata.and_then(nodata_as::<T>),
        }
    }

    fn is_nodata(&self, value: T) -> bool {
        self.nodata == Some(value)
    }
}

/// The sample value equal to `nodata`, if `T` can represent it at all.
fn nodata_as<T: RasterType>(nodata: f64) -> Option<T> {
    let value = T::from_f64(nodata);
    match T::raw_kind() {
        RawKind::Float32 => Some(value),
        RawKind::Int16 | RawKind::Byte => (value.to_f64() == nodata).then_some(value),
    }
}

impl<T: RasterType> PixelOps for RawOps<'_, T> {
    fn channels(&self) -> usize {
        self.bands
    }

    fn copy(&mut self, src: usize, dst: usize) -> usize {
        let mut set = 0;
        for band in 0..self.bands {
            let value = self.src[src + band * self.src_plane];
            if self.is_nodata(value) {
                continue;
            }
            self.dst[dst + band * self.dst_plane] = value;
            set += 1;
        }
        set
    }

    fn accumulate(&self, src: usize, weight: f64, acc: &mut Accumulator) {
        if self.is_nodata(self.src[src]) {
            return;
        }
        let values = (0..self.bands).map(|band| self.src[src + band * self.src_plane].to_f64());
        acc.add(weight, values);
    }

    fn store(&mut self, dst: usize, acc: &Accumulator, _coverage: f64) -> usize {
        for band in 0..self.bands {
            self.dst[dst + band * self.dst_plane] = T::from_f64(acc.mean(band));
        }
        self.bands
    }
}
