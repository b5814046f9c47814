//! Access to source raster data.

use tracing::debug;

use crate::errors::{ResampleError, Result};
use crate::raster::{PixelEncoding, Raster, RasterData, RasterType, RawKind, Rgba};

/// A rectangular window of a source raster, in source pixel/line units.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct RasterWindow {
    /// `(x, y)` of the top left pixel.
    pub offset: (usize, usize),
    /// `(cols, rows)`
    pub size: (usize, usize),
}

impl RasterWindow {
    pub fn new(offset: (usize, usize), size: (usize, usize)) -> Self {
        RasterWindow { offset, size }
    }

    /// The window covering a whole raster of `size`.
    pub fn whole(size: (usize, usize)) -> Self {
        Self::new((0, 0), size)
    }

    pub fn is_empty(&self) -> bool {
        self.size.0 == 0 || self.size.1 == 0
    }

    /// Returns `true` if the window lies within a raster of `size`.
    pub fn fits(&self, size: (usize, usize)) -> bool {
        self.offset.0 + self.size.0 <= size.0 && self.offset.1 + self.size.1 <= size.1
    }
}

/// A raster that can be read window by window, at any resolution.
pub trait RasterSource {
    /// `(cols, rows)` of the full raster.
    fn raster_size(&self) -> (usize, usize);

    /// Reads `window` into a new raster of `buffer_size` pixels with the
    /// requested `encoding`, resampling with nearest neighbour when the sizes
    /// differ.
    ///
    /// Paletted and true-color results must render `nodata` samples
    /// transparent. Raw results keep them as-is; the resamplers skip them.
    ///
    /// Fails with [`ResampleError::DatasetRead`] when the window is out of
    /// range or the data cannot be delivered in `encoding`.
    fn read_window(
        &self,
        window: &RasterWindow,
        buffer_size: (usize, usize),
        encoding: PixelEncoding,
        nodata: Option<f64>,
    ) -> Result<Raster>;
}

impl<T: RasterSource + ?Sized> RasterSource for &T {
    fn raster_size(&self) -> (usize, usize) {
        (**self).raster_size()
    }

    fn read_window(
        &self,
        window: &RasterWindow,
        buffer_size: (usize, usize),
        encoding: PixelEncoding,
        nodata: Option<f64>,
    ) -> Result<Raster> {
        (**self).read_window(window, buffer_size, encoding, nodata)
    }
}

/// A [`RasterSource`] backed by an in-memory [`Raster`].
///
/// Raw data can be read as any raw kind with the same band count, and a
/// paletted raster can be read as true color.
///
/// A nodata value matching a palette index makes that index transparent. On
/// true-color data it matches grey pixels whose three channels equal it.
#[derive(Debug, Clone, PartialEq)]
pub struct MemDataset {
    raster: Raster,
}

impl MemDataset {
    pub fn new(raster: Raster) -> Self {
        MemDataset { raster }
    }

    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    pub fn into_raster(self) -> Raster {
        self.raster
    }
}

impl From<Raster> for MemDataset {
    fn from(raster: Raster) -> Self {
        Self::new(raster)
    }
}

impl RasterSource for MemDataset {
    fn raster_size(&self) -> (usize, usize) {
        self.raster.size()
    }

    fn read_window(
        &self,
        window: &RasterWindow,
        buffer_size: (usize, usize),
        encoding: PixelEncoding,
        nodata: Option<f64>,
    ) -> Result<Raster> {
        if window.is_empty() || !window.fits(self.raster.size()) {
            return Err(ResampleError::DatasetRead(format!(
                "window {window:?} is not within raster of size {:?}",
                self.raster.size()
            )));
        }
        if buffer_size.0 == 0 || buffer_size.1 == 0 {
            return Err(ResampleError::BadArgument(format!(
                "empty buffer size {buffer_size:?}"
            )));
        }

        let sampling = Sampling::new(window, buffer_size, self.raster.width());
        let bands = self.raster.band_count();
        let plane = self.raster.width() * self.raster.height();
        let offsite = offsite_value(nodata);
        let data = match (self.raster.data(), encoding) {
            (RasterData::Palette { indices, palette }, PixelEncoding::Palette) => {
                let mut indices = sampling.pick(indices);
                let mut palette = palette.clone();
                if let Some(offsite) = offsite {
                    match palette.transparent() {
                        Some(transparent) => indices
                            .iter_mut()
                            .filter(|i| **i == offsite)
                            .for_each(|i| *i = transparent),
                        None => palette = palette.with_transparent(offsite),
                    }
                }
                RasterData::Palette { indices, palette }
            }
            (RasterData::Palette { indices, palette }, PixelEncoding::TrueColor) => {
                let rgba = sampling
                    .pick(indices)
                    .into_iter()
                    .map(|i| match palette.entry(i) {
                        Some([r, g, b]) if Some(i) != palette.transparent() && Some(i) != offsite => {
                            Rgba::opaque(r, g, b)
                        }
                        _ => Rgba::TRANSPARENT,
                    })
                    .collect();
                RasterData::TrueColor(rgba)
            }
            (RasterData::TrueColor(pixels), PixelEncoding::TrueColor) => {
                let mut rgba = sampling.pick(pixels);
                if let Some(offsite) = offsite {
                    rgba.iter_mut()
                        .filter(|p| p.r == offsite && p.g == offsite && p.b == offsite)
                        .for_each(|p| *p = Rgba::TRANSPARENT);
                }
                RasterData::TrueColor(rgba)
            }
            (RasterData::Int16(v), PixelEncoding::Raw { kind, bands: b }) if b == bands => {
                convert(sampling.pick_bands(v, plane, bands), kind)
            }
            (RasterData::Float32(v), PixelEncoding::Raw { kind, bands: b }) if b == bands => {
                convert(sampling.pick_bands(v, plane, bands), kind)
            }
            (RasterData::Byte(v), PixelEncoding::Raw { kind, bands: b }) if b == bands => {
                convert(sampling.pick_bands(v, plane, bands), kind)
            }
            _ => {
                return Err(ResampleError::DatasetRead(format!(
                    "cannot read '{}' data as '{encoding}'",
                    self.raster.encoding()
                )))
            }
        };

        debug!(?window, ?buffer_size, %encoding, "read raster window");
        Raster::new(buffer_size, bands_of(encoding), data)
    }
}

/// The 8-bit sample equal to `nodata`, if there is one.
fn offsite_value(nodata: Option<f64>) -> Option<u8> {
    nodata
        .filter(|v| v.fract() == 0.0 && (0.0..=255.0).contains(v))
        .map(|v| v as u8)
}

fn bands_of(encoding: PixelEncoding) -> usize {
    match encoding {
        PixelEncoding::Raw { bands, .. } => bands,
        PixelEncoding::Palette | PixelEncoding::TrueColor => 1,
    }
}

/// Source offsets of every buffer pixel, nearest neighbour.
struct Sampling {
    offsets: Vec<usize>,
}

impl Sampling {
    fn new(window: &RasterWindow, buffer_size: (usize, usize), width: usize) -> Self {
        let axis = |offset: usize, len: usize, buf: usize| -> Vec<usize> {
            (0..buf)
                .map(|i| {
                    let src = ((i as f64 + 0.5) * len as f64 / buf as f64) as usize;
                    offset + src.min(len - 1)
                })
                .collect()
        };
        let xs = axis(window.offset.0, window.size.0, buffer_size.0);
        let ys = axis(window.offset.1, window.size.1, buffer_size.1);

        let offsets = ys
            .iter()
            .flat_map(|y| xs.iter().map(move |x| x + y * width))
            .collect();
        Sampling { offsets }
    }

    fn pick<T: Copy>(&self, plane: &[T]) -> Vec<T> {
        self.offsets.iter().map(|o| plane[*o]).collect()
    }

    fn pick_bands<T: RasterType>(&self, samples: &[T], plane: usize, bands: usize) -> RasterData {
        let picked = (0..bands)
            .flat_map(|b| self.pick(&samples[b * plane..(b + 1) * plane]))
            .collect();
        T::into_data(picked)
    }
}

/// Converts raw samples to `kind`, rounding and saturating.
fn convert(data: RasterData, kind: RawKind) -> RasterData {
    fn cast<S: RasterType, D: RasterType>(samples: &[S]) -> RasterData {
        D::into_data(samples.iter().map(|s| D::from_f64(s.to_f64())).collect())
    }

    macro_rules! cast_to {
        ($samples:expr) => {
            match kind {
                RawKind::Int16 => cast::<_, i16>($samples),
                RawKind::Float32 => cast::<_, f32>($samples),
                RawKind::Byte => cast::<_, u8>($samples),
            }
        };
    }

    match data {
        RasterData::Int16(v) if kind != RawKind::Int16 => cast_to!(&v),
        RasterData::Float32(v) if kind != RawKind::Float32 => cast_to!(&v),
        RasterData::Byte(v) if kind != RawKind::Byte => cast_to!(&v),
        other => other,
    }
}
