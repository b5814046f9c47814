use crate::errors::{ResampleError, Result};
use crate::raster::{Palette, PixelEncoding, RasterType, RawKind, Rgba};

#[cfg(feature = "ndarray")]
use ndarray::Array2;

/// Pixel storage of a [`Raster`].
///
/// Raw variants hold `bands` band-major planes of `width * height` samples.
#[derive(Debug, Clone, PartialEq)]
pub enum RasterData {
    Palette { indices: Vec<u8>, palette: Palette },
    TrueColor(Vec<Rgba>),
    Int16(Vec<i16>),
    Float32(Vec<f32>),
    Byte(Vec<u8>),
}

impl RasterData {
    fn len(&self) -> usize {
        match self {
            RasterData::Palette { indices, .. } => indices.len(),
            RasterData::TrueColor(v) => v.len(),
            RasterData::Int16(v) => v.len(),
            RasterData::Float32(v) => v.len(),
            RasterData::Byte(v) => v.len(),
        }
    }
}

/// An owned image whose buffer layout is fully determined by its size and
/// [`PixelEncoding`].
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    width: usize,
    height: usize,
    bands: usize,
    data: RasterData,
}

impl Raster {
    /// Construct a raster from `size` (`(cols, rows)`), a band count and its data.
    ///
    /// Fails if the data length does not match `cols * rows * bands`, or if a
    /// visual encoding is given more than one band.
    pub fn new(size: (usize, usize), bands: usize, data: RasterData) -> Result<Self> {
        let visual = matches!(data, RasterData::Palette { .. } | RasterData::TrueColor(_));
        if bands == 0 || (visual && bands != 1) {
            return Err(ResampleError::BadArgument(format!(
                "invalid band count {bands} for raster data"
            )));
        }
        let expected = size.0 * size.1 * bands;
        if data.len() != expected {
            return Err(ResampleError::BadArgument(format!(
                "size {size:?} x {bands} bands does not match length {}",
                data.len()
            )));
        }
        Ok(Raster {
            width: size.0,
            height: size.1,
            bands,
            data,
        })
    }

    /// A raster of the given encoding with every sample cleared: transparent
    /// for true color, the transparent (or first) index for palettes, zero for
    /// raw data.
    ///
    /// Fails if a raw encoding has no bands.
    pub fn blank(size: (usize, usize), encoding: PixelEncoding, palette: Option<Palette>) -> Result<Self> {
        if let PixelEncoding::Raw { bands: 0, .. } = encoding {
            return Err(ResampleError::BadArgument(format!(
                "invalid band count 0 for encoding '{encoding}'"
            )));
        }
        let pixels = size.0 * size.1;
        let (bands, data) = match encoding {
            PixelEncoding::Palette => {
                let palette = palette.unwrap_or_default();
                let fill = palette.transparent().unwrap_or(0);
                (
                    1,
                    RasterData::Palette {
                        indices: vec![fill; pixels],
                        palette,
                    },
                )
            }
            PixelEncoding::TrueColor => (1, RasterData::TrueColor(vec![Rgba::TRANSPARENT; pixels])),
            PixelEncoding::Raw { kind, bands } => {
                let len = pixels * bands;
                let data = match kind {
                    RawKind::Int16 => RasterData::Int16(vec![0; len]),
                    RawKind::Float32 => RasterData::Float32(vec![0.0; len]),
                    RawKind::Byte => RasterData::Byte(vec![0; len]),
                };
                (bands, data)
            }
        };
        Ok(Raster {
            width: size.0,
            height: size.1,
            bands,
            data,
        })
    }

    pub fn from_raw<T: RasterType>(size: (usize, usize), bands: usize, samples: Vec<T>) -> Result<Self> {
        Self::new(size, bands, T::into_data(samples))
    }

    pub fn from_rgba(size: (usize, usize), pixels: Vec<Rgba>) -> Result<Self> {
        Self::new(size, 1, RasterData::TrueColor(pixels))
    }

    pub fn from_indices(size: (usize, usize), indices: Vec<u8>, palette: Palette) -> Result<Self> {
        Self::new(size, 1, RasterData::Palette { indices, palette })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// `(cols, rows)`
    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn band_count(&self) -> usize {
        self.bands
    }

    pub fn encoding(&self) -> PixelEncoding {
        match &self.data {
            RasterData::Palette { .. } => PixelEncoding::Palette,
            RasterData::TrueColor(_) => PixelEncoding::TrueColor,
            RasterData::Int16(_) => PixelEncoding::Raw {
                kind: RawKind::Int16,
                bands: self.bands,
            },
            RasterData::Float32(_) => PixelEncoding::Raw {
                kind: RawKind::Float32,
                bands: self.bands,
            },
            RasterData::Byte(_) => PixelEncoding::Raw {
                kind: RawKind::Byte,
                bands: self.bands,
            },
        }
    }

    pub fn data(&self) -> &RasterData {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut RasterData {
        &mut self.data
    }

    pub fn palette(&self) -> Option<&Palette> {
        match &self.data {
            RasterData::Palette { palette, .. } => Some(palette),
            _ => None,
        }
    }

    pub fn palette_mut(&mut self) -> Option<&mut Palette> {
        match &mut self.data {
            RasterData::Palette { palette, .. } => Some(palette),
            _ => None,
        }
    }

    /// The samples of raw band `band` (0-based).
    pub fn band<T: RasterType>(&self, band: usize) -> Result<&[T]> {
        let plane = self.width * self.height;
        let samples = T::plane(&self.data).ok_or_else(|| {
            ResampleError::BadArgument(format!(
                "raster of encoding '{}' has no {} samples",
                self.encoding(),
                T::raw_kind().name()
            ))
        })?;
        if band >= self.bands {
            return Err(ResampleError::BadArgument(format!(
                "band {band} out of range, raster has {} bands",
                self.bands
            )));
        }
        Ok(&samples[band * plane..(band + 1) * plane])
    }

    /// Raw sample at `(x, y)` of `band`, if in range.
    pub fn sample<T: RasterType>(&self, band: usize, x: usize, y: usize) -> Option<T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.band::<T>(band).ok().map(|s| s[x + y * self.width])
    }

    pub fn rgba(&self, x: usize, y: usize) -> Option<Rgba> {
        match &self.data {
            RasterData::TrueColor(v) if x < self.width && y < self.height => Some(v[x + y * self.width]),
            _ => None,
        }
    }

    pub fn index(&self, x: usize, y: usize) -> Option<u8> {
        match &self.data {
            RasterData::Palette { indices, .. } if x < self.width && y < self.height => {
                Some(indices[x + y * self.width])
            }
            _ => None,
        }
    }

    #[cfg(feature = "ndarray")]
    /// Convert raw band `band` into an [`ndarray::Array2`].
    ///
    /// The Matrix shape is (rows, cols) and raster shape is (cols in x-axis, rows in y-axis).
    pub fn to_array<T: RasterType>(&self, band: usize) -> Result<Array2<T>> {
        let samples = self.band::<T>(band)?.to_vec();
        Array2::from_shape_vec((self.height, self.width), samples)
            .map_err(|e| ResampleError::BadArgument(e.to_string()))
    }
}
