use std::fmt::{Debug, Display, Formatter};

use crate::raster::RasterData;

/// Sample type of a raw (non-visual) raster.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum RawKind {
    Int16,
    Float32,
    Byte,
}

impl RawKind {
    pub fn name(&self) -> &'static str {
        match self {
            RawKind::Int16 => "Int16",
            RawKind::Float32 => "Float32",
            RawKind::Byte => "Byte",
        }
    }
}

/// How the pixels of a [`crate::raster::Raster`] are stored.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PixelEncoding {
    /// One palette index per pixel.
    Palette,
    /// One RGBA value per pixel.
    TrueColor,
    /// `bands` band-major planes of `kind` samples.
    Raw { kind: RawKind, bands: usize },
}

impl Display for PixelEncoding {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PixelEncoding::Palette => f.write_str("Palette"),
            PixelEncoding::TrueColor => f.write_str("TrueColor"),
            PixelEncoding::Raw { kind, bands } => write!(f, "{}x{bands}", kind.name()),
        }
    }
}

/// Type-level constraint for limiting which primitive numeric values can be
/// stored in raw rasters.
pub trait RasterType: Copy + PartialEq + Default + Debug + Send + Sync + 'static {
    fn raw_kind() -> RawKind;

    fn to_f64(self) -> f64;

    /// Converts an interpolated value back, rounding and saturating for
    /// integer types.
    fn from_f64(value: f64) -> Self;

    fn plane(data: &RasterData) -> Option<&[Self]>;

    fn plane_mut(data: &mut RasterData) -> Option<&mut [Self]>;

    fn into_data(samples: Vec<Self>) -> RasterData;
}

impl RasterType for u8 {
    fn raw_kind() -> RawKind {
        RawKind::Byte
    }

    fn to_f64(self) -> f64 {
        self as f64
    }

    fn from_f64(value: f64) -> Self {
        value.round().clamp(u8::MIN as f64, u8::MAX as f64) as u8
    }

    fn plane(data: &RasterData) -> Option<&[Self]> {
        match data {
            RasterData::Byte(v) => Some(v),
            _ => None,
        }
    }

    fn plane_mut(data: &mut RasterData) -> Option<&mut [Self]> {
        match data {
            RasterData::Byte(v) => Some(v),
            _ => None,
        }
    }

    fn into_data(samples: Vec<Self>) -> RasterData {
        RasterData::Byte(samples)
    }
}

impl RasterType for i16 {
    fn raw_kind() -> RawKind {
        RawKind::Int16
    }

    fn to_f64(self) -> f64 {
        self as f64
    }

    fn from_f64(value: f64) -> Self {
        value.round().clamp(i16::MIN as f64, i16::MAX as f64) as i16
    }

    fn plane(data: &RasterData) -> Option<&[Self]> {
        match data {
            RasterData::Int16(v) => Some(v),
            _ => None,
        }
    }

    fn plane_mut(data: &mut RasterData) -> Option<&mut [Self]> {
        match data {
            RasterData::Int16(v) => Some(v),
            _ => None,
        }
    }

    fn into_data(samples: Vec<Self>) -> RasterData {
        RasterData::Int16(samples)
    }
}

impl RasterType for f32 {
    fn raw_kind() -> RawKind {
        RawKind::Float32
    }

    fn to_f64(self) -> f64 {
        self as f64
    }

    fn from_f64(value: f64) -> Self {
        value as f32
    }

    fn plane(data: &RasterData) -> Option<&[Self]> {
        match data {
            RasterData::Float32(v) => Some(v),
            _ => None,
        }
    }

    fn plane_mut(data: &mut RasterData) -> Option<&mut [Self]> {
        match data {
            RasterData::Float32(v) => Some(v),
            _ => None,
        }
    }

    fn into_data(samples: Vec<Self>) -> RasterData {
        RasterData::Float32(samples)
    }
}
