//! Resampling of a source raster into a destination raster through a
//! pixel-to-pixel [`Transformer`].

mod average;
mod bilinear;
mod nearest;
mod ops;

use std::str::FromStr;

use tracing::debug;

use crate::alg::transform::Transformer;
use crate::errors::{ResampleError, Result};
use crate::raster::{ColorMap, Palette, Raster, RasterData};

use ops::{PaletteOps, PixelOps, RawOps, RgbaOps};

/// Resampling algorithm used to derive destination pixels from the source.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum ResampleAlg {
    /// Nearest neighbour (one input pixel per output pixel)
    #[default]
    Nearest,
    /// Bilinear (2x2 kernel, nodata excluded from the weights)
    Bilinear,
    /// Average of every input pixel under the output pixel footprint,
    /// weighted by overlap area
    Average,
}

impl ResampleAlg {
    pub fn name(&self) -> &'static str {
        match self {
            ResampleAlg::Nearest => "NEAREST",
            ResampleAlg::Bilinear => "BILINEAR",
            ResampleAlg::Average => "AVERAGE",
        }
    }
}

impl FromStr for ResampleAlg {
    type Err = ResampleError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "NEAREST" => Ok(ResampleAlg::Nearest),
            "BILINEAR" => Ok(ResampleAlg::Bilinear),
            "AVERAGE" => Ok(ResampleAlg::Average),
            _ => Err(ResampleError::BadArgument(format!(
                "unknown resampling algorithm '{s}'"
            ))),
        }
    }
}

/// Counters reported by a resampling run.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct ResampleStats {
    /// Destination pixels whose coordinates failed to transform.
    pub failed: usize,
    /// Samples actually written to the destination.
    pub set: usize,
}

/// Resamples `src` into `dst` with `alg`.
///
/// `transformer` maps destination pixel/line coordinates to source
/// pixel/line coordinates. Points that fail to transform are counted and left
/// untouched in `dst`; they never abort the run.
///
/// `nodata` applies to raw rasters. `colormap` remaps source palette indices
/// onto the destination palette; without one, indices are kept as-is except
/// the source's transparent index, which is never drawn.
///
/// Fails with [`ResampleError::UnsupportedEncoding`] if `src` and `dst` do
/// not share the same pixel encoding, or carry no bands.
pub fn resample<X: Transformer>(
    alg: ResampleAlg,
    src: &Raster,
    nodata: Option<f64>,
    dst: &mut Raster,
    colormap: Option<&ColorMap>,
    transformer: &X,
    debug: bool,
) -> Result<ResampleStats> {
    let (src_encoding, dst_encoding) = (src.encoding(), dst.encoding());
    if src_encoding != dst_encoding {
        return Err(ResampleError::UnsupportedEncoding {
            src: src_encoding,
            dst: dst_encoding,
        });
    }

    if src.band_count() == 0 {
        return Err(ResampleError::UnsupportedEncoding {
            src: src_encoding,
            dst: dst_encoding,
        });
    }

    let src_size = src.size();
    let dst_size = dst.size();
    if src_size.0 == 0 || src_size.1 == 0 || dst_size.0 == 0 || dst_size.1 == 0 {
        return Ok(ResampleStats::default());
    }

    let bands = src.band_count();
    let identity = src.palette().map(identity_color_map);

    macro_rules! run_raw {
        ($src:expr, $dst:expr) => {{
            let mut ops = RawOps::new($src, $dst, bands, nodata);
            run_kernel(alg, &mut ops, src_size, dst_size, transformer)
        }};
    }

    let stats = match (src.data(), dst.data_mut()) {
        (
            RasterData::Palette {
                indices: s,
                palette,
            },
            RasterData::Palette { indices: d, .. },
        ) => {
            let cmap = colormap.or(identity.as_ref()).ok_or_else(|| {
                ResampleError::BadArgument("paletted source without a color map".to_string())
            })?;
            let mut ops = PaletteOps::new(s, palette.transparent(), d, cmap);
            run_kernel(alg, &mut ops, src_size, dst_size, transformer)
        }
        (RasterData::TrueColor(s), RasterData::TrueColor(d)) => {
            let mut ops = RgbaOps::new(s, d);
            run_kernel(alg, &mut ops, src_size, dst_size, transformer)
        }
        (RasterData::Int16(s), RasterData::Int16(d)) => run_raw!(s, d),
        (RasterData::Float32(s), RasterData::Float32(d)) => run_raw!(s, d),
        (RasterData::Byte(s), RasterData::Byte(d)) => run_raw!(s, d),
        _ => {
            return Err(ResampleError::UnsupportedEncoding {
                src: src_encoding,
                dst: dst_encoding,
            })
        }
    };

    if debug && stats.failed > 0 {
        debug!(
            alg = alg.name(),
            failed = stats.failed,
            set = stats.set,
            "{} failed to transform, {} actually set",
            stats.failed,
            stats.set
        );
    }

    Ok(stats)
}

fn run_kernel<P: PixelOps, X: Transformer>(
    alg: ResampleAlg,
    ops: &mut P,
    src_size: (usize, usize),
    dst_size: (usize, usize),
    transformer: &X,
) -> ResampleStats {
    match alg {
        ResampleAlg::Nearest => nearest::resample(ops, src_size, dst_size, transformer),
        ResampleAlg::Bilinear => bilinear::resample(ops, src_size, dst_size, transformer),
        ResampleAlg::Average => average::resample(ops, src_size, dst_size, transformer),
    }
}

fn identity_color_map(palette: &Palette) -> ColorMap {
    let mut cmap: ColorMap = [None; 256];
    for (i, entry) in cmap.iter_mut().enumerate().take(palette.len()) {
        if Some(i as u8) != palette.transparent() {
            *entry = Some(i as u8);
        }
    }
    cmap
}

#[cfg(test)]
mod tests;
