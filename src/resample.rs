//! Drawing a georeferenced source raster into a map image.

use geo_types::{coord, Rect};
use tracing::{debug, error};

use crate::alg::{ApproxTransformer, ProjTransformer};
use crate::dataset::{RasterSource, RasterWindow};
use crate::errors::Result;
use crate::geo_transform::{GeoTransform, GeoTransformEx};
use crate::options::{LoadFlags, ProcessingOptions};
use crate::raster::{self, transform_map_to_source, Raster, ResampleStats};
use crate::spatial_ref::SpatialRef;

/// Maximum error, in source pixels, tolerated from the linear approximation
/// of the coordinate transformation.
pub const APPROX_MAX_ERROR: f64 = 0.333;

/// Per-request settings of a resampling call.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct ResampleContext {
    /// Requests may run on several threads at once; coordinate systems are
    /// then copied for every request instead of being shared.
    pub concurrency_enabled: bool,
    /// Emit diagnostics about the chosen window, resolution and failures.
    pub debug: bool,
}

/// The destination: a map image and where it lies on the ground.
#[derive(Debug, Clone)]
pub struct MapRaster {
    pub raster: Raster,
    pub geo_transform: GeoTransform,
    /// `None` means compatible with any source.
    pub srs: Option<SpatialRef>,
}

/// The source: a raster dataset, its georeferencing and processing options.
#[derive(Debug, Clone)]
pub struct SourceLayer<S> {
    pub dataset: S,
    pub geo_transform: GeoTransform,
    /// `None` means compatible with any map.
    pub srs: Option<SpatialRef>,
    /// Nodata / offsite value. Raw samples equal to it are skipped by the
    /// resamplers; paletted and true-color sources render them transparent.
    pub nodata: Option<f64>,
    pub options: ProcessingOptions,
}

impl<S: RasterSource> SourceLayer<S> {
    pub fn new(dataset: S, geo_transform: GeoTransform, srs: Option<SpatialRef>) -> Self {
        SourceLayer {
            dataset,
            geo_transform,
            srs,
            nodata: None,
            options: ProcessingOptions::default(),
        }
    }

    pub fn with_nodata(mut self, nodata: f64) -> Self {
        self.nodata = Some(nodata);
        self
    }

    pub fn with_options(mut self, options: ProcessingOptions) -> Self {
        self.options = options;
        self
    }
}

/// Result of [`resample_to_map`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ResampleOutcome {
    Resampled(ResampleStats),
    /// The source does not intersect the map; the map was left untouched.
    NoOverlap,
}

/// Resamples `layer` into `map.raster`.
///
/// The part of the source covering the map is located first, then read at a
/// resolution no finer than `OVERSAMPLE_RATIO` times the map's, and finally
/// resampled pixel by pixel with the algorithm named by the `RESAMPLE`
/// option.
pub fn resample_to_map<S: RasterSource>(
    ctx: &ResampleContext,
    map: &mut MapRaster,
    layer: &SourceLayer<S>,
) -> Result<ResampleOutcome> {
    let alg = layer.options.resample_alg();
    let oversample_ratio = layer
        .options
        .oversample_ratio()
        .inspect_err(|e| error!(error = %e, "invalid processing options"))?;
    let flags = layer.options.load_flags();

    if ctx.debug && (map.srs.is_none() || layer.srs.is_none()) {
        debug!("either map or layer projection is missing, assuming compatible");
    }

    let dst_size = map.raster.size();
    let src_size = layer.dataset.raster_size();

    let full_res = ProjTransformer::new(
        layer.srs.as_ref(),
        &layer.geo_transform,
        map.srs.as_ref(),
        &map.geo_transform,
        ctx.concurrency_enabled,
    )
    .inspect_err(|e| error!(error = %e, "cannot set up the source transformation"))?;

    let estimated = if flags.contains(LoadFlags::LOAD_WHOLE_IMAGE) {
        None
    } else {
        transform_map_to_source(dst_size, &full_res, src_size)
    };
    let extent = estimated.unwrap_or_else(|| {
        if ctx.debug {
            debug!("cannot locate the map in the source, loading whole image");
        }
        Rect::new(
            coord! { x: 0.0, y: 0.0 },
            coord! { x: src_size.0 as f64, y: src_size.1 as f64 },
        )
    });

    // One extra source pixel on every side, stripped to available data.
    let min_x = (extent.min().x - 1.0).floor().max(0.0);
    let min_y = (extent.min().y - 1.0).floor().max(0.0);
    let max_x = (extent.max().x + 1.0).ceil().min(src_size.0 as f64);
    let max_y = (extent.max().y + 1.0).ceil().min(src_size.1 as f64);
    if max_x <= min_x || max_y <= min_y {
        if ctx.debug {
            debug!("no overlap between source and map");
        }
        return Ok(ResampleOutcome::NoOverlap);
    }
    let (window_width, window_height) = (max_x - min_x, max_y - min_y);

    let nominal_cell_size = layer.geo_transform.nominal_cell_size();
    let mut cell_size = if extent.width() > oversample_ratio * dst_size.0 as f64
        && !flags.contains(LoadFlags::LOAD_FULL_RES_IMAGE)
    {
        nominal_cell_size * extent.width() / (oversample_ratio * dst_size.0 as f64)
    } else {
        nominal_cell_size
    };
    let load_size = (
        (window_width * nominal_cell_size / cell_size).max(1.0) as usize,
        (window_height * nominal_cell_size / cell_size).max(1.0) as usize,
    );
    // The loaded raster has to span the whole window, at least in x.
    cell_size = window_width * nominal_cell_size / load_size.0 as f64;
    if ctx.debug {
        debug!(cell_size, ?load_size, "resampling in effect");
    }

    let scratch_geo_transform =
        layer
            .geo_transform
            .windowed(min_x, min_y, cell_size / nominal_cell_size);
    let window = RasterWindow::new(
        (min_x as usize, min_y as usize),
        (window_width as usize, window_height as usize),
    );
    let scratch = layer
        .dataset
        .read_window(&window, load_size, map.raster.encoding(), layer.nodata)
        .inspect_err(|e| error!(error = %e, ?window, "cannot read source window"))?;

    let colormap = match (scratch.palette(), map.raster.palette_mut()) {
        (Some(src), Some(dst)) => Some(src.color_map(dst)),
        _ => None,
    };

    let transformer = ApproxTransformer::new(
        ProjTransformer::new(
            layer.srs.as_ref(),
            &scratch_geo_transform,
            map.srs.as_ref(),
            &map.geo_transform,
            ctx.concurrency_enabled,
        )?,
        APPROX_MAX_ERROR,
    );

    let stats = raster::resample(
        alg,
        &scratch,
        layer.nodata,
        &mut map.raster,
        colormap.as_ref(),
        &transformer,
        ctx.debug,
    )
    .inspect_err(|e| error!(error = %e, "resampling failed"))?;

    Ok(ResampleOutcome::Resampled(stats))
}
