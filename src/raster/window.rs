//! Estimation of the source raster window needed to cover a destination
//! raster.

use geo_types::{coord, Rect};
use tracing::debug;

use crate::alg::transform::{PointBatch, Transformer};

/// Number of intervals sampled along each destination edge (and grid axis).
pub const EDGE_STEPS: usize = 10;

/// Computes the extent, in source pixel/line coordinates, covered by a
/// `dst_size` raster whose pixels map to the source through `transformer`.
///
/// The destination edges are sampled first. If any edge point fails to
/// transform, a regular grid over the whole destination is sampled instead,
/// and the resulting extent is grown by one grid cell (clamped to
/// `src_size`) to make up for the coarse sampling.
///
/// Returns `None` if no point transformed at all; callers are expected to
/// fall back to the whole source raster.
pub fn transform_map_to_source<T: Transformer>(
    dst_size: (usize, usize),
    transformer: &T,
    src_size: (usize, usize),
) -> Option<Rect<f64>> {
    let mut batch = edge_samples(dst_size);
    batch.transform_with(transformer);

    if batch.success.iter().any(|ok| !ok) {
        debug!(
            failed = batch.success.iter().filter(|ok| !**ok).count(),
            "edge sampling failed, retrying with a grid"
        );
        batch = grid_samples(dst_size);
        batch.transform_with(transformer);
    }

    let mut extent: Option<Rect<f64>> = None;
    let mut failures = 0;
    for ((x, y), ok) in batch.x.iter().zip(&batch.y).zip(&batch.success) {
        if !ok {
            failures += 1;
            continue;
        }
        let point = coord! { x: *x, y: *y };
        extent = Some(match extent {
            None => Rect::new(point, point),
            Some(r) => Rect::new(
                coord! { x: r.min().x.min(point.x), y: r.min().y.min(point.y) },
                coord! { x: r.max().x.max(point.x), y: r.max().y.max(point.y) },
            ),
        });
    }
    let extent = extent?;

    if failures == 0 {
        return Some(extent);
    }

    let grow_x = (extent.width().trunc() / EDGE_STEPS as f64).trunc() + 1.0;
    let grow_y = (extent.height().trunc() / EDGE_STEPS as f64).trunc() + 1.0;
    Some(Rect::new(
        coord! {
            x: (extent.min().x - grow_x).max(0.0),
            y: (extent.min().y - grow_y).max(0.0),
        },
        coord! {
            x: (extent.max().x + grow_x).min(src_size.0 as f64),
            y: (extent.max().y + grow_y).min(src_size.1 as f64),
        },
    ))
}

/// `EDGE_STEPS + 1` evenly spaced positions from `0` to `len`, inclusive.
fn steps(len: usize) -> impl Iterator<Item = f64> {
    (0..=EDGE_STEPS).map(move |i| (i * len) as f64 / EDGE_STEPS as f64)
}

/// `EDGE_STEPS + 1` points along each of the four destination edges.
fn edge_samples(dst_size: (usize, usize)) -> PointBatch {
    let (width, height) = (dst_size.0 as f64, dst_size.1 as f64);
    let mut batch = PointBatch::default();
    for (x, y) in steps(dst_size.0).zip(steps(dst_size.1)) {
        for (px, py) in [(x, 0.0), (x, height), (0.0, y), (width, y)] {
            batch.x.push(px);
            batch.y.push(py);
        }
    }
    batch.success = vec![false; batch.x.len()];
    batch
}

/// A regular `(EDGE_STEPS + 1)²` grid spanning the destination.
fn grid_samples(dst_size: (usize, usize)) -> PointBatch {
    let mut batch = PointBatch::default();
    for y in steps(dst_size.1) {
        for x in steps(dst_size.0) {
            batch.x.push(x);
            batch.y.push(y);
        }
    }
    batch.success = vec![false; batch.x.len()];
    batch
}
