use crate::alg::transform::{PointBatch, Transformer};
use crate::raster::resample::ops::{Accumulator, PixelOps};
use crate::raster::resample::ResampleStats;

/// Averages the source pixels covered by the footprint of every destination
/// pixel, weighting each by its overlap area.
///
/// The footprint is the axis-aligned bounding box of the four transformed
/// pixel corners, not the exact quadrilateral.
pub(super) fn resample<P: PixelOps, X: Transformer>(
    ops: &mut P,
    src_size: (usize, usize),
    dst_size: (usize, usize),
    transformer: &X,
) -> ResampleStats {
    let (src_width, src_height) = src_size;
    let (dst_width, dst_height) = dst_size;
    let mut stats = ResampleStats::default();
    let mut top = PointBatch::new(dst_width + 1);
    let mut bottom = PointBatch::new(dst_width + 1);
    let mut acc = Accumulator::new(ops.channels());

    for dst_y in 0..dst_height {
        top.fill_scanline(0.0, dst_y as f64);
        bottom.fill_scanline(0.0, dst_y as f64 + 1.0);
        top.transform_with(transformer);
        bottom.transform_with(transformer);

        for dst_x in 0..dst_width {
            let corners = [
                (&top, dst_x),
                (&top, dst_x + 1),
                (&bottom, dst_x),
                (&bottom, dst_x + 1),
            ];
            if corners.iter().any(|(b, i)| !b.success[*i]) {
                stats.failed += 1;
                continue;
            }

            let mut x_min = f64::INFINITY;
            let mut y_min = f64::INFINITY;
            let mut x_max = f64::NEG_INFINITY;
            let mut y_max = f64::NEG_INFINITY;
            for (b, i) in corners {
                x_min = x_min.min(b.x[i]);
                y_min = y_min.min(b.y[i]);
                x_max = x_max.max(b.x[i]);
                y_max = y_max.max(b.y[i]);
            }

            let x_min = x_min.max(0.0);
            let y_min = y_min.max(0.0);
            let x_max = x_max.min(src_width as f64);
            let y_max = y_max.min(src_height as f64);
            if !(x_max > x_min && y_max > y_min) {
                continue;
            }

            acc.clear();
            let mut max_weight = 0.0;
            for src_y in (y_min as usize)..(y_max.ceil() as usize) {
                let cell_y = (y_max.min(src_y as f64 + 1.0)) - y_min.max(src_y as f64);
                for src_x in (x_min as usize)..(x_max.ceil() as usize) {
                    let cell_x = (x_max.min(src_x as f64 + 1.0)) - x_min.max(src_x as f64);
                    let weight = cell_x * cell_y;
                    ops.accumulate(src_x + src_y * src_width, weight, &mut acc);
                    max_weight += weight;
                }
            }

            let weight_sum = acc.weight_sum();
            if weight_sum == 0.0 {
                continue;
            }
            stats.set += ops.store(dst_x + dst_y * dst_width, &acc, weight_sum / max_weight);
        }
    }

    stats
}
