use crate::alg::transform::{PointBatch, Transformer};
use crate::raster::resample::ops::{Accumulator, PixelOps};
use crate::raster::resample::ResampleStats;

/// Interpolates between the four source pixels surrounding every destination
/// pixel centre.
pub(super) fn resample<P: PixelOps, X: Transformer>(
    ops: &mut P,
    src_size: (usize, usize),
    dst_size: (usize, usize),
    transformer: &X,
) -> ResampleStats {
    let (src_width, src_height) = src_size;
    let (dst_width, dst_height) = dst_size;
    let mut stats = ResampleStats::default();
    let mut batch = PointBatch::new(dst_width);
    let mut acc = Accumulator::new(ops.channels());

    for dst_y in 0..dst_height {
        batch.fill_scanline(0.5, dst_y as f64 + 0.5);
        batch.transform_with(transformer);

        for dst_x in 0..dst_width {
            if !batch.success[dst_x] {
                stats.failed += 1;
                continue;
            }

            // Sample positions are pixel centres, weights are relative to the
            // top left corner of the 2x2 neighbourhood.
            let x = batch.x[dst_x] - 0.5;
            let y = batch.y[dst_x] - 0.5;
            if !(x.is_finite() && y.is_finite()) {
                continue;
            }
            let (x1, y1) = (x.floor(), y.floor());
            let (ratio_x, ratio_y) = (x - x1, y - y1);

            if x1 + 1.0 < 0.0 || x1 >= src_width as f64 || y1 + 1.0 < 0.0 || y1 >= src_height as f64 {
                continue;
            }

            // Neighbours one pixel off the edge are clamped onto it.
            let src_x1 = x1.max(0.0) as usize;
            let src_y1 = y1.max(0.0) as usize;
            let src_x2 = ((x1 + 1.0) as usize).min(src_width - 1);
            let src_y2 = ((y1 + 1.0) as usize).min(src_height - 1);

            acc.clear();
            let samples = [
                (src_x1, src_y1, (1.0 - ratio_x) * (1.0 - ratio_y)),
                (src_x2, src_y1, ratio_x * (1.0 - ratio_y)),
                (src_x1, src_y2, (1.0 - ratio_x) * ratio_y),
                (src_x2, src_y2, ratio_x * ratio_y),
            ];
            for (sx, sy, weight) in samples {
                ops.accumulate(sx + sy * src_width, weight, &mut acc);
            }

            let weight_sum = acc.weight_sum();
            if weight_sum == 0.0 {
                continue;
            }
            stats.set += ops.store(dst_x + dst_y * dst_width, &acc, weight_sum);
        }
    }

    stats
}
