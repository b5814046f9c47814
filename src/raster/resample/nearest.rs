use crate::alg::transform::{PointBatch, Transformer};
use crate::raster::resample::ops::PixelOps;
use crate::raster::resample::ResampleStats;

/// Copies, for every destination pixel centre, the source pixel it falls in.
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

    for dst_y in 0..dst_height {
        batch.fill_scanline(0.5, dst_y as f64 + 0.5);
        batch.transform_with(transformer);

        for dst_x in 0..dst_width {
            if !batch.success[dst_x] {
                stats.failed += 1;
                continue;
            }

            // Test the unfloored values, truncation rounds towards zero.
            let (x, y) = (batch.x[dst_x], batch.y[dst_x]);
            if !(x >= 0.0 && y >= 0.0) {
                continue;
            }
            let (src_x, src_y) = (x as usize, y as usize);
            if src_x >= src_width || src_y >= src_height {
                continue;
            }

            stats.set += ops.copy(src_x + src_y * src_width, dst_x + dst_y * dst_width);
        }
    }

    stats
}
