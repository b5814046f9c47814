//! Linear approximation of an expensive [`Transformer`] along scanlines.
//!
//! Instead of transforming every point of a scanline, the first, middle and
//! last point are transformed exactly and the rest is interpolated, as long as
//! the middle point deviates less than the allowed error from the straight
//! line through the two ends. Otherwise both halves are handled recursively.

use crate::alg::transform::Transformer;
use crate::errors::Result;

/// Below this many points, the base transformer is always called directly.
const MIN_APPROX_POINTS: usize = 6;

/// Wraps a base transformer, replacing per-point transformation by linear
/// interpolation wherever the result stays within `max_error` (measured as
/// the sum of the x and y deviations, in output units).
#[derive(Debug, Clone)]
pub struct ApproxTransformer<T> {
    base: T,
    max_error: f64,
}

impl<T: Transformer> ApproxTransformer<T> {
    pub fn new(base: T, max_error: f64) -> Self {
        ApproxTransformer { base, max_error }
    }

    pub fn base(&self) -> &T {
        &self.base
    }

    pub fn max_error(&self) -> f64 {
        self.max_error
    }

    fn approximate(&self, x: &mut [f64], y: &mut [f64], success: &mut [bool]) -> Result<()> {
        let n = x.len();
        if n < MIN_APPROX_POINTS || self.max_error == 0.0 {
            return self.base.transform(x, y, success);
        }
        let middle = (n - 1) / 2;
        let last = n - 1;

        // Only points sharing a row, with distinct columns, can be interpolated.
        if y[0] != y[last] || y[0] != y[middle] || x[0] == x[last] || x[0] == x[middle] {
            return self.base.transform(x, y, success);
        }

        let mut x2 = [x[0], x[middle], x[last]];
        let mut y2 = [y[0], y[middle], y[last]];
        let mut success2 = [false; 3];
        let sampled = self.base.transform(&mut x2, &mut y2, &mut success2);
        if sampled.is_err() || success2.iter().any(|ok| !ok) {
            return self.base.transform(x, y, success);
        }

        let span = x[last] - x[0];
        let delta_x = (x2[2] - x2[0]) / span;
        let delta_y = (y2[2] - y2[0]) / span;
        let dist_middle = x[middle] - x[0];
        let error = (x2[0] + delta_x * dist_middle - x2[1]).abs()
            + (y2[0] + delta_y * dist_middle - y2[1]).abs();

        if error > self.max_error {
            let original_x = x.to_vec();
            let original_y = y.to_vec();

            let (x_head, x_tail) = x.split_at_mut(middle);
            let (y_head, y_tail) = y.split_at_mut(middle);
            let (s_head, s_tail) = success.split_at_mut(middle);

            let halves = self
                .approximate(x_head, y_head, s_head)
                .and_then(|_| self.approximate(x_tail, y_tail, s_tail));
            if halves.is_err() {
                x.copy_from_slice(&original_x);
                y.copy_from_slice(&original_y);
                return self.base.transform(x, y, success);
            }
            return Ok(());
        }

        let x0 = x[0];
        for ((px, py), ok) in x.iter_mut().zip(y.iter_mut()).zip(success.iter_mut()) {
            let dist = *px - x0;
            *px = x2[0] + delta_x * dist;
            *py = y2[0] + delta_y * dist;
            *ok = true;
        }

        Ok(())
    }
}

impl<T: Transformer> Transformer for ApproxTransformer<T> {
    fn transform(&self, x: &mut [f64], y: &mut [f64], success: &mut [bool]) -> Result<()> {
        self.approximate(x, y, success)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::alg::transform::PointBatch;
    use crate::errors::ResampleError;

    /// A parabolic mapping that counts the points it sees. The chord error
    /// of a parabola peaks at the middle of the chord.
    struct Curved {
        calls: Cell<usize>,
    }

    impl Curved {
        fn new() -> Self {
            Curved { calls: Cell::new(0) }
        }

        fn map(x: f64, y: f64) -> (f64, f64) {
            (x + 0.002 * x * x, y + 0.5 * x - 0.001 * x * x)
        }
    }

    impl Transformer for Curved {
        fn transform(&self, x: &mut [f64], y: &mut [f64], success: &mut [bool]) -> Result<()> {
            self.calls.set(self.calls.get() + x.len());
            for ((px, py), ok) in x.iter_mut().zip(y.iter_mut()).zip(success.iter_mut()) {
                (*px, *py) = Self::map(*px, *py);
                *ok = true;
            }
            Ok(())
        }
    }

    /// Fails short batches containing `x == poison` as a whole.
    struct Flaky {
        poison: f64,
    }

    impl Flaky {
        fn map(x: f64, y: f64) -> (f64, f64) {
            (x * 2.0, y + (x * 0.05).sin() * 30.0)
        }
    }

    impl Transformer for Flaky {
        fn transform(&self, x: &mut [f64], y: &mut [f64], success: &mut [bool]) -> Result<()> {
            if (4..6).contains(&x.len()) && x.contains(&self.poison) {
                success.iter_mut().for_each(|s| *s = false);
                return Err(ResampleError::InvalidCoordinateRange {
                    from: "a".to_string(),
                    to: "b".to_string(),
                    msg: None,
                });
            }
            for ((px, py), ok) in x.iter_mut().zip(y.iter_mut()).zip(success.iter_mut()) {
                (*px, *py) = Self::map(*px, *py);
                *ok = true;
            }
            Ok(())
        }
    }

    #[test]
    fn approximation_stays_within_max_error() {
        for &max_error in &[0.333, 0.125, 1.0, 2.5] {
            let approx = ApproxTransformer::new(Curved::new(), max_error);
            assert_eq!(approx.max_error(), max_error);
            let mut batch = PointBatch::new(512);
            batch.fill_scanline(0.5, 17.5);
            batch.transform_with(&approx);

            for (i, ((x, y), ok)) in batch.x.iter().zip(&batch.y).zip(&batch.success).enumerate() {
                assert!(ok);
                let (ex, ey) = Curved::map(0.5 + i as f64, 17.5);
                let deviation = (x - ex).abs() + (y - ey).abs();
                // the middle sample sits up to half a point off the chord centre
                assert!(
                    deviation <= max_error + 1e-3,
                    "point {i}: deviation {deviation} exceeds {max_error}"
                );
            }
            assert!(approx.base().calls.get() < 512, "no calls saved at {max_error}");
        }
    }

    #[test]
    fn linear_scanline_uses_three_base_points() {
        let approx = ApproxTransformer::new(Curved::new(), 1e6);
        let mut batch = PointBatch::new(1000);
        batch.fill_scanline(0.0, 0.0);
        batch.transform_with(&approx);
        assert_eq!(approx.base().calls.get(), 3);
        assert!(batch.success.iter().all(|ok| *ok));
    }

    #[test]
    fn preconditions_delegate_to_base() {
        // too short
        let approx = ApproxTransformer::new(Curved::new(), 0.5);
        let mut batch = PointBatch::new(5);
        batch.fill_scanline(0.0, 0.0);
        batch.transform_with(&approx);
        assert_eq!(approx.base().calls.get(), 5);

        // zero tolerance
        let approx = ApproxTransformer::new(Curved::new(), 0.0);
        let mut batch = PointBatch::new(64);
        batch.fill_scanline(0.0, 0.0);
        batch.transform_with(&approx);
        assert_eq!(approx.base().calls.get(), 64);

        // not a single row
        let approx = ApproxTransformer::new(Curved::new(), 0.5);
        let mut batch = PointBatch::new(64);
        batch.fill_scanline(0.0, 0.0);
        batch.y[63] = 1.0;
        batch.transform_with(&approx);
        assert_eq!(approx.base().calls.get(), 64);
        let (ex, ey) = Curved::map(63.0, 1.0);
        assert_eq!((batch.x[63], batch.y[63]), (ex, ey));
    }

    #[test]
    fn failed_subdivision_transforms_original_points() {
        let base = Flaky { poison: 70.0 };
        let approx = ApproxTransformer::new(&base, 0.01);
        let mut batch = PointBatch::new(100);
        batch.fill_scanline(0.0, 3.0);
        batch.transform_with(&approx);

        assert!(batch.success.iter().all(|ok| *ok));
        for (i, (x, y)) in batch.x.iter().zip(&batch.y).enumerate() {
            let (ex, ey) = Flaky::map(i as f64, 3.0);
            assert!((x - ex).abs() + (y - ey).abs() <= 0.05, "point {i}");
        }
        assert_eq!((batch.x[70], batch.y[70]), Flaky::map(70.0, 3.0));
    }

    #[test]
    fn failed_samples_delegate_whole_range() {
        let base = Flaky { poison: 2.0 };
        let approx = ApproxTransformer::new(&base, 0.5);
        let mut batch = PointBatch::new(5);
        batch.fill_scanline(0.0, 0.0);
        batch.transform_with(&approx);
        assert!(batch.success.iter().all(|ok| !ok));
    }
}
