use super::*;
use crate::errors::ResampleError;
use crate::raster::{PixelEncoding, RawKind, Rgba};
use crate::test_utils::{assert_near, ramp, rgba_ramp, FlakyTransformer, ScaleTransformer};

const ALGS: [ResampleAlg; 3] = [ResampleAlg::Nearest, ResampleAlg::Bilinear, ResampleAlg::Average];

fn blank_like(src: &Raster, size: (usize, usize)) -> Raster {
    Raster::blank(size, src.encoding(), src.palette().cloned()).unwrap()
}

#[test]
fn alg_from_str() {
    assert_eq!("bilinear".parse::<ResampleAlg>().unwrap(), ResampleAlg::Bilinear);
    assert_eq!("AVERAGE".parse::<ResampleAlg>().unwrap(), ResampleAlg::Average);
    assert_eq!("Nearest".parse::<ResampleAlg>().unwrap(), ResampleAlg::Nearest);
    assert!("cubic".parse::<ResampleAlg>().is_err());
    assert_eq!(ResampleAlg::default(), ResampleAlg::Nearest);
}

#[test]
fn identity_reproduces_raw_source() {
    let src = ramp::<i16>((13, 7), 3);
    for alg in ALGS {
        let mut dst = blank_like(&src, (13, 7));
        let stats = resample(alg, &src, None, &mut dst, None, &ScaleTransformer::identity(), false).unwrap();
        assert_eq!(dst, src, "{}", alg.name());
        assert_eq!(stats, ResampleStats { failed: 0, set: 13 * 7 * 3 });
    }
}

#[test]
fn identity_reproduces_true_color() {
    let src = rgba_ramp((9, 4));
    for alg in ALGS {
        let mut dst = blank_like(&src, (9, 4));
        resample(alg, &src, None, &mut dst, None, &ScaleTransformer::identity(), false).unwrap();
        assert_eq!(dst, src, "{}", alg.name());
    }
}

#[test]
fn nearest_remaps_palette() {
    let palette = Palette::from_entries(vec![[0, 0, 0], [255, 0, 0], [0, 255, 0]]).with_transparent(0);
    let src = Raster::from_indices((3, 1), vec![0, 1, 2], palette.clone()).unwrap();
    let mut dst = Raster::from_indices((3, 1), vec![7, 7, 7], palette).unwrap();

    let mut cmap: ColorMap = [None; 256];
    cmap[1] = Some(5);
    let stats = resample(
        ResampleAlg::Nearest,
        &src,
        None,
        &mut dst,
        Some(&cmap),
        &ScaleTransformer::identity(),
        false,
    )
    .unwrap();
    assert_eq!(stats.set, 1);
    assert_eq!(dst.index(0, 0), Some(7));
    assert_eq!(dst.index(1, 0), Some(5));
    assert_eq!(dst.index(2, 0), Some(7));

    // without a color map, only the transparent index is dropped
    let stats = resample(ResampleAlg::Nearest, &src, None, &mut dst, None, &ScaleTransformer::identity(), false)
        .unwrap();
    assert_eq!(stats.set, 2);
    assert_eq!(dst.index(0, 0), Some(7));
    assert_eq!(dst.index(2, 0), Some(2));
}

#[test]
fn nearest_blends_partial_alpha() {
    let src = Raster::from_rgba(
        (3, 1),
        vec![Rgba::TRANSPARENT, Rgba::new(255, 255, 255, 128), Rgba::opaque(1, 2, 3)],
    )
    .unwrap();
    let background = Rgba::opaque(0, 0, 0);
    let mut dst = Raster::from_rgba((3, 1), vec![background; 3]).unwrap();
    let stats = resample(ResampleAlg::Nearest, &src, None, &mut dst, None, &ScaleTransformer::identity(), false)
        .unwrap();
    assert_eq!(stats.set, 2);
    assert_eq!(dst.rgba(0, 0), Some(background));
    assert_eq!(dst.rgba(1, 0), Some(Rgba::opaque(128, 128, 128)));
    assert_eq!(dst.rgba(2, 0), Some(Rgba::opaque(1, 2, 3)));
}

#[test]
fn nearest_skips_nodata_per_band() {
    let src = Raster::from_raw::<i16>((2, 1), 2, vec![-1, 4, 9, -1]).unwrap();
    let mut dst = blank_like(&src, (2, 1));
    let stats = resample(ResampleAlg::Nearest, &src, Some(-1.0), &mut dst, None, &ScaleTransformer::identity(), false)
        .unwrap();
    assert_eq!(stats.set, 2);
    assert_eq!(dst.band::<i16>(0).unwrap(), &[0, 4]);
    assert_eq!(dst.band::<i16>(1).unwrap(), &[9, 0]);
}

#[test]
fn bilinear_excludes_nodata() {
    let src = Raster::from_raw::<f32>((2, 1), 1, vec![10.0, -9999.0]).unwrap();
    let mut dst = blank_like(&src, (1, 1));
    // the destination centre lands on the shared edge of both source pixels
    let halfway = ScaleTransformer::scale(2.0, 1.0);
    let stats = resample(ResampleAlg::Bilinear, &src, Some(-9999.0), &mut dst, None, &halfway, false).unwrap();
    assert_eq!(stats.set, 1);
    assert_near!(dst.sample::<f32>(0, 0, 0).unwrap() as f64, 10.0);

    let mut dst = blank_like(&src, (1, 1));
    resample(ResampleAlg::Bilinear, &src, None, &mut dst, None, &halfway, false).unwrap();
    assert_near!(dst.sample::<f32>(0, 0, 0).unwrap() as f64, -4994.5);
}

#[test]
fn bilinear_ignores_nodata_columns_at_half_resolution() {
    // even columns are nodata, odd columns hold x + 100 * y
    let (width, height) = (8, 2);
    let samples = (0..width * height)
        .map(|i| {
            let (x, y) = (i % width, i / width);
            if x % 2 == 0 {
                -9999.0
            } else {
                (x + 100 * y) as f32
            }
        })
        .collect();
    let src = Raster::from_raw::<f32>((width, height), 1, samples).unwrap();
    let mut dst = blank_like(&src, (4, 1));
    let stats = resample(
        ResampleAlg::Bilinear,
        &src,
        Some(-9999.0),
        &mut dst,
        None,
        &ScaleTransformer::scale(2.0, 2.0),
        false,
    )
    .unwrap();
    assert_eq!(stats, ResampleStats { failed: 0, set: 4 });
    // each output is the mean of the odd column above and below its centre
    assert_eq!(dst.band::<f32>(0).unwrap(), &[51.0, 53.0, 55.0, 57.0]);
}

#[test]
fn bilinear_all_nodata_leaves_pixel_unset() {
    let src = Raster::from_raw::<i16>((2, 2), 1, vec![-9999; 4]).unwrap();
    let mut dst = Raster::from_raw::<i16>((2, 2), 1, vec![3; 4]).unwrap();
    let stats = resample(
        ResampleAlg::Bilinear,
        &src,
        Some(-9999.0),
        &mut dst,
        None,
        &ScaleTransformer::identity(),
        false,
    )
    .unwrap();
    assert_eq!(stats.set, 0);
    assert_eq!(dst.band::<i16>(0).unwrap(), &[3; 4]);
}

#[test]
fn bilinear_interpolates_every_band() {
    let src = Raster::from_raw::<f32>((2, 1), 2, vec![0.0, 10.0, 100.0, 300.0]).unwrap();
    let mut dst = blank_like(&src, (1, 1));
    resample(
        ResampleAlg::Bilinear,
        &src,
        None,
        &mut dst,
        None,
        &ScaleTransformer::scale(2.0, 1.0),
        false,
    )
    .unwrap();
    assert_eq!(dst.band::<f32>(0).unwrap(), &[5.0]);
    assert_eq!(dst.band::<f32>(1).unwrap(), &[200.0]);
}

#[test]
fn average_conserves_constant_raster() {
    let src = Raster::from_raw::<i16>((12, 8), 1, vec![42; 96]).unwrap();
    for factor in [1usize, 2, 4] {
        let size = (12 / factor, 8 / factor);
        let mut dst = blank_like(&src, size);
        let scale = ScaleTransformer::scale(factor as f64, factor as f64);
        let stats = resample(ResampleAlg::Average, &src, None, &mut dst, None, &scale, false).unwrap();
        assert_eq!(stats.set, size.0 * size.1);
        assert!(dst.band::<i16>(0).unwrap().iter().all(|v| *v == 42), "factor {factor}");
    }
}

#[test]
fn average_weights_block_means() {
    let samples = (0..16).map(|v| v as f32).collect();
    let src = Raster::from_raw::<f32>((4, 4), 1, samples).unwrap();
    let mut dst = blank_like(&src, (2, 2));
    resample(
        ResampleAlg::Average,
        &src,
        None,
        &mut dst,
        None,
        &ScaleTransformer::scale(2.0, 2.0),
        false,
    )
    .unwrap();
    assert_eq!(dst.band::<f32>(0).unwrap(), &[2.5, 4.5, 10.5, 12.5]);
}

#[test]
fn average_coverage_becomes_alpha() {
    let red = Rgba::opaque(255, 0, 0);
    let src = Raster::from_rgba((2, 2), vec![red, red, Rgba::TRANSPARENT, Rgba::TRANSPARENT]).unwrap();
    let mut dst = blank_like(&src, (1, 1));
    let stats = resample(
        ResampleAlg::Average,
        &src,
        None,
        &mut dst,
        None,
        &ScaleTransformer::scale(2.0, 2.0),
        false,
    )
    .unwrap();
    assert_eq!(stats.set, 1);
    assert_eq!(dst.rgba(0, 0), Some(Rgba::new(255, 0, 0, 128)));
}

#[test]
fn out_of_bounds_is_not_a_failure() {
    let src = ramp::<u8>((4, 4), 1);
    let shifted = ScaleTransformer::identity().offset(-10.0, 0.0);
    for alg in ALGS {
        let mut dst = blank_like(&src, (4, 4));
        let stats = resample(alg, &src, None, &mut dst, None, &shifted, true).unwrap();
        assert_eq!(stats, ResampleStats::default(), "{}", alg.name());
        assert!(dst.band::<u8>(0).unwrap().iter().all(|v| *v == 0));
    }
}

#[test]
fn partial_failures_are_contained() {
    let src = ramp::<i16>((16, 16), 1);
    let flaky = FlakyTransformer::new(ScaleTransformer::identity(), 30);
    for alg in ALGS {
        let mut dst = blank_like(&src, (16, 16));
        let stats = resample(alg, &src, None, &mut dst, None, &flaky, true).unwrap();
        assert!(stats.failed > 0, "{}", alg.name());
        assert!(stats.set > 0, "{}", alg.name());
        assert_eq!(stats.failed + stats.set, 16 * 16, "{}", alg.name());

        let expected = src.band::<i16>(0).unwrap();
        for (got, want) in dst.band::<i16>(0).unwrap().iter().zip(expected) {
            assert!(*got == 0 || got == want, "{}: {got} vs {want}", alg.name());
        }
    }
}

#[test]
fn mismatched_encodings() {
    let src = rgba_ramp((2, 2));
    let mut dst = Raster::blank(
        (2, 2),
        PixelEncoding::Raw {
            kind: RawKind::Int16,
            bands: 1,
        },
        None,
    )
    .unwrap();
    let r = resample(ResampleAlg::Nearest, &src, None, &mut dst, None, &ScaleTransformer::identity(), false);
    assert!(matches!(r, Err(ResampleError::UnsupportedEncoding { .. })));

    let src = ramp::<i16>((2, 2), 3);
    let r = resample(ResampleAlg::Bilinear, &src, None, &mut dst, None, &ScaleTransformer::identity(), false);
    assert!(matches!(r, Err(ResampleError::UnsupportedEncoding { .. })));
}
