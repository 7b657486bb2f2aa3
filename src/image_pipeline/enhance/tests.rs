use super::*;
use crate::image_pipeline::filters::BinomialKernel;

/// Linear value whose sRGB encoding is one half.
const MID_GREY: u16 = 14027;

fn params_without_detail() -> PipelineParameters {
    PipelineParameters::builder().denoise(false).sharpen(false).build()
}

fn std_dev(values: impl Iterator<Item = f32> + Clone) -> f32 {
    let n = values.clone().count() as f32;
    let mean = values.clone().sum::<f32>() / n;
    (values.map(|v| (v - mean) * (v - mean)).sum::<f32>() / n).sqrt()
}

#[test]
fn test_contrast_curve_midpoint() {
    let curve = ContrastCurve::new(1.0, 0.0, 1.0).unwrap();
    let mid = curve.apply(MID_GREY) as i32;
    assert!((mid - 32768).abs() <= 16, "got {mid}");
}

#[test]
fn test_contrast_curve_monotonic_and_bounded() {
    for contrast in [0.25, 1.0, 3.0] {
        let curve = ContrastCurve::new(contrast, 0.0, 1.0).unwrap();
        let lut = curve.lut();
        assert_eq!(lut.len(), 65536);
        assert_eq!(lut[0], 0);
        assert!(lut[65535] >= 65530);
        assert!(lut.windows(2).all(|w| w[0] <= w[1]), "contrast {contrast}");
    }
}

#[test]
fn test_contrast_curve_black_point_crushes_shadows() {
    let curve = ContrastCurve::new(1.0, 0.2, 1.0).unwrap();
    // linear 0.02 encodes to about 0.15, below the black point
    assert_eq!(curve.apply(1310), 0);
}

#[test]
fn test_contrast_curve_rejects_bad_points() {
    assert!(ContrastCurve::new(1.0, 0.0, 0.0).is_err());
    assert!(ContrastCurve::new(1.0, 1.0, 1.0).is_err());
}

#[test]
fn test_hue_shift_bands() {
    let blues = HueShift {
        blues: 10.0,
        greens: 0.0,
        saturation: 1.0,
    };
    let greens = HueShift {
        blues: 0.0,
        greens: -20.0,
        saturation: 1.0,
    };

    let [h, _, _] = blues.apply([180.0, 0.5, 0.5]);
    assert!((h - 190.0).abs() < 1e-3);

    let [h, _, _] = greens.apply([90.0, 0.5, 0.5]);
    assert!((h - 70.0).abs() < 1e-3);

    // bands overlap slightly: the green tail reaches the blue centre
    let both = HueShift {
        blues: 10.0,
        greens: -20.0,
        saturation: 1.0,
    };
    let [h, _, _] = both.apply([180.0, 0.5, 0.5]);
    assert!((h - 190.0).abs() < 1e-2);

    // magenta is far from both bands
    let [h, _, _] = both.apply([300.0, 0.5, 0.5]);
    assert!((h - 300.0).abs() < 1e-3);
}

#[test]
fn test_saturation_is_clamped() {
    let shift = HueShift {
        saturation: 3.0,
        ..HueShift::default()
    };
    let [_, s, v] = shift.apply([30.0, 0.5, 0.7]);
    assert_eq!(s, 1.0);
    assert_eq!(v, 0.7);
}

#[test]
fn test_eps_map_constant_green() {
    let params = ChromaEps::default();
    let rgb = Image::filled(20, 12, 3, u16::MAX);

    let eps = chroma_eps_map(&rgb, &params).unwrap();

    assert_eq!(eps.dimensions(), (20, 12));
    let expected = params.eps_at(1.0);
    assert!(eps.data().iter().all(|&e| (e - expected).abs() <= expected * 1e-5));
}

#[test]
fn test_eps_map_larger_in_shadows() {
    let params = ChromaEps {
        falloff: 4.0,
        boost: 1.0,
        base: 0.01,
    };
    let dark = chroma_eps_map(&Image::filled(8, 8, 3, 0u16), &params).unwrap();
    let bright = chroma_eps_map(&Image::filled(8, 8, 3, 50000u16), &params).unwrap();

    let expected_dark = (2.0f32 * 0.01 * 65535.0).powi(2);
    assert!((dark.get(4, 4, 0) - expected_dark).abs() <= expected_dark * 1e-5);
    assert!(dark.get(4, 4, 0) > bright.get(4, 4, 0));
}

#[test]
fn test_eps_map_requires_green() {
    let result = chroma_eps_map(&Image::filled(4, 4, 1, 0u16), &ChromaEps::default());
    assert!(matches!(result, Err(PipelineError::InvalidChannel { .. })));
}

#[test]
fn test_chroma_denoise_keeps_grey() {
    let denoise = ChromaDenoise::new(&[15, 15, 25]).unwrap();
    let rgb = Image::filled(24, 24, 3, 0.4f32);
    let eps = Image::filled(24, 24, 1, 1e6f32);

    let out = denoise.process(&rgb, &eps).unwrap();

    assert!(out.data().iter().all(|v| (v - 0.4).abs() < 1e-3));
}

#[test]
fn test_chroma_denoise_smooths_colour_noise() {
    let denoise = ChromaDenoise::new(&[3]).unwrap();
    let noise = |x: usize, y: usize| if (x + y) % 2 == 0 { 0.02 } else { -0.02 };
    let rgb = Image::from_fn(32, 32, 3, |x, y, c| match c {
        0 => 0.5 + noise(x, y),
        1 => 0.5,
        _ => 0.5 - noise(x, y),
    });
    let eps = Image::filled(32, 32, 1, 1e9f32);

    let out = denoise.process(&rgb, &eps).unwrap();

    let before = std_dev(rgb.plane(0).iter().copied());
    let after = std_dev(out.plane(0).iter().copied());
    assert!(after < before * 0.5, "{after} vs {before}");
}

#[test]
fn test_chroma_denoise_validation() {
    assert!(ChromaDenoise::new(&[]).is_err());
    assert!(ChromaDenoise::new(&[15, 0]).is_err());

    let denoise = ChromaDenoise::new(&[3]).unwrap();
    let result = denoise.process(&Image::filled(8, 8, 3, 0.5f32), &Image::filled(4, 4, 1, 1.0f32));
    assert!(matches!(result, Err(PipelineError::DimensionMismatch { .. })));
}

#[test]
fn test_sharpen_kernel_selection() {
    let narrow = Sharpen::new([2.0, 2.0], 1.0, 5).unwrap();
    assert_eq!(narrow.kernels(), [BinomialKernel::Tap3, BinomialKernel::Tap3]);

    let wide = Sharpen::new([2.0, 2.0], 1.0, 25).unwrap();
    assert_eq!(wide.kernels(), [BinomialKernel::Tap5, BinomialKernel::Tap9]);

    assert!(Sharpen::new([2.0, 2.0], 1.0, 0).is_err());
}

#[test]
fn test_sharpen_flat_unchanged() {
    let sharpen = Sharpen::new([2.0, 2.0], 1.5, 25).unwrap();
    let flat = Image::filled(40, 30, 1, 30000u16);

    let out = sharpen.process(&flat).unwrap();

    assert!(out.data().iter().all(|&v| v == 30000));
}

#[test]
fn test_sharpen_overshoots_edge() {
    let sharpen = Sharpen::new([2.0, 2.0], 1.0, 25).unwrap();
    let edge = Image::from_fn(32, 8, 1, |x, _, _| if x < 16 { 10000u16 } else { 50000 });

    let out = sharpen.process(&edge).unwrap();

    assert!(out.get(16, 4, 0) > 50000);
    assert!(out.get(15, 4, 0) < 10000);
    // far from the edge the image is flat
    assert_eq!(out.get(2, 4, 0), 10000);
    assert_eq!(out.get(29, 4, 0), 50000);
}

#[test]
fn test_enhance_mid_grey_round_trip() {
    let enhance = Enhance::new(&params_without_detail()).unwrap();
    let rgb = Image::filled(8, 8, 3, MID_GREY);
    let eps = Image::filled(8, 8, 1, 0.0f32);

    let out = enhance.process(&rgb, &eps).unwrap();

    for &v in out.data() {
        assert!((v as i32 - MID_GREY as i32).abs() <= 40, "got {v}");
    }
}

#[test]
fn test_enhance_defaults_keep_grey_neutral() {
    let enhance = Enhance::new(&PipelineParameters::default()).unwrap();
    let rgb = Image::filled(24, 24, 3, MID_GREY);
    let eps = chroma_eps_map(&rgb, &ChromaEps::default()).unwrap();

    let out = enhance.process(&rgb, &eps).unwrap();

    for y in 0..24 {
        for x in 0..24 {
            let [r, g, b] = [0, 1, 2].map(|c| out.get(x, y, c) as i32);
            assert!((r - g).abs() <= 2 && (b - g).abs() <= 2, "({r}, {g}, {b})");
            assert!((g - MID_GREY as i32).abs() <= 40);
        }
    }
}

#[test]
fn test_enhance_saturation_zero_desaturates() {
    let params = PipelineParameters::builder()
        .denoise(false)
        .sharpen(false)
        .saturation(0.0)
        .build();
    let enhance = Enhance::new(&params).unwrap();
    let rgb = Image::from_fn(4, 4, 3, |_, _, c| [20000u16, 8000, 3000][c]);

    let out = enhance.process(&rgb, &Image::new(0, 0, 1)).unwrap();

    let px = [0, 1, 2].map(|c| out.get(1, 1, c));
    assert_eq!(px[0], px[1]);
    assert_eq!(px[1], px[2]);
}

#[test]
fn test_enhance_rejects_non_rgb() {
    let enhance = Enhance::new(&params_without_detail()).unwrap();
    let result = enhance.process(&Image::filled(4, 4, 1, 0u16), &Image::filled(4, 4, 1, 0.0f32));
    assert!(matches!(result, Err(PipelineError::InvalidParameter(_))));
}
