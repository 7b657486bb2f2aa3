use crate::image_pipeline::color::*;

fn assert_close(a: [f32; 3], b: [f32; 3], tol: f32) {
    for (x, y) in a.iter().zip(b.iter()) {
        assert!((x - y).abs() <= tol, "{a:?} != {b:?}");
    }
}

#[test]
fn test_srgb_transfer_inverts() {
    for i in 0..=100 {
        let v = i as f32 / 100.0;
        assert!((srgb_decode(srgb_encode(v)) - v).abs() < 1e-5);
    }
    assert!((srgb_encode(0.214) - 0.5).abs() < 0.01);
}

#[test]
fn test_encode_lut_is_monotonic() {
    let lut = srgb_encode_lut();
    assert_eq!(lut.len(), 65536);
    assert_eq!(lut[0], 0);
    // 1.055 - 0.055 lands just below 1.0 in f32 and truncates
    assert!(lut[65535] >= 65534);
    assert!(lut.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn test_lut8_endpoints() {
    let lut = srgb_encode_lut8();
    assert_eq!(lut[0], 0);
    assert_eq!(lut[255], 255);
    assert_eq!(lut[55], 128);
}

#[test]
fn test_ycbcr_gray_has_zero_chroma() {
    let ycc = rgb_to_ycbcr([0.4, 0.4, 0.4]);
    assert!((ycc[0] - 0.4).abs() < 1e-4);
    assert!(ycc[1].abs() < 1e-4);
    assert!(ycc[2].abs() < 1e-4);
    assert_close(ycbcr_to_rgb(ycc), [0.4, 0.4, 0.4], 1e-4);
}

#[test]
fn test_ycbcr_roundtrip_colour() {
    let rgb = [0.8, 0.3, 0.1];
    assert_close(ycbcr_to_rgb(rgb_to_ycbcr(rgb)), rgb, 2e-3);
}

#[test]
fn test_hsv_primaries() {
    assert_close(rgb_to_hsv([1.0, 0.0, 0.0]), [0.0, 1.0, 1.0], 1e-5);
    assert_close(rgb_to_hsv([0.0, 1.0, 0.0]), [120.0, 1.0, 1.0], 1e-4);
    assert_close(rgb_to_hsv([0.0, 0.0, 1.0]), [240.0, 1.0, 1.0], 1e-4);
    assert_close(rgb_to_hsv([1.0, 0.0, 1.0]), [300.0, 1.0, 1.0], 1e-4);
}

#[test]
fn test_hsv_roundtrip() {
    for rgb in [[0.2, 0.5, 0.7], [0.9, 0.1, 0.4], [0.3, 0.3, 0.3], [0.6, 0.6, 0.1]] {
        assert_close(hsv_to_rgb(rgb_to_hsv(rgb)), rgb, 1e-4);
    }
}

#[test]
fn test_hsv_to_rgb_wraps_hue() {
    assert_close(hsv_to_rgb([360.0, 1.0, 1.0]), [1.0, 0.0, 0.0], 1e-5);
    assert_close(hsv_to_rgb([-120.0, 1.0, 1.0]), hsv_to_rgb([240.0, 1.0, 1.0]), 1e-5);
}

#[test]
fn test_color_matrix_ops() {
    let m = ColorMatrix([[2.0, 0.0, 0.0], [0.0, 1.0, 1.0], [1.0, 1.0, 2.0]]);
    assert_eq!(m.apply([1.0, 2.0, 3.0]), [2.0, 5.0, 9.0]);
    assert_eq!(ColorMatrix::IDENTITY.multiply(&m), m);

    let scaled = m.scale_columns([1.0, 2.0, 0.5]);
    assert_eq!(scaled.0[2], [1.0, 2.0, 1.0]);

    let normalized = m.normalize_rows();
    assert_close(normalized.apply([1.0, 1.0, 1.0]), [1.0, 1.0, 1.0], 1e-6);
}

#[test]
fn test_luma_of_white_is_one() {
    assert!((luma(1.0, 1.0, 1.0) - 1.0).abs() < 1e-6);
}
