//! Colour math shared by the tone and enhancement stages.
//!
//! Everything here works on normalized `f32` values (`0..=1`) or on the
//! 16-bit working domain through precomputed lookup tables.

use serde::{Deserialize, Serialize};

use crate::image_pipeline::common::Sample;

#[cfg(test)]
mod tests;

const U16_SCALE: f32 = u16::MAX as f32;

/// sRGB opto-electronic transfer function.
#[inline]
pub fn srgb_encode(linear: f32) -> f32 {
    if linear < 0.003_130_8 {
        linear * 12.92
    } else {
        1.055 * linear.powf(1.0 / 2.4) - 0.055
    }
}

/// Inverse of [`srgb_encode`].
#[inline]
pub fn srgb_decode(encoded: f32) -> f32 {
    if encoded < 0.040_45 {
        encoded / 12.92
    } else {
        ((encoded + 0.055) / 1.055).powf(2.4)
    }
}

fn lut_u16(transfer: fn(f32) -> f32, bias: f32) -> Vec<u16> {
    (0..=u16::MAX)
        .map(|i| u16::from_f32(transfer(i as f32 / U16_SCALE) * U16_SCALE + bias))
        .collect()
}

/// sRGB encode over the 16-bit domain, truncating.
pub fn srgb_encode_lut() -> Vec<u16> {
    lut_u16(srgb_encode, 0.0)
}

/// sRGB decode over the 16-bit domain, truncating.
pub fn srgb_decode_lut() -> Vec<u16> {
    lut_u16(srgb_decode, 0.0)
}

pub fn srgb_encode_lut_rounded() -> Vec<u16> {
    lut_u16(srgb_encode, 0.5)
}

pub fn srgb_decode_lut_rounded() -> Vec<u16> {
    lut_u16(srgb_decode, 0.5)
}

/// sRGB encode over the 8-bit domain, rounded.
pub fn srgb_encode_lut8() -> [u8; 256] {
    let mut lut = [0u8; 256];
    for (i, v) in lut.iter_mut().enumerate() {
        *v = u8::from_f32(srgb_encode(i as f32 / 255.0) * 255.0 + 0.5);
    }
    lut
}

/// Rec.601 luma weights, used for exposure weighting.
#[inline]
pub fn luma(r: f32, g: f32, b: f32) -> f32 {
    0.299 * r + 0.587 * g + 0.114 * b
}

#[inline]
pub fn rgb_to_ycbcr([r, g, b]: [f32; 3]) -> [f32; 3] {
    [
        0.2126 * r + 0.7152 * g + 0.0722 * b,
        -0.1146 * r - 0.3854 * g + 0.5 * b,
        0.5 * r - 0.4542 * g - 0.0458 * b,
    ]
}

#[inline]
pub fn ycbcr_to_rgb([y, cb, cr]: [f32; 3]) -> [f32; 3] {
    [
        y + 1.5748 * cr,
        y - 0.1873 * cb - 0.4681 * cr,
        y + 1.8556 * cb,
    ]
}

/// RGB to HSV with hue in degrees. Hue is `0` for achromatic input.
#[inline]
pub fn rgb_to_hsv([r, g, b]: [f32; 3]) -> [f32; 3] {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let h = if delta < f32::EPSILON {
        0.0
    } else if max == r {
        ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        2.0 + (b - r) / delta
    } else {
        4.0 + (r - g) / delta
    };

    let s = if max < f32::EPSILON { 0.0 } else { delta / max };

    [h * 60.0, s, max]
}

/// HSV (hue in degrees, any range) to RGB clamped to `0..=1`.
#[inline]
pub fn hsv_to_rgb([h, s, v]: [f32; 3]) -> [f32; 3] {
    let h = h.rem_euclid(360.0) / 60.0;
    let sector = h.floor();
    let f = h - sector;

    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    let rgb = match (sector as i32).rem_euclid(6) {
        0 => [v, t, p],
        1 => [q, v, p],
        2 => [p, v, t],
        3 => [p, q, v],
        4 => [t, p, v],
        _ => [v, p, q],
    };

    rgb.map(|c| c.clamp(0.0, 1.0))
}

/// Row-major 3×3 matrix mapping camera RGB to the output space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorMatrix(pub [[f32; 3]; 3]);

impl ColorMatrix {
    pub const IDENTITY: ColorMatrix =
        ColorMatrix([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]);

    /// Linear sRGB from CIE XYZ (D65).
    pub const XYZ_TO_SRGB: ColorMatrix = ColorMatrix([
        [3.240_454_2, -1.537_138_5, -0.498_531_4],
        [-0.969_266, 1.876_010_8, 0.041_556],
        [0.055_643_4, -0.204_025_9, 1.057_225_2],
    ]);

    #[inline]
    pub fn apply(&self, rgb: [f32; 3]) -> [f32; 3] {
        let m = &self.0;
        [
            m[0][0] * rgb[0] + m[0][1] * rgb[1] + m[0][2] * rgb[2],
            m[1][0] * rgb[0] + m[1][1] * rgb[1] + m[1][2] * rgb[2],
            m[2][0] * rgb[0] + m[2][1] * rgb[1] + m[2][2] * rgb[2],
        ]
    }

    pub fn multiply(&self, rhs: &ColorMatrix) -> ColorMatrix {
        let mut out = [[0.0f32; 3]; 3];
        for (r, row) in out.iter_mut().enumerate() {
            for (c, v) in row.iter_mut().enumerate() {
                *v = (0..3).map(|k| self.0[r][k] * rhs.0[k][c]).sum();
            }
        }
        ColorMatrix(out)
    }

    /// Scales each column, i.e. `self · diag(scale)`.
    pub fn scale_columns(&self, scale: [f32; 3]) -> ColorMatrix {
        let mut out = self.0;
        for row in out.iter_mut() {
            for (v, s) in row.iter_mut().zip(scale) {
                *v *= s;
            }
        }
        ColorMatrix(out)
    }

    /// Normalizes rows so that `[1, 1, 1]` maps to `[1, 1, 1]`.
    pub fn normalize_rows(&self) -> ColorMatrix {
        let mut out = self.0;
        for row in out.iter_mut() {
            let sum: f32 = row.iter().sum();
            if sum.abs() > f32::EPSILON {
                row.iter_mut().for_each(|v| *v /= sum);
            }
        }
        ColorMatrix(out)
    }
}

impl Default for ColorMatrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}
