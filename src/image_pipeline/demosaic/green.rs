//! Green plane reconstruction.

use serde::{Deserialize, Serialize};

use crate::image_pipeline::common::{Image, Sample};
use crate::image_pipeline::demosaic::mosaic::Mosaic;
use crate::image_pipeline::filters::weighted_median3x3;

/// Strategy used to estimate green at red and blue sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GreenInterpolation {
    /// Four directional estimates blended by inverse gradient activity.
    #[default]
    GradientWeighted,
    /// Directional linear minimum mean-square error estimate.
    Lmmse,
}

impl GreenInterpolation {
    /// Full green plane: interpolation followed by the weighted median.
    pub fn reconstruct(&self, mosaic: &Mosaic) -> Image<i32> {
        let raw = match self {
            GreenInterpolation::GradientWeighted => gradient_weighted(mosaic),
            GreenInterpolation::Lmmse => lmmse(mosaic),
        };
        weighted_median3x3(&raw)
    }
}

#[inline]
fn saturate_i16(value: f32) -> i32 {
    i16::from_f32(value) as i32
}

#[inline]
fn half(v: i32) -> i32 {
    v.div_euclid(2)
}

/// Gradient-corrected directional estimates weighted by
/// `1 / (1 + activity)` along each direction.
pub fn gradient_weighted(mosaic: &Mosaic) -> Image<i32> {
    Image::from_fn(mosaic.width(), mosaic.height(), 1, |x, y, _| {
        let (x, y) = (x as isize, y as isize);
        let at = |dx: isize, dy: isize| mosaic.at(x + dx, y + dy);

        if Mosaic::is_green(x, y) {
            return at(0, 0);
        }

        // g<row><col> on a 7×7 grid centred at (4, 4); c.. is the centre colour
        let g14 = at(0, -3);
        let g23 = at(-1, -2);
        let g25 = at(1, -2);
        let g32 = at(-2, -1);
        let g34 = at(0, -1);
        let g36 = at(2, -1);
        let g41 = at(-3, 0);
        let g43 = at(-1, 0);
        let g45 = at(1, 0);
        let g47 = at(3, 0);
        let g52 = at(-2, 1);
        let g54 = at(0, 1);
        let g56 = at(2, 1);
        let g63 = at(-1, 2);
        let g65 = at(1, 2);
        let g74 = at(0, 3);

        let c24 = at(0, -2);
        let c42 = at(-2, 0);
        let c44 = at(0, 0);
        let c46 = at(2, 0);
        let c64 = at(0, 2);

        let activity =
            |terms: [i32; 5]| 1.0 / (1.0 + terms.iter().map(|t| t.abs()).sum::<i32>() as f32);

        let north = activity([g54 - g34, g34 - g14, c44 - c24, half(g43 - g23), half(g45 - g25)]);
        let west = activity([g45 - g43, g43 - g41, c44 - c42, half(g34 - g32), half(g54 - g52)]);
        let east = activity([g43 - g45, g45 - g47, c44 - c46, half(g34 - g36), half(g54 - g56)]);
        let south = activity([g34 - g54, g54 - g74, c44 - c64, half(g43 - g63), half(g45 - g65)]);

        let estimates = [
            (north, g34 + half(c44 - c24)),
            (west, g43 + half(c44 - c42)),
            (east, g45 + half(c44 - c46)),
            (south, g54 + half(c44 - c64)),
        ];

        let weight_sum: f32 = estimates.iter().map(|(w, _)| w).sum();
        let interp = estimates.iter().map(|(w, g)| w * *g as f32).sum::<f32>() / weight_sum;

        saturate_i16(interp + 0.5)
    })
}

const LMMSE_SMOOTHING: [f32; 9] = [
    0.031_25,
    0.070_312_5,
    0.117_187_5,
    0.179_687_5,
    0.203_125,
    0.179_687_5,
    0.117_187_5,
    0.070_312_5,
    0.031_25,
];

const LMMSE_EPS: f32 = 0.1 / (1024.0 * 1024.0);

/// Colour difference (green minus centre colour, or its negation at green
/// sites) along one axis, and its smoothed version.
fn directional_differences(mosaic: &Mosaic, horizontal: bool) -> (Image<f32>, Image<f32>) {
    let step = |x: isize, y: isize, k: isize| if horizontal { (x + k, y) } else { (x, y + k) };

    let diff = Image::from_fn(mosaic.width(), mosaic.height(), 1, |x, y, _| {
        let (x, y) = (x as isize, y as isize);
        let at = |k: isize| {
            let (sx, sy) = step(x, y, k);
            mosaic.at(sx, sy) as f32
        };
        let filtered = -0.25 * at(-2) + 0.5 * at(-1) + 0.5 * at(0) + 0.5 * at(1) - 0.25 * at(2);
        if Mosaic::is_green(x, y) {
            at(0) - filtered
        } else {
            filtered - at(0)
        }
    });

    let smoothed = Image::from_fn(mosaic.width(), mosaic.height(), 1, |x, y, _| {
        LMMSE_SMOOTHING
            .iter()
            .enumerate()
            .map(|(k, w)| {
                let (sx, sy) = step(x as isize, y as isize, k as isize - 4);
                w * diff.get_clamped(sx, sy, 0)
            })
            .sum()
    });

    (diff, smoothed)
}

/// LMMSE estimate of the difference at one pixel and its error variance.
fn lmmse_estimate(
    diff: &Image<f32>,
    smoothed: &Image<f32>,
    x: isize,
    y: isize,
    horizontal: bool,
) -> (f32, f32) {
    let mut moment = 0.0;
    let mut power = 0.0;
    let mut residual = 0.0;
    for m in -1..=1 {
        let (sx, sy) = if horizontal { (x + m, y) } else { (x, y + m) };
        let s = smoothed.get_clamped(sx, sy, 0);
        let d = diff.get_clamped(sx, sy, 0);
        moment += s;
        power += s * s;
        residual += (s - d) * (s - d);
    }

    let mean = smoothed.get_clamped(x, y, 0);
    let signal = (power / 2.0 - moment * moment / 6.0).max(0.0);
    let noise = residual / 3.0 + LMMSE_EPS;
    let gain = signal / (signal + noise);

    let estimate = mean + gain * (diff.get_clamped(x, y, 0) - mean);
    let variance = signal - gain * signal + LMMSE_EPS;
    (estimate, variance)
}

/// Fuses horizontal and vertical LMMSE colour-difference estimates,
/// each weighted by the other's error variance.
pub fn lmmse(mosaic: &Mosaic) -> Image<i32> {
    let (diff_h, smooth_h) = directional_differences(mosaic, true);
    let (diff_v, smooth_v) = directional_differences(mosaic, false);

    Image::from_fn(mosaic.width(), mosaic.height(), 1, |x, y, _| {
        let (x, y) = (x as isize, y as isize);
        let center = mosaic.at(x, y);
        if Mosaic::is_green(x, y) {
            return center;
        }

        let (h, var_h) = lmmse_estimate(&diff_h, &smooth_h, x, y, true);
        let (v, var_v) = lmmse_estimate(&diff_v, &smooth_v, x, y, false);
        let fused = (var_v * h + var_h * v) / (var_h + var_v);

        saturate_i16(center as f32 + fused + 0.5)
    })
}
