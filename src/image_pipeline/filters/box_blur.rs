//! Separable box and binomial blurs.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::image_pipeline::common::{Image, PipelineError, Result, Sample};

/// Fixed binomial kernels, each normalized by a power of two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinomialKernel {
    /// `[1, 2, 1] / 4`
    Tap3,
    /// `[1, 4, 6, 4, 1] / 16`
    Tap5,
    /// `[1, 8, 28, 56, 70, 56, 28, 8, 1] / 256`
    Tap9,
}

impl BinomialKernel {
    pub fn weights(&self) -> &'static [i32] {
        match self {
            BinomialKernel::Tap3 => &[1, 2, 1],
            BinomialKernel::Tap5 => &[1, 4, 6, 4, 1],
            BinomialKernel::Tap9 => &[1, 8, 28, 56, 70, 56, 28, 8, 1],
        }
    }

    pub fn norm(&self) -> i32 {
        self.weights().iter().sum()
    }

    fn half_width(&self) -> isize {
        (self.weights().len() / 2) as isize
    }
}

/// Row pass then column pass, each accumulated in `i32` and divided by the
/// kernel norm before narrowing back to `u16`. Edges replicate.
pub fn binomial_blur(image: &Image<u16>, kernel: BinomialKernel) -> Image<u16> {
    let weights = kernel.weights();
    let norm = kernel.norm();
    let half = kernel.half_width();

    let rows = Image::<i32>::from_fn(image.width(), image.height(), image.channels(), |x, y, c| {
        let sum: i32 = weights
            .iter()
            .enumerate()
            .map(|(k, w)| {
                w * image.get_clamped(x as isize + k as isize - half, y as isize, c) as i32
            })
            .sum();
        sum / norm
    });

    Image::from_fn(image.width(), image.height(), image.channels(), |x, y, c| {
        let sum: i32 = weights
            .iter()
            .enumerate()
            .map(|(k, w)| w * rows.get_clamped(x as isize, y as isize + k as isize - half, c))
            .sum();
        u16::from_i32(sum / norm)
    })
}

/// Window offsets `-R/2 ..= -R/2 + R - 1`.
#[inline]
fn window(radius: usize) -> (isize, isize) {
    let lo = -((radius / 2) as isize);
    (lo, lo + radius as isize - 1)
}

/// Horizontal running window sum over each row, replicate-edge.
fn sum_rows(data: &[f64], width: usize, radius: usize) -> Vec<f64> {
    let (lo, hi) = window(radius);
    let last = width as isize - 1;
    let mut out = vec![0.0; data.len()];

    out.par_chunks_mut(width)
        .zip(data.par_chunks(width))
        .for_each(|(out, row)| {
            let at = |i: isize| row[i.clamp(0, last) as usize];
            let mut sum: f64 = (lo..=hi).map(at).sum();
            for (x, v) in out.iter_mut().enumerate() {
                *v = sum;
                let x = x as isize;
                sum += at(x + 1 + hi) - at(x + lo);
            }
        });
    out
}

fn transpose(data: &[f64], width: usize, height: usize) -> Vec<f64> {
    let mut out = vec![0.0; data.len()];
    out.par_chunks_mut(height).enumerate().for_each(|(x, col)| {
        for (y, v) in col.iter_mut().enumerate() {
            *v = data[y * width + x];
        }
    });
    out
}

/// Box sum of a `width × height` plane over an `R × R` window.
pub(crate) fn box_sum_plane(data: &[f64], width: usize, height: usize, radius: usize) -> Vec<f64> {
    if data.is_empty() {
        return Vec::new();
    }
    let horizontal = sum_rows(data, width, radius);
    let vertical = sum_rows(&transpose(&horizontal, width, height), height, radius);
    transpose(&vertical, height, width)
}

/// Box average of a plane; both passes divide by `R`.
pub(crate) fn box_average_plane(
    data: &[f64],
    width: usize,
    height: usize,
    radius: usize,
) -> Vec<f64> {
    let area = (radius * radius) as f64;
    box_sum_plane(data, width, height, radius)
        .into_iter()
        .map(|v| v / area)
        .collect()
}

/// Box average of every channel, returned as `f32`.
pub fn box_average<T: Sample>(image: &Image<T>, radius: usize) -> Result<Image<f32>> {
    if radius == 0 {
        return Err(PipelineError::InvalidParameter("box radius must be at least 1".to_string()));
    }
    let (width, height) = image.dimensions();
    let mut data = Vec::with_capacity(image.data().len());
    for c in 0..image.channels() {
        let plane: Vec<f64> = image.plane(c).iter().map(|v| v.to_f32() as f64).collect();
        data.extend(
            box_average_plane(&plane, width, height, radius)
                .into_iter()
                .map(|v| v as f32),
        );
    }
    Image::from_vec(width, height, image.channels(), data)
}
