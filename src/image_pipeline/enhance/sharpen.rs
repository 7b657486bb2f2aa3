//! Two-band unsharp mask followed by a guided local-contrast boost.

use tracing::instrument;

use crate::image_pipeline::common::{Image, PipelineError, Result, Sample};
use crate::image_pipeline::filters::{BinomialKernel, GuidedFilter, binomial_blur};
use crate::image_pipeline::pyramid::{expand, reduce};

/// Radius from which the wider kernel pair is used.
const WIDE_RADIUS: usize = 11;

/// Constant ε of the local-contrast filter, `(0.2 · 65535)²`.
const LOCAL_CONTRAST_EPS: f32 = (0.2 * 65535.0) * (0.2 * 65535.0);

#[derive(Debug, Clone, Copy)]
pub struct Sharpen {
    amounts: [f32; 2],
    pop: f32,
    kernels: [BinomialKernel; 2],
    filter: GuidedFilter,
}

impl Sharpen {
    /// `amounts` scale the fine and coarse detail bands; `pop` scales the
    /// difference from the guided base layer of radius `pop_radius`.
    pub fn new(amounts: [f32; 2], pop: f32, pop_radius: usize) -> Result<Self> {
        if !amounts.iter().chain([&pop]).all(|v| v.is_finite()) {
            return Err(PipelineError::InvalidParameter(
                "sharpen amounts must be finite".to_string(),
            ));
        }
        let kernels = if pop_radius < WIDE_RADIUS {
            [BinomialKernel::Tap3, BinomialKernel::Tap3]
        } else {
            [BinomialKernel::Tap5, BinomialKernel::Tap9]
        };
        Ok(Self {
            amounts,
            pop,
            kernels,
            filter: GuidedFilter::new(pop_radius)?,
        })
    }

    pub fn kernels(&self) -> [BinomialKernel; 2] {
        self.kernels
    }

    /// Sharpens a single-channel value plane.
    #[instrument(skip_all, fields(width = value.width(), height = value.height()))]
    pub fn process(&self, value: &Image<u16>) -> Result<Image<u16>> {
        let sharpened = self.unsharp(value);
        self.local_contrast(&sharpened)
    }

    fn unsharp(&self, value: &Image<u16>) -> Image<u16> {
        let blur1 = binomial_blur(value, self.kernels[0]);
        let blur2 = binomial_blur(&blur1, self.kernels[1]);
        let [k0, k1] = self.amounts;

        Image::from_fn(value.width(), value.height(), 1, |x, y, _| {
            let v = value.get(x, y, 0) as f32;
            let b1 = blur1.get(x, y, 0) as f32;
            let b2 = blur2.get(x, y, 0) as f32;
            u16::from_f32(b2 + k0 * (v - b1) + k1 * (b1 - b2) + 0.5)
        })
    }

    fn local_contrast(&self, sharpened: &Image<u16>) -> Result<Image<u16>> {
        let (width, height) = sharpened.dimensions();
        let down = reduce(&sharpened.map(|v| v as i32));
        let base: Image<i32> = self.filter.apply_uniform(&down, 0, LOCAL_CONTRAST_EPS)?;
        let up = expand(&base, width, height);

        Ok(Image::from_fn(width, height, 1, |x, y, _| {
            let u = up.get(x, y, 0) as f32;
            let s = sharpened.get(x, y, 0) as f32;
            u16::from_f32(0.5 + u + self.pop * (s - u))
        }))
    }
}
