//! Highlight recovery from a second, shorter exposure.
//!
//! The base exposure is replaced by the scaled-down HDR capture only where
//! both are close to clipping.

use tracing::instrument;

use crate::image_pipeline::color::luma;
use crate::image_pipeline::common::{Image, PipelineError, Result, Sample};

const MASK_SHARPNESS: f32 = 16.0;

/// Second RGB exposure at the demosaiced resolution.
#[derive(Debug, Clone)]
pub struct HdrCapture {
    image: Image<u16>,
    scale: f32,
    input_gain: f32,
}

impl HdrCapture {
    /// `scale` is the exposure of the base frame relative to `image`;
    /// `input_gain` is applied to the merged highlights.
    pub fn new(image: Image<u16>, scale: f32, input_gain: f32) -> Result<Self> {
        if image.channels() != 3 {
            return Err(PipelineError::InvalidParameter(format!(
                "HDR capture must be RGB, got {} channels",
                image.channels()
            )));
        }
        if !(scale.is_finite() && scale > 0.0) {
            return Err(PipelineError::InvalidParameter(format!(
                "HDR scale {scale} must be positive"
            )));
        }
        if !(input_gain.is_finite() && input_gain > 0.0) {
            return Err(PipelineError::InvalidParameter(format!(
                "HDR input gain {input_gain} must be positive"
            )));
        }
        Ok(Self {
            image,
            scale,
            input_gain,
        })
    }

    pub fn image(&self) -> &Image<u16> {
        &self.image
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn input_gain(&self) -> f32 {
        self.input_gain
    }

    fn check_size(&self, base: &Image<u16>) -> Result<()> {
        if base.dimensions() != self.image.dimensions() {
            return Err(PipelineError::DimensionMismatch {
                expected: base.dimensions(),
                actual: self.image.dimensions(),
            });
        }
        Ok(())
    }

    fn normalized(image: &Image<u16>, x: usize, y: usize) -> [f32; 3] {
        std::array::from_fn(|c| image.get(x, y, c) as f32 / 65535.0)
    }

    /// Per-pixel weight of the HDR capture, in `0..=1`.
    pub fn mask(&self, base: &Image<u16>) -> Result<Image<f32>> {
        self.check_size(base)?;
        let (width, height) = base.dimensions();
        Ok(Image::from_fn(width, height, 1, |x, y, _| {
            let [hr, hg, hb] = Self::normalized(&self.image, x, y);
            let [br, bg, bb] = Self::normalized(base, x, y);
            highlight_weight(luma(hr, hg, hb) / self.scale, luma(br, bg, bb))
        }))
    }

    /// Base exposure with its highlights taken from the HDR capture, in the
    /// 16-bit working domain.
    #[instrument(skip_all, fields(scale = self.scale, input_gain = self.input_gain))]
    pub fn merge_highlights(&self, base: &Image<u16>) -> Result<Image<u16>> {
        let mask = self.mask(base)?;
        let (width, height) = base.dimensions();
        Ok(Image::from_fn(width, height, 3, |x, y, c| {
            let m = mask.get(x, y, 0);
            let hdr = self.image.get(x, y, c) as f32 / 65535.0;
            let low = base.get(x, y, c) as f32 / 65535.0;
            let highlights = m * hdr + (1.0 - m) * self.scale * low;
            u16::from_f32(self.input_gain * highlights * 65535.0)
        }))
    }
}

/// Product of two "near white" bells, squared. `hdr_luma` is clamped to
/// `0..=1` first.
#[inline]
pub fn highlight_weight(hdr_luma: f32, base_luma: f32) -> f32 {
    let bell = |l: f32| (-MASK_SHARPNESS * (l - 1.0) * (l - 1.0)).exp();
    let m = bell(hdr_luma.clamp(0.0, 1.0)) * bell(base_luma);
    m * m
}
