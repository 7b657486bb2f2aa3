//! Chroma denoising by cascaded guided filtering of Cb and Cr.

use tracing::{debug, instrument};

use crate::image_pipeline::color::{rgb_to_ycbcr, ycbcr_to_rgb};
use crate::image_pipeline::common::{Image, PipelineError, Result, Sample};
use crate::image_pipeline::filters::GuidedFilter;

/// Chroma is offset by one half so that it fits the unsigned working type.
const CHROMA_OFFSET: f32 = 0.5;

#[derive(Debug, Clone)]
pub struct ChromaDenoise {
    passes: Vec<GuidedFilter>,
}

impl ChromaDenoise {
    /// One guided filter pass per radius, run in order.
    pub fn new(radii: &[usize]) -> Result<Self> {
        if radii.is_empty() {
            return Err(PipelineError::InvalidParameter(
                "chroma denoise needs at least one pass".to_string(),
            ));
        }
        let passes = radii.iter().map(|&r| GuidedFilter::new(r)).collect::<Result<Vec<_>>>()?;
        Ok(Self { passes })
    }

    pub fn radii(&self) -> Vec<usize> {
        self.passes.iter().map(|p| p.radius()).collect()
    }

    /// Denoises normalized RGB (`0..=1`, three channels). Luma is untouched.
    #[instrument(
        skip_all,
        fields(width = rgb.width(), height = rgb.height(), passes = self.passes.len())
    )]
    pub fn process(&self, rgb: &Image<f32>, eps: &Image<f32>) -> Result<Image<f32>> {
        let (width, height) = rgb.dimensions();
        let ycbcr = Image::<f32>::from_fn(width, height, 3, |x, y, c| {
            rgb_to_ycbcr([rgb.get(x, y, 0), rgb.get(x, y, 1), rgb.get(x, y, 2)])[c]
        });

        let chroma: Vec<Image<u16>> = [1, 2]
            .into_iter()
            .map(|c| -> Result<Image<u16>> {
                let mut plane: Image<u16> = ycbcr
                    .channel(c)?
                    .map(|v| u16::from_f32((v + CHROMA_OFFSET) * 65535.0 + 0.5));
                for (i, pass) in self.passes.iter().enumerate() {
                    debug!(channel = c, pass = i, radius = pass.radius(), "guided pass");
                    plane = pass.apply(&plane, 0, eps)?;
                }
                Ok(plane)
            })
            .collect::<Result<_>>()?;

        Ok(Image::from_fn(width, height, 3, |x, y, c| {
            let cb = chroma[0].get(x, y, 0) as f32 / 65535.0 - CHROMA_OFFSET;
            let cr = chroma[1].get(x, y, 0) as f32 / 65535.0 - CHROMA_OFFSET;
            ycbcr_to_rgb([ycbcr.get(x, y, 0), cb, cr])[c]
        }))
    }
}
