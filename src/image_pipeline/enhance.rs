//! Tone, colour and detail enhancement of the tonemapped image
//!
//! Stages, in order:
//! 1. contrast curve with black and white point ([`tone_curve`])
//! 2. chroma denoise in YCbCr, luma untouched ([`chroma_denoise`])
//! 3. selective hue shift and saturation in HSV ([`hue`])
//! 4. unsharp mask and local contrast on the value channel ([`sharpen`])
//! 5. back to RGB and linearized through the inverse sRGB curve
//!
//! Stages 2 and 4 can be disabled. The ε map driving stage 2 comes from
//! [`chroma_eps_map`].

pub mod chroma_denoise;
pub mod eps_map;
pub mod hue;
pub mod sharpen;
pub mod tone_curve;

#[cfg(test)]
mod tests;

use tracing::{debug, instrument};

use crate::image_pipeline::color::{hsv_to_rgb, rgb_to_hsv, srgb_decode_lut_rounded};
use crate::image_pipeline::common::{Image, PipelineError, Result, Sample};
use crate::image_pipeline::config::PipelineParameters;

pub use chroma_denoise::ChromaDenoise;
pub use eps_map::{ChromaEps, chroma_eps_map};
pub use hue::HueShift;
pub use sharpen::Sharpen;
pub use tone_curve::ContrastCurve;

#[derive(Debug, Clone)]
pub struct Enhance {
    curve: ContrastCurve,
    denoise: Option<ChromaDenoise>,
    hue: HueShift,
    sharpen: Option<Sharpen>,
}

impl Enhance {
    pub fn new(params: &PipelineParameters) -> Result<Self> {
        let denoise = if params.denoise {
            Some(ChromaDenoise::new(&params.denoise_radii)?)
        } else {
            None
        };
        let sharpen = if params.sharpen {
            Some(Sharpen::new([params.sharpen0, params.sharpen1], params.pop, params.pop_radius)?)
        } else {
            None
        };

        Ok(Self {
            curve: ContrastCurve::new(params.contrast, params.black_point, params.white_point)?,
            denoise,
            hue: HueShift {
                blues: params.blues,
                greens: params.greens,
                saturation: params.saturation,
            },
            sharpen,
        })
    }

    /// Enhances linear 16-bit RGB; `eps` is only read when chroma denoise is
    /// enabled and must then match the image size.
    #[instrument(skip_all, fields(
        width = rgb.width(),
        height = rgb.height(),
        denoise = self.denoise.is_some(),
        sharpen = self.sharpen.is_some(),
    ))]
    pub fn process(&self, rgb: &Image<u16>, eps: &Image<f32>) -> Result<Image<u16>> {
        if rgb.channels() != 3 {
            return Err(PipelineError::InvalidParameter(format!(
                "enhance expects RGB input, got {} channels",
                rgb.channels()
            )));
        }
        let (width, height) = rgb.dimensions();

        let curved = rgb.map(|v| self.curve.apply(v) as f32 / 65535.0);

        let denoised = match &self.denoise {
            Some(denoise) => denoise.process(&curved, eps)?,
            None => curved,
        };

        let hsv = Image::<f32>::from_fn(width, height, 3, |x, y, c| {
            rgb_to_hsv([denoised.get(x, y, 0), denoised.get(x, y, 1), denoised.get(x, y, 2)])[c]
        });

        let value = match &self.sharpen {
            Some(sharpen) => {
                let input = Image::<u16>::from_fn(width, height, 1, |x, y, _| {
                    u16::from_f32(hsv.get(x, y, 2) * 65535.0)
                });
                let sharpened = sharpen.process(&input)?;
                sharpened.map(|v| v as f32 / 65535.0)
            }
            None => hsv.channel(2)?,
        };

        debug!("converting back to RGB");
        let decode = srgb_decode_lut_rounded();
        let hue = self.hue;
        Ok(Image::from_fn(width, height, 3, |x, y, c| {
            let shifted = hue.apply([hsv.get(x, y, 0), hsv.get(x, y, 1), hsv.get(x, y, 2)]);
            let rgb = hsv_to_rgb([shifted[0], shifted[1], value.get(x, y, 0)]);
            decode[u16::from_f32(rgb[c] * 65535.0 + 0.5) as usize]
        }))
    }
}
