//! Output quantization with optional dithering.

use tracing::instrument;

use crate::image_pipeline::color::{srgb_encode_lut8, srgb_encode_lut_rounded};
use crate::image_pipeline::common::{Image, PipelineError, Result, Sample};
use crate::image_pipeline::config::OutputDepth;

/// Developed image, gamma encoded.
#[derive(Debug, Clone, PartialEq)]
pub enum QuantizedImage {
    Eight(Image<u8>),
    Sixteen(Image<u16>),
}

impl QuantizedImage {
    pub fn dimensions(&self) -> (usize, usize) {
        match self {
            QuantizedImage::Eight(image) => image.dimensions(),
            QuantizedImage::Sixteen(image) => image.dimensions(),
        }
    }

    pub fn depth(&self) -> OutputDepth {
        match self {
            QuantizedImage::Eight(_) => OutputDepth::Eight,
            QuantizedImage::Sixteen(_) => OutputDepth::Sixteen,
        }
    }

    pub fn bits_per_sample(&self) -> u16 {
        match self {
            QuantizedImage::Eight(_) => 8,
            QuantizedImage::Sixteen(_) => 16,
        }
    }
}

/// Tiled 8-bit noise, typically blue noise, used to dither 8-bit output.
#[derive(Debug, Clone)]
pub struct NoiseTexture {
    texture: Image<u8>,
}

impl NoiseTexture {
    pub fn new(width: usize, height: usize, channels: usize, data: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 || channels == 0 {
            return Err(PipelineError::InvalidDimensions(width, height));
        }
        Ok(Self {
            texture: Image::from_vec(width, height, channels, data)?,
        })
    }

    /// Noise offset in `-1..=1` LSB with a triangular-like distribution.
    #[inline]
    pub fn offset(&self, x: usize, y: usize, c: usize) -> f32 {
        let (width, height) = self.texture.dimensions();
        let t = self.texture.get(x % width, y % height, c % self.texture.channels());
        let n = t as f32 * 2.0 / 255.0 - 1.0;
        let sign = if n < 0.0 { -1.0 } else { 1.0 };
        sign * (1.0 - (1.0 - n.abs()).max(0.0).sqrt())
    }
}

#[derive(Debug, Clone)]
pub struct Quantizer {
    depth: OutputDepth,
    noise: Option<NoiseTexture>,
}

impl Quantizer {
    pub fn new(depth: OutputDepth) -> Self {
        Self { depth, noise: None }
    }

    pub fn with_noise(mut self, noise: NoiseTexture) -> Self {
        self.noise = Some(noise);
        self
    }

    pub fn depth(&self) -> OutputDepth {
        self.depth
    }

    /// Gamma encodes linear 16-bit RGB to the configured depth.
    #[instrument(skip_all, fields(depth = ?self.depth, dithered = self.noise.is_some()))]
    pub fn quantize(&self, linear: &Image<u16>) -> QuantizedImage {
        let (width, height) = linear.dimensions();
        match self.depth {
            OutputDepth::Eight => {
                let lut = srgb_encode_lut8();
                let noise = self.noise.as_ref();
                QuantizedImage::Eight(Image::from_fn(width, height, linear.channels(), |x, y, c| {
                    let dither = noise.map_or(0.0, |n| n.offset(x, y, c));
                    let v = linear.get(x, y, c) as f32 * 255.0 / 65535.0;
                    lut[u8::from_f32(0.5 + v + dither) as usize]
                }))
            }
            OutputDepth::Sixteen => {
                let lut = srgb_encode_lut_rounded();
                QuantizedImage::Sixteen(linear.map(|v| lut[v as usize]))
            }
        }
    }
}
