//! Logistic contrast curve applied in the sRGB-encoded domain.

use crate::image_pipeline::color::srgb_encode;
use crate::image_pipeline::common::{PipelineError, Result, Sample};

const MIN_CONTRAST: f32 = 1e-5;
const RANGE_FLOOR: f32 = 1e-5;

/// 16-bit lookup table mapping linear input to the contrast-shaped,
/// gamma-encoded value.
#[derive(Debug, Clone)]
pub struct ContrastCurve {
    lut: Vec<u16>,
}

impl ContrastCurve {
    pub fn new(contrast: f32, black_point: f32, white_point: f32) -> Result<Self> {
        if !(white_point > 0.0) {
            return Err(PipelineError::InvalidParameter(format!(
                "white point {white_point} must be positive"
            )));
        }
        if !(black_point < 1.0) {
            return Err(PipelineError::InvalidParameter(format!(
                "black point {black_point} must be below 1"
            )));
        }

        let p = contrast.max(MIN_CONTRAST);
        let a = 8.0 * p;
        let b = 4.0 * p;
        let low = 1.0 / (1.0 + b.exp());
        let span = 1.0 / (1.0 + (-a + b).exp()) - low;

        let lut = (0..=u16::MAX)
            .map(|i| {
                let encoded = srgb_encode(i as f32 / 65535.0);
                let k = (encoded - black_point).clamp(0.0, 1.0) / (1.0 - black_point + RANGE_FLOOR);
                let m = k / white_point;
                let t = (1.0 / (1.0 + (-a * m + b).exp()) - low) / span;
                u16::from_f32(t * 65535.0 + 0.5)
            })
            .collect();

        Ok(Self { lut })
    }

    #[inline]
    pub fn apply(&self, value: u16) -> u16 {
        self.lut[value as usize]
    }

    pub fn lut(&self) -> &[u16] {
        &self.lut
    }
}
