//! Luma-adaptive regularization map for the chroma guided filter.
//!
//! Dark regions get the strongest smoothing: `ε` falls off with the
//! low-passed, gamma-compressed green channel.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::image_pipeline::common::{Image, PipelineError, Result, Sample};
use crate::image_pipeline::pyramid::{expand, reduce};

/// Shape of the chroma ε curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChromaEps {
    pub falloff: f32,
    pub boost: f32,
    pub base: f32,
}

impl Default for ChromaEps {
    fn default() -> Self {
        Self {
            falloff: 0.01,
            boost: 0.01,
            base: 0.01,
        }
    }
}

impl ChromaEps {
    pub fn validate(&self) -> Result<()> {
        let fields = [("falloff", self.falloff), ("boost", self.boost), ("base", self.base)];
        for (name, value) in fields {
            if !(value >= 0.0) {
                return Err(PipelineError::InvalidParameter(format!(
                    "chroma eps {name} {value} must be non-negative"
                )));
            }
        }
        Ok(())
    }

    /// `ε` for a normalized smoothed luma `x`, in squared 16-bit units.
    #[inline]
    pub fn eps_at(&self, x: f32) -> f32 {
        let scale = (self.boost * (-self.falloff * x * x).exp() + 1.0) * self.base * 65535.0;
        scale * scale
    }
}

/// ε map matching the size of `rgb`, derived from its green channel.
#[instrument(skip_all, fields(width = rgb.width(), height = rgb.height()))]
pub fn chroma_eps_map(rgb: &Image<u16>, params: &ChromaEps) -> Result<Image<f32>> {
    rgb.check_channel(1)?;
    let (width, height) = rgb.dimensions();
    let green = rgb.plane(1);

    let luma = Image::<i32>::from_fn(width, height, 1, |x, y, _| {
        let g = green[y * width + x] as f32 / 65535.0;
        u8::from_f32(0.5 + 255.0 * g.powf(1.0 / 2.2)) as i32
    });

    let half = reduce(&luma);
    let quarter = reduce(&half);
    let smoothed = expand(&expand(&quarter, half.width(), half.height()), width, height);

    Ok(smoothed.map(|v| params.eps_at(v as f32 / 255.0)))
}
