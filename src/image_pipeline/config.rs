//! Development parameters
//!
//! Every scalar that shapes a development run lives in [`PipelineParameters`].
//! Parameters are read-only for the duration of a run and can be loaded from
//! JSON (missing fields take their defaults) or assembled with the builder.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::image_pipeline::common::{PipelineError, Result};
use crate::image_pipeline::demosaic::GreenInterpolation;
use crate::image_pipeline::enhance::ChromaEps;


/// Bit depth of the developed image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputDepth {
    /// Dithered 8-bit sRGB
    #[default]
    Eight,
    /// 16-bit sRGB
    Sixteen,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineParameters {
    /// Exposure compensation in stops
    pub exposure: f32,
    /// Shadow lift of the brightened tonemap exposure
    pub shadows: f32,
    pub tonemap_variance: f32,
    pub tonemap_levels: usize,
    pub contrast: f32,
    pub black_point: f32,
    pub white_point: f32,
    pub saturation: f32,
    /// Hue rotation of the blue band, in degrees
    pub blues: f32,
    /// Hue rotation of the green band, in degrees
    pub greens: f32,
    pub sharpen0: f32,
    pub sharpen1: f32,
    /// Local contrast strength
    pub pop: f32,
    pub pop_radius: usize,
    pub chroma_eps: ChromaEps,
    /// Guided filter radius of each chroma denoise pass
    pub denoise_radii: Vec<usize>,
    pub denoise: bool,
    pub sharpen: bool,
    pub green_interpolation: GreenInterpolation,
    pub output_depth: OutputDepth,
}

impl Default for PipelineParameters {
    fn default() -> Self {
        Self {
            exposure: 0.0,
            shadows: 2.0,
            tonemap_variance: 0.25,
            tonemap_levels: 9,
            contrast: 1.0,
            black_point: 0.0,
            white_point: 1.0,
            saturation: 1.0,
            blues: 0.0,
            greens: 0.0,
            sharpen0: 2.0,
            sharpen1: 2.0,
            pop: 1.0,
            pop_radius: 25,
            chroma_eps: ChromaEps::default(),
            denoise_radii: vec![15, 15, 25],
            denoise: true,
            sharpen: true,
            green_interpolation: GreenInterpolation::default(),
            output_depth: OutputDepth::default(),
        }
    }
}

impl PipelineParameters {
    pub fn builder() -> PipelineParametersBuilder {
        PipelineParametersBuilder::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let params: Self =
            serde_json::from_str(json).map_err(|e| PipelineError::ConfigError(e.to_string()))?;
        params.validate()?;
        Ok(params)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading parameters from {}", path.display());
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| PipelineError::ConfigError(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(PipelineError::InvalidParameter(msg));

        if self.tonemap_levels == 0 {
            return invalid("tonemap_levels must be at least 1".to_string());
        }
        if !(self.tonemap_variance > 0.0) {
            return invalid(format!("tonemap_variance {} must be positive", self.tonemap_variance));
        }
        if !(self.shadows > 0.0) {
            return invalid(format!("shadows {} must be positive", self.shadows));
        }
        if !(self.white_point > 0.0) {
            return invalid(format!("white_point {} must be positive", self.white_point));
        }
        if !(self.black_point < 1.0) {
            return invalid(format!("black_point {} must be below 1", self.black_point));
        }
        if !self.exposure.is_finite() {
            return invalid(format!("exposure {} must be finite", self.exposure));
        }
        if self.pop_radius == 0 {
            return invalid("pop_radius must be at least 1".to_string());
        }
        if self.denoise_radii.is_empty() || self.denoise_radii.contains(&0) {
            return invalid(format!(
                "denoise_radii {:?} must be non-empty and non-zero",
                self.denoise_radii
            ));
        }
        self.chroma_eps.validate()
    }
}

/// Builder for PipelineParameters
#[derive(Default)]
pub struct PipelineParametersBuilder {
    exposure: Option<f32>,
    shadows: Option<f32>,
    tonemap_variance: Option<f32>,
    tonemap_levels: Option<usize>,
    contrast: Option<f32>,
    black_point: Option<f32>,
    white_point: Option<f32>,
    saturation: Option<f32>,
    blues: Option<f32>,
    greens: Option<f32>,
    sharpen0: Option<f32>,
    sharpen1: Option<f32>,
    pop: Option<f32>,
    pop_radius: Option<usize>,
    chroma_eps: Option<ChromaEps>,
    denoise_radii: Option<Vec<usize>>,
    denoise: Option<bool>,
    sharpen: Option<bool>,
    green_interpolation: Option<GreenInterpolation>,
    output_depth: Option<OutputDepth>,
}

impl PipelineParametersBuilder {
    pub fn exposure(mut self, stops: f32) -> Self {
        self.exposure = Some(stops);
        self
    }

    pub fn shadows(mut self, gain: f32) -> Self {
        self.shadows = Some(gain);
        self
    }

    pub fn tonemap_variance(mut self, variance: f32) -> Self {
        self.tonemap_variance = Some(variance);
        self
    }

    pub fn tonemap_levels(mut self, levels: usize) -> Self {
        self.tonemap_levels = Some(levels);
        self
    }

    pub fn contrast(mut self, contrast: f32) -> Self {
        self.contrast = Some(contrast);
        self
    }

    pub fn black_point(mut self, black: f32) -> Self {
        self.black_point = Some(black);
        self
    }

    pub fn white_point(mut self, white: f32) -> Self {
        self.white_point = Some(white);
        self
    }

    pub fn saturation(mut self, saturation: f32) -> Self {
        self.saturation = Some(saturation);
        self
    }

    pub fn blues(mut self, degrees: f32) -> Self {
        self.blues = Some(degrees);
        self
    }

    pub fn greens(mut self, degrees: f32) -> Self {
        self.greens = Some(degrees);
        self
    }

    pub fn sharpen0(mut self, amount: f32) -> Self {
        self.sharpen0 = Some(amount);
        self
    }

    pub fn sharpen1(mut self, amount: f32) -> Self {
        self.sharpen1 = Some(amount);
        self
    }

    pub fn pop(mut self, pop: f32) -> Self {
        self.pop = Some(pop);
        self
    }

    pub fn pop_radius(mut self, radius: usize) -> Self {
        self.pop_radius = Some(radius);
        self
    }

    pub fn chroma_eps(mut self, eps: ChromaEps) -> Self {
        self.chroma_eps = Some(eps);
        self
    }

    pub fn denoise_radii(mut self, radii: Vec<usize>) -> Self {
        self.denoise_radii = Some(radii);
        self
    }

    pub fn denoise(mut self, enable: bool) -> Self {
        self.denoise = Some(enable);
        self
    }

    pub fn sharpen(mut self, enable: bool) -> Self {
        self.sharpen = Some(enable);
        self
    }

    pub fn green_interpolation(mut self, strategy: GreenInterpolation) -> Self {
        self.green_interpolation = Some(strategy);
        self
    }

    pub fn output_depth(mut self, depth: OutputDepth) -> Self {
        self.output_depth = Some(depth);
        self
    }

    pub fn build(self) -> PipelineParameters {
        let default = PipelineParameters::default();
        PipelineParameters {
            exposure: self.exposure.unwrap_or(default.exposure),
            shadows: self.shadows.unwrap_or(default.shadows),
            tonemap_variance: self.tonemap_variance.unwrap_or(default.tonemap_variance),
            tonemap_levels: self.tonemap_levels.unwrap_or(default.tonemap_levels),
            contrast: self.contrast.unwrap_or(default.contrast),
            black_point: self.black_point.unwrap_or(default.black_point),
            white_point: self.white_point.unwrap_or(default.white_point),
            saturation: self.saturation.unwrap_or(default.saturation),
            blues: self.blues.unwrap_or(default.blues),
            greens: self.greens.unwrap_or(default.greens),
            sharpen0: self.sharpen0.unwrap_or(default.sharpen0),
            sharpen1: self.sharpen1.unwrap_or(default.sharpen1),
            pop: self.pop.unwrap_or(default.pop),
            pop_radius: self.pop_radius.unwrap_or(default.pop_radius),
            chroma_eps: self.chroma_eps.unwrap_or(default.chroma_eps),
            denoise_radii: self.denoise_radii.unwrap_or(default.denoise_radii),
            denoise: self.denoise.unwrap_or(default.denoise),
            sharpen: self.sharpen.unwrap_or(default.sharpen),
            green_interpolation: self.green_interpolation.unwrap_or(default.green_interpolation),
            output_depth: self.output_depth.unwrap_or(default.output_depth),
        }
    }
}
