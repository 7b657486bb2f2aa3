//! Multiresolution exposure fusion.
//!
//! Three gamma-encoded exposures (`base`, `base × gain`, `alt`) are weighted
//! per pixel by how close their luma sits to mid-grey, and blended level by
//! level in Laplacian space. Detail from the well-exposed input wins at every
//! scale, so the result both merges the exposures and compresses range.

use tracing::{debug, instrument};

use crate::image_pipeline::color::{luma, srgb_decode_lut, srgb_encode_lut};
use crate::image_pipeline::common::{Image, PipelineError, Result, Sample};
use crate::image_pipeline::pyramid::{GaussianPyramid, LaplacianPyramid};


/// Fixed-point scale of a normalized weight.
pub const WEIGHT_ONE: f32 = 16384.0;

const WEIGHT_LUT_SCALE: f32 = i16::MAX as f32;
const WEIGHT_FLOOR: f32 = 1e-12;

/// Gaussian well-exposedness of a normalized luma value.
#[inline]
pub fn well_exposedness(luma: f32, variance: f32) -> f32 {
    let d = luma - 0.5;
    (-(d * d) / (2.0 * variance * variance)).exp()
}

/// Per-exposure weights for one pixel, normalized to sum to one.
pub fn fusion_weights(lumas: &[f32], variance: f32) -> Vec<f32> {
    let raw: Vec<f32> = lumas.iter().map(|&l| well_exposedness(l, variance)).collect();
    let total: f32 = raw.iter().sum::<f32>() + WEIGHT_FLOOR;
    raw.into_iter().map(|w| w / total).collect()
}

fn weight_lut(variance: f32) -> Vec<i16> {
    (0..=u16::MAX)
        .map(|i| i16::from_f32(well_exposedness(i as f32 / 65535.0, variance) * WEIGHT_LUT_SCALE))
        .collect()
}

#[derive(Debug, Clone, Copy)]
pub struct Tonemap {
    levels: usize,
    variance: f32,
    gain: f32,
}

impl Tonemap {
    /// `levels` is the pyramid depth, `variance` the width of the
    /// well-exposedness curve, `gain` the shadow lift of the second exposure.
    pub fn new(levels: usize, variance: f32, gain: f32) -> Result<Self> {
        if levels == 0 {
            return Err(PipelineError::InvalidParameter(
                "tonemap needs at least one pyramid level".to_string(),
            ));
        }
        if !(variance > 0.0) {
            return Err(PipelineError::InvalidParameter(format!(
                "tonemap variance {variance} must be positive"
            )));
        }
        if !(gain > 0.0) {
            return Err(PipelineError::InvalidParameter(format!(
                "tonemap gain {gain} must be positive"
            )));
        }
        Ok(Self { levels, variance, gain })
    }

    pub fn levels(&self) -> usize {
        self.levels
    }

    /// Fuses two linear RGB exposures of equal size into one linear RGB image.
    #[instrument(
        skip_all,
        fields(width = base.width(), height = base.height(), levels = self.levels)
    )]
    pub fn process(&self, base: &Image<u16>, alt: &Image<u16>) -> Result<Image<u16>> {
        if base.dimensions() != alt.dimensions() {
            return Err(PipelineError::DimensionMismatch {
                expected: base.dimensions(),
                actual: alt.dimensions(),
            });
        }
        if base.channels() != 3 || alt.channels() != 3 {
            return Err(PipelineError::InvalidParameter("tonemap expects RGB input".to_string()));
        }

        let encode = srgb_encode_lut();
        let gain = self.gain;
        let exposures = [
            base.map(|v| encode[v as usize]),
            base.map(|v| encode[u16::from_f32(v as f32 * gain) as usize]),
            alt.map(|v| encode[v as usize]),
        ];

        let weights = self.normalized_weights(&exposures);

        let depth = self.levels;
        let laplacians: Vec<LaplacianPyramid> = exposures
            .iter()
            .map(|e| LaplacianPyramid::from_gaussian(&GaussianPyramid::from_samples(e, depth)))
            .collect();
        let weight_pyramids: Vec<GaussianPyramid> = weights
            .iter()
            .map(|w| GaussianPyramid::from_samples(w, depth))
            .collect();

        debug!("blending {} levels", depth + 1);
        let combined = (0..=depth)
            .map(|k| {
                let shape = &laplacians[0].levels()[k];
                Image::from_fn(shape.width(), shape.height(), shape.channels(), |x, y, c| {
                    let sum: f32 = laplacians
                        .iter()
                        .zip(&weight_pyramids)
                        .map(|(lap, w)| {
                            let weight = w.level(k).get(x, y, 0) as f32 / WEIGHT_ONE;
                            lap.levels()[k].get(x, y, c) as f32 * weight
                        })
                        .sum();
                    (sum + 0.5).floor() as i32
                })
            })
            .collect();

        let fused: Image<u16> = LaplacianPyramid::from_levels(combined)?.collapse_saturating();

        let decode = srgb_decode_lut();
        Ok(fused.map(|v| decode[v as usize]))
    }

    /// Fixed-point weights per exposure, summing to `WEIGHT_ONE` up to
    /// truncation.
    fn normalized_weights(&self, exposures: &[Image<u16>; 3]) -> [Image<u16>; 3] {
        let lut = weight_lut(self.variance);
        let (width, height) = exposures[0].dimensions();

        let raw: Vec<Image<f32>> = exposures
            .iter()
            .map(|e| {
                Image::from_fn(width, height, 1, |x, y, _| {
                    let y_val = luma(
                        e.get(x, y, 0) as f32,
                        e.get(x, y, 1) as f32,
                        e.get(x, y, 2) as f32,
                    );
                    lut[u16::from_f32(y_val) as usize] as f32 / WEIGHT_LUT_SCALE
                })
            })
            .collect();

        std::array::from_fn(|i| {
            Image::from_fn(width, height, 1, |x, y, _| {
                let total: f32 = raw.iter().map(|r| r.get(x, y, 0)).sum::<f32>() + WEIGHT_FLOOR;
                u16::from_f32(WEIGHT_ONE * raw[i].get(x, y, 0) / total)
            })
        })
    }
}
