//! Self-guided filter (He et al.) with a per-pixel regularization map.
//!
//! The guide is the filtered channel itself. For a window of side `R`:
//!
//! ```text
//! a = var(I) / (var(I) + ε)      b = mean(I) - a · mean(I)
//! q = mean(a) · I + mean(b)
//! ```
//!
//! Flat regions (`var ≪ ε`) are averaged, edges (`var ≫ ε`) are kept.

use tracing::instrument;

use crate::image_pipeline::common::{Image, PipelineError, Result, Sample};
use crate::image_pipeline::filters::box_blur::box_average_plane;

/// Smallest denominator used for the `a` coefficient.
const VARIANCE_FLOOR: f64 = 1e-12;

#[derive(Debug, Clone, Copy)]
pub struct GuidedFilter {
    radius: usize,
}

impl GuidedFilter {
    pub fn new(radius: usize) -> Result<Self> {
        if radius == 0 {
            return Err(PipelineError::InvalidParameter(
                "guided filter radius must be at least 1".to_string(),
            ));
        }
        Ok(Self { radius })
    }

    pub fn radius(&self) -> usize {
        self.radius
    }

    /// Filters `channel` of `input` using the single-channel ε map `eps`,
    /// which must match the input size. Output is rounded and saturated to `O`.
    #[instrument(
        skip_all,
        fields(radius = self.radius, width = input.width(), height = input.height())
    )]
    pub fn apply<I: Sample, O: Sample>(
        &self,
        input: &Image<I>,
        channel: usize,
        eps: &Image<f32>,
    ) -> Result<Image<O>> {
        input.check_channel(channel)?;
        if eps.dimensions() != input.dimensions() {
            return Err(PipelineError::DimensionMismatch {
                expected: input.dimensions(),
                actual: eps.dimensions(),
            });
        }

        let (width, height) = input.dimensions();
        let radius = self.radius;

        let guide: Vec<f64> = input.plane(channel).iter().map(|v| v.to_f32() as f64).collect();
        let guide_sq: Vec<f64> = guide.iter().map(|v| v * v).collect();

        let mean_i = box_average_plane(&guide, width, height, radius);
        let mean_ii = box_average_plane(&guide_sq, width, height, radius);

        let (a, b): (Vec<f64>, Vec<f64>) = mean_i
            .iter()
            .zip(&mean_ii)
            .zip(eps.plane(0))
            .map(|((&m, &mm), &e)| {
                let var = (mm - m * m).max(0.0);
                let a = var / (var + e as f64).max(VARIANCE_FLOOR);
                (a, m - a * m)
            })
            .unzip();

        let mean_a = box_average_plane(&a, width, height, radius);
        let mean_b = box_average_plane(&b, width, height, radius);

        let data = guide
            .iter()
            .zip(mean_a.iter().zip(&mean_b))
            .map(|(&i, (&ma, &mb))| O::from_f32_rounded((ma * i + mb) as f32))
            .collect();

        Image::from_vec(width, height, 1, data)
    }

    /// Same as [`GuidedFilter::apply`] with a constant ε.
    pub fn apply_uniform<I: Sample, O: Sample>(
        &self,
        input: &Image<I>,
        channel: usize,
        eps: f32,
    ) -> Result<Image<O>> {
        let map = Image::filled(input.width(), input.height(), 1, eps);
        self.apply(input, channel, &map)
    }
}
