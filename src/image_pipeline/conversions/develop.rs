use tracing::{debug, info, instrument};

use crate::image_pipeline::common::{Image, PipelineError, PipelineTimings, Result, Sample, Timer};
use crate::image_pipeline::config::PipelineParameters;
use crate::image_pipeline::conversions::defringe::{Defringe, PassthroughDefringe};
use crate::image_pipeline::conversions::hdr::HdrCapture;
use crate::image_pipeline::conversions::quantize::{NoiseTexture, QuantizedImage, Quantizer};
use crate::image_pipeline::demosaic::Demosaic;
use crate::image_pipeline::enhance::{Enhance, chroma_eps_map};
use crate::image_pipeline::raw::RawFrame;
use crate::image_pipeline::tonemap::Tonemap;

/// Demosaic → exposure → optional highlight merge → tonemap → defringe →
/// enhance → quantize, configured once from [`PipelineParameters`].
pub struct DevelopPipeline {
    params: PipelineParameters,
    demosaic: Demosaic,
    tonemap: Tonemap,
    enhance: Enhance,
    quantizer: Quantizer,
    defringe: Box<dyn Defringe>,
}

impl DevelopPipeline {
    /// Validates `params` and prepares every stage.
    pub fn new(params: PipelineParameters) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            demosaic: Demosaic::new(params.green_interpolation),
            tonemap: Tonemap::new(params.tonemap_levels, params.tonemap_variance, params.shadows)?,
            enhance: Enhance::new(&params)?,
            quantizer: Quantizer::new(params.output_depth),
            defringe: Box::new(PassthroughDefringe),
            params,
        })
    }

    pub fn with_defringe<D: Defringe + 'static>(mut self, defringe: D) -> Self {
        self.defringe = Box::new(defringe);
        self
    }

    /// Dithers 8-bit output with a tiled noise texture.
    pub fn with_noise(mut self, noise: NoiseTexture) -> Self {
        self.quantizer = self.quantizer.with_noise(noise);
        self
    }

    pub fn parameters(&self) -> &PipelineParameters {
        &self.params
    }

    /// Demosaiced, colour-corrected linear RGB with no tone processing.
    pub fn linear_image(&self, frame: &RawFrame) -> Result<Image<u16>> {
        self.demosaic.process(frame)
    }

    pub fn develop(&self, frame: &RawFrame, hdr: Option<&HdrCapture>) -> Result<QuantizedImage> {
        self.develop_with_timings(frame, hdr).map(|(image, _)| image)
    }

    #[instrument(skip_all, fields(hdr = hdr.is_some()))]
    pub fn develop_with_timings(
        &self,
        frame: &RawFrame,
        hdr: Option<&HdrCapture>,
    ) -> Result<(QuantizedImage, PipelineTimings)> {
        let mut timings = PipelineTimings::new();
        let (width, height) = frame.output_dimensions();
        info!(width, height, "Developing frame");

        let timer = Timer::start("demosaic");
        let linear = self.demosaic.process(frame)?;
        timings.record(timer.stop());

        let timer = Timer::start("chroma_eps");
        let eps = if self.params.denoise {
            chroma_eps_map(&linear, &self.params.chroma_eps)?
        } else {
            Image::new(0, 0, 1)
        };
        timings.record(timer.stop());

        let timer = Timer::start("exposure");
        let gain = self.params.exposure.exp2();
        let base = linear.map(|v| u16::from_f32(0.5 + gain * v as f32));
        let alt = match hdr {
            Some(capture) => {
                debug!("merging HDR highlights");
                capture.merge_highlights(&linear)?
            }
            None => base.clone(),
        };
        timings.record(timer.stop());

        let timer = Timer::start("tonemap");
        let tonemapped = self.tonemap.process(&base, &alt)?;
        timings.record(timer.stop());

        let timer = Timer::start("defringe");
        let defringed = self.defringe.defringe(tonemapped)?;
        if defringed.dimensions() != linear.dimensions() || defringed.channels() != 3 {
            return Err(PipelineError::DimensionMismatch {
                expected: linear.dimensions(),
                actual: defringed.dimensions(),
            });
        }
        timings.record(timer.stop());

        let timer = Timer::start("enhance");
        let enhanced = self.enhance.process(&defringed, &eps)?;
        timings.record(timer.stop());

        let timer = Timer::start("quantize");
        let output = self.quantizer.quantize(&enhanced);
        timings.record(timer.stop());

        info!(
            "Develop complete: {}x{} in {:.3}ms",
            width,
            height,
            timings.total_duration().as_secs_f64() * 1000.0
        );
        Ok((output, timings))
    }
}
