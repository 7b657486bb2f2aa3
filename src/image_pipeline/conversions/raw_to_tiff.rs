use std::io::Write;
use std::path::Path;

use tracing::{info, instrument, warn};

use crate::image_pipeline::{
    common::{PipelineError, PipelineTimings, Result, Timer},
    config::PipelineParameters,
    conversions::develop::DevelopPipeline,
    raw::{RawFrameReader, RawLoaderReader},
    tiff::{OutputConfig, StandardTiffWriter, TiffWriter},
};

/// Reads a RAW file, develops it and writes an RGB TIFF.
pub struct RawToTiffPipeline<R: RawFrameReader, W: TiffWriter> {
    reader: R,
    writer: W,
    develop: DevelopPipeline,
    config: OutputConfig,
}

impl RawToTiffPipeline<RawLoaderReader, StandardTiffWriter> {
    pub fn new(params: PipelineParameters, config: OutputConfig) -> Result<Self> {
        Ok(Self {
            reader: RawLoaderReader::new(),
            writer: StandardTiffWriter,
            develop: DevelopPipeline::new(params)?,
            config,
        })
    }
}

impl<R: RawFrameReader, W: TiffWriter> RawToTiffPipeline<R, W> {
    pub fn with_custom(
        reader: R,
        writer: W,
        develop: DevelopPipeline,
        config: OutputConfig,
    ) -> Self {
        Self {
            reader,
            writer,
            develop,
            config,
        }
    }

    fn validate_dimensions(&self, width: usize, height: usize) -> Result<()> {
        if !self.config.validate_dimensions {
            return Ok(());
        }

        if width == 0 || height == 0 {
            return Err(PipelineError::InvalidDimensions(width, height));
        }

        if let Some(max) = self.config.max_dimension {
            if width > max || height > max {
                warn!("Image dimensions {}x{} exceed maximum {}", width, height, max);
                return Err(PipelineError::InvalidDimensions(width, height));
            }
        }

        Ok(())
    }

    #[instrument(skip(self, input_data, output), fields(input_size = input_data.len()))]
    pub fn convert(&self, input_data: &[u8], output: &mut dyn Write) -> Result<()> {
        self.convert_with_timings(input_data, output).map(|_| ())
    }

    pub fn convert_with_timings(
        &self,
        input_data: &[u8],
        output: &mut dyn Write,
    ) -> Result<PipelineTimings> {
        let mut timings = PipelineTimings::new();
        info!("Starting RAW to TIFF conversion");

        let timer = Timer::start("decode_raw");
        let frame = self.reader.read_frame(input_data)?;
        timings.record(timer.stop());

        let (width, height) = frame.output_dimensions();
        {
            let _span = tracing::info_span!("validate_dimensions", width, height).entered();
            self.validate_dimensions(width, height)?;
        }

        let (image, develop_timings) = self.develop.develop_with_timings(&frame, None)?;
        for step in develop_timings.steps() {
            timings.record((step.name, step.duration));
        }

        let timer = Timer::start("encode_tiff");
        self.writer.write_tiff(&image, output, &self.config)?;
        timings.record(timer.stop());

        info!(
            width,
            height,
            bits = image.bits_per_sample(),
            ms = timings.total_duration().as_secs_f64() * 1000.0,
            "Conversion complete"
        );
        Ok(timings)
    }

    #[instrument(skip(self, input_path, output_path))]
    pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_path: P,
        output_path: Q,
    ) -> Result<PipelineTimings> {
        let input_path = input_path.as_ref();
        let output_path = output_path.as_ref();

        info!(
            input = %input_path.display(),
            output = %output_path.display(),
            "Converting file"
        );

        let input_data = {
            let _span = tracing::info_span!("read_input_file").entered();
            std::fs::read(input_path)
                .map_err(|e| {
                    PipelineError::InputReadError(format!("{}: {}", input_path.display(), e))
                })?
        };

        let mut output_file = {
            let _span = tracing::info_span!("create_output_file").entered();
            std::fs::File::create(output_path)
                .map_err(|e| {
                    PipelineError::OutputWriteError(format!("{}: {}", output_path.display(), e))
                })?
        };

        self.convert_with_timings(&input_data, &mut output_file)
    }

    pub fn develop_pipeline(&self) -> &DevelopPipeline {
        &self.develop
    }

    pub fn config(&self) -> &OutputConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: OutputConfig) {
        self.config = config;
    }
}
