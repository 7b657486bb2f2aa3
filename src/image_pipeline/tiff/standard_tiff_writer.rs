use std::io::{Cursor, Write};

use tiff::encoder::{TiffEncoder, colortype};
use tracing::debug;

use crate::image_pipeline::common::{PipelineError, Result};
use crate::image_pipeline::conversions::QuantizedImage;
use crate::image_pipeline::tiff::types::OutputConfig;
use crate::image_pipeline::tiff::writer::TiffWriter;

/// Interleaved RGB TIFF, 8 or 16 bits per sample.
pub struct StandardTiffWriter;

fn encoder<'a>(
    buffer: &'a mut Vec<u8>,
    config: &OutputConfig,
) -> Result<TiffEncoder<Cursor<&'a mut Vec<u8>>>> {
    let mut encoder = TiffEncoder::new(Cursor::new(buffer))
        .map_err(|e| PipelineError::EncodeError(e.to_string()))?
        .with_compression(config.compression.to_encoder());
    if config.predictor {
        encoder = encoder.with_predictor(tiff::tags::Predictor::Horizontal);
    }
    Ok(encoder)
}

impl TiffWriter for StandardTiffWriter {
    fn write_tiff(
        &self,
        image: &QuantizedImage,
        output: &mut dyn Write,
        config: &OutputConfig,
    ) -> Result<()> {
        let (width, height) = image.dimensions();
        debug!("Encoding {}-bit RGB TIFF: {}x{}", image.bits_per_sample(), width, height);

        let mut buffer = Vec::new();
        let mut encoder = encoder(&mut buffer, config)?;

        match image {
            QuantizedImage::Eight(rgb) => encoder.write_image::<colortype::RGB8>(
                width as u32,
                height as u32,
                &rgb.to_interleaved(),
            ),
            QuantizedImage::Sixteen(rgb) => encoder.write_image::<colortype::RGB16>(
                width as u32,
                height as u32,
                &rgb.to_interleaved(),
            ),
        }
        .map_err(|e| PipelineError::EncodeError(e.to_string()))?;
        drop(encoder);

        output.write_all(&buffer)?;

        debug!("TIFF encoding complete, {} bytes", buffer.len());
        Ok(())
    }
}
