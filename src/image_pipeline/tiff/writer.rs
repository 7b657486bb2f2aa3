use std::io::Write;

use crate::image_pipeline::common::Result;
use crate::image_pipeline::conversions::QuantizedImage;
use crate::image_pipeline::tiff::types::OutputConfig;

pub trait TiffWriter {
    fn write_tiff(
        &self,
        image: &QuantizedImage,
        output: &mut dyn Write,
        config: &OutputConfig,
    ) -> Result<()>;
}
