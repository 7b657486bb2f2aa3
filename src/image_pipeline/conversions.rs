//! Pipeline orchestration
//!
//! [`DevelopPipeline`] chains the processing stages for one frame;
//! [`RawToTiffPipeline`] wraps it between a RAW reader and a TIFF writer.

mod defringe;
mod develop;
mod hdr;
mod quantize;
mod raw_to_tiff;


pub use defringe::{Defringe, PassthroughDefringe};
pub use develop::DevelopPipeline;
pub use hdr::{HdrCapture, highlight_weight};
pub use quantize::{NoiseTexture, QuantizedImage, Quantizer};
pub use raw_to_tiff::RawToTiffPipeline;
