//! TIFF writing module
//!
//! Developed images are written as interleaved RGB TIFF with optional
//! LZW or Deflate compression.

mod standard_tiff_writer;
pub mod types;
mod writer;

#[cfg(test)]
mod tests;

pub use standard_tiff_writer::StandardTiffWriter;
pub use types::{OutputConfig, OutputConfigBuilder, TiffCompression};
pub use writer::TiffWriter;
