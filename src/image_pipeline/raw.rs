//! RAW frame input module
//!
//! A [`RawFrame`] is the demosaic input: four half-resolution Bayer planes in
//! sensor order plus the calibration that travels with them. Frames come from
//! a [`RawFrameReader`], either a packed sensor buffer ([`PackedRawReader`])
//! or any file format rawloader understands ([`RawLoaderReader`]).

mod packed;
mod rawloader_reader;
mod reader;
pub mod types;

#[cfg(test)]
mod tests;

pub use packed::{PackedFormat, PackedRawReader, deinterleave};
pub use rawloader_reader::RawLoaderReader;
pub use reader::RawFrameReader;
pub use types::{
    DEFAULT_WORKING_RANGE, FrameMetadata, RawFrame, SensorArrangement, SensorLevels, ShadingMap,
};
