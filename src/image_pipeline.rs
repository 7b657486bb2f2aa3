//! RAW development pipeline
//!
//! Turns four Bayer planes into a tonemapped, colour-corrected, denoised and
//! sharpened RGB image. Stage modules are usable on their own; the
//! [`conversions`] module wires them together and adds file I/O.

pub mod color;
pub mod common;
pub mod config;
pub mod conversions;
pub mod demosaic;
pub mod enhance;
pub mod filters;
pub mod pyramid;
pub mod raw;
pub mod tiff;
pub mod tonemap;

pub use common::{Image, PipelineError, PipelineTimings, Result};

pub use config::{OutputDepth, PipelineParameters, PipelineParametersBuilder};

pub use raw::{
    FrameMetadata, PackedFormat, PackedRawReader, RawFrame, RawFrameReader, RawLoaderReader,
    SensorArrangement, ShadingMap,
};

pub use demosaic::{Demosaic, GreenInterpolation};
pub use enhance::{ChromaEps, Enhance};
pub use filters::GuidedFilter;
pub use tonemap::Tonemap;

pub use self::tiff::{
    OutputConfig, OutputConfigBuilder, StandardTiffWriter, TiffCompression, TiffWriter,
};

pub use conversions::{
    Defringe, DevelopPipeline, HdrCapture, NoiseTexture, PassthroughDefringe, QuantizedImage,
    RawToTiffPipeline,
};
