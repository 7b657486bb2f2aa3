//! Common utilities module
//!
//! Shared building blocks used by every stage: the planar sample grid, the
//! numeric sample trait, the error type and stage timing.

pub mod error;
pub mod image;
pub mod timing;


pub use error::{PipelineError, Result};
pub use image::{Image, Sample};
pub use timing::{PipelineTimings, StepTiming, Timer};
