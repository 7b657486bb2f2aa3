//! Spatial filters used by the demosaic and enhancement stages.
//!
//! - [`box_blur`]: fixed binomial kernels and radius-parameterized box sums
//! - [`guided`]: edge-preserving guided filter with a per-pixel ε map
//! - [`median`]: 3×3 median and 12-sample weighted median networks

pub mod box_blur;
pub mod guided;
pub mod median;


pub use box_blur::{BinomialKernel, binomial_blur, box_average};
pub use guided::GuidedFilter;
pub use median::{median3x3, median9, weighted_median12, weighted_median3x3};
