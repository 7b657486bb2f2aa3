use crate::image_pipeline::common::{Image, Result};

/// Removes colour fringing from the tonemapped image before enhancement.
///
/// Implementations receive and return 16-bit RGB of the same size.
pub trait Defringe: Send + Sync {
    fn defringe(&self, rgb: Image<u16>) -> Result<Image<u16>>;
}

/// Leaves the image unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughDefringe;

impl Defringe for PassthroughDefringe {
    fn defringe(&self, rgb: Image<u16>) -> Result<Image<u16>> {
        Ok(rgb)
    }
}
