//! Demosaicing module for reconstructing linear RGB from four Bayer planes
//!
//! Stages, in order:
//! 1. planes are reordered to R, G1, G2, B and hot-pixel clamped before the
//!    lens shading gain is applied ([`mosaic`])
//! 2. green is interpolated at red/blue sites and median filtered ([`green`])
//! 3. red and blue are rebuilt from filtered colour differences ([`chroma`])
//! 4. the result is normalized, clipped at the as-shot neutral and colour
//!    corrected into 16-bit linear RGB

pub mod chroma;
pub mod green;
pub mod mosaic;


use tracing::{debug, instrument};

use crate::image_pipeline::common::{Image, Result};
use crate::image_pipeline::common::image::round_u16;
use crate::image_pipeline::raw::RawFrame;

pub use chroma::ChromaSite;
pub use green::GreenInterpolation;
pub use mosaic::Mosaic;

#[derive(Debug, Clone, Copy, Default)]
pub struct Demosaic {
    green: GreenInterpolation,
}

impl Demosaic {
    pub fn new(green: GreenInterpolation) -> Self {
        Self { green }
    }

    pub fn green_interpolation(&self) -> GreenInterpolation {
        self.green
    }

    /// Full-resolution linear RGB, three channels scaled to `0..=65535`.
    #[instrument(skip_all, fields(
        width = frame.output_dimensions().0,
        height = frame.output_dimensions().1,
        arrangement = ?frame.arrangement,
    ))]
    pub fn process(&self, frame: &RawFrame) -> Result<Image<u16>> {
        frame.validate()?;

        let mosaic = {
            let _span = tracing::debug_span!("shade").entered();
            Mosaic::from_frame(frame)
        };

        let green = {
            let _span = tracing::debug_span!("green", strategy = ?self.green).entered();
            self.green.reconstruct(&mosaic)
        };

        let (red, blue) = {
            let _span = tracing::debug_span!("red_blue").entered();
            (
                chroma::reconstruct(&mosaic, &green, ChromaSite::Red),
                chroma::reconstruct(&mosaic, &green, ChromaSite::Blue),
            )
        };

        debug!("colour correcting");
        let channels = [&red, &green, &blue];
        let inv_range = 1.0 / frame.range;
        let matrix = frame.color_matrix;
        let as_shot = frame.as_shot;

        let corrected = Image::<u16>::from_fn(mosaic.width(), mosaic.height(), 3, |x, y, c| {
            let rgb: [f32; 3] = std::array::from_fn(|k| {
                (channels[k].get(x, y, 0) as f32 * inv_range).clamp(0.0, as_shot[k])
            });
            round_u16(matrix.apply(rgb)[c] * 65535.0)
        });

        Ok(corrected)
    }
}
