//! RAW frame reader backed by the rawloader library.
//!
//! Supports every Bayer format rawloader decodes (ARW, CR2, NEF, DNG, RAF, ...).
//! The decoded mosaic is split into four planes, black/white levels are
//! normalized into the working range, and the camera calibration becomes the
//! frame's as-shot neutral and camera-to-sRGB matrix.

use std::io::Cursor;

use rawloader::RawImageData as RawloaderImageData;
use tracing::{debug, warn};

use crate::image_pipeline::color::ColorMatrix;
use crate::image_pipeline::common::{Image, PipelineError, Result};
use crate::image_pipeline::raw::reader::RawFrameReader;
use crate::image_pipeline::raw::types::{
    DEFAULT_WORKING_RANGE, FrameMetadata, RawFrame, SensorArrangement, SensorLevels, ShadingMap,
};

pub struct RawLoaderReader {
    range: f32,
}

impl RawLoaderReader {
    pub fn new() -> Self {
        Self {
            range: DEFAULT_WORKING_RANGE,
        }
    }

    pub fn with_range(mut self, range: f32) -> Self {
        self.range = range;
        self
    }
}

impl Default for RawLoaderReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Green-relative white balance multipliers; unknown coefficients become 1.
fn white_balance(coeffs: [f32; 4]) -> [f32; 3] {
    let green = coeffs[1];
    if !green.is_finite() || green <= 0.0 {
        return [1.0; 3];
    }
    [coeffs[0], coeffs[1], coeffs[2]]
        .map(|c| if c.is_finite() && c > 0.0 { c / green } else { 1.0 })
}

/// Splits an interleaved Bayer mosaic into its four planes in sensor order.
pub(crate) fn split_mosaic<S, F>(
    samples: &[S],
    width: usize,
    height: usize,
    convert: F,
) -> Result<[Image<u16>; 4]>
where
    S: Copy + Sync,
    F: Fn(S) -> u16 + Sync,
{
    let (plane_w, plane_h) = (width / 2, height / 2);
    if plane_w == 0 || plane_h == 0 || samples.len() < width * height {
        return Err(PipelineError::InvalidDimensions(width, height));
    }
    Ok(std::array::from_fn(|plane| {
        let (dx, dy) = (plane & 1, plane >> 1);
        Image::from_fn(plane_w, plane_h, 1, |x, y, _| {
            convert(samples[(2 * y + dy) * width + 2 * x + dx])
        })
    }))
}

impl RawFrameReader for RawLoaderReader {
    fn read_frame(&self, data: &[u8]) -> Result<RawFrame> {
        debug!("Decoding RAW image, {} bytes", data.len());

        let decoded = rawloader::decode(&mut Cursor::new(data))
            .map_err(|e| PipelineError::DecodeError(e.to_string()))?;

        if decoded.cpp != 1 {
            return Err(PipelineError::UnsupportedFormat(format!(
                "{} components per pixel, expected a Bayer mosaic",
                decoded.cpp
            )));
        }

        let width = decoded.width;
        let height = decoded.height;
        debug!("Decoded image: {}x{} ({} {})", width, height, decoded.make, decoded.model);

        let colors: [usize; 4] =
            std::array::from_fn(|plane| decoded.cfa.color_at(plane >> 1, plane & 1));
        let arrangement = SensorArrangement::from_cfa_colors(colors).ok_or_else(|| {
            PipelineError::UnsupportedFormat(format!("CFA pattern {}", decoded.cfa.name))
        })?;

        let planes = match &decoded.data {
            RawloaderImageData::Integer(values) => split_mosaic(values, width, height, |v| v)?,
            // float data is normalized to 0.0-1.0
            RawloaderImageData::Float(values) => {
                split_mosaic(values, width, height, |v| (v * u16::MAX as f32) as u16)?
            }
        };

        let levels = SensorLevels {
            black: colors.map(|c| decoded.blacklevels[c] as f32),
            white: colors.map(|c| decoded.whitelevels[c] as f32),
        };

        let wb = white_balance(decoded.wb_coeffs);
        let as_shot = wb.map(|m| 1.0 / m);

        let cam_to_xyz = decoded.cam_to_xyz_normalized();
        let cam_to_xyz =
            ColorMatrix(std::array::from_fn(|r| std::array::from_fn(|c| cam_to_xyz[r][c])));
        let color_matrix = if cam_to_xyz.0.iter().flatten().all(|v| v.is_finite()) {
            ColorMatrix::XYZ_TO_SRGB
                .multiply(&cam_to_xyz)
                .normalize_rows()
                .scale_columns(wb)
        } else {
            warn!("camera matrix unavailable, using identity");
            ColorMatrix::IDENTITY.scale_columns(wb)
        };

        debug!(?arrangement, ?as_shot, "calibration extracted");

        let metadata = FrameMetadata {
            arrangement,
            levels,
            as_shot,
            color_matrix,
            shading: std::array::from_fn(|_| ShadingMap::unit()),
        };

        RawFrame::from_sensor(planes, &metadata, self.range)
    }
}
