//! RAW frame data types

use serde::{Deserialize, Serialize};

use crate::image_pipeline::color::ColorMatrix;
use crate::image_pipeline::common::{Image, PipelineError, Result, Sample};

/// White level of the normalized working domain. Demosaic saturates its
/// intermediates to `i16`, so frames stay at or below `i16::MAX`.
pub const DEFAULT_WORKING_RANGE: f32 = 16384.0;

/// Colour filter layout of the top-left 2×2 Bayer quad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorArrangement {
    Rggb,
    Grbg,
    Gbrg,
    Bggr,
}

impl SensorArrangement {
    /// Sensor plane index holding R, G1 (top-row green), G2, B.
    ///
    /// Plane `i` is the quad position `(x = i & 1, y = i >> 1)`.
    pub fn canonical_order(&self) -> [usize; 4] {
        match self {
            SensorArrangement::Rggb => [0, 1, 2, 3],
            SensorArrangement::Grbg => [1, 0, 3, 2],
            SensorArrangement::Gbrg => [2, 0, 3, 1],
            SensorArrangement::Bggr => [3, 1, 2, 0],
        }
    }

    /// Pattern from the colour index (`0 = R`, `1 = G`, `2 = B`) at each quad
    /// position in plane order.
    pub fn from_cfa_colors(colors: [usize; 4]) -> Option<Self> {
        match colors {
            [0, 1, 1, 2] => Some(SensorArrangement::Rggb),
            [1, 0, 2, 1] => Some(SensorArrangement::Grbg),
            [1, 2, 0, 1] => Some(SensorArrangement::Gbrg),
            [2, 1, 1, 0] => Some(SensorArrangement::Bggr),
            _ => None,
        }
    }
}

impl TryFrom<i32> for SensorArrangement {
    type Error = PipelineError;

    fn try_from(code: i32) -> Result<Self> {
        match code {
            0 => Ok(SensorArrangement::Rggb),
            1 => Ok(SensorArrangement::Grbg),
            2 => Ok(SensorArrangement::Gbrg),
            3 => Ok(SensorArrangement::Bggr),
            other => Err(PipelineError::InvalidSensorArrangement(other)),
        }
    }
}

/// Low-resolution per-channel gain grid for lens shading correction.
#[derive(Debug, Clone, PartialEq)]
pub struct ShadingMap {
    gains: Image<f32>,
}

impl ShadingMap {
    pub fn new(width: usize, height: usize, gains: Vec<f32>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(PipelineError::InvalidDimensions(width, height));
        }
        Ok(Self {
            gains: Image::from_vec(width, height, 1, gains)?,
        })
    }

    /// 1×1 map with gain 1.
    pub fn unit() -> Self {
        Self {
            gains: Image::filled(1, 1, 1, 1.0),
        }
    }

    pub fn dimensions(&self) -> (usize, usize) {
        self.gains.dimensions()
    }

    /// Bilinear resample to `width × height` with pixel-centre alignment.
    /// Coordinates before the first centre clamp to it.
    pub fn upsample(&self, width: usize, height: usize) -> Image<f32> {
        let (src_w, src_h) = self.gains.dimensions();
        let scale_x = width as f32 / src_w as f32;
        let scale_y = height as f32 / src_h as f32;

        let axis = |pos: usize, scale: f32, len: usize| {
            let f = ((pos as f32 + 0.5) / scale - 0.5).max(0.0);
            let i = f as usize;
            let last = len - 1;
            (i.min(last), (i + 1).min(last), f - i as f32)
        };

        Image::from_fn(width, height, 1, |x, y, _| {
            let (x0, x1, ax) = axis(x, scale_x, src_w);
            let (y0, y1, ay) = axis(y, scale_y, src_h);
            let top = lerp(self.gains.get(x0, y0, 0), self.gains.get(x1, y0, 0), ax);
            let bottom = lerp(self.gains.get(x0, y1, 0), self.gains.get(x1, y1, 0), ax);
            lerp(top, bottom, ay)
        })
    }
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Sensor black and white levels, per plane in sensor order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorLevels {
    pub black: [f32; 4],
    pub white: [f32; 4],
}

impl SensorLevels {
    pub fn uniform(black: f32, white: f32) -> Self {
        Self {
            black: [black; 4],
            white: [white; 4],
        }
    }

    /// `(v - black) / (white - black)` scaled to `range`, rounded and clamped.
    pub fn normalize(&self, planes: [Image<u16>; 4], range: f32) -> Result<[Image<u16>; 4]> {
        for plane in 0..4 {
            if self.white[plane] <= self.black[plane] {
                return Err(PipelineError::InvalidParameter(format!(
                    "white level {} not above black level {} for plane {}",
                    self.white[plane], self.black[plane], plane
                )));
            }
        }
        let mut plane = 0;
        Ok(planes.map(|image| {
            let black = self.black[plane];
            let scale = range / (self.white[plane] - black);
            plane += 1;
            image.map(|v| u16::from_f32(((v as f32 - black) * scale + 0.5).clamp(0.0, range)))
        }))
    }
}

/// Calibration carried alongside the sensor planes.
#[derive(Debug, Clone)]
pub struct FrameMetadata {
    pub arrangement: SensorArrangement,
    pub levels: SensorLevels,
    /// As-shot neutral in camera space; each channel clips at this value.
    pub as_shot: [f32; 3],
    pub color_matrix: ColorMatrix,
    /// Shading maps in canonical R, G1, G2, B order.
    pub shading: [ShadingMap; 4],
}

impl Default for FrameMetadata {
    fn default() -> Self {
        Self {
            arrangement: SensorArrangement::Rggb,
            levels: SensorLevels::uniform(0.0, u16::MAX as f32),
            as_shot: [1.0; 3],
            color_matrix: ColorMatrix::IDENTITY,
            shading: std::array::from_fn(|_| ShadingMap::unit()),
        }
    }
}

/// Demosaic input: four same-sized planes in sensor order, normalized to
/// `0..=range`, with their calibration.
#[derive(Debug, Clone)]
pub struct RawFrame {
    pub planes: [Image<u16>; 4],
    pub arrangement: SensorArrangement,
    /// Shading maps in canonical R, G1, G2, B order.
    pub shading: [ShadingMap; 4],
    pub range: f32,
    pub as_shot: [f32; 3],
    pub color_matrix: ColorMatrix,
}

impl RawFrame {
    /// Frame with unit shading, identity colour and the default range.
    pub fn new(planes: [Image<u16>; 4], arrangement: SensorArrangement) -> Result<Self> {
        let frame = Self {
            planes,
            arrangement,
            shading: std::array::from_fn(|_| ShadingMap::unit()),
            range: DEFAULT_WORKING_RANGE,
            as_shot: [1.0; 3],
            color_matrix: ColorMatrix::IDENTITY,
        };
        frame.validate()?;
        Ok(frame)
    }

    /// Normalizes sensor-level planes with `metadata.levels` into `range`.
    pub fn from_sensor(
        planes: [Image<u16>; 4],
        metadata: &FrameMetadata,
        range: f32,
    ) -> Result<Self> {
        let planes = metadata.levels.normalize(planes, range)?;
        let frame = Self {
            planes,
            arrangement: metadata.arrangement,
            shading: metadata.shading.clone(),
            range,
            as_shot: metadata.as_shot,
            color_matrix: metadata.color_matrix,
        };
        frame.validate()?;
        Ok(frame)
    }

    pub fn with_shading(mut self, shading: [ShadingMap; 4]) -> Self {
        self.shading = shading;
        self
    }

    pub fn with_range(mut self, range: f32) -> Self {
        self.range = range;
        self
    }

    pub fn with_as_shot(mut self, as_shot: [f32; 3]) -> Self {
        self.as_shot = as_shot;
        self
    }

    pub fn with_color_matrix(mut self, color_matrix: ColorMatrix) -> Self {
        self.color_matrix = color_matrix;
        self
    }

    /// Size of each Bayer plane.
    pub fn plane_dimensions(&self) -> (usize, usize) {
        self.planes[0].dimensions()
    }

    /// Size of the demosaiced image.
    pub fn output_dimensions(&self) -> (usize, usize) {
        let (w, h) = self.plane_dimensions();
        (w * 2, h * 2)
    }

    pub fn validate(&self) -> Result<()> {
        let (width, height) = self.plane_dimensions();
        if width == 0 || height == 0 {
            return Err(PipelineError::InvalidDimensions(width, height));
        }
        for plane in &self.planes {
            if plane.dimensions() != (width, height) {
                return Err(PipelineError::DimensionMismatch {
                    expected: (width, height),
                    actual: plane.dimensions(),
                });
            }
            if plane.channels() != 1 {
                return Err(PipelineError::InvalidParameter(format!(
                    "Bayer planes must have one channel, got {}",
                    plane.channels()
                )));
            }
        }
        if !self.as_shot.iter().all(|v| v.is_finite() && *v > 0.0) {
            return Err(PipelineError::InvalidParameter(format!(
                "as-shot neutral {:?} must be positive",
                self.as_shot
            )));
        }
        if !(self.range > 0.0 && self.range <= i16::MAX as f32) {
            return Err(PipelineError::InvalidParameter(format!(
                "working range {} outside (0, {}]",
                self.range,
                i16::MAX
            )));
        }
        Ok(())
    }
}
