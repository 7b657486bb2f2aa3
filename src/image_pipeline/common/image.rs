//! Planar sample grid shared by every stage.
//!
//! Images are stored channel-major (`[c][y][x]`), so a single channel is a
//! contiguous slice. Reads outside the grid go through [`Image::get_clamped`],
//! which replicates the nearest edge sample.

use rayon::prelude::*;

use crate::image_pipeline::common::error::{PipelineError, Result};

/// Numeric sample stored in an [`Image`].
///
/// Conversions *into* a sample type saturate to its range and truncate
/// toward zero; callers that want rounding add `0.5` first.
pub trait Sample:
    Copy + Default + PartialEq + PartialOrd + Send + Sync + std::fmt::Debug + 'static
{
    /// Largest representable value, as `f32`.
    const MAX_F32: f32;

    fn to_f32(self) -> f32;
    fn to_i32(self) -> i32;
    fn from_f32(value: f32) -> Self;
    fn from_i32(value: i32) -> Self;

    /// Nearest representable value, saturated.
    #[inline]
    fn from_f32_rounded(value: f32) -> Self {
        Self::from_f32(value.round())
    }
}

macro_rules! impl_integer_sample {
    ($t:ty) => {
        impl Sample for $t {
            const MAX_F32: f32 = <$t>::MAX as f32;

            #[inline]
            fn to_f32(self) -> f32 {
                self as f32
            }

            #[inline]
            fn to_i32(self) -> i32 {
                self as i32
            }

            #[inline]
            fn from_f32(value: f32) -> Self {
                // `as` saturates and maps NaN to zero
                value as $t
            }

            #[inline]
            fn from_i32(value: i32) -> Self {
                value.clamp(<$t>::MIN as i32, <$t>::MAX as i32) as $t
            }
        }
    };
}

impl_integer_sample!(u8);
impl_integer_sample!(u16);
impl_integer_sample!(i16);

impl Sample for i32 {
    const MAX_F32: f32 = i32::MAX as f32;

    #[inline]
    fn to_f32(self) -> f32 {
        self as f32
    }

    #[inline]
    fn to_i32(self) -> i32 {
        self
    }

    #[inline]
    fn from_f32(value: f32) -> Self {
        value as i32
    }

    #[inline]
    fn from_i32(value: i32) -> Self {
        value
    }
}

impl Sample for f32 {
    const MAX_F32: f32 = f32::MAX;

    #[inline]
    fn to_f32(self) -> f32 {
        self
    }

    #[inline]
    fn to_i32(self) -> i32 {
        self as i32
    }

    #[inline]
    fn from_f32(value: f32) -> Self {
        value
    }

    #[inline]
    fn from_i32(value: i32) -> Self {
        value as f32
    }

    #[inline]
    fn from_f32_rounded(value: f32) -> Self {
        value
    }
}

/// Saturating `f32 -> u16` with round-half-up.
#[inline]
pub fn round_u16(value: f32) -> u16 {
    u16::from_f32(value + 0.5)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Image<T> {
    width: usize,
    height: usize,
    channels: usize,
    data: Vec<T>,
}

impl<T: Sample> Image<T> {
    /// Zero-filled image.
    pub fn new(width: usize, height: usize, channels: usize) -> Self {
        Self::filled(width, height, channels, T::default())
    }

    pub fn filled(width: usize, height: usize, channels: usize, value: T) -> Self {
        Self {
            width,
            height,
            channels,
            data: vec![value; width * height * channels],
        }
    }

    /// Wraps planar data. Fails when the length does not match the shape.
    pub fn from_vec(width: usize, height: usize, channels: usize, data: Vec<T>) -> Result<Self> {
        if data.len() != width * height * channels {
            return Err(PipelineError::InvalidParameter(format!(
                "buffer of {} samples does not fit {}x{}x{}",
                data.len(),
                width,
                height,
                channels
            )));
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Builds an image from interleaved samples (`[y][x][c]`).
    pub fn from_interleaved(
        width: usize,
        height: usize,
        channels: usize,
        data: &[T],
    ) -> Result<Self> {
        if data.len() != width * height * channels {
            return Err(PipelineError::InvalidParameter(format!(
                "interleaved buffer of {} samples does not fit {}x{}x{}",
                data.len(),
                width,
                height,
                channels
            )));
        }
        Ok(Self::from_fn(width, height, channels, |x, y, c| {
            data[(y * width + x) * channels + c]
        }))
    }

    /// Evaluates `f(x, y, c)` for every sample, one row per rayon task.
    pub fn from_fn<F>(width: usize, height: usize, channels: usize, f: F) -> Self
    where
        F: Fn(usize, usize, usize) -> T + Sync + Send,
    {
        let mut data = vec![T::default(); width * height * channels];
        if !data.is_empty() {
            data.par_chunks_mut(width)
                .enumerate()
                .for_each(|(row, out)| {
                    let c = row / height;
                    let y = row % height;
                    for (x, v) in out.iter_mut().enumerate() {
                        *v = f(x, y, c);
                    }
                });
        }
        Self {
            width,
            height,
            channels,
            data,
        }
    }

    /// Stacks single-channel images into one multi-channel image.
    pub fn from_planes(planes: &[&Image<T>]) -> Result<Self> {
        let Some(first) = planes.first() else {
            return Err(PipelineError::InvalidParameter("no planes to stack".to_string()));
        };
        let (width, height) = first.dimensions();
        let mut data = Vec::with_capacity(width * height * planes.len());
        for plane in planes {
            if plane.dimensions() != (width, height) {
                return Err(PipelineError::DimensionMismatch {
                    expected: (width, height),
                    actual: plane.dimensions(),
                });
            }
            for c in 0..plane.channels {
                data.extend_from_slice(plane.plane(c));
            }
        }
        let channels = data.len() / (width * height).max(1);
        Self::from_vec(width, height, channels, data)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize, c: usize) -> T {
        debug_assert!(x < self.width && y < self.height && c < self.channels);
        self.data[(c * self.height + y) * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, c: usize, value: T) {
        debug_assert!(x < self.width && y < self.height && c < self.channels);
        self.data[(c * self.height + y) * self.width + x] = value;
    }

    /// Replicate-edge read.
    #[inline]
    pub fn get_clamped(&self, x: isize, y: isize, c: usize) -> T {
        let x = x.clamp(0, self.width as isize - 1) as usize;
        let y = y.clamp(0, self.height as isize - 1) as usize;
        self.get(x, y, c)
    }

    #[inline]
    pub fn plane(&self, c: usize) -> &[T] {
        let len = self.width * self.height;
        &self.data[c * len..(c + 1) * len]
    }

    /// Copies one channel out as a single-channel image.
    pub fn channel(&self, c: usize) -> Result<Image<T>> {
        self.check_channel(c)?;
        Image::from_vec(self.width, self.height, 1, self.plane(c).to_vec())
    }

    pub fn check_channel(&self, c: usize) -> Result<()> {
        if c >= self.channels {
            return Err(PipelineError::InvalidChannel {
                index: c,
                channels: self.channels,
            });
        }
        Ok(())
    }

    pub fn map<U, F>(&self, f: F) -> Image<U>
    where
        U: Sample,
        F: Fn(T) -> U + Sync + Send,
    {
        Image {
            width: self.width,
            height: self.height,
            channels: self.channels,
            data: self.data.par_iter().map(|&v| f(v)).collect(),
        }
    }

    /// Samples in `[y][x][c]` order, as encoders expect.
    pub fn to_interleaved(&self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.data.len());
        for y in 0..self.height {
            for x in 0..self.width {
                for c in 0..self.channels {
                    out.push(self.get(x, y, c));
                }
            }
        }
        out
    }
}
