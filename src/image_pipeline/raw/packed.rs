//! Packed sensor buffers (Android `RAW10` / `RAW16`) split into Bayer planes.

use tracing::{debug, instrument};

use crate::image_pipeline::common::{Image, PipelineError, Result};
use crate::image_pipeline::raw::reader::RawFrameReader;
use crate::image_pipeline::raw::types::{DEFAULT_WORKING_RANGE, FrameMetadata, RawFrame};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackedFormat {
    /// One little-endian `u16` per sample.
    Raw16,
    /// Four 10-bit samples in five bytes: four MSB bytes, then one byte of
    /// 2-bit LSB pairs (sample `p` in bits `2p..2p+2`).
    Raw10,
}

impl PackedFormat {
    fn min_row_bytes(&self, width: usize) -> usize {
        match self {
            PackedFormat::Raw16 => width * 2,
            PackedFormat::Raw10 => width / 4 * 5,
        }
    }

    #[inline]
    fn sample(&self, row: &[u8], col: usize) -> u16 {
        match self {
            PackedFormat::Raw16 => u16::from_le_bytes([row[col * 2], row[col * 2 + 1]]),
            PackedFormat::Raw10 => {
                let group = col / 4 * 5;
                let p = col % 4;
                let msb = row[group + p] as u16;
                let lsb = (row[group + 4] >> (2 * p)) & 0x03;
                (msb << 2) | lsb as u16
            }
        }
    }
}

/// Splits a packed `width × height` mosaic with `stride` bytes per row into
/// four `width/2 × height/2` planes in sensor order.
#[instrument(skip(data), fields(len = data.len()))]
pub fn deinterleave(
    data: &[u8],
    width: usize,
    height: usize,
    stride: usize,
    format: PackedFormat,
) -> Result<[Image<u16>; 4]> {
    if width == 0 || height == 0 || width % 2 != 0 || height % 2 != 0 {
        return Err(PipelineError::InvalidDimensions(width, height));
    }
    if format == PackedFormat::Raw10 && width % 4 != 0 {
        return Err(PipelineError::InvalidDimensions(width, height));
    }
    let row_bytes = format.min_row_bytes(width);
    if stride < row_bytes {
        return Err(PipelineError::DecodeError(format!(
            "stride {stride} shorter than {row_bytes} bytes needed per row"
        )));
    }
    let needed = (height - 1) * stride + row_bytes;
    if data.len() < needed {
        return Err(PipelineError::DecodeError(format!(
            "packed buffer holds {} bytes, {} needed",
            data.len(),
            needed
        )));
    }

    debug!(width, height, stride, ?format, "deinterleaving packed mosaic");

    let (plane_w, plane_h) = (width / 2, height / 2);
    Ok(std::array::from_fn(|plane| {
        let (dx, dy) = (plane & 1, plane >> 1);
        Image::from_fn(plane_w, plane_h, 1, |x, y, _| {
            let start = (2 * y + dy) * stride;
            format.sample(&data[start..start + row_bytes], 2 * x + dx)
        })
    }))
}

/// Reader for packed buffers whose geometry and calibration are known
/// out of band.
#[derive(Debug, Clone)]
pub struct PackedRawReader {
    width: usize,
    height: usize,
    stride: usize,
    format: PackedFormat,
    metadata: FrameMetadata,
    range: f32,
}

impl PackedRawReader {
    pub fn new(
        width: usize,
        height: usize,
        stride: usize,
        format: PackedFormat,
        metadata: FrameMetadata,
    ) -> Self {
        Self {
            width,
            height,
            stride,
            format,
            metadata,
            range: DEFAULT_WORKING_RANGE,
        }
    }

    pub fn with_range(mut self, range: f32) -> Self {
        self.range = range;
        self
    }
}

impl RawFrameReader for PackedRawReader {
    fn read_frame(&self, data: &[u8]) -> Result<RawFrame> {
        let planes = deinterleave(data, self.width, self.height, self.stride, self.format)?;
        RawFrame::from_sensor(planes, &self.metadata, self.range)
    }
}
