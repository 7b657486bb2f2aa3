//! Shading-corrected Bayer mosaic in canonical RGGB parity.

use crate::image_pipeline::common::{Image, Sample};
use crate::image_pipeline::raw::RawFrame;

/// Four shaded planes in R, G1, G2, B order, addressed at full resolution.
///
/// Reads outside the mosaic clamp in plane space, so a sample at `(x, y)`
/// always has the colour of `(x mod 2, y mod 2)`.
pub struct Mosaic {
    planes: [Image<i32>; 4],
    width: usize,
    height: usize,
}

impl Mosaic {
    pub fn from_frame(frame: &RawFrame) -> Self {
        let (plane_w, plane_h) = frame.plane_dimensions();
        let order = frame.arrangement.canonical_order();
        let planes = std::array::from_fn(|k| {
            let gains = frame.shading[k].upsample(plane_w, plane_h);
            correct_plane(&frame.planes[order[k]], &gains, frame.range)
        });
        Self {
            planes,
            width: plane_w * 2,
            height: plane_h * 2,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn at(&self, x: isize, y: isize) -> i32 {
        let c = (y.rem_euclid(2) * 2 + x.rem_euclid(2)) as usize;
        self.planes[c].get_clamped(x.div_euclid(2), y.div_euclid(2), 0)
    }

    #[inline]
    pub fn is_green(x: isize, y: isize) -> bool {
        (x + y).rem_euclid(2) == 1
    }
}

/// Hot-pixel clamp followed by the shading gain.
///
/// Each sample is limited to twice the mean of the middle two of its four
/// direct same-colour neighbours, then multiplied by its gain, rounded and
/// clamped to `0..=range`.
pub fn correct_plane(plane: &Image<u16>, gains: &Image<f32>, range: f32) -> Image<i32> {
    Image::from_fn(plane.width(), plane.height(), 1, |x, y, _| {
        let (xi, yi) = (x as isize, y as isize);
        let mut n = [
            plane.get_clamped(xi - 1, yi, 0) as i32,
            plane.get_clamped(xi + 1, yi, 0) as i32,
            plane.get_clamped(xi, yi + 1, 0) as i32,
            plane.get_clamped(xi, yi - 1, 0) as i32,
        ];
        n.sort_unstable();
        let threshold = 2 * ((n[1] + n[2]) / 2);

        let raw = (plane.get(x, y, 0) as i32).min(threshold) as f32;
        i32::from_f32((raw * gains.get(x, y, 0) + 0.5).clamp(0.0, range))
    })
}
