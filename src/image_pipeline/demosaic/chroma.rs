//! Red and blue reconstruction from green-relative colour differences.

use crate::image_pipeline::common::{Image, Sample};
use crate::image_pipeline::demosaic::mosaic::Mosaic;
use crate::image_pipeline::filters::median3x3;

/// Quad position of the native samples of a colour in RGGB parity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChromaSite {
    Red,
    Blue,
}

impl ChromaSite {
    fn parity(&self) -> isize {
        match self {
            ChromaSite::Red => 0,
            ChromaSite::Blue => 1,
        }
    }
}

const TAP: [i32; 3] = [1, 2, 1];

/// `green + median(blur(raw - green))`, saturated to `i16`.
///
/// The difference is only non-zero at native sites, one in four, so the
/// `[1, 2, 1]²` sum divided by four is a bilinear fill of the sparse grid.
pub fn reconstruct(mosaic: &Mosaic, green: &Image<i32>, site: ChromaSite) -> Image<i32> {
    let parity = site.parity();
    let difference = |x: isize, y: isize| -> i32 {
        if x.rem_euclid(2) == parity && y.rem_euclid(2) == parity {
            mosaic.at(x, y) - green.get_clamped(x, y, 0)
        } else {
            0
        }
    };

    let blurred = Image::<i32>::from_fn(mosaic.width(), mosaic.height(), 1, |x, y, _| {
        let (x, y) = (x as isize, y as isize);
        let mut sum = 0;
        for (j, wy) in TAP.iter().enumerate() {
            for (i, wx) in TAP.iter().enumerate() {
                sum += wy * wx * difference(x + i as isize - 1, y + j as isize - 1);
            }
        }
        sum.div_euclid(4)
    });

    let filtered = median3x3(&blurred);

    Image::from_fn(mosaic.width(), mosaic.height(), 1, |x, y, _| {
        i16::from_i32(green.get(x, y, 0) + filtered.get(x, y, 0)) as i32
    })
}
