//! Median networks on signed working samples.

use crate::image_pipeline::common::Image;

/// Median of nine samples.
#[inline]
pub fn median9(mut values: [i32; 9]) -> i32 {
    values.sort_unstable();
    values[4]
}

/// Weighted median over a 3×3 cross: the centre counts four times, the
/// orthogonal and diagonal neighbours once each. Returns the mean of the
/// two middle order statistics of those twelve samples.
#[inline]
pub fn weighted_median12(center: i32, orthogonal: [i32; 4], diagonal: [i32; 4]) -> i32 {
    let mut p = [0i32; 12];
    p[..4].fill(center);
    p[4..8].copy_from_slice(&orthogonal);
    p[8..].copy_from_slice(&diagonal);
    p.sort_unstable();
    (p[5] + p[6]).div_euclid(2)
}

/// 3×3 median of a single-channel plane, replicate-edge.
pub fn median3x3(plane: &Image<i32>) -> Image<i32> {
    Image::from_fn(plane.width(), plane.height(), 1, |x, y, _| {
        let (x, y) = (x as isize, y as isize);
        let mut window = [0i32; 9];
        for (i, v) in window.iter_mut().enumerate() {
            let dx = (i % 3) as isize - 1;
            let dy = (i / 3) as isize - 1;
            *v = plane.get_clamped(x + dx, y + dy, 0);
        }
        median9(window)
    })
}

/// [`weighted_median12`] over every pixel of a single-channel plane.
pub fn weighted_median3x3(plane: &Image<i32>) -> Image<i32> {
    Image::from_fn(plane.width(), plane.height(), 1, |x, y, _| {
        let (x, y) = (x as isize, y as isize);
        let at = |dx: isize, dy: isize| plane.get_clamped(x + dx, y + dy, 0);
        weighted_median12(
            at(0, 0),
            [at(0, -1), at(0, 1), at(-1, 0), at(1, 0)],
            [at(-1, -1), at(-1, 1), at(1, -1), at(1, 1)],
        )
    })
}
