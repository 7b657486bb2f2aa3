//! Gaussian and Laplacian image pyramids.
//!
//! All levels are stored as `Image<i32>` so Laplacian detail keeps its sign
//! and headroom until the final collapse. Level `k` of a pyramid built from a
//! `w × h` image is `ceil(w / 2^k) × ceil(h / 2^k)`.
//!
//! [`reduce`] and [`expand`] share the `[1, 4, 6, 4, 1]` binomial kernel.
//! Both accumulate the separable sum at full precision and round once.

use tracing::instrument;

use crate::image_pipeline::common::{Image, PipelineError, Result, Sample};

#[cfg(test)]
mod tests;

const KERNEL: [i32; 5] = [1, 4, 6, 4, 1];

/// Low-pass and decimate by two. Only the kept samples are evaluated.
pub fn reduce(image: &Image<i32>) -> Image<i32> {
    let (width, height) = image.dimensions();
    let out_width = width.div_ceil(2);
    let out_height = height.div_ceil(2);

    // horizontal pass at even columns, every input row
    let rows = Image::<i32>::from_fn(out_width, height, image.channels(), |x, y, c| {
        let cx = 2 * x as isize;
        KERNEL
            .iter()
            .enumerate()
            .map(|(k, w)| w * image.get_clamped(cx + k as isize - 2, y as isize, c))
            .sum()
    });

    Image::from_fn(out_width, out_height, image.channels(), |x, y, c| {
        let cy = 2 * y as isize;
        let sum: i32 = KERNEL
            .iter()
            .enumerate()
            .map(|(k, w)| w * rows.get_clamped(x as isize, cy + k as isize - 2, c))
            .sum();
        (sum + 128) >> 8
    })
}

/// Zero-insert upsample of the edge-replicated coarse image, low-passed and
/// scaled by four, cropped to `width × height`.
pub fn expand(image: &Image<i32>, width: usize, height: usize) -> Image<i32> {
    // Only even taps of the zero-inserted grid are non-zero, so each output
    // sample touches two or three coarse samples per axis.
    let tap = |fine: isize, k: usize| -> Option<isize> {
        let pos = fine + k as isize - 2;
        (pos.rem_euclid(2) == 0).then(|| pos.div_euclid(2))
    };

    let rows = Image::<i32>::from_fn(width, image.height(), image.channels(), |x, y, c| {
        KERNEL
            .iter()
            .enumerate()
            .filter_map(|(k, w)| {
                tap(x as isize, k).map(|cx| w * image.get_clamped(cx, y as isize, c))
            })
            .sum()
    });

    Image::from_fn(width, height, image.channels(), |x, y, c| {
        let sum: i32 = KERNEL
            .iter()
            .enumerate()
            .filter_map(|(k, w)| {
                tap(y as isize, k).map(|cy| w * rows.get_clamped(x as isize, cy, c))
            })
            .sum();
        // (sum / 256) * 4
        (sum + 32) >> 6
    })
}

/// Successively reduced copies of an image, finest first.
#[derive(Debug, Clone)]
pub struct GaussianPyramid {
    levels: Vec<Image<i32>>,
}

impl GaussianPyramid {
    /// Level 0 is `image`; levels `1..=depth` are successive reductions.
    #[instrument(skip_all, fields(width = image.width(), height = image.height(), depth = depth))]
    pub fn build(image: Image<i32>, depth: usize) -> Self {
        let mut levels = Vec::with_capacity(depth + 1);
        levels.push(image);
        for k in 1..=depth {
            let next = reduce(&levels[k - 1]);
            levels.push(next);
        }
        Self { levels }
    }

    pub fn from_samples<T: Sample>(image: &Image<T>, depth: usize) -> Self {
        Self::build(image.map(|v| v.to_i32()), depth)
    }

    pub fn levels(&self) -> &[Image<i32>] {
        &self.levels
    }

    pub fn level(&self, k: usize) -> &Image<i32> {
        &self.levels[k]
    }

    /// Index of the coarsest level.
    pub fn depth(&self) -> usize {
        self.levels.len() - 1
    }
}

/// Band-pass detail levels plus the coarsest Gaussian residual.
#[derive(Debug, Clone)]
pub struct LaplacianPyramid {
    levels: Vec<Image<i32>>,
}

impl LaplacianPyramid {
    pub fn from_gaussian(gaussian: &GaussianPyramid) -> Self {
        let top = gaussian.depth();
        let levels = (0..=top)
            .map(|k| {
                let level = gaussian.level(k);
                if k == top {
                    return level.clone();
                }
                let up = expand(gaussian.level(k + 1), level.width(), level.height());
                Image::from_fn(level.width(), level.height(), level.channels(), |x, y, c| {
                    level.get(x, y, c) - up.get(x, y, c)
                })
            })
            .collect();
        Self { levels }
    }

    /// Wraps already blended levels. Each level must be the `ceil`-half of
    /// the previous one and share its channel count.
    pub fn from_levels(levels: Vec<Image<i32>>) -> Result<Self> {
        if levels.is_empty() {
            return Err(PipelineError::InvalidParameter(
                "pyramid needs at least one level".to_string(),
            ));
        }
        for pair in levels.windows(2) {
            let expected = (pair[0].width().div_ceil(2), pair[0].height().div_ceil(2));
            if pair[1].dimensions() != expected || pair[1].channels() != pair[0].channels() {
                return Err(PipelineError::DimensionMismatch {
                    expected,
                    actual: pair[1].dimensions(),
                });
            }
        }
        Ok(Self { levels })
    }

    pub fn levels(&self) -> &[Image<i32>] {
        &self.levels
    }

    /// Upsample-and-add from the coarsest level, without clipping.
    pub fn collapse(&self) -> Image<i32> {
        let mut levels = self.levels.iter().rev();
        let Some(top) = levels.next() else {
            return Image::new(0, 0, 0);
        };
        levels.fold(top.clone(), |acc, level| {
            let up = expand(&acc, level.width(), level.height());
            Image::from_fn(level.width(), level.height(), level.channels(), |x, y, c| {
                level.get(x, y, c) + up.get(x, y, c)
            })
        })
    }

    /// [`LaplacianPyramid::collapse`] saturated to `T` at level 0 only.
    pub fn collapse_saturating<T: Sample>(&self) -> Image<T> {
        self.collapse().map(T::from_i32)
    }
}
