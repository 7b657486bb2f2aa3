use crate::image_pipeline::common::{Image, PipelineError};
use crate::image_pipeline::pyramid::*;

fn noise_image(width: usize, height: usize, channels: usize) -> Image<i32> {
    Image::from_fn(width, height, channels, |x, y, c| {
        let v = (x * 7919 + y * 104_729 + c * 1299) ^ (x * y + 31);
        (v % 65536) as i32
    })
}

#[test]
fn test_level_dimensions_round_up() {
    let pyramid = GaussianPyramid::build(noise_image(13, 7, 1), 4);

    let dims: Vec<_> = pyramid.levels().iter().map(|l| l.dimensions()).collect();
    assert_eq!(dims, vec![(13, 7), (7, 4), (4, 2), (2, 1), (1, 1)]);
    assert_eq!(pyramid.depth(), 4);
}

#[test]
fn test_reduce_and_expand_preserve_constants() {
    for value in [0, 1234, -777, 65535] {
        let image = Image::<i32>::filled(9, 5, 3, value);

        let reduced = reduce(&image);
        assert_eq!(reduced.dimensions(), (5, 3));
        assert!(reduced.data().iter().all(|&v| v == value));

        let expanded = expand(&reduced, 9, 5);
        assert!(expanded.data().iter().all(|&v| v == value));
    }
}

#[test]
fn test_expand_inverts_reduce_on_ramp() {
    let ramp = Image::<i32>::from_fn(32, 16, 1, |x, y, _| (x * 100 + y * 40) as i32);

    let restored = expand(&reduce(&ramp), 32, 16);

    // samples that never touch a replicated coarse edge sample
    for y in 4..12 {
        for x in 4..28 {
            let diff = (restored.get(x, y, 0) - ramp.get(x, y, 0)).abs();
            assert!(diff <= 2, "({x}, {y}) differs by {diff}");
        }
    }
}

#[test]
fn test_laplacian_roundtrip_up_to_six_levels() {
    let image = noise_image(45, 31, 3);

    for depth in 0..=6 {
        let gaussian = GaussianPyramid::build(image.clone(), depth);
        let laplacian = LaplacianPyramid::from_gaussian(&gaussian);

        assert_eq!(laplacian.levels().len(), depth + 1);
        assert_eq!(laplacian.collapse(), image, "depth {depth}");
    }
}

#[test]
fn test_laplacian_of_constant_is_flat_residual() {
    let gaussian = GaussianPyramid::from_samples(&Image::<u16>::filled(16, 16, 1, 500), 3);
    let laplacian = LaplacianPyramid::from_gaussian(&gaussian);

    for level in &laplacian.levels()[..3] {
        assert!(level.data().iter().all(|&v| v == 0));
    }
    assert!(laplacian.levels()[3].data().iter().all(|&v| v == 500));
}

#[test]
fn test_collapse_saturates_only_at_final_level() {
    let top = Image::<i32>::filled(1, 1, 1, 70000);
    let detail = Image::<i32>::filled(2, 2, 1, -10000);
    let laplacian = LaplacianPyramid::from_levels(vec![detail, top]).unwrap();

    let collapsed: Image<u16> = laplacian.collapse_saturating();
    assert!(collapsed.data().iter().all(|&v| v == 60000));
}

#[test]
fn test_from_levels_checks_shapes() {
    let levels = vec![Image::<i32>::new(8, 8, 1), Image::<i32>::new(3, 4, 1)];
    assert!(matches!(
        LaplacianPyramid::from_levels(levels),
        Err(PipelineError::DimensionMismatch { .. })
    ));
    assert!(LaplacianPyramid::from_levels(Vec::new()).is_err());
}
