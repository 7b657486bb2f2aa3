use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rawpipe_rs::image_pipeline::{
    Demosaic, DevelopPipeline, GreenInterpolation, GuidedFilter, Image, PipelineParameters,
    RawFrame, SensorArrangement,
};

fn synthetic_frame(plane_width: usize, plane_height: usize) -> RawFrame {
    let planes = std::array::from_fn(|p| {
        Image::from_fn(plane_width, plane_height, 1, |x, y, _| {
            (((x * 37 + y * 11 + p * 500) % 12000) + 1000) as u16
        })
    });
    RawFrame::new(planes, SensorArrangement::Rggb).expect("valid synthetic frame")
}

fn benchmark_demosaic(c: &mut Criterion) {
    let mut group = c.benchmark_group("demosaic");
    let frame = synthetic_frame(256, 256);

    for (strategy, label) in [
        (GreenInterpolation::GradientWeighted, "gradient_weighted"),
        (GreenInterpolation::Lmmse, "lmmse"),
    ] {
        let demosaic = Demosaic::new(strategy);
        group.bench_function(label, |b| {
            b.iter(|| demosaic.process(black_box(&frame)));
        });
    }

    group.finish();
}

fn benchmark_guided_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("guided_filter");
    let image = Image::from_fn(512, 512, 1, |x, y, _| ((x * y) % 65536) as u16);

    for radius in [15, 25, 51] {
        let filter = GuidedFilter::new(radius).expect("non-zero radius");
        group.bench_with_input(BenchmarkId::from_parameter(radius), &image, |b, image| {
            b.iter(|| filter.apply_uniform::<u16, u16>(black_box(image), 0, 1e6));
        });
    }

    group.finish();
}

fn benchmark_develop(c: &mut Criterion) {
    let mut group = c.benchmark_group("develop_by_size");
    group.sample_size(10);

    for (width, height, label) in [(64, 64, "128x128"), (256, 256, "512x512")] {
        let frame = synthetic_frame(width, height);
        group.bench_with_input(BenchmarkId::from_parameter(label), &frame, |b, frame| {
            let pipeline =
                DevelopPipeline::new(PipelineParameters::default()).expect("default parameters");
            b.iter(|| pipeline.develop(black_box(frame), None));
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_demosaic, benchmark_guided_filter, benchmark_develop);
criterion_main!(benches);
