use capture_verify::analysis::SharpnessEstimator;
use capture_verify::capture::{encode_jpeg, Frame};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn sharpness(c: &mut Criterion) {
    let estimator = SharpnessEstimator::new();
    let vga = Frame::checkerboard(640, 480, 1);
    let hd = Frame::checkerboard(1280, 720, 1);

    c.bench_function("evaluate_640x480", |b| {
        b.iter(|| estimator.evaluate(black_box(&vga)))
    });
    c.bench_function("evaluate_1280x720", |b| {
        b.iter(|| estimator.evaluate(black_box(&hd)))
    });
    c.bench_function("encode_jpeg_640x480", |b| {
        b.iter(|| encode_jpeg(black_box(&vga), 92))
    });
}

criterion_group!(benches, sharpness);
criterion_main!(benches);
