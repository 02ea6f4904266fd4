use cbdetect::core::synthetic::BoardRender;
use cbdetect::corners::{CornerDetector, CornerParams};
use cbdetect::{detect, DetectorParams};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nalgebra::Point2;

fn bench_detect(c: &mut Criterion) {
    let board = BoardRender::axis_aligned(10, 7, 32.0, Point2::new(63.5, 47.5), 640, 480);
    let img = board.render();
    let params = DetectorParams::default();

    c.bench_function("corners_640x480", |b| {
        let detector = CornerDetector::new(CornerParams::default());
        b.iter(|| detector.detect(black_box(&img.view())))
    });

    c.bench_function("detect_640x480", |b| {
        b.iter(|| detect(black_box(&img.view()), 9, 6, &params))
    });
}

criterion_group!(benches, bench_detect);
criterion_main!(benches);
