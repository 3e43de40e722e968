use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use vm_core::Image;
use vm_nms::{NonMaxConfig, NonMaxExtractor, NonMaxInputs, NonMaxKind, NonMaxSuppression, PointList};

/// Smooth blob field with a sparse set of peaks and valleys.
fn build_response(width: usize, height: usize) -> Image<f32> {
    let mut data = vec![0.0f32; width * height];
    for y in 0..height {
        for x in 0..width {
            let fx = x as f32 * 0.11;
            let fy = y as f32 * 0.07;
            data[y * width + x] = 10.0 * fx.sin() * fy.cos() + 0.5 * (0.9 * fx + 1.3 * fy).sin();
        }
    }
    Image::from_vec(width, height, data).expect("valid image")
}

fn bench_nms(c: &mut Criterion) {
    let img = build_response(640, 480);
    let view = img.as_view();

    let mut group = c.benchmark_group("nms_640x480");
    for radius in [1usize, 3, 6] {
        let cfg = NonMaxConfig {
            radius,
            threshold: 1.0,
            detect_minimums: true,
            ..NonMaxConfig::default()
        };

        for kind in [NonMaxKind::Dense, NonMaxKind::SlidingWindow] {
            let mut ex = NonMaxExtractor::new(kind, cfg.clone()).expect("valid config");
            let mut found_min = PointList::new();
            let mut found_max = PointList::new();

            group.bench_with_input(BenchmarkId::new(kind.name(), radius), &radius, |b, _| {
                b.iter(|| {
                    ex.process(
                        black_box(&view),
                        &NonMaxInputs::default(),
                        Some(&mut found_min),
                        Some(&mut found_max),
                    );
                    black_box(found_min.len() + found_max.len());
                });
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_nms);
criterion_main!(benches);
