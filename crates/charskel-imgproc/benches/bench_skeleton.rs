use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use charskel_image::{Image, ImageSize};
use charskel_imgproc::morphology::{medial_axis, skeletonize, skeletonize_3d, thin};

// thick ring crossed by a bar, roughly the footprint of a glyph stroke
fn create_glyph(width: usize, height: usize) -> Image<bool, 1> {
    let (cx, cy) = (width as f32 / 2.0, height as f32 / 2.0);
    let outer = width.min(height) as f32 * 0.4;
    let inner = outer * 0.6;
    let data = (0..width * height)
        .map(|i| {
            let (x, y) = ((i % width) as f32, (i / width) as f32);
            let r = ((x - cx).powi(2) + (y - cy).powi(2)).sqrt();
            let ring = r <= outer && r >= inner;
            let bar = (y - cy).abs() < outer * 0.15 && (x - cx).abs() < outer;
            ring || bar
        })
        .collect();
    Image::new(ImageSize { width, height }, data).unwrap()
}

fn bench_skeleton(c: &mut Criterion) {
    let mut group = c.benchmark_group("Skeleton");

    for (width, height) in [(64, 64), (256, 256)].iter() {
        group.throughput(Throughput::Elements((*width * *height) as u64));
        let parameter_string = format!("{width}x{height}");

        let mask = create_glyph(*width, *height);
        let mut dst = Image::from_size_val(mask.size(), false).unwrap();

        group.bench_with_input(
            BenchmarkId::new("skeletonize", &parameter_string),
            &mask,
            |b, m| b.iter(|| std::hint::black_box(skeletonize(m, &mut dst))),
        );

        group.bench_with_input(
            BenchmarkId::new("thin", &parameter_string),
            &mask,
            |b, m| b.iter(|| std::hint::black_box(thin(m, &mut dst, None))),
        );

        group.bench_with_input(
            BenchmarkId::new("medial_axis", &parameter_string),
            &mask,
            |b, m| b.iter(|| std::hint::black_box(medial_axis(m, &mut dst, None, 0))),
        );

        group.bench_with_input(
            BenchmarkId::new("skeletonize_3d", &parameter_string),
            &mask,
            |b, m| b.iter(|| std::hint::black_box(skeletonize_3d(m, &mut dst))),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_skeleton);
criterion_main!(benches);
