use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dome_warp::{DomeConfig, DomeProjection};
use image::{Rgb, RgbImage};

fn build_projection(c: &mut Criterion) {
    let config = DomeConfig::with_projector_resolution(180, 320);
    c.bench_function("build projection 320x180", |b| {
        b.iter(|| DomeProjection::new(black_box(&config)).unwrap())
    });
}

fn warp_frame(c: &mut Criterion) {
    let config = DomeConfig::with_projector_resolution(360, 640);
    let projection = DomeProjection::new(&config).unwrap();
    let warper = projection.warper();
    let images: Vec<RgbImage> = config
        .screens
        .iter()
        .enumerate()
        .map(|(i, screen)| {
            RgbImage::from_fn(screen.pixel_width, screen.pixel_height, |x, y| {
                Rgb([x as u8, y as u8, (i * 80) as u8])
            })
        })
        .collect();
    let (width, height) = warper.output_size();
    let mut output = RgbImage::new(width, height);

    c.bench_function("warp frame 640x360", |b| {
        b.iter(|| warper.warp_into(black_box(&images), &mut output).unwrap())
    });
}

criterion_group!(benches, build_projection, warp_frame);
criterion_main!(benches);
