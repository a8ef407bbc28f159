//! Cost of one full frame (physics, projection and drawing) at the default
//! six clusters of sixty nodes, and of the physics step alone.
//!
//! Run with: `cargo bench --bench frame`

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use neuralbg::{physics, BackgroundConfig, NeuralBackground, PixelCanvas, Rgb, Viewport, World};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn full_frame(c: &mut Criterion) {
    let mut background = NeuralBackground::with_seed(BackgroundConfig::default(), 1);
    let mut canvas = PixelCanvas::new(1280, 720, 1.0, Rgb::new(0, 0, 0));
    background.mount(1280.0, 720.0);

    c.bench_function("tick_1280x720", |b| {
        b.iter(|| black_box(background.tick(Some(&mut canvas))))
    });
}

fn physics_step(c: &mut Criterion) {
    let config = BackgroundConfig::default();
    let mut rng = StdRng::seed_from_u64(1);
    let mut world = World::generate(Viewport::new(1280.0, 720.0), &config, &mut rng);

    c.bench_function("physics_step", |b| {
        b.iter(|| physics::step(black_box(&mut world), &config.physics))
    });
}

criterion_group!(benches, full_frame, physics_step);
criterion_main!(benches);
