//! Benchmarks for the gyro composition hot path.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::{DQuat, DVec3};
use warp_core::{Curvature, GyroVector};

fn bench_compose(c: &mut Criterion) {
    let g = GyroVector::new(DVec3::new(0.2, -0.05, 0.1), DQuat::from_rotation_y(0.4));
    let other = GyroVector::new(DVec3::new(-0.1, 0.0, 0.3), DQuat::from_rotation_x(0.2));
    let delta = DVec3::new(0.01, 0.0, 0.02);

    c.bench_function("gyro_add_translation", |b| {
        b.iter(|| black_box(g).add(Curvature::Hyperbolic, black_box(delta)));
    });

    c.bench_function("gyro_add_gyro", |b| {
        b.iter(|| black_box(g).add(Curvature::Hyperbolic, black_box(other)));
    });

    c.bench_function("gyro_travel_1000_steps", |b| {
        b.iter(|| {
            let mut traveller = GyroVector::IDENTITY;
            for _ in 0..1000 {
                traveller = traveller.travel(Curvature::Hyperbolic, black_box(delta));
            }
            traveller
        });
    });
}

criterion_group!(benches, bench_compose);
criterion_main!(benches);
