// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs)]
use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use instancer_geom::{Aabb, Instance, LaneQuery, QuaternionDecomposition, DEFAULT_LANE_WIDTH};
use instancer_math::{Quat, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn instance(steps: usize) -> Instance {
    let object = Arc::new(Aabb::from_center_half_extents(Vec3::ZERO, 1.0, 1.0, 1.0));
    let mut inst = Instance::with_object(steps, object).expect("instance");
    for i in 0..steps {
        let angle = 0.3 * f32::from(u16::try_from(i).expect("step"));
        let qd = QuaternionDecomposition::identity()
            .with_rotation(Quat::from_axis_angle(Vec3::UNIT_Y, angle))
            .with_translation(Vec3::new(angle, 0.0, 0.0));
        inst.set_quaternion_decomposition(&qd, i);
    }
    inst.commit().expect("commit");
    inst
}

fn queries(rng: &mut StdRng, spread: f32, count: usize) -> Vec<LaneQuery<DEFAULT_LANE_WIDTH>> {
    (0..count)
        .map(|_| {
            let base = rng.gen_range(0.0..(1.0 - spread));
            let mut times = [0.0f32; DEFAULT_LANE_WIDTH];
            for t in &mut times {
                *t = base + rng.gen_range(0.0..=spread);
            }
            LaneQuery::new(times)
        })
        .collect()
}

fn bench_lanes(c: &mut Criterion) {
    let mut group = c.benchmark_group("world_to_local");
    let inst = instance(33);
    let mut rng = StdRng::seed_from_u64(0xB47C);
    // Spread 0 keeps every lane in one segment; 0.9 scatters them.
    for &(label, spread) in &[("coherent", 0.0f32), ("scattered", 0.9)] {
        let batch = queries(&mut rng, spread, 256);
        group.throughput(Throughput::Elements((batch.len() * DEFAULT_LANE_WIDTH) as u64));
        group.bench_with_input(BenchmarkId::new("lanes", label), &batch, |b, batch| {
            b.iter(|| {
                for q in batch {
                    black_box(inst.world_to_local_lanes(q));
                }
            });
        });
        group.bench_with_input(BenchmarkId::new("scalar", label), &batch, |b, batch| {
            b.iter(|| {
                for q in batch {
                    for &t in &q.times {
                        black_box(inst.world_to_local(t));
                    }
                }
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_lanes);
criterion_main!(benches);
