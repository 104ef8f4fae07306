// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs)]
use core::f32::consts::{FRAC_PI_2, PI};
use std::sync::Arc;

use proptest::prelude::*;
use proptest::test_runner::{Config as PropConfig, RngAlgorithm, TestRng, TestRunner};

use instancer_geom::{
    Aabb, BoundsConfig, InstancedObject, Instance, KeyframedBounds, QuaternionDecomposition,
    TimeRange,
};
use instancer_math::{AffineTransform, Mat3, Quat, Vec3};

const SAMPLES: u16 = 200;

const SEED_BYTES: [u8; 32] = [
    0x2b, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0,
];

fn pinned_runner(cases: u32) -> TestRunner {
    let rng = TestRng::from_seed(RngAlgorithm::ChaCha, &SEED_BYTES);
    TestRunner::new_with_rng(
        PropConfig {
            cases,
            ..PropConfig::default()
        },
        rng,
    )
}

fn magnitude(b: &Aabb) -> f32 {
    b.min().abs().max(&b.max().abs()).max_element().max(1.0)
}

/// Dense-samples `bounds_at_time` over `range` and checks that the envelope
/// (and its hull) contain every sample.
fn check_conservative(inst: &Instance, range: &TimeRange) -> Result<(), String> {
    let lb = inst.interval_bounds(range);
    if !lb.is_valid() {
        return Err(format!("invalid envelope {lb:?}"));
    }
    let hull = lb.bounds();
    for step in 0..=SAMPLES {
        let u = f32::from(step) / f32::from(SAMPLES);
        let t = instancer_math::lerp(range.lower, range.upper, u);
        let sample = inst.bounds_at_time(t);
        let tol = 1e-5 * magnitude(&sample);
        let at = lb.interpolate(u);
        if !at.contains(&sample, tol) {
            return Err(format!("t={t}: envelope {at:?} misses {sample:?}"));
        }
        if !hull.contains(&sample, tol) {
            return Err(format!("t={t}: hull {hull:?} misses {sample:?}"));
        }
    }
    Ok(())
}

fn assert_conservative(inst: &Instance, range: &TimeRange) {
    if let Err(msg) = check_conservative(inst, range) {
        panic!("range {range:?}: {msg}");
    }
}

fn ranges() -> [TimeRange; 5] {
    [
        TimeRange::UNIT,
        TimeRange::new(0.2, 0.9),
        TimeRange::new(0.13, 0.71),
        TimeRange::new(0.3, 0.35),
        TimeRange::new(0.5, 0.5),
    ]
}

fn off_center_box() -> Arc<Aabb> {
    Arc::new(Aabb::new(
        Vec3::new(4.0, -0.5, -0.5),
        Vec3::new(5.0, 0.5, 0.5),
    ))
}

fn spin(angles: &[f32], axis: Vec3, object: Arc<dyn InstancedObject>) -> Instance {
    let mut inst = Instance::with_object(angles.len(), object).expect("instance");
    for (i, &a) in angles.iter().enumerate() {
        let qd = QuaternionDecomposition::identity().with_rotation(Quat::from_axis_angle(axis, a));
        inst.set_quaternion_decomposition(&qd, i);
    }
    inst.commit().expect("commit");
    inst
}

#[test]
fn linear_motion_is_conservative() {
    let mut inst = Instance::with_object(3, off_center_box()).expect("instance");
    inst.set_transform(&AffineTransform::identity(), 0);
    inst.set_transform(
        &AffineTransform::new(
            Mat3::rotation_z(1.0).multiply(&Mat3::from_diagonal(Vec3::new(2.0, 1.0, 1.0))),
            Vec3::new(0.0, 3.0, 0.0),
        ),
        1,
    );
    inst.set_transform(
        &AffineTransform::new(Mat3::rotation_y(-2.0), Vec3::new(-6.0, 0.0, 1.0)),
        2,
    );
    inst.commit().expect("commit");
    for range in ranges() {
        assert_conservative(&inst, &range);
    }
}

#[test]
fn linear_constant_box_matches_segment_bounds() {
    let mut inst = Instance::with_object(2, off_center_box()).expect("instance");
    inst.set_transform(
        &AffineTransform::new(Mat3::rotation_z(0.8), Vec3::new(1.0, 2.0, 3.0)),
        1,
    );
    inst.commit().expect("commit");
    let lb = inst.interval_bounds(&TimeRange::UNIT);
    let seg = inst.segment_bounds(0);
    let pad = 1e-4 * magnitude(&seg.bounds());
    for (got, want) in [(lb.bounds0, seg.bounds0), (lb.bounds1, seg.bounds1)] {
        assert!(got.contains(&want, 0.0));
        assert!(want.contains(&got, pad));
    }
}

#[test]
fn rotating_off_center_object_is_conservative() {
    let inst = spin(&[0.0, FRAC_PI_2, 2.0, 3.4], Vec3::UNIT_Z, off_center_box());
    for range in ranges() {
        assert_conservative(&inst, &range);
    }
    let tilted = spin(
        &[0.0, 2.8, 0.3],
        Vec3::new(1.0, -2.0, 0.5).normalize(),
        off_center_box(),
    );
    for range in ranges() {
        assert_conservative(&tilted, &range);
    }
}

#[test]
fn half_turn_segment_is_conservative() {
    let inst = spin(&[0.0, PI - 1e-3], Vec3::UNIT_X, off_center_box());
    assert_conservative(&inst, &TimeRange::UNIT);
}

#[test]
fn quarter_turn_envelope_stays_tight() {
    let inst = spin(&[0.0, FRAC_PI_2], Vec3::UNIT_Z, off_center_box());
    let hull = inst.interval_bounds(&TimeRange::UNIT).bounds();
    // The swept box stays within radius |(5, 0.5)| of the z axis. A linear
    // envelope over a quarter turn has to overshoot that by about 1.15 on
    // the leading axes.
    let reach = (25.0f32 + 0.25).sqrt();
    assert!(hull.max().x() < reach * 1.3, "{hull:?}");
    assert!(hull.max().y() < reach * 1.3, "{hull:?}");
    assert!(hull.min().x() > -0.5 - 0.1 * reach, "{hull:?}");
    assert!(hull.min().y() > -0.5 - 0.1 * reach, "{hull:?}");
}

#[test]
fn coarse_refinement_is_still_conservative() {
    let mut inst = spin(&[0.0, 2.5, 0.2], Vec3::UNIT_Y, off_center_box());
    inst.set_bounds_config(BoundsConfig {
        refine_tolerance: 0.5,
        max_refine_depth: 0,
    })
    .expect("config");
    for range in ranges() {
        assert_conservative(&inst, &range);
    }
}

#[test]
fn full_decomposition_motion_is_conservative() {
    let mut inst = Instance::with_object(3, off_center_box()).expect("instance");
    inst.set_quaternion_decomposition(
        &QuaternionDecomposition::identity()
            .with_scale(Vec3::new(1.0, 2.0, 0.5))
            .with_shift(Vec3::new(-4.5, 0.0, 0.0)),
        0,
    );
    inst.set_quaternion_decomposition(
        &QuaternionDecomposition::identity()
            .with_skew(0.5, -0.25, 0.1)
            .with_rotation(Quat::from_axis_angle(Vec3::UNIT_Z, 1.9))
            .with_translation(Vec3::new(3.0, 0.0, -2.0)),
        1,
    );
    inst.set_quaternion_decomposition(
        &QuaternionDecomposition::identity()
            .with_scale(Vec3::splat(1.5))
            .with_rotation(Quat::from_axis_angle(Vec3::UNIT_X, -2.2))
            .with_translation(Vec3::new(0.0, 10.0, 0.0)),
        2,
    );
    inst.commit().expect("commit");
    for range in ranges() {
        assert_conservative(&inst, &range);
    }
}

fn growing_object() -> Arc<KeyframedBounds> {
    Arc::new(KeyframedBounds::new(vec![
        Aabb::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0)),
        Aabb::new(Vec3::new(-3.0, -1.0, 0.0), Vec3::new(6.0, 1.0, 2.0)),
        Aabb::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.5, 0.5, 0.5)),
    ]))
}

#[test]
fn varying_object_bounds_are_conservative_in_both_modes() {
    let mut linear = Instance::with_object(3, growing_object()).expect("instance");
    linear.set_transform(
        &AffineTransform::new(Mat3::rotation_z(0.0), Vec3::ZERO),
        0,
    );
    linear.set_transform(
        &AffineTransform::new(Mat3::rotation_z(1.2), Vec3::new(2.0, 0.0, 0.0)),
        1,
    );
    linear.set_transform(
        &AffineTransform::new(Mat3::rotation_x(0.6), Vec3::new(0.0, 0.0, 5.0)),
        2,
    );
    linear.commit().expect("commit");
    for range in ranges() {
        assert_conservative(&linear, &range);
    }

    let spherical = spin(&[0.0, 1.5, 3.0], Vec3::UNIT_Z, growing_object());
    for range in ranges() {
        assert_conservative(&spherical, &range);
    }
}

#[test]
fn instance_time_range_narrower_than_query() {
    let mut inst = spin(&[0.0, 2.0], Vec3::UNIT_Z, off_center_box());
    inst.set_time_range(0.25, 0.75).expect("range");
    inst.commit().expect("commit");
    assert_conservative(&inst, &TimeRange::UNIT);
    assert_conservative(&inst, &TimeRange::new(0.0, 0.4));
}

#[test]
fn single_timestep_envelope_is_the_padded_box() {
    let mut inst = Instance::with_object(1, off_center_box()).expect("instance");
    inst.set_transform(
        &AffineTransform::from_translation(Vec3::new(0.0, 0.0, 1.0)),
        0,
    );
    inst.commit().expect("commit");
    let lb = inst.interval_bounds(&TimeRange::new(0.1, 0.6));
    let b = inst.bounds_at(0);
    assert!(lb.bounds0.contains(&b, 0.0) && lb.bounds1.contains(&b, 0.0));
    assert!(b.contains(&lb.bounds(), 1e-3));
}

fn decomposition() -> impl Strategy<Value = QuaternionDecomposition> {
    let axis = prop::array::uniform3(-1.0f32..1.0);
    let angle = -3.1f32..3.1;
    let scale = prop::array::uniform3(0.5f32..2.0);
    let skew = prop::array::uniform3(-0.5f32..0.5);
    let shift = prop::array::uniform3(-2.0f32..2.0);
    let translation = prop::array::uniform3(-10.0f32..10.0);
    (axis, angle, scale, skew, shift, translation).prop_map(
        |(axis, angle, scale, skew, shift, translation)| {
            let axis = Vec3::from(axis);
            let axis = if axis.length() > 1e-3 { axis.normalize() } else { Vec3::UNIT_Z };
            QuaternionDecomposition::identity()
                .with_scale(Vec3::from(scale))
                .with_skew(skew[0], skew[1], skew[2])
                .with_shift(Vec3::from(shift))
                .with_rotation(Quat::from_axis_angle(axis, angle))
                .with_translation(Vec3::from(translation))
        },
    )
}

fn object_box() -> impl Strategy<Value = Aabb> {
    let center = prop::array::uniform3(-5.0f32..5.0);
    let half = prop::array::uniform3(0.01f32..3.0);
    (center, half).prop_map(|(c, h)| Aabb::from_center_half_extents(Vec3::from(c), h[0], h[1], h[2]))
}

fn sub_range() -> impl Strategy<Value = TimeRange> {
    (0.0f32..1.0, 0.0f32..1.0).prop_map(|(a, b)| TimeRange::new(a.min(b), a.max(b)))
}

#[test]
fn random_spherical_motion_is_conservative() {
    let mut runner = pinned_runner(48);
    let keys = prop::collection::vec(decomposition(), 2..=4);
    runner
        .run(&(keys, object_box(), sub_range()), |(keys, object, range)| {
            let mut inst = Instance::with_object(keys.len(), Arc::new(object)).expect("instance");
            for (i, key) in keys.iter().enumerate() {
                inst.set_quaternion_decomposition(key, i);
            }
            inst.commit().expect("commit");
            prop_assert!(check_conservative(&inst, &TimeRange::UNIT).is_ok());
            let result = check_conservative(&inst, &range);
            prop_assert!(result.is_ok(), "{:?}", result);
            Ok(())
        })
        .expect("spherical conservativeness");
}

#[test]
fn random_linear_motion_with_keyframed_bounds_is_conservative() {
    let mut runner = pinned_runner(48);
    let keys = prop::collection::vec(decomposition(), 2..=4);
    let frames = prop::collection::vec(object_box(), 4);
    runner
        .run(&(keys, frames, sub_range()), |(keys, frames, range)| {
            let object = Arc::new(KeyframedBounds::new(frames));
            let mut inst = Instance::with_object(keys.len(), object).expect("instance");
            for (i, key) in keys.iter().enumerate() {
                inst.set_transform(&key.to_affine(), i);
            }
            inst.commit().expect("commit");
            let result = check_conservative(&inst, &range);
            prop_assert!(result.is_ok(), "{:?}", result);
            Ok(())
        })
        .expect("linear conservativeness");
}
