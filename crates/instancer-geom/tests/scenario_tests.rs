// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs)]
use core::f32::consts::{FRAC_PI_2, FRAC_PI_4, SQRT_2};
use std::sync::Arc;

use instancer_geom::{
    Aabb, GeomId, Instance, Interpolation, PrimInfo, PrimRef, PrimRefMB, QuaternionDecomposition,
    TimeRange,
};
use instancer_math::{AffineTransform, Mat3, Quat, Vec3};

fn unit_box() -> Arc<Aabb> {
    Arc::new(Aabb::new(Vec3::splat(-1.0), Vec3::ONE))
}

fn assert_box_eq(got: &Aabb, want: &Aabb, tol: f32) {
    assert!(
        got.contains(want, tol) && want.contains(got, tol),
        "got {got:?}, want {want:?}"
    );
}

fn quarter_turn_z() -> QuaternionDecomposition {
    QuaternionDecomposition::identity().with_rotation(Quat::from_axis_angle(Vec3::UNIT_Z, FRAC_PI_2))
}

#[test]
fn linear_translation_midpoint() {
    let mut inst = Instance::with_object(2, unit_box()).expect("instance");
    inst.set_transform(&AffineTransform::identity(), 0);
    inst.set_transform(
        &AffineTransform::from_translation(Vec3::new(10.0, 0.0, 0.0)),
        1,
    );
    inst.commit().expect("commit");
    assert_eq!(inst.interpolation(), Interpolation::Linear);

    let mid = inst.transform_at(0.5);
    let want = AffineTransform::from_translation(Vec3::new(5.0, 0.0, 0.0));
    assert!(mid.max_abs_diff(&want) < 1e-6, "{mid:?}");

    assert_box_eq(
        &inst.bounds_at_time(0.5),
        &Aabb::new(Vec3::new(4.0, -1.0, -1.0), Vec3::new(6.0, 1.0, 1.0)),
        1e-6,
    );

    let back = inst
        .world_to_local(0.5)
        .transform_point(&Vec3::new(5.0, 0.0, 0.0));
    assert!(back.abs().max_element() < 1e-6);
}

#[test]
fn spherical_quarter_turn_midpoint_is_eighth_turn() {
    let mut inst = Instance::with_object(2, unit_box()).expect("instance");
    inst.set_quaternion_decomposition(&QuaternionDecomposition::identity(), 0);
    inst.set_quaternion_decomposition(&quarter_turn_z(), 1);
    inst.commit().expect("commit");
    assert_eq!(inst.interpolation(), Interpolation::Spherical);

    let mid = inst.transform_at(0.5);
    let want = AffineTransform::from_linear(Mat3::rotation_z(FRAC_PI_4));
    assert!(mid.max_abs_diff(&want) < 1e-5, "{mid:?}");
    assert!((mid.determinant() - 1.0).abs() < 1e-5);

    // The entry-wise blend of the same endpoints is not a rotation.
    let blend = AffineTransform::identity().lerp(&quarter_turn_z().to_affine(), 0.5);
    assert!((blend.determinant() - 0.5).abs() < 1e-5);

    let r = SQRT_2;
    assert_box_eq(
        &inst.bounds_at_time(0.5),
        &Aabb::new(Vec3::new(-r, -r, -1.0), Vec3::new(r, r, 1.0)),
        1e-5,
    );
}

#[test]
fn plain_then_decomposed_interpolates_spherically() {
    let mut inst = Instance::with_object(2, unit_box()).expect("instance");
    inst.set_transform(&AffineTransform::identity(), 0);
    inst.set_quaternion_decomposition(&quarter_turn_z(), 1);
    inst.commit().expect("commit");
    assert_eq!(inst.interpolation(), Interpolation::Spherical);
    let mid = inst.transform_at(0.5);
    let want = AffineTransform::from_linear(Mat3::rotation_z(FRAC_PI_4));
    assert!(mid.max_abs_diff(&want) < 1e-5, "{mid:?}");
}

fn flattened() -> AffineTransform {
    AffineTransform::new(
        Mat3::from_diagonal(Vec3::new(1.0, 0.0, 1.0)),
        Vec3::new(3.0, 0.0, 0.0),
    )
}

fn run_producers(inst: &Instance) -> (usize, usize, usize) {
    let mut refs = [PrimRef::default(); 1];
    let mut k_static = 0;
    let info = inst.create_prim_ref_array(&mut refs, 0..1, &mut k_static, GeomId(7));
    assert_eq!(info.count, k_static);

    let mut k_segment = 0;
    let info = inst.create_prim_ref_array_mb(&mut refs, 0, 0..1, &mut k_segment, GeomId(7));
    assert_eq!(info.count, k_segment);

    let mut mb = [PrimRefMB::default(); 1];
    let mut k_range = 0;
    let info = inst.create_prim_ref_mb_array(&mut mb, &TimeRange::UNIT, 0..1, &mut k_range, GeomId(7));
    assert_eq!(info.count, k_range);
    (k_static, k_segment, k_range)
}

#[test]
fn singular_timestep_is_invalid_and_filtered() {
    let mut inst = Instance::with_object(2, unit_box()).expect("instance");
    inst.set_transform(&flattened(), 1);
    inst.commit().expect("commit");

    assert!(inst.timestep_is_valid(0));
    assert!(!inst.timestep_is_valid(1));
    assert!(inst.is_valid(0..=0));
    assert!(!inst.is_valid(0..=1));
    assert!(!inst.is_valid(1..=1));

    // Timestep 0 is fine, so only the static producer emits.
    assert_eq!(run_producers(&inst), (1, 0, 0));
}

#[test]
fn singular_first_timestep_is_filtered_everywhere() {
    let mut inst = Instance::with_object(2, unit_box()).expect("instance");
    inst.set_transform(&flattened(), 0);
    inst.commit().expect("commit");
    assert_eq!(run_producers(&inst), (0, 0, 0));
    // The cached inverse is non-finite rather than a panic.
    assert!(!inst.world_to_local0().is_finite());
}

#[test]
fn singular_decomposition_is_filtered() {
    let mut inst = Instance::with_object(2, unit_box()).expect("instance");
    let flat = QuaternionDecomposition::identity().with_scale(Vec3::new(1.0, 1.0, 0.0));
    inst.set_quaternion_decomposition(&QuaternionDecomposition::identity(), 0);
    inst.set_quaternion_decomposition(&flat, 1);
    inst.commit().expect("commit");
    assert!(!inst.timestep_is_valid(1));
    assert_eq!(run_producers(&inst), (1, 0, 0));
}

#[test]
fn non_finite_and_huge_transforms_are_invalid() {
    let mut inst = Instance::with_object(3, unit_box()).expect("instance");
    inst.set_transform(
        &AffineTransform::from_translation(Vec3::new(f32::NAN, 0.0, 0.0)),
        1,
    );
    inst.set_transform(
        &AffineTransform::from_translation(Vec3::new(0.0, 2.0e18, 0.0)),
        2,
    );
    inst.commit().expect("commit");
    assert!(inst.timestep_is_valid(0));
    assert!(!inst.timestep_is_valid(1));
    assert!(!inst.timestep_is_valid(2));
    assert!(!inst.bounds_at(2).is_valid());
}

#[test]
fn static_instance_reports_one_primitive() {
    let mut inst = Instance::with_object(1, unit_box()).expect("instance");
    inst.set_transform(
        &AffineTransform::from_translation(Vec3::new(0.0, 0.0, 4.0)),
        0,
    );
    inst.commit().expect("commit");
    let mut refs = [PrimRef::default(); 2];
    let mut k = 1;
    let info = inst.create_prim_ref_array(&mut refs, 0..1, &mut k, GeomId(2));
    assert_eq!(k, 2);
    assert_eq!(refs[1].geom_id, GeomId(2));
    assert_eq!(refs[1].prim_id, 0);
    assert_box_eq(
        &refs[1].bounds,
        &Aabb::new(Vec3::new(-1.0, -1.0, 3.0), Vec3::new(1.0, 1.0, 5.0)),
        0.0,
    );
    let mut want = PrimInfo::empty();
    want.add_center2(&refs[1]);
    assert_eq!(info, want);
}
