// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs)]
use instancer_geom::{BoundsConfig, ConfigError, GeometryError, Instance};

#[test]
fn defaults() {
    let cfg = BoundsConfig::default();
    assert!((cfg.refine_tolerance - 0.01).abs() < f32::EPSILON);
    assert_eq!(cfg.max_refine_depth, 8);
    assert_eq!(cfg.validate(), Ok(()));
}

#[test]
fn instance_rejects_invalid_config_and_keeps_the_old_one() {
    let mut inst = Instance::new(2).expect("instance");
    let bad = BoundsConfig {
        refine_tolerance: f32::INFINITY,
        ..BoundsConfig::default()
    };
    assert_eq!(
        inst.set_bounds_config(bad),
        Err(GeometryError::Config(ConfigError::InvalidTolerance(
            f32::INFINITY
        )))
    );
    assert_eq!(*inst.bounds_config(), BoundsConfig::default());

    let deep = BoundsConfig {
        max_refine_depth: BoundsConfig::MAX_DEPTH,
        ..BoundsConfig::default()
    };
    inst.set_bounds_config(deep).expect("max depth accepted");
    assert_eq!(inst.bounds_config().max_refine_depth, BoundsConfig::MAX_DEPTH);
}

#[test]
fn error_messages_name_the_field() {
    let err = GeometryError::from(ConfigError::InvalidDepth { got: 30, max: 16 });
    assert_eq!(
        err.to_string(),
        "invalid bounds config: max_refine_depth must be in 0..=16 (got 30)"
    );
}

#[test]
fn depth_cap_bounds_refinement_cost() {
    assert_eq!(BoundsConfig::MAX_DEPTH, 16);
    let too_deep = BoundsConfig {
        max_refine_depth: 17,
        ..BoundsConfig::default()
    };
    assert_eq!(
        too_deep.validate(),
        Err(ConfigError::InvalidDepth { got: 17, max: 16 })
    );
}

#[cfg(feature = "serde")]
mod serde_config {
    use instancer_geom::{BoundsConfig, QuaternionDecomposition, TransformRecord};
    use instancer_math::{Quat, Vec3};

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: BoundsConfig =
            serde_json::from_str(r#"{ "refine_tolerance": 0.05 }"#).expect("parse");
        assert!((cfg.refine_tolerance - 0.05).abs() < f32::EPSILON);
        assert_eq!(cfg.max_refine_depth, 8);
        assert_eq!(cfg.validate(), Ok(()));
    }

    #[test]
    fn parsed_config_is_still_validated() {
        let cfg: BoundsConfig =
            serde_json::from_str(r#"{ "max_refine_depth": 64 }"#).expect("parse");
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn transform_record_keeps_its_tag() {
        let qd = QuaternionDecomposition::identity()
            .with_rotation(Quat::from_axis_angle(Vec3::UNIT_Y, 0.5))
            .with_translation(Vec3::new(1.0, 2.0, 3.0));
        let record = TransformRecord::Decomposed(qd);
        let json = serde_json::to_string(&record).expect("serialize");
        assert!(json.contains("Decomposed"), "{json}");
        let back: TransformRecord = serde_json::from_str(&json).expect("parse");
        assert_eq!(back, record);
    }
}
