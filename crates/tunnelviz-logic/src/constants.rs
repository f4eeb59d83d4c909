//! Engine constants and control ranges.
//!
//! The numbers here are design simplifications that stand in for real
//! geotechnical formulas. They are kept as named values in
//! [`EngineConstants`] so a scenario file can override any subset of them.

use serde::{Deserialize, Serialize};

use crate::alignment::FrameMode;
use crate::error::DesignError;

/// Length of the modelled tunnel stretch (m). Rings and bolt rows are laid
/// out over this length.
pub const TUNNEL_LENGTH: f32 = 40.0;

/// Number of control points generated for the alignment curve.
pub const ALIGNMENT_SAMPLES: usize = 21;

/// Radius at or above which the alignment is treated as straight (m).
pub const STRAIGHT_RADIUS: f32 = 10_000.0;

/// Smallest horizontal radius the curve sampler accepts (m).
pub const MIN_HORIZONTAL_RADIUS: f32 = 50.0;

/// Angular span reserved for the key segment (degrees).
pub const KEY_SEGMENT_ANGLE_DEG: f32 = 20.0;

/// Gap subtracted from every segment's span (degrees).
pub const SEGMENT_GAP_DEG: f32 = 0.5;

/// Rock bolts per NATM row, spread over the upper half circle.
pub const BOLTS_PER_ROW: u32 = 7;

/// Support pressure as a fraction of overburden pressure.
pub const SUPPORT_PRESSURE_COEFFICIENT: f32 = 0.4;

/// Unit weight of water (kN/m³).
pub const WATER_UNIT_WEIGHT: f32 = 9.81;

/// Upper bound of the hazard index.
pub const HAZARD_INDEX_MAX: f32 = 10.0;

/// Reference length for the spoil volume readout (m).
pub const SPOIL_REFERENCE_LENGTH: f32 = 100.0;

/// Upper bound on rings, bolt rows, bolts per row and alignment samples.
pub const MAX_LAYOUT_ELEMENTS: u32 = 10_000;

/// Above this length (m) cut-and-cover is always rated Low.
pub const CUT_AND_COVER_MAX_LENGTH: f64 = 2_000.0;

/// Overridable engine constants.
///
/// Every field falls back to its module constant when missing from a JSON
/// scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConstants {
    pub tunnel_length: f32,
    pub alignment_samples: usize,
    pub straight_radius: f32,
    pub min_horizontal_radius: f32,
    pub key_segment_angle_deg: f32,
    pub segment_gap_deg: f32,
    pub bolts_per_row: u32,
    pub support_pressure_coefficient: f32,
    pub water_unit_weight: f32,
    pub hazard: HazardWeights,
    pub stages: StageRequirements,
    /// Frame construction for rings and bolt rows.
    pub frame_mode: FrameMode,
}

impl Default for EngineConstants {
    fn default() -> Self {
        Self {
            tunnel_length: TUNNEL_LENGTH,
            alignment_samples: ALIGNMENT_SAMPLES,
            straight_radius: STRAIGHT_RADIUS,
            min_horizontal_radius: MIN_HORIZONTAL_RADIUS,
            key_segment_angle_deg: KEY_SEGMENT_ANGLE_DEG,
            segment_gap_deg: SEGMENT_GAP_DEG,
            bolts_per_row: BOLTS_PER_ROW,
            support_pressure_coefficient: SUPPORT_PRESSURE_COEFFICIENT,
            water_unit_weight: WATER_UNIT_WEIGHT,
            hazard: HazardWeights::default(),
            stages: StageRequirements::default(),
            frame_mode: FrameMode::FixedUp,
        }
    }
}

/// Validate overridden constants, returning all errors found.
pub fn validate_constants(constants: &EngineConstants) -> Vec<DesignError> {
    let mut errors = Vec::new();
    let mut check = |name: &'static str, value: f32, ok: bool| {
        if !(value.is_finite() && ok) {
            errors.push(DesignError::InvalidConstant { name, value });
        }
    };
    let c = constants;
    check("tunnel_length", c.tunnel_length, c.tunnel_length > 0.0);
    check(
        "alignment_samples",
        c.alignment_samples as f32,
        (2..=MAX_LAYOUT_ELEMENTS as usize).contains(&c.alignment_samples),
    );
    check(
        "min_horizontal_radius",
        c.min_horizontal_radius,
        c.min_horizontal_radius > 0.0,
    );
    // Infinity is allowed: every finite radius is then curved.
    check(
        "straight_radius",
        if c.straight_radius == f32::INFINITY { 0.0 } else { c.straight_radius },
        c.straight_radius > c.min_horizontal_radius,
    );
    check(
        "key_segment_angle_deg",
        c.key_segment_angle_deg,
        c.key_segment_angle_deg > 0.0 && c.key_segment_angle_deg < 360.0,
    );
    check("segment_gap_deg", c.segment_gap_deg, c.segment_gap_deg >= 0.0);
    check(
        "bolts_per_row",
        c.bolts_per_row as f32,
        (1..=MAX_LAYOUT_ELEMENTS).contains(&c.bolts_per_row),
    );
    check(
        "support_pressure_coefficient",
        c.support_pressure_coefficient,
        c.support_pressure_coefficient >= 0.0,
    );
    check("water_unit_weight", c.water_unit_weight, c.water_unit_weight >= 0.0);

    let h = &c.hazard;
    for (name, value) in [
        ("hazard.long_stand_up", h.long_stand_up),
        ("hazard.hours_stand_up", h.hours_stand_up),
        ("hazard.minutes_stand_up", h.minutes_stand_up),
        ("hazard.water_low_permeability", h.water_low_permeability),
        ("hazard.water_medium_permeability", h.water_medium_permeability),
        ("hazard.water_high_permeability", h.water_high_permeability),
    ] {
        check(name, value, true);
    }
    errors
}

/// Weights feeding the hazard index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HazardWeights {
    /// Base weight for ground that stands up for a long time.
    pub long_stand_up: f32,
    /// Base weight for ground that stands up for hours.
    pub hours_stand_up: f32,
    /// Base weight for ground that stands up for minutes.
    pub minutes_stand_up: f32,
    /// Water penalty per permeability class when the table is above the crown.
    pub water_low_permeability: f32,
    pub water_medium_permeability: f32,
    pub water_high_permeability: f32,
}

impl Default for HazardWeights {
    fn default() -> Self {
        Self {
            long_stand_up: 1.0,
            hours_stand_up: 4.0,
            minutes_stand_up: 8.0,
            water_low_permeability: 0.5,
            water_medium_permeability: 1.5,
            water_high_permeability: 3.0,
        }
    }
}

/// Excavation stage from which each NATM support element is installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageRequirements {
    pub shell: u8,
    pub mesh: u8,
    pub bolts: u8,
}

impl Default for StageRequirements {
    fn default() -> Self {
        Self {
            shell: 1,
            mesh: 1,
            bolts: 1,
        }
    }
}

/// Inclusive slider range for a design control.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlRange {
    pub min: f32,
    pub max: f32,
}

impl ControlRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    /// Clamp into range. NaN maps to the lower bound.
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            self.min
        } else {
            value.clamp(self.min, self.max)
        }
    }
}

/// Control ranges exposed by the design editor.
pub mod controls {
    use super::{ControlRange, MIN_HORIZONTAL_RADIUS, STRAIGHT_RADIUS};

    pub const WIDTH: ControlRange = ControlRange::new(3.0, 15.0);
    pub const HEIGHT: ControlRange = ControlRange::new(3.0, 15.0);
    pub const WALL_THICKNESS: ControlRange = ControlRange::new(0.2, 1.0);
    pub const DEPTH: ControlRange = ControlRange::new(5.0, 100.0);
    pub const RING_WIDTH: ControlRange = ControlRange::new(1.0, 2.0);
    pub const BOLT_LENGTH: ControlRange = ControlRange::new(2.0, 8.0);
    pub const BOLT_SPACING: ControlRange = ControlRange::new(0.5, 3.0);
    pub const HORIZONTAL_RADIUS: ControlRange =
        ControlRange::new(MIN_HORIZONTAL_RADIUS, STRAIGHT_RADIUS);
    pub const VERTICAL_GRADE: ControlRange = ControlRange::new(-5.0, 5.0);

    pub const SEGMENT_COUNT_MIN: u32 = 3;
    pub const SEGMENT_COUNT_MAX: u32 = 10;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_module_constants() {
        let c = EngineConstants::default();
        assert_eq!(c.alignment_samples, ALIGNMENT_SAMPLES);
        assert!((c.key_segment_angle_deg - 20.0).abs() < f32::EPSILON);
        assert!((c.support_pressure_coefficient - 0.4).abs() < f32::EPSILON);
        assert_eq!(c.bolts_per_row, 7);
        assert_eq!(c.stages.bolts, 1);
    }

    #[test]
    fn partial_json_override_keeps_defaults() {
        let c: EngineConstants =
            serde_json::from_str(r#"{ "key_segment_angle_deg": 30.0, "hazard": { "minutes_stand_up": 9.0 } }"#)
                .unwrap();
        assert!((c.key_segment_angle_deg - 30.0).abs() < f32::EPSILON);
        assert!((c.hazard.minutes_stand_up - 9.0).abs() < f32::EPSILON);
        assert!((c.hazard.hours_stand_up - 4.0).abs() < f32::EPSILON);
        assert!((c.tunnel_length - TUNNEL_LENGTH).abs() < f32::EPSILON);
    }

    #[test]
    fn default_constants_are_valid() {
        assert!(validate_constants(&EngineConstants::default()).is_empty());
        let open = EngineConstants {
            straight_radius: f32::INFINITY,
            ..Default::default()
        };
        assert!(validate_constants(&open).is_empty());
    }

    #[test]
    fn rejects_degenerate_constants() {
        let c = EngineConstants {
            tunnel_length: 0.0,
            alignment_samples: 1,
            support_pressure_coefficient: -3.0,
            bolts_per_row: 0,
            hazard: HazardWeights {
                hours_stand_up: f32::NAN,
                ..Default::default()
            },
            ..Default::default()
        };
        let names: Vec<_> = validate_constants(&c)
            .into_iter()
            .map(|e| match e {
                DesignError::InvalidConstant { name, .. } => name,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(
            names,
            vec![
                "tunnel_length",
                "alignment_samples",
                "bolts_per_row",
                "support_pressure_coefficient",
                "hazard.hours_stand_up",
            ]
        );
    }

    #[test]
    fn rejects_huge_layout_counts() {
        let c = EngineConstants {
            alignment_samples: 1_000_000,
            bolts_per_row: u32::MAX,
            ..Default::default()
        };
        assert_eq!(validate_constants(&c).len(), 2);
    }

    #[test]
    fn control_range_clamps_nan_to_min() {
        assert!((controls::WIDTH.clamp(f32::NAN) - 3.0).abs() < f32::EPSILON);
        assert!((controls::WIDTH.clamp(40.0) - 15.0).abs() < f32::EPSILON);
        assert!(controls::DEPTH.contains(20.0));
    }
}
