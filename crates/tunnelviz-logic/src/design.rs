//! Tunnel design parameters and their validation.
//!
//! A [`TunnelDesign`] is the snapshot the design editor mutates field by
//! field. The engine never mutates it; it validates the snapshot at the
//! boundary and derives everything else from it.
//!
//! ```
//! use tunnelviz_logic::design::{validate_design, ConstructionMethod, TunnelDesign};
//!
//! let design = TunnelDesign::default().with_method(ConstructionMethod::Natm);
//! assert!(validate_design(&design).is_empty());
//! ```

use serde::{Deserialize, Serialize};

use crate::constants::{controls, MIN_HORIZONTAL_RADIUS, STRAIGHT_RADIUS};
use crate::error::DesignError;

/// Cross-section shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TunnelShape {
    Circular,
    Rectangular,
    Horseshoe,
}

impl TunnelShape {
    pub fn all() -> &'static [TunnelShape] {
        &[Self::Circular, Self::Rectangular, Self::Horseshoe]
    }
}

/// Construction method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstructionMethod {
    Tbm,
    Natm,
    CutAndCover,
}

impl ConstructionMethod {
    pub fn all() -> &'static [ConstructionMethod] {
        &[Self::Tbm, Self::Natm, Self::CutAndCover]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Tbm => "TBM",
            Self::Natm => "NATM",
            Self::CutAndCover => "Cut & Cover",
        }
    }
}

/// Parametric tunnel design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TunnelDesign {
    pub shape: TunnelShape,
    /// Width, or diameter for circular sections (m).
    pub width: f32,
    pub height: f32,
    pub wall_thickness: f32,
    /// Invert depth below the surface (m).
    pub depth: f32,
    pub method: ConstructionMethod,
    /// Regular segments per TBM ring (the key segment is extra).
    pub segment_count: u32,
    pub ring_width: f32,
    pub bolt_length: f32,
    pub bolt_spacing: f32,
    /// Horizontal curve radius (m). Values at or above
    /// [`STRAIGHT_RADIUS`] (or infinity) mean a straight alignment.
    pub horizontal_radius: f32,
    /// Vertical grade in percent, signed.
    pub vertical_grade: f32,
}

impl Default for TunnelDesign {
    fn default() -> Self {
        Self {
            shape: TunnelShape::Circular,
            width: 6.0,
            height: 6.0,
            wall_thickness: 0.3,
            depth: 20.0,
            method: ConstructionMethod::Tbm,
            segment_count: 6,
            ring_width: 1.5,
            bolt_length: 4.0,
            bolt_spacing: 1.5,
            horizontal_radius: STRAIGHT_RADIUS,
            vertical_grade: 0.0,
        }
    }
}

impl TunnelDesign {
    /// Switch construction method. TBM forces a circular shape.
    pub fn with_method(mut self, method: ConstructionMethod) -> Self {
        self.method = method;
        self.normalized()
    }

    /// Apply the TBM shape rule to an existing snapshot.
    pub fn normalized(mut self) -> Self {
        if self.method == ConstructionMethod::Tbm {
            self.shape = TunnelShape::Circular;
            self.height = self.width;
        }
        self
    }

    /// Outer radius of a circular section, or half the width otherwise.
    pub fn outer_radius(&self) -> f32 {
        self.width / 2.0
    }

    /// Clear height of the section: the diameter for circular sections.
    pub fn section_height(&self) -> f32 {
        match self.shape {
            TunnelShape::Circular => self.width,
            _ => self.height,
        }
    }

    /// Depth of the crown below the surface.
    pub fn crown_depth(&self) -> f32 {
        (self.depth - self.section_height()).max(0.0)
    }

    pub fn is_straight(&self) -> bool {
        self.horizontal_radius >= STRAIGHT_RADIUS
    }
}

/// Validate a design, returning all errors found.
pub fn validate_design(design: &TunnelDesign) -> Vec<DesignError> {
    let mut errors = Vec::new();

    let finite = [
        ("width", design.width),
        ("height", design.height),
        ("wall_thickness", design.wall_thickness),
        ("depth", design.depth),
        ("ring_width", design.ring_width),
        ("bolt_length", design.bolt_length),
        ("bolt_spacing", design.bolt_spacing),
        ("vertical_grade", design.vertical_grade),
    ];
    for (name, value) in finite {
        if !value.is_finite() {
            errors.push(DesignError::NonFinite(name));
        }
    }
    // Infinity is the straight sentinel, NaN is not.
    if design.horizontal_radius.is_nan() {
        errors.push(DesignError::NonFinite("horizontal_radius"));
    }
    if !errors.is_empty() {
        return errors;
    }

    if design.width <= 0.0 {
        errors.push(DesignError::NonPositiveWidth(design.width));
    }
    // TBM sections are normalized to circles, so only other methods carry
    // a free height.
    let has_height =
        design.shape != TunnelShape::Circular && design.method != ConstructionMethod::Tbm;
    if has_height && design.height <= 0.0 {
        errors.push(DesignError::NonPositiveHeight(design.height));
    }
    if design.wall_thickness <= 0.0 {
        errors.push(DesignError::NonPositiveWallThickness(design.wall_thickness));
    } else {
        if design.width > 0.0 && design.wall_thickness >= design.width / 2.0 {
            errors.push(DesignError::WallTooThick {
                thickness: design.wall_thickness,
                half_width: design.width / 2.0,
            });
        }
        if has_height && design.height > 0.0 && design.wall_thickness >= design.height / 2.0 {
            errors.push(DesignError::WallTooThickForHeight {
                thickness: design.wall_thickness,
                half_height: design.height / 2.0,
            });
        }
    }
    if design.depth <= 0.0 {
        errors.push(DesignError::NonPositiveDepth(design.depth));
    }

    match design.method {
        ConstructionMethod::Tbm => {
            if design.ring_width <= 0.0 {
                errors.push(DesignError::NonPositiveRingWidth(design.ring_width));
            }
            if !(controls::SEGMENT_COUNT_MIN..=controls::SEGMENT_COUNT_MAX)
                .contains(&design.segment_count)
            {
                errors.push(DesignError::SegmentCountOutOfRange {
                    count: design.segment_count,
                    min: controls::SEGMENT_COUNT_MIN,
                    max: controls::SEGMENT_COUNT_MAX,
                });
            }
        }
        ConstructionMethod::Natm => {
            if design.bolt_spacing <= 0.0 {
                errors.push(DesignError::NonPositiveBoltSpacing(design.bolt_spacing));
            }
            if design.bolt_length <= 0.0 {
                errors.push(DesignError::NonPositiveBoltLength(design.bolt_length));
            }
        }
        ConstructionMethod::CutAndCover => {}
    }

    if design.horizontal_radius < MIN_HORIZONTAL_RADIUS {
        errors.push(DesignError::RadiusBelowFloor {
            radius: design.horizontal_radius,
            floor: MIN_HORIZONTAL_RADIUS,
        });
    }

    errors
}

/// Clamp every field into its editor range.
///
/// This is the forgiving path used by interactive front ends; the engine
/// itself rejects out-of-range input through [`validate_design`].
pub fn clamp_to_controls(design: &TunnelDesign) -> TunnelDesign {
    let mut out = design.clone();
    out.width = clamp_logged("width", design.width, controls::WIDTH.clamp(design.width));
    out.height = clamp_logged("height", design.height, controls::HEIGHT.clamp(design.height));
    out.wall_thickness = clamp_logged(
        "wall_thickness",
        design.wall_thickness,
        controls::WALL_THICKNESS.clamp(design.wall_thickness),
    );
    out.depth = clamp_logged("depth", design.depth, controls::DEPTH.clamp(design.depth));
    out.ring_width = clamp_logged(
        "ring_width",
        design.ring_width,
        controls::RING_WIDTH.clamp(design.ring_width),
    );
    out.bolt_length = clamp_logged(
        "bolt_length",
        design.bolt_length,
        controls::BOLT_LENGTH.clamp(design.bolt_length),
    );
    out.bolt_spacing = clamp_logged(
        "bolt_spacing",
        design.bolt_spacing,
        controls::BOLT_SPACING.clamp(design.bolt_spacing),
    );
    out.horizontal_radius = clamp_logged(
        "horizontal_radius",
        design.horizontal_radius,
        controls::HORIZONTAL_RADIUS.clamp(design.horizontal_radius),
    );
    out.vertical_grade = clamp_logged(
        "vertical_grade",
        design.vertical_grade,
        controls::VERTICAL_GRADE.clamp(design.vertical_grade),
    );
    let segments = design
        .segment_count
        .clamp(controls::SEGMENT_COUNT_MIN, controls::SEGMENT_COUNT_MAX);
    if segments != design.segment_count {
        log::warn!(
            "segment_count clamped from {} to {}",
            design.segment_count,
            segments
        );
    }
    out.segment_count = segments;
    out.normalized()
}

fn clamp_logged(field: &str, before: f32, after: f32) -> f32 {
    if before != after {
        log::warn!("{field} clamped from {before} to {after}");
    }
    after
}

/// Short design feedback for the stats panel.
pub fn design_advisories(design: &TunnelDesign) -> Vec<&'static str> {
    let mut tips = Vec::new();
    if design.width > 12.0 {
        tips.push("Large diameter requires heavier support.");
    }
    if design.shape == TunnelShape::Rectangular && design.method == ConstructionMethod::Natm {
        tips.push("Rectangular sections are unusual for NATM; an arched crown carries load better.");
    }
    if design.depth < design.section_height() * 1.5 && design.method != ConstructionMethod::CutAndCover
    {
        tips.push("Shallow cover: consider cut-and-cover or ground improvement.");
    }
    if tips.is_empty() {
        tips.push("Standard dimensions within efficient range.");
    }
    tips
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_design_is_valid() {
        assert!(validate_design(&TunnelDesign::default()).is_empty());
    }

    #[test]
    fn tbm_forces_circular() {
        let mut design = TunnelDesign {
            shape: TunnelShape::Rectangular,
            height: 4.0,
            method: ConstructionMethod::Natm,
            ..Default::default()
        };
        design = design.with_method(ConstructionMethod::Tbm);
        assert_eq!(design.shape, TunnelShape::Circular);
        assert!((design.height - design.width).abs() < f32::EPSILON);
    }

    #[test]
    fn natm_keeps_shape() {
        let design = TunnelDesign {
            shape: TunnelShape::Horseshoe,
            ..Default::default()
        }
        .with_method(ConstructionMethod::Natm);
        assert_eq!(design.shape, TunnelShape::Horseshoe);
    }

    #[test]
    fn collects_all_errors() {
        let design = TunnelDesign {
            width: 0.0,
            wall_thickness: -1.0,
            depth: 0.0,
            ring_width: 0.0,
            segment_count: 12,
            horizontal_radius: 10.0,
            ..Default::default()
        };
        let errors = validate_design(&design);
        assert!(errors.contains(&DesignError::NonPositiveWidth(0.0)));
        assert!(errors.contains(&DesignError::NonPositiveWallThickness(-1.0)));
        assert!(errors.contains(&DesignError::NonPositiveDepth(0.0)));
        assert!(errors.contains(&DesignError::NonPositiveRingWidth(0.0)));
        assert!(errors
            .iter()
            .any(|e| matches!(e, DesignError::SegmentCountOutOfRange { count: 12, .. })));
        assert!(errors
            .iter()
            .any(|e| matches!(e, DesignError::RadiusBelowFloor { .. })));
    }

    #[test]
    fn wall_must_be_thinner_than_half_width() {
        let design = TunnelDesign {
            width: 4.0,
            wall_thickness: 2.0,
            ..Default::default()
        };
        let errors = validate_design(&design);
        assert!(matches!(errors[0], DesignError::WallTooThick { .. }));
    }

    #[test]
    fn wall_must_be_thinner_than_half_height() {
        let design = TunnelDesign {
            shape: TunnelShape::Horseshoe,
            method: ConstructionMethod::Natm,
            width: 10.0,
            height: 3.0,
            wall_thickness: 1.6,
            ..Default::default()
        };
        assert_eq!(
            validate_design(&design),
            vec![DesignError::WallTooThickForHeight {
                thickness: 1.6,
                half_height: 1.5
            }]
        );
        let msg = DesignError::WallTooThickForHeight {
            thickness: 1.6,
            half_height: 1.5,
        }
        .to_string();
        assert!(msg.contains("half the height (1.5)"), "{msg}");
    }

    #[test]
    fn tbm_height_is_ignored() {
        let design = TunnelDesign {
            shape: TunnelShape::Rectangular,
            height: 0.5,
            ..Default::default()
        };
        assert!(validate_design(&design).is_empty());
    }

    #[test]
    fn natm_checks_bolts_not_rings() {
        let design = TunnelDesign {
            method: ConstructionMethod::Natm,
            ring_width: 0.0,
            bolt_spacing: 0.0,
            ..Default::default()
        };
        let errors = validate_design(&design);
        assert_eq!(errors, vec![DesignError::NonPositiveBoltSpacing(0.0)]);
    }

    #[test]
    fn infinite_radius_is_straight_and_valid() {
        let design = TunnelDesign {
            horizontal_radius: f32::INFINITY,
            ..Default::default()
        };
        assert!(validate_design(&design).is_empty());
        assert!(design.is_straight());
    }

    #[test]
    fn nan_is_rejected() {
        let design = TunnelDesign {
            width: f32::NAN,
            ..Default::default()
        };
        assert_eq!(validate_design(&design), vec![DesignError::NonFinite("width")]);
    }

    #[test]
    fn clamping_produces_valid_design() {
        let design = TunnelDesign {
            width: 40.0,
            wall_thickness: 0.0,
            depth: 500.0,
            segment_count: 1,
            horizontal_radius: 1.0,
            vertical_grade: 12.0,
            ..Default::default()
        };
        let clamped = clamp_to_controls(&design);
        assert!((clamped.width - 15.0).abs() < f32::EPSILON);
        assert!((clamped.depth - 100.0).abs() < f32::EPSILON);
        assert_eq!(clamped.segment_count, 3);
        assert!((clamped.vertical_grade - 5.0).abs() < f32::EPSILON);
        assert!(validate_design(&clamped).is_empty());
    }

    #[test]
    fn crown_depth_uses_diameter_for_circles() {
        let design = TunnelDesign::default();
        assert!((design.crown_depth() - 14.0).abs() < 1e-5);
    }

    #[test]
    fn advisories() {
        assert_eq!(
            design_advisories(&TunnelDesign::default()),
            vec!["Standard dimensions within efficient range."]
        );
        let wide = TunnelDesign {
            width: 13.0,
            depth: 60.0,
            ..Default::default()
        };
        assert_eq!(
            design_advisories(&wide),
            vec!["Large diameter requires heavier support."]
        );
    }
}
