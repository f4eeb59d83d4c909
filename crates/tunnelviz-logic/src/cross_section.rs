//! Excavated cross-section geometry.
//!
//! # Shapes
//!
//! | Shape | Area | Perimeter |
//! |-------|------|-----------|
//! | Circular | πr² | 2πr |
//! | Rectangular | w·h | 2(w+h) |
//! | Horseshoe | πr²/2 + 0.5·w·h | πr + 2h + w |
//!
//! with r = width/2. The horseshoe row is an approximation (a half-circle
//! crown over a rectangular lower body), not a true horseshoe profile.

use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

use crate::design::{TunnelDesign, TunnelShape};
use crate::error::DesignError;

/// Area and perimeter of one section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionProperties {
    pub area: f32,
    pub perimeter: f32,
}

/// Area and perimeter of a bare shape.
///
/// The height is ignored for circular sections.
pub fn section_properties(
    shape: TunnelShape,
    width: f32,
    height: f32,
) -> Result<SectionProperties, DesignError> {
    if !(width > 0.0) {
        return Err(DesignError::NonPositiveWidth(width));
    }
    if shape != TunnelShape::Circular && !(height > 0.0) {
        return Err(DesignError::NonPositiveHeight(height));
    }

    let r = width / 2.0;
    let props = match shape {
        TunnelShape::Circular => SectionProperties {
            area: PI * r * r,
            perimeter: 2.0 * PI * r,
        },
        TunnelShape::Rectangular => SectionProperties {
            area: width * height,
            perimeter: 2.0 * (width + height),
        },
        TunnelShape::Horseshoe => SectionProperties {
            area: (PI * r * r) / 2.0 + width * height * 0.5,
            perimeter: PI * r + 2.0 * height + width,
        },
    };
    Ok(props)
}

/// Outer and inner extents of the lining.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiningBounds {
    pub outer_width: f32,
    pub outer_height: f32,
    pub inner_width: f32,
    pub inner_height: f32,
}

impl LiningBounds {
    pub fn outer_radius(&self) -> f32 {
        self.outer_width / 2.0
    }

    pub fn inner_radius(&self) -> f32 {
        self.inner_width / 2.0
    }
}

/// Full cross-section readout for a design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossSection {
    pub shape: TunnelShape,
    pub excavation: SectionProperties,
    pub lining: LiningBounds,
    /// Concrete area per metre of tunnel (m²).
    pub lining_area: f32,
    /// Spoil volume over [`crate::constants::SPOIL_REFERENCE_LENGTH`] (m³).
    pub spoil_volume_reference: f32,
}

impl CrossSection {
    /// Excavated volume over `length` metres.
    pub fn spoil_volume(&self, length: f32) -> f32 {
        self.excavation.area * length
    }
}

/// Derive the cross-section of a design.
pub fn cross_section(design: &TunnelDesign) -> Result<CrossSection, DesignError> {
    let height = design.section_height();
    let excavation = section_properties(design.shape, design.width, height)?;

    let t = design.wall_thickness;
    if !(t > 0.0) {
        return Err(DesignError::NonPositiveWallThickness(t));
    }
    let inner_width = design.width - 2.0 * t;
    let inner_height = height - 2.0 * t;
    if !(inner_width > 0.0) {
        return Err(DesignError::WallTooThick {
            thickness: t,
            half_width: design.width / 2.0,
        });
    }
    if !(inner_height > 0.0) {
        return Err(DesignError::WallTooThickForHeight {
            thickness: t,
            half_height: height / 2.0,
        });
    }

    let inner = section_properties(design.shape, inner_width, inner_height)?;
    let lining = LiningBounds {
        outer_width: design.width,
        outer_height: height,
        inner_width,
        inner_height,
    };

    Ok(CrossSection {
        shape: design.shape,
        excavation,
        lining,
        lining_area: excavation.area - inner.area,
        spoil_volume_reference: excavation.area * crate::constants::SPOIL_REFERENCE_LENGTH,
    })
}
