//! Full analysis pipeline: one input snapshot in, one report out.
//!
//! ```text
//! design + layers + settings
//!   ├─ cross_section ─────────────┐
//!   ├─ alignment ─ segmental/natm ┼─> DesignReport
//!   └─ stratigraphy ─ geotech ────┘
//! ```
//!
//! The pipeline is pure. Identical inputs give identical reports, so callers
//! may memoize on the input (see [`crate::cache`]).
//!
//! ```
//! use tunnelviz_logic::engine::{analyze, AnalysisInput};
//!
//! let report = analyze(&AnalysisInput::default()).unwrap();
//! assert!(report.geotech.assessment().is_some());
//! ```

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::alignment::{AlignmentCurve, AlignmentParams};
use crate::constants::{validate_constants, EngineConstants};
use crate::cross_section::{cross_section, CrossSection, LiningBounds};
use crate::design::{design_advisories, validate_design, ConstructionMethod, TunnelDesign};
use crate::error::EngineError;
use crate::geology::{default_layers, validate_layers, GeologicalLayer};
use crate::geotech::{assess, GeotechOutcome};
use crate::natm::{natm_layout, NatmLayout};
use crate::segmental::{segmental_layout, SegmentalLayout};
use crate::settings::SimulationSettings;

/// Everything the engine needs for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisInput {
    pub design: TunnelDesign,
    pub layers: Vec<GeologicalLayer>,
    pub settings: SimulationSettings,
    pub constants: EngineConstants,
}

impl Default for AnalysisInput {
    fn default() -> Self {
        Self {
            design: TunnelDesign::default(),
            layers: default_layers(),
            settings: SimulationSettings::default(),
            constants: EngineConstants::default(),
        }
    }
}

/// Structural support for the chosen method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SupportLayout {
    Segmental(SegmentalLayout),
    Natm(NatmLayout),
    /// Cut-and-cover box or arch cast in an open trench.
    CastInPlace { lining: LiningBounds },
}

/// Derived results for one design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignReport {
    /// The design after method normalization.
    pub design: TunnelDesign,
    pub cross_section: CrossSection,
    pub alignment: Vec<Vec3>,
    pub support: SupportLayout,
    pub geotech: GeotechOutcome,
    pub advisories: Vec<String>,
}

/// Alignment parameters for a design under the given constants.
pub fn alignment_params(design: &TunnelDesign, constants: &EngineConstants) -> AlignmentParams {
    AlignmentParams {
        horizontal_radius: design.horizontal_radius,
        vertical_grade: design.vertical_grade,
        length: constants.tunnel_length,
        samples: constants.alignment_samples,
        straight_radius: constants.straight_radius,
        min_radius: constants.min_horizontal_radius,
    }
}

/// Run the whole pipeline.
pub fn analyze(input: &AnalysisInput) -> Result<DesignReport, EngineError> {
    let errors = validate_design(&input.design);
    if !errors.is_empty() {
        return Err(EngineError::InvalidDesign(errors));
    }
    let constant_errors = validate_constants(&input.constants);
    if !constant_errors.is_empty() {
        return Err(EngineError::InvalidConstants(constant_errors));
    }
    let layer_errors = validate_layers(&input.layers);
    if !layer_errors.is_empty() {
        return Err(EngineError::InvalidLayers(layer_errors));
    }

    let design = input.design.clone().normalized();
    let constants = &input.constants;
    let section = cross_section(&design).map_err(|e| EngineError::InvalidDesign(vec![e]))?;
    let curve = AlignmentCurve::from_params(alignment_params(&design, constants));

    let support = match design.method {
        ConstructionMethod::Tbm => SupportLayout::Segmental(
            segmental_layout(&design, &curve, constants, constants.frame_mode)
                .map_err(|e| EngineError::InvalidDesign(vec![e]))?,
        ),
        ConstructionMethod::Natm => SupportLayout::Natm(
            natm_layout(
                &design,
                &curve,
                input.settings.natm_stage,
                constants,
                constants.frame_mode,
            )
            .map_err(|e| EngineError::InvalidDesign(vec![e]))?,
        ),
        ConstructionMethod::CutAndCover => SupportLayout::CastInPlace {
            lining: section.lining,
        },
    };

    let geotech = assess(&design, &input.layers, &input.settings, constants)?;
    let advisories = design_advisories(&design)
        .into_iter()
        .map(String::from)
        .collect();

    log::debug!(
        "analyzed {} design: area {:.2} m², {}",
        design.method.name(),
        section.excavation.area,
        match &geotech {
            GeotechOutcome::Assessed(a) => format!("hazard {:.1}", a.hazard_index),
            GeotechOutcome::InsufficientData { .. } => "insufficient geology".to_string(),
        }
    );

    Ok(DesignReport {
        design,
        cross_section: section,
        alignment: curve.samples().to_vec(),
        support,
        geotech,
        advisories,
    })
}
