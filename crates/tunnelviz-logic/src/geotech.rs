//! Geotechnical readouts for the active layer at tunnel depth.
//!
//! These are simplified hand formulas for design feedback:
//!
//! - support pressure = overburden × a fixed coefficient (an at-rest ratio
//!   assumption, not a limit-equilibrium solution)
//! - stand-up time is categorical, by material class
//! - the hazard index is a weighted score clamped to 0..=10
//!
//! None of this is a structural analysis.

use serde::{Deserialize, Serialize};

use crate::constants::{EngineConstants, HazardWeights, HAZARD_INDEX_MAX};
use crate::design::TunnelDesign;
use crate::error::StratigraphyError;
use crate::geology::{GeoMaterial, GeologicalLayer, Permeability};
use crate::settings::SimulationSettings;
use crate::stratigraphy::{active_layer, overburden_pressure};

/// How long unsupported ground stays open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StandUpTime {
    /// Competent rock: more than a year.
    Long,
    /// Stiff clay or weathered rock: hours.
    Hours,
    /// Everything else: under 30 minutes.
    Minutes,
}

impl StandUpTime {
    pub fn from_material(material: GeoMaterial) -> Self {
        match material {
            GeoMaterial::SoundRock | GeoMaterial::Granite => Self::Long,
            GeoMaterial::StiffClay | GeoMaterial::WeatheredRock => Self::Hours,
            GeoMaterial::SoftClay | GeoMaterial::Sand | GeoMaterial::Gravel => Self::Minutes,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Long => ">1 year",
            Self::Hours => "Hours",
            Self::Minutes => "<30 min",
        }
    }

    pub fn hazard_weight(&self, weights: &HazardWeights) -> f32 {
        match self {
            Self::Long => weights.long_stand_up,
            Self::Hours => weights.hours_stand_up,
            Self::Minutes => weights.minutes_stand_up,
        }
    }
}

/// Water penalty for a submerged crown.
pub fn water_penalty(permeability: Permeability, weights: &HazardWeights) -> f32 {
    match permeability {
        Permeability::Low => weights.water_low_permeability,
        Permeability::Medium => weights.water_medium_permeability,
        Permeability::High => weights.water_high_permeability,
    }
}

/// Hazard index in 0..=10.
pub fn hazard_index(
    stand_up: StandUpTime,
    permeability: Permeability,
    water_table_level: f32,
    weights: &HazardWeights,
) -> f32 {
    let mut score = stand_up.hazard_weight(weights);
    if water_table_level > 0.0 {
        score += water_penalty(permeability, weights);
    }
    score.clamp(0.0, HAZARD_INDEX_MAX)
}

/// Overburden for a homogeneous column: depth × unit weight.
pub fn homogeneous_overburden(depth: f32, layer: &GeologicalLayer) -> f32 {
    depth * layer.density
}

/// Derived geotechnical readout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeotechnicalAssessment {
    pub depth: f32,
    pub active_layer_index: usize,
    pub active_layer_id: String,
    pub material: GeoMaterial,
    /// Vertical overburden at tunnel depth (kPa).
    pub overburden_pressure: f32,
    /// Required support pressure (kPa).
    pub support_pressure: f32,
    pub stand_up_time: StandUpTime,
    pub hazard_index: f32,
    pub submerged: bool,
    /// Water pressure at the crown (kPa), zero when dry.
    pub hydrostatic_crown_pressure: f32,
    /// Ring thrust from support pressure on the outer radius (kN/m).
    pub hoop_thrust: f32,
    /// Thrust over wall thickness (kPa).
    pub lining_stress: f32,
}

/// Result of assessing a design against a layer stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GeotechOutcome {
    Assessed(GeotechnicalAssessment),
    /// The stack does not reach the tunnel. Not a zero pressure.
    InsufficientData { depth: f32, stack_thickness: f32 },
}

impl GeotechOutcome {
    pub fn assessment(&self) -> Option<&GeotechnicalAssessment> {
        match self {
            Self::Assessed(a) => Some(a),
            Self::InsufficientData { .. } => None,
        }
    }
}

/// Assess the ground at the design's depth.
pub fn assess(
    design: &TunnelDesign,
    layers: &[GeologicalLayer],
    settings: &SimulationSettings,
    constants: &EngineConstants,
) -> Result<GeotechOutcome, StratigraphyError> {
    let depth = design.depth;
    let active = match active_layer(layers, depth) {
        Ok(active) => active,
        Err(StratigraphyError::DepthExceedsStack {
            depth,
            stack_thickness,
        }) => {
            log::warn!(
                "tunnel depth {} is below the {} m layer stack",
                depth,
                stack_thickness
            );
            return Ok(GeotechOutcome::InsufficientData {
                depth,
                stack_thickness,
            });
        }
        Err(e) => return Err(e),
    };
    let overburden = overburden_pressure(layers, depth)?.pressure;

    let layer = active.layer;
    let stand_up = StandUpTime::from_material(layer.material);
    let support_pressure = overburden * constants.support_pressure_coefficient;
    let hoop_thrust = support_pressure * design.outer_radius();
    let lining_stress = if design.wall_thickness > 0.0 {
        hoop_thrust / design.wall_thickness
    } else {
        0.0
    };

    Ok(GeotechOutcome::Assessed(GeotechnicalAssessment {
        depth,
        active_layer_index: active.index,
        active_layer_id: layer.id.clone(),
        material: layer.material,
        overburden_pressure: overburden,
        support_pressure,
        stand_up_time: stand_up,
        hazard_index: hazard_index(
            stand_up,
            layer.permeability,
            settings.water_table_level,
            &constants.hazard,
        ),
        submerged: settings.is_submerged(),
        hydrostatic_crown_pressure: settings.water_table_level.max(0.0)
            * constants.water_unit_weight,
        hoop_thrust,
        lining_stress,
    }))
}
