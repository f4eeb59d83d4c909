//! Simulation context that sits next to a design.

use serde::{Deserialize, Serialize};

/// Scalar context for an analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Water table relative to the tunnel crown (m). Positive means the
    /// crown is submerged.
    pub water_table_level: f32,
    /// NATM excavation stage. Support elements appear once the stage
    /// reaches their required value.
    pub natm_stage: u8,
    pub toggles: VisualToggles,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            water_table_level: -5.0,
            natm_stage: 1,
            toggles: VisualToggles::default(),
        }
    }
}

impl SimulationSettings {
    pub fn is_submerged(&self) -> bool {
        self.water_table_level > 0.0
    }
}

/// Display filters. They never change computed values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualToggles {
    pub show_stress: bool,
    pub show_grouting: bool,
    pub show_alignment: bool,
    pub show_borehole: bool,
    pub show_bending_moment: bool,
    pub show_settlement: bool,
    pub show_hydrostatic_vectors: bool,
}

impl Default for VisualToggles {
    fn default() -> Self {
        Self {
            show_stress: false,
            show_grouting: false,
            show_alignment: true,
            show_borehole: true,
            show_bending_moment: false,
            show_settlement: false,
            show_hydrostatic_vectors: false,
        }
    }
}
