//! NATM primary support: shotcrete shell, mesh and rock bolts.
//!
//! Bolt rows are placed every `bolt_spacing` metres along the alignment.
//! Each row fans `bolts_per_row` bolts evenly over the upper half circle,
//! from springline to springline through the crown. NATM bolting targets the
//! crown and haunches, so the invert gets none.
//!
//! Elements are only present once the excavation stage reaches the stage
//! they are installed in (see [`StageRequirements`]).

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::alignment::{AlignmentCurve, FrameMode};
use crate::constants::{EngineConstants, StageRequirements, MAX_LAYOUT_ELEMENTS};
use crate::design::TunnelDesign;
use crate::error::DesignError;

/// NATM support element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SupportElement {
    Shell,
    Mesh,
    Bolts,
}

impl SupportElement {
    pub fn required_stage(&self, stages: &StageRequirements) -> u8 {
        match self {
            Self::Shell => stages.shell,
            Self::Mesh => stages.mesh,
            Self::Bolts => stages.bolts,
        }
    }

    pub fn is_installed(&self, stage: u8, stages: &StageRequirements) -> bool {
        stage >= self.required_stage(stages)
    }
}

/// Which elements are installed at a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportStage {
    pub stage: u8,
    pub shell: bool,
    pub mesh: bool,
    pub bolts: bool,
}

impl SupportStage {
    pub fn at(stage: u8, stages: &StageRequirements) -> Self {
        Self {
            stage,
            shell: SupportElement::Shell.is_installed(stage, stages),
            mesh: SupportElement::Mesh.is_installed(stage, stages),
            bolts: SupportElement::Bolts.is_installed(stage, stages),
        }
    }
}

/// Shotcrete shell following the alignment at the outer radius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShellGeometry {
    pub outer_radius: f32,
    pub thickness: f32,
    /// Centreline the shell is swept along.
    pub path: Vec<Vec3>,
    /// Whether the mesh overlay is installed on the shell.
    pub mesh: bool,
}

/// One rock bolt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RockBolt {
    pub row: u32,
    pub index: u32,
    pub label: String,
    /// Angle in the section plane (degrees, 90 = crown).
    pub angle_deg: f32,
    /// Head position on the excavation boundary.
    pub origin: Vec3,
    /// Unit direction into the ground.
    pub direction: Vec3,
    pub length: f32,
}

impl RockBolt {
    pub fn tip(&self) -> Vec3 {
        self.origin + self.direction * self.length
    }
}

/// NATM support layout at one excavation stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NatmLayout {
    pub stage: SupportStage,
    pub row_count: u32,
    pub shell: Option<ShellGeometry>,
    pub bolts: Vec<RockBolt>,
}

impl NatmLayout {
    pub fn bolts_in_row(&self, row: u32) -> impl Iterator<Item = &RockBolt> {
        self.bolts.iter().filter(move |b| b.row == row)
    }

    /// Total bolt steel length (m).
    pub fn total_bolt_length(&self) -> f32 {
        self.bolts.iter().map(|b| b.length).sum()
    }
}

/// Number of bolt rows over `length`.
pub fn row_count(length: f32, bolt_spacing: f32) -> Result<u32, DesignError> {
    if !(bolt_spacing > 0.0) {
        return Err(DesignError::NonPositiveBoltSpacing(bolt_spacing));
    }
    let count = (length / bolt_spacing).floor();
    if !(count <= MAX_LAYOUT_ELEMENTS as f32) {
        return Err(DesignError::TooManyElements {
            what: "bolt row",
            count,
            max: MAX_LAYOUT_ELEMENTS,
        });
    }
    Ok(count as u32)
}

/// Angles of the bolts in a row, spread from 0° to 180°.
pub fn bolt_angles(count: u32) -> Vec<f32> {
    match count {
        0 => Vec::new(),
        1 => vec![90.0],
        n => (0..n)
            .map(|i| i as f32 * 180.0 / (n - 1) as f32)
            .collect(),
    }
}

/// Lay out the NATM support of a design at `stage`.
pub fn natm_layout(
    design: &TunnelDesign,
    curve: &AlignmentCurve,
    stage: u8,
    constants: &EngineConstants,
    frame_mode: FrameMode,
) -> Result<NatmLayout, DesignError> {
    let rows = row_count(constants.tunnel_length, design.bolt_spacing)?;
    if !(design.bolt_length > 0.0) {
        return Err(DesignError::NonPositiveBoltLength(design.bolt_length));
    }
    let installed = SupportStage::at(stage, &constants.stages);
    let outer_radius = design.outer_radius();

    let shell = installed.shell.then(|| ShellGeometry {
        outer_radius,
        thickness: design.wall_thickness,
        path: curve.samples().to_vec(),
        mesh: installed.mesh,
    });

    let mut bolts = Vec::new();
    if installed.bolts {
        let angles = bolt_angles(constants.bolts_per_row);
        for row in 0..rows {
            // Rows sit mid-bay: the first one half a spacing in.
            let t = ((row as f32 + 0.5) * design.bolt_spacing / constants.tunnel_length).min(1.0);
            let frame = curve.frame_at(t, frame_mode);
            for (index, &angle) in angles.iter().enumerate() {
                let direction = frame.radial(angle);
                bolts.push(RockBolt {
                    row,
                    index: index as u32,
                    label: format!("B{}-{}", row, index),
                    angle_deg: angle,
                    origin: frame.origin + direction * outer_radius,
                    direction,
                    length: design.bolt_length,
                });
            }
        }
    }

    log::debug!(
        "natm layout: stage {}, {} rows, {} bolts, shell {}",
        stage,
        rows,
        bolts.len(),
        installed.shell
    );

    Ok(NatmLayout {
        stage: installed,
        row_count: rows,
        shell,
        bolts,
    })
}
