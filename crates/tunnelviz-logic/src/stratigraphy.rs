//! Depth lookups against an ordered layer stack.
//!
//! Layers are walked top-down. The active layer at a depth is the first one
//! whose cumulative bottom (inclusive) reaches that depth. Overburden is the
//! sum of thickness × unit weight for every fully traversed layer, plus only
//! the remaining partial thickness of the layer containing the target depth.
//!
//! A depth below the bottom of the stack is an error, never a clamp: the
//! caller must treat it as missing data.

use serde::{Deserialize, Serialize};

use crate::error::StratigraphyError;
use crate::geology::GeologicalLayer;

/// Tolerance for depth comparisons at layer boundaries (m).
const DEPTH_EPSILON: f32 = 1e-4;

/// Depth interval of one layer, for borehole logs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerInterval {
    pub index: usize,
    pub id: String,
    pub top: f32,
    pub bottom: f32,
}

/// Layer found at a target depth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveLayer<'a> {
    pub index: usize,
    pub layer: &'a GeologicalLayer,
    pub top: f32,
    pub bottom: f32,
}

/// Pressure contributed by one layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverburdenContribution {
    pub index: usize,
    pub id: String,
    /// Thickness counted toward the total (partial for the last layer).
    pub thickness: f32,
    pub pressure: f32,
}

/// Accumulated overburden at a depth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverburdenProfile {
    pub depth: f32,
    /// Total vertical pressure (kPa).
    pub pressure: f32,
    pub contributions: Vec<OverburdenContribution>,
}

pub fn total_thickness(layers: &[GeologicalLayer]) -> f32 {
    layers.iter().map(|l| l.thickness).sum()
}

pub fn layer_intervals(layers: &[GeologicalLayer]) -> Vec<LayerInterval> {
    let mut top = 0.0;
    layers
        .iter()
        .enumerate()
        .map(|(index, layer)| {
            let bottom = top + layer.thickness;
            let interval = LayerInterval {
                index,
                id: layer.id.clone(),
                top,
                bottom,
            };
            top = bottom;
            interval
        })
        .collect()
}

fn check_depth(layers: &[GeologicalLayer], depth: f32) -> Result<(), StratigraphyError> {
    if layers.is_empty() {
        return Err(StratigraphyError::EmptyStack);
    }
    if depth.is_nan() || depth < 0.0 {
        return Err(StratigraphyError::NegativeDepth(depth));
    }
    Ok(())
}

/// Find the layer containing `depth`.
pub fn active_layer(
    layers: &[GeologicalLayer],
    depth: f32,
) -> Result<ActiveLayer<'_>, StratigraphyError> {
    check_depth(layers, depth)?;
    let mut top = 0.0;
    for (index, layer) in layers.iter().enumerate() {
        let bottom = top + layer.thickness;
        if bottom + DEPTH_EPSILON >= depth {
            return Ok(ActiveLayer {
                index,
                layer,
                top,
                bottom,
            });
        }
        top = bottom;
    }
    Err(StratigraphyError::DepthExceedsStack {
        depth,
        stack_thickness: top,
    })
}

/// Accumulate overburden pressure down to `depth`.
pub fn overburden_pressure(
    layers: &[GeologicalLayer],
    depth: f32,
) -> Result<OverburdenProfile, StratigraphyError> {
    check_depth(layers, depth)?;
    let mut reached = 0.0;
    let mut pressure = 0.0;
    let mut contributions = Vec::new();

    for (index, layer) in layers.iter().enumerate() {
        let remaining = depth - reached;
        if remaining <= DEPTH_EPSILON {
            break;
        }
        let counted = layer.thickness.min(remaining);
        let p = counted * layer.density;
        pressure += p;
        reached += counted;
        contributions.push(OverburdenContribution {
            index,
            id: layer.id.clone(),
            thickness: counted,
            pressure: p,
        });
    }

    if depth - reached > DEPTH_EPSILON {
        return Err(StratigraphyError::DepthExceedsStack {
            depth,
            stack_thickness: total_thickness(layers),
        });
    }

    Ok(OverburdenProfile {
        depth,
        pressure,
        contributions,
    })
}
