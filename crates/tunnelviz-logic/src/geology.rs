//! Geological materials and layer stacks.
//!
//! Layers are read top-down from the surface. Order matters: it defines how
//! depth accumulates, so reordering a stack changes every downstream value.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::StratigraphyError;

/// Soil and rock classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeoMaterial {
    SoftClay,
    StiffClay,
    Sand,
    Gravel,
    WeatheredRock,
    SoundRock,
    Granite,
}

/// Permeability class of a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permeability {
    Low,
    Medium,
    High,
}

/// Catalogue entry for a material.
#[derive(Debug, Clone, Serialize)]
pub struct MaterialProperties {
    pub name: &'static str,
    /// Unit weight (kN/m³).
    pub density: f32,
    pub permeability: Permeability,
    /// Display colour, never used in computation.
    pub color: &'static str,
    pub is_rock: bool,
}

impl GeoMaterial {
    pub fn properties(&self) -> MaterialProperties {
        match self {
            Self::SoftClay => MaterialProperties {
                name: "Soft Clay",
                density: 18.0,
                permeability: Permeability::Low,
                color: "#8B4513",
                is_rock: false,
            },
            Self::StiffClay => MaterialProperties {
                name: "Stiff Clay",
                density: 19.5,
                permeability: Permeability::Low,
                color: "#A0522D",
                is_rock: false,
            },
            Self::Sand => MaterialProperties {
                name: "Sand",
                density: 20.0,
                permeability: Permeability::High,
                color: "#F4A460",
                is_rock: false,
            },
            Self::Gravel => MaterialProperties {
                name: "Gravel",
                density: 21.0,
                permeability: Permeability::High,
                color: "#C2B280",
                is_rock: false,
            },
            Self::WeatheredRock => MaterialProperties {
                name: "Weathered Rock",
                density: 23.0,
                permeability: Permeability::Medium,
                color: "#8F8F8F",
                is_rock: true,
            },
            Self::SoundRock => MaterialProperties {
                name: "Sound Rock",
                density: 25.0,
                permeability: Permeability::Low,
                color: "#708090",
                is_rock: true,
            },
            Self::Granite => MaterialProperties {
                name: "Granite",
                density: 26.5,
                permeability: Permeability::Low,
                color: "#696969",
                is_rock: true,
            },
        }
    }

    pub fn is_rock(&self) -> bool {
        self.properties().is_rock
    }

    pub fn all() -> &'static [GeoMaterial] {
        &[
            Self::SoftClay,
            Self::StiffClay,
            Self::Sand,
            Self::Gravel,
            Self::WeatheredRock,
            Self::SoundRock,
            Self::Granite,
        ]
    }
}

/// One layer of the stratigraphic column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeologicalLayer {
    pub id: String,
    pub material: GeoMaterial,
    /// Thickness in metres.
    pub thickness: f32,
    pub color: String,
    /// Unit weight (kN/m³).
    pub density: f32,
    pub permeability: Permeability,
    /// Standard penetration test blow count, soils only.
    #[serde(default)]
    pub spt_n: Option<u32>,
    /// Rock quality designation in percent, rocks only.
    #[serde(default)]
    pub rqd: Option<f32>,
}

impl GeologicalLayer {
    /// Build a layer with catalogue defaults for density, permeability and colour.
    pub fn from_material(id: impl Into<String>, material: GeoMaterial, thickness: f32) -> Self {
        let props = material.properties();
        Self {
            id: id.into(),
            material,
            thickness,
            color: props.color.to_string(),
            density: props.density,
            permeability: props.permeability,
            spt_n: None,
            rqd: None,
        }
    }

    pub fn with_density(mut self, density: f32) -> Self {
        self.density = density;
        self
    }
}

/// The stack the editor starts with.
pub fn default_layers() -> Vec<GeologicalLayer> {
    vec![
        GeologicalLayer::from_material("1", GeoMaterial::SoftClay, 10.0),
        GeologicalLayer::from_material("2", GeoMaterial::Sand, 15.0),
        GeologicalLayer::from_material("3", GeoMaterial::SoundRock, 30.0),
    ]
}

/// Validate a layer stack, returning all errors found.
pub fn validate_layers(layers: &[GeologicalLayer]) -> Vec<StratigraphyError> {
    let mut errors = Vec::new();
    if layers.is_empty() {
        errors.push(StratigraphyError::EmptyStack);
        return errors;
    }

    let mut seen = HashSet::new();
    for layer in layers {
        if !seen.insert(layer.id.as_str()) {
            errors.push(StratigraphyError::DuplicateLayerId(layer.id.clone()));
        }
        if !(layer.thickness > 0.0) || !layer.thickness.is_finite() {
            errors.push(StratigraphyError::NonPositiveThickness {
                id: layer.id.clone(),
                thickness: layer.thickness,
            });
        }
        if let Some(rqd) = layer.rqd {
            if !(0.0..=100.0).contains(&rqd) {
                errors.push(StratigraphyError::RqdOutOfRange {
                    id: layer.id.clone(),
                    rqd,
                });
            }
        }
        let rock = layer.material.is_rock();
        if (rock && layer.spt_n.is_some()) || (!rock && layer.rqd.is_some()) {
            errors.push(StratigraphyError::MismatchedIndex {
                id: layer.id.clone(),
            });
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_stack_matches_reference() {
        let layers = default_layers();
        assert_eq!(layers.len(), 3);
        assert_eq!(layers[0].material, GeoMaterial::SoftClay);
        assert!((layers[0].density - 18.0).abs() < f32::EPSILON);
        assert!((layers[1].density - 20.0).abs() < f32::EPSILON);
        assert!((layers[2].density - 25.0).abs() < f32::EPSILON);
        assert!(validate_layers(&layers).is_empty());
    }

    #[test]
    fn every_material_has_positive_density() {
        for m in GeoMaterial::all() {
            assert!(m.properties().density > 0.0, "{:?}", m);
        }
    }

    #[test]
    fn rejects_duplicates_and_bad_thickness() {
        let layers = vec![
            GeologicalLayer::from_material("a", GeoMaterial::Sand, 5.0),
            GeologicalLayer::from_material("a", GeoMaterial::Gravel, 0.0),
        ];
        let errors = validate_layers(&layers);
        assert!(errors.contains(&StratigraphyError::DuplicateLayerId("a".into())));
        assert!(errors
            .iter()
            .any(|e| matches!(e, StratigraphyError::NonPositiveThickness { .. })));
    }

    #[test]
    fn index_must_match_material_class() {
        let mut clay = GeologicalLayer::from_material("c", GeoMaterial::SoftClay, 5.0);
        clay.rqd = Some(50.0);
        let mut rock = GeologicalLayer::from_material("r", GeoMaterial::Granite, 5.0);
        rock.rqd = Some(140.0);
        let errors = validate_layers(&[clay, rock]);
        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[0], StratigraphyError::MismatchedIndex { .. }));
        assert!(matches!(errors[1], StratigraphyError::RqdOutOfRange { .. }));
    }

    #[test]
    fn empty_stack_is_an_error() {
        assert_eq!(validate_layers(&[]), vec![StratigraphyError::EmptyStack]);
    }
}
