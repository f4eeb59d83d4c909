//! Cost, duration and suitability of each construction method.
//!
//! Per method:
//!
//! 1. look up the ground-dependent rate and cost multipliers
//! 2. effective rate = base rate × rate multiplier
//!    excavation days = ceil(length / effective rate)
//!    total days = mobilization + excavation + demobilization
//!    total cost = base cost × cost multiplier × length
//! 3. rate suitability from the (method, ground) table, then apply the
//!    length override: cut-and-cover beyond the threshold is always Low.
//!
//! The override runs after the ground table, never before.
//!
//! ```
//! use tunnelviz_logic::comparison::{compare_methods, ComparisonScenario, GroundCategory, Suitability};
//! use tunnelviz_logic::design::ConstructionMethod;
//!
//! let rows = compare_methods(&ComparisonScenario::new(5_000.0, GroundCategory::SoftClay)).unwrap();
//! let cut = rows.iter().find(|r| r.method == ConstructionMethod::CutAndCover).unwrap();
//! assert_eq!(cut.suitability, Suitability::Low);
//! ```

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::constants::CUT_AND_COVER_MAX_LENGTH;
use crate::design::ConstructionMethod;
use crate::error::{ComparisonError, StratigraphyError};
use crate::geology::{GeoMaterial, GeologicalLayer};
use crate::stratigraphy::active_layer;

/// Coarse ground condition used for method comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroundCategory {
    HardRock,
    MixedGround,
    SoftClay,
}

impl GroundCategory {
    pub fn all() -> &'static [GroundCategory] {
        &[Self::HardRock, Self::MixedGround, Self::SoftClay]
    }

    pub fn from_material(material: GeoMaterial) -> Self {
        match material {
            GeoMaterial::SoundRock | GeoMaterial::Granite => Self::HardRock,
            GeoMaterial::SoftClay | GeoMaterial::StiffClay => Self::SoftClay,
            GeoMaterial::Sand | GeoMaterial::Gravel | GeoMaterial::WeatheredRock => {
                Self::MixedGround
            }
        }
    }
}

/// Ground category of the layer at `depth`.
pub fn classify_ground(
    layers: &[GeologicalLayer],
    depth: f32,
) -> Result<GroundCategory, StratigraphyError> {
    let active = active_layer(layers, depth)?;
    Ok(GroundCategory::from_material(active.layer.material))
}

/// Method fitness rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Suitability {
    High,
    Medium,
    Low,
}

impl Suitability {
    /// Ordering key: higher is better.
    pub fn rank(&self) -> u8 {
        match self {
            Self::High => 2,
            Self::Medium => 1,
            Self::Low => 0,
        }
    }
}

/// Base figures for one method in average ground.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodProfile {
    pub method: ConstructionMethod,
    /// Advance rate (m/day).
    pub base_rate: f32,
    pub mobilization_days: u32,
    pub demobilization_days: u32,
    /// Unit cost (€/m).
    pub base_cost: f64,
}

impl MethodProfile {
    pub fn for_method(method: ConstructionMethod) -> Self {
        match method {
            ConstructionMethod::Tbm => Self {
                method,
                base_rate: 15.0,
                mobilization_days: 90,
                demobilization_days: 30,
                base_cost: 25_000.0,
            },
            ConstructionMethod::Natm => Self {
                method,
                base_rate: 4.0,
                mobilization_days: 14,
                demobilization_days: 7,
                base_cost: 12_000.0,
            },
            ConstructionMethod::CutAndCover => Self {
                method,
                base_rate: 8.0,
                mobilization_days: 30,
                demobilization_days: 14,
                base_cost: 8_000.0,
            },
        }
    }
}

/// Rate and cost multipliers for a (method, ground) pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundAdjustment {
    pub rate: f32,
    pub cost: f64,
}

/// Ground multipliers.
///
/// Hard rock cripples cut-and-cover, mixed faces slow a TBM, and soft clay
/// holds NATM back.
pub fn ground_adjustment(method: ConstructionMethod, ground: GroundCategory) -> GroundAdjustment {
    use crate::design::ConstructionMethod as M;
    use self::GroundCategory as G;
    let (rate, cost) = match (method, ground) {
        (M::Tbm, G::HardRock) => (0.8, 1.1),
        (M::Tbm, G::MixedGround) => (0.6, 1.3),
        (M::Tbm, G::SoftClay) => (1.0, 1.0),
        (M::Natm, G::HardRock) => (1.0, 1.0),
        (M::Natm, G::MixedGround) => (0.9, 1.1),
        (M::Natm, G::SoftClay) => (0.7, 1.25),
        (M::CutAndCover, G::HardRock) => (0.3, 2.5),
        (M::CutAndCover, G::MixedGround) => (0.8, 1.2),
        (M::CutAndCover, G::SoftClay) => (1.0, 1.0),
    };
    GroundAdjustment { rate, cost }
}

/// Suitability from ground alone, before any length rule.
pub fn ground_suitability(method: ConstructionMethod, ground: GroundCategory) -> Suitability {
    use crate::design::ConstructionMethod as M;
    use self::GroundCategory as G;
    match (method, ground) {
        (M::Tbm, G::HardRock) | (M::Tbm, G::SoftClay) => Suitability::High,
        (M::Tbm, G::MixedGround) => Suitability::Medium,
        (M::Natm, G::HardRock) | (M::Natm, G::MixedGround) => Suitability::High,
        (M::Natm, G::SoftClay) => Suitability::Medium,
        (M::CutAndCover, G::HardRock) => Suitability::Low,
        (M::CutAndCover, G::MixedGround) => Suitability::Medium,
        (M::CutAndCover, G::SoftClay) => Suitability::High,
    }
}

/// Comparison inputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComparisonScenario {
    /// Tunnel length (m).
    pub length: f64,
    pub ground: GroundCategory,
}

impl ComparisonScenario {
    pub fn new(length: f64, ground: GroundCategory) -> Self {
        Self { length, ground }
    }
}

/// Overridable comparison table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonTable {
    pub profiles: Vec<MethodProfile>,
    /// Cut-and-cover is rated Low above this length (m).
    pub cut_and_cover_max_length: f64,
}

impl Default for ComparisonTable {
    fn default() -> Self {
        Self {
            profiles: ConstructionMethod::all()
                .iter()
                .map(|m| MethodProfile::for_method(*m))
                .collect(),
            cut_and_cover_max_length: CUT_AND_COVER_MAX_LENGTH,
        }
    }
}

/// One row of the comparison table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodEstimate {
    pub method: ConstructionMethod,
    pub effective_rate: f32,
    pub excavation_days: u32,
    pub total_days: u32,
    pub total_cost: f64,
    pub cost_per_metre: f64,
    pub suitability: Suitability,
}

/// Compare every method with the default table.
pub fn compare_methods(scenario: &ComparisonScenario) -> Result<Vec<MethodEstimate>, ComparisonError> {
    compare_methods_with(scenario, &ComparisonTable::default())
}

/// Compare every method in `table`, in table order.
pub fn compare_methods_with(
    scenario: &ComparisonScenario,
    table: &ComparisonTable,
) -> Result<Vec<MethodEstimate>, ComparisonError> {
    if !(scenario.length.is_finite() && scenario.length > 0.0) {
        return Err(ComparisonError::InvalidLength(scenario.length));
    }
    table
        .profiles
        .iter()
        .map(|profile| estimate(profile, scenario, table))
        .collect()
}

fn estimate(
    profile: &MethodProfile,
    scenario: &ComparisonScenario,
    table: &ComparisonTable,
) -> Result<MethodEstimate, ComparisonError> {
    let adj = ground_adjustment(profile.method, scenario.ground);
    let effective_rate = profile.base_rate * adj.rate;
    if !(effective_rate > 0.0) {
        return Err(ComparisonError::NonPositiveRate {
            method: profile.method.name(),
            rate: effective_rate,
        });
    }
    let overflow = || ComparisonError::DurationOverflow {
        method: profile.method.name(),
        length: scenario.length,
    };
    let days = (scenario.length / effective_rate as f64).ceil();
    if days > u32::MAX as f64 {
        return Err(overflow());
    }
    let excavation_days = days as u32;
    let total_days = profile
        .mobilization_days
        .checked_add(excavation_days)
        .and_then(|d| d.checked_add(profile.demobilization_days))
        .ok_or_else(overflow)?;
    let total_cost = profile.base_cost * adj.cost * scenario.length;

    let mut suitability = ground_suitability(profile.method, scenario.ground);
    if profile.method == ConstructionMethod::CutAndCover
        && scenario.length > table.cut_and_cover_max_length
    {
        suitability = Suitability::Low;
    }

    Ok(MethodEstimate {
        method: profile.method,
        effective_rate,
        excavation_days,
        total_days,
        total_cost,
        cost_per_metre: total_cost / scenario.length,
        suitability,
    })
}

/// Best method: highest suitability, then lowest cost, then shortest
/// duration. Full ties keep table order.
pub fn recommend(estimates: &[MethodEstimate]) -> Option<&MethodEstimate> {
    estimates.iter().reduce(|best, candidate| {
        let ord = candidate
            .suitability
            .rank()
            .cmp(&best.suitability.rank())
            .then_with(|| {
                best.total_cost
                    .partial_cmp(&candidate.total_cost)
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| best.total_days.cmp(&candidate.total_days));
        if ord == Ordering::Greater {
            candidate
        } else {
            best
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geology::default_layers;

    fn row(rows: &[MethodEstimate], method: ConstructionMethod) -> &MethodEstimate {
        rows.iter().find(|r| r.method == method).unwrap()
    }

    #[test]
    fn tbm_in_soft_clay() {
        let rows = compare_methods(&ComparisonScenario::new(1_000.0, GroundCategory::SoftClay)).unwrap();
        let tbm = row(&rows, ConstructionMethod::Tbm);
        assert!((tbm.effective_rate - 15.0).abs() < 1e-6);
        assert_eq!(tbm.excavation_days, 67);
        assert_eq!(tbm.total_days, 90 + 67 + 30);
        assert!((tbm.total_cost - 25_000_000.0).abs() < 1e-3);
        assert!((tbm.cost_per_metre - 25_000.0).abs() < 1e-6);
        assert_eq!(tbm.suitability, Suitability::High);
    }

    #[test]
    fn rows_follow_table_order() {
        let rows = compare_methods(&ComparisonScenario::new(500.0, GroundCategory::HardRock)).unwrap();
        let methods: Vec<_> = rows.iter().map(|r| r.method).collect();
        assert_eq!(methods, ConstructionMethod::all().to_vec());
    }

    #[test]
    fn hard_rock_penalizes_cut_and_cover() {
        let rows = compare_methods(&ComparisonScenario::new(500.0, GroundCategory::HardRock)).unwrap();
        let cut = row(&rows, ConstructionMethod::CutAndCover);
        assert!((cut.effective_rate - 2.4).abs() < 1e-5);
        assert_eq!(cut.excavation_days, 209);
        assert!((cut.cost_per_metre - 20_000.0).abs() < 1e-6);
        assert_eq!(cut.suitability, Suitability::Low);
    }

    #[test]
    fn cut_and_cover_override_beats_ground_table() {
        for ground in GroundCategory::all() {
            let rows = compare_methods(&ComparisonScenario::new(2_500.0, *ground)).unwrap();
            assert_eq!(
                row(&rows, ConstructionMethod::CutAndCover).suitability,
                Suitability::Low,
                "{ground:?}"
            );
        }
    }

    #[test]
    fn override_threshold_is_strict() {
        let rows = compare_methods(&ComparisonScenario::new(2_000.0, GroundCategory::SoftClay)).unwrap();
        assert_eq!(
            row(&rows, ConstructionMethod::CutAndCover).suitability,
            Suitability::High
        );
    }

    #[test]
    fn override_leaves_other_methods_alone() {
        let rows = compare_methods(&ComparisonScenario::new(9_000.0, GroundCategory::MixedGround)).unwrap();
        assert_eq!(row(&rows, ConstructionMethod::Tbm).suitability, Suitability::Medium);
        assert_eq!(row(&rows, ConstructionMethod::Natm).suitability, Suitability::High);
    }

    #[test]
    fn invalid_length_is_rejected() {
        for length in [0.0, -10.0, f64::NAN, f64::INFINITY] {
            assert!(compare_methods(&ComparisonScenario::new(length, GroundCategory::SoftClay)).is_err());
        }
    }

    #[test]
    fn huge_length_reports_overflow() {
        let result = compare_methods(&ComparisonScenario::new(1.0e11, GroundCategory::HardRock));
        assert!(matches!(
            result,
            Err(ComparisonError::DurationOverflow { method: "TBM", .. })
        ));
    }

    #[test]
    fn day_count_near_the_limit() {
        // Excavation fits in u32 but mobilization pushes the total over.
        let mut table = ComparisonTable::default();
        table.profiles.truncate(1);
        table.profiles[0].base_rate = 1.0;
        let length = (u32::MAX - 10) as f64;
        let scenario = ComparisonScenario::new(length, GroundCategory::SoftClay);
        assert!(matches!(
            compare_methods_with(&scenario, &table),
            Err(ComparisonError::DurationOverflow { .. })
        ));
        table.profiles[0].mobilization_days = 0;
        table.profiles[0].demobilization_days = 0;
        let rows = compare_methods_with(&scenario, &table).unwrap();
        assert_eq!(rows[0].total_days, u32::MAX - 10);
    }

    #[test]
    fn custom_table() {
        let mut table = ComparisonTable::default();
        table.cut_and_cover_max_length = 100.0;
        table.profiles[0].base_rate = 0.0;
        let scenario = ComparisonScenario::new(500.0, GroundCategory::SoftClay);
        assert!(matches!(
            compare_methods_with(&scenario, &table),
            Err(ComparisonError::NonPositiveRate { method: "TBM", .. })
        ));
        table.profiles.remove(0);
        let rows = compare_methods_with(&scenario, &table).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(row(&rows, ConstructionMethod::CutAndCover).suitability, Suitability::Low);
    }

    #[test]
    fn recommendation() {
        let rows = compare_methods(&ComparisonScenario::new(1_000.0, GroundCategory::SoftClay)).unwrap();
        // TBM and cut-and-cover are both High; cut-and-cover is cheaper.
        assert_eq!(recommend(&rows).unwrap().method, ConstructionMethod::CutAndCover);
        let long = compare_methods(&ComparisonScenario::new(5_000.0, GroundCategory::HardRock)).unwrap();
        // TBM and NATM both High; NATM is cheaper.
        assert_eq!(recommend(&long).unwrap().method, ConstructionMethod::Natm);
        assert!(recommend(&[]).is_none());
    }

    #[test]
    fn ground_from_layers() {
        let layers = default_layers();
        assert_eq!(classify_ground(&layers, 5.0).unwrap(), GroundCategory::SoftClay);
        assert_eq!(classify_ground(&layers, 20.0).unwrap(), GroundCategory::MixedGround);
        assert_eq!(classify_ground(&layers, 40.0).unwrap(), GroundCategory::HardRock);
        assert!(classify_ground(&layers, 90.0).is_err());
    }

    #[test]
    fn deterministic() {
        let s = ComparisonScenario::new(1_234.0, GroundCategory::MixedGround);
        assert_eq!(compare_methods(&s).unwrap(), compare_methods(&s).unwrap());
    }
}
