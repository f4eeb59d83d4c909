//! TunnelViz Headless Analysis Harness
//!
//! Runs a design scenario through the engine and sweeps randomized designs
//! to check invariants. Entirely in-process: no renderer, no UI.
//!
//! Usage:
//!   cargo run -p tunnelviz-simtest
//!   cargo run -p tunnelviz-simtest -- --verbose
//!   cargo run -p tunnelviz-simtest -- path/to/scenario.json
//!
//! Set `RUST_LOG=debug` to see engine logging.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use tunnelviz_logic::alignment::{AlignmentCurve, FrameMode};
use tunnelviz_logic::cache::AnalysisCache;
use tunnelviz_logic::comparison::{
    classify_ground, compare_methods, recommend, ComparisonScenario, GroundCategory, Suitability,
};
use tunnelviz_logic::constants::{controls, CUT_AND_COVER_MAX_LENGTH};
use tunnelviz_logic::design::{clamp_to_controls, ConstructionMethod, TunnelDesign, TunnelShape};
use tunnelviz_logic::engine::{alignment_params, analyze, AnalysisInput, DesignReport, SupportLayout};
use tunnelviz_logic::stratigraphy::layer_intervals;

// ── Scenario file ───────────────────────────────────────────────────────
const DEFAULT_SCENARIO_JSON: &str = include_str!("../../../data/default_scenario.json");

/// Fixed seed so sweeps are reproducible run to run.
const SWEEP_SEED: u64 = 0x7E11_7E11;
const SWEEP_DESIGNS: usize = 200;

#[derive(Debug, Deserialize)]
struct Scenario {
    #[serde(flatten)]
    input: AnalysisInput,
    #[serde(default)]
    comparison: ComparisonSetup,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ComparisonSetup {
    length: f64,
    /// Taken from the layer at design depth when absent.
    ground: Option<GroundCategory>,
}

impl Default for ComparisonSetup {
    fn default() -> Self {
        Self {
            length: 1_000.0,
            ground: None,
        }
    }
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

impl TestResult {
    fn check(name: &str, passed: bool, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed,
            detail: detail.into(),
        }
    }
}

fn main() {
    env_logger::init();
    let verbose = std::env::args().any(|a| a == "--verbose");
    let scenario_path = std::env::args().skip(1).find(|a| !a.starts_with("--"));
    println!("=== TunnelViz Analysis Harness ===\n");

    let mut results = Vec::new();

    // 1. Scenario load and full analysis
    match load_scenario(scenario_path.as_deref()) {
        Ok(scenario) => {
            results.extend(validate_scenario(&scenario, verbose));
            // 2. Method comparison for the scenario
            results.extend(validate_comparison(&scenario, verbose));
        }
        Err(detail) => results.push(TestResult::check("scenario_load", false, detail)),
    }

    // 3. Randomized design sweep
    results.extend(validate_design_sweep(verbose));

    // 4. Cut-and-cover length override
    results.extend(validate_length_override(verbose));

    // 5. Report cache
    results.extend(validate_cache(verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn load_scenario(path: Option<&str>) -> Result<Scenario, String> {
    let json = match path {
        Some(path) => {
            log::info!("loading scenario from {}", path);
            std::fs::read_to_string(path)
                .map_err(|e| format!("cannot read scenario {}: {}", path, e))?
        }
        None => DEFAULT_SCENARIO_JSON.to_string(),
    };
    serde_json::from_str(&json).map_err(|e| format!("JSON parse error: {}", e))
}

// ── 1. Scenario ─────────────────────────────────────────────────────────

fn validate_scenario(scenario: &Scenario, verbose: bool) -> Vec<TestResult> {
    println!("--- Scenario ---");
    let mut results = Vec::new();
    let input = &scenario.input;
    let toggles = &input.settings.toggles;

    if toggles.show_borehole {
        for interval in layer_intervals(&input.layers) {
            println!(
                "  layer {:>3}: {:6.1} m .. {:6.1} m",
                interval.id, interval.top, interval.bottom
            );
        }
    }

    let report = match analyze(input) {
        Ok(r) => r,
        Err(e) => {
            results.push(TestResult::check("scenario_analyze", false, e.to_string()));
            return results;
        }
    };

    println!(
        "  {} {:?}: area {:.2} m², perimeter {:.2} m, spoil/100 m {:.0} m³",
        report.design.method.name(),
        report.design.shape,
        report.cross_section.excavation.area,
        report.cross_section.excavation.perimeter,
        report.cross_section.spoil_volume_reference,
    );
    if toggles.show_alignment {
        for (i, p) in report.alignment.iter().enumerate() {
            if verbose || i == 0 || i + 1 == report.alignment.len() {
                println!("  alignment[{:>2}] = ({:8.3}, {:8.3}, {:8.3})", i, p.x, p.y, p.z);
            }
        }
    }
    match report.geotech.assessment() {
        Some(a) => println!(
            "  layer {} ({:?}): overburden {:.1} kPa, support {:.1} kPa, stand-up {}, hazard {:.1}",
            a.active_layer_id,
            a.material,
            a.overburden_pressure,
            a.support_pressure,
            a.stand_up_time.label(),
            a.hazard_index
        ),
        None => println!("  geology does not reach the tunnel"),
    }
    for tip in &report.advisories {
        println!("  tip: {}", tip);
    }

    results.push(TestResult::check(
        "scenario_analyze",
        true,
        format!("{} alignment samples", report.alignment.len()),
    ));
    results.extend(check_report("scenario", input, &report));

    // Toggles are display-only
    let mut hidden = input.clone();
    hidden.settings.toggles.show_alignment = !toggles.show_alignment;
    hidden.settings.toggles.show_stress = !toggles.show_stress;
    let same = analyze(&hidden).map(|r| r == report).unwrap_or(false);
    results.push(TestResult::check(
        "scenario_toggles_display_only",
        same,
        "flipping toggles leaves the report unchanged",
    ));

    results
}

// ── 2. Comparison ───────────────────────────────────────────────────────

fn validate_comparison(scenario: &Scenario, verbose: bool) -> Vec<TestResult> {
    println!("--- Method Comparison ---");
    let mut results = Vec::new();
    let input = &scenario.input;

    let ground = match scenario.comparison.ground {
        Some(g) => g,
        None => match classify_ground(&input.layers, input.design.depth) {
            Ok(g) => g,
            Err(e) => {
                results.push(TestResult::check("comparison_ground", false, e.to_string()));
                return results;
            }
        },
    };

    let rows = match compare_methods(&ComparisonScenario::new(scenario.comparison.length, ground)) {
        Ok(rows) => rows,
        Err(e) => {
            results.push(TestResult::check("comparison_rows", false, e.to_string()));
            return results;
        }
    };

    for row in &rows {
        println!(
            "  {:<12} {:>6.2} m/day {:>6} days  €{:>14.0}  {:?}",
            row.method.name(),
            row.effective_rate,
            row.total_days,
            row.total_cost,
            row.suitability
        );
    }
    if let Some(best) = recommend(&rows) {
        println!("  recommended: {}", best.method.name());
    }

    results.push(TestResult::check(
        "comparison_rows",
        rows.len() == ConstructionMethod::all().len(),
        format!("{} methods compared in {:?}", rows.len(), ground),
    ));

    let consistent = rows.iter().all(|r| {
        r.total_days > r.excavation_days
            && r.total_cost > 0.0
            && (r.cost_per_metre * scenario.comparison.length - r.total_cost).abs()
                < 1e-6 * r.total_cost
    });
    results.push(TestResult::check(
        "comparison_consistent",
        consistent,
        "days include mobilization, cost scales with length",
    ));

    let best = recommend(&rows);
    let best_rank_ok = best
        .map(|b| rows.iter().all(|r| r.suitability.rank() <= b.suitability.rank()))
        .unwrap_or(false);
    results.push(TestResult::check(
        "comparison_recommend",
        best_rank_ok,
        match best {
            Some(b) => format!("{} has the top suitability", b.method.name()),
            None => "no recommendation".into(),
        },
    ));

    if verbose {
        println!("  length {:.0} m, ground {:?}", scenario.comparison.length, ground);
    }
    results
}

// ── 3. Design sweep ─────────────────────────────────────────────────────

fn random_design(rng: &mut StdRng) -> TunnelDesign {
    let method = ConstructionMethod::all()[rng.gen_range(0..ConstructionMethod::all().len())];
    let shape = TunnelShape::all()[rng.gen_range(0..TunnelShape::all().len())];
    // Sample slightly past each control range so clamping is exercised too.
    let design = TunnelDesign {
        shape,
        width: rng.gen_range(2.0..=16.0),
        height: rng.gen_range(2.0..=16.0),
        wall_thickness: rng.gen_range(0.1..=1.2),
        depth: rng.gen_range(5.0..=60.0),
        method,
        segment_count: rng.gen_range(2..=11),
        ring_width: rng.gen_range(0.8..=2.2),
        bolt_length: rng.gen_range(2.0..=8.0),
        bolt_spacing: rng.gen_range(0.4..=3.2),
        horizontal_radius: if rng.gen_bool(0.2) {
            f32::INFINITY
        } else {
            rng.gen_range(20.0..=12_000.0)
        },
        vertical_grade: rng.gen_range(-6.0..=6.0),
    };
    clamp_to_controls(&design)
}

fn validate_design_sweep(verbose: bool) -> Vec<TestResult> {
    println!("--- Design Sweep ---");
    let mut results = Vec::new();
    let mut rng = StdRng::seed_from_u64(SWEEP_SEED);

    let mut failures = Vec::new();
    let mut analyzed = 0;
    for i in 0..SWEEP_DESIGNS {
        let mut input = AnalysisInput {
            design: random_design(&mut rng),
            ..Default::default()
        };
        input.settings.water_table_level = rng.gen_range(-10.0..=10.0);
        input.settings.natm_stage = rng.gen_range(0..=3);
        if rng.gen_bool(0.3) {
            input.constants.frame_mode = FrameMode::ParallelTransport;
        }

        let report = match analyze(&input) {
            Ok(r) => r,
            Err(e) => {
                failures.push(format!("design {}: {}", i, e));
                continue;
            }
        };
        analyzed += 1;
        for r in check_report(&format!("sweep_{}", i), &input, &report) {
            if !r.passed {
                failures.push(format!("{}: {}", r.name, r.detail));
            }
        }
        if verbose && i % 50 == 0 {
            println!(
                "  design {:>3}: {} {:?} w={:.2} depth={:.1}",
                i,
                report.design.method.name(),
                report.design.shape,
                report.design.width,
                report.design.depth
            );
        }
    }

    results.push(TestResult::check(
        "sweep_all_analyzed",
        analyzed == SWEEP_DESIGNS,
        format!("{}/{} clamped designs analyzed", analyzed, SWEEP_DESIGNS),
    ));
    results.push(TestResult::check(
        "sweep_invariants",
        failures.is_empty(),
        if failures.is_empty() {
            "all invariants hold".to_string()
        } else {
            failures.join("; ")
        },
    ));
    results
}

/// Structural invariants every report must satisfy.
fn check_report(prefix: &str, input: &AnalysisInput, report: &DesignReport) -> Vec<TestResult> {
    let mut results = Vec::new();
    let section = &report.cross_section.excavation;
    results.push(TestResult::check(
        &format!("{}_section_positive", prefix),
        section.area > 0.0 && section.perimeter > 0.0,
        format!("area {:.3}, perimeter {:.3}", section.area, section.perimeter),
    ));

    let curve = AlignmentCurve::from_params(alignment_params(&report.design, &input.constants));
    let tangents_ok = (0..=20).all(|i| {
        let t = curve.tangent_at(i as f32 / 20.0);
        (t.length() - 1.0).abs() < 1e-3
    });
    results.push(TestResult::check(
        &format!("{}_tangents_unit", prefix),
        tangents_ok,
        "unit tangent along the whole curve",
    ));

    match &report.support {
        SupportLayout::Segmental(layout) => {
            let total = layout.partition.total_deg();
            results.push(TestResult::check(
                &format!("{}_ring_closes", prefix),
                (total - 360.0).abs() < 1e-3,
                format!("partition sums to {:.4}°", total),
            ));
            let half = layout.partition.regular_angle_deg / 2.0;
            let staggered = layout.rings.iter().all(|r| {
                let expected = if r.index % 2 == 0 { 0.0 } else { half };
                (r.stagger_deg - expected).abs() < 1e-5
            });
            results.push(TestResult::check(
                &format!("{}_stagger", prefix),
                staggered,
                format!("{} rings alternate 0/{:.2}°", layout.ring_count(), half),
            ));
        }
        SupportLayout::Natm(layout) => {
            let expected = if layout.stage.bolts {
                layout.row_count as usize * input.constants.bolts_per_row as usize
            } else {
                0
            };
            results.push(TestResult::check(
                &format!("{}_bolt_count", prefix),
                layout.bolts.len() == expected && layout.shell.is_some() == layout.stage.shell,
                format!("{} bolts at stage {}", layout.bolts.len(), layout.stage.stage),
            ));
        }
        SupportLayout::CastInPlace { lining } => {
            results.push(TestResult::check(
                &format!("{}_cast_lining", prefix),
                lining.inner_width > 0.0 && lining.inner_width < lining.outer_width,
                format!("inner {:.2} m of outer {:.2} m", lining.inner_width, lining.outer_width),
            ));
        }
    }

    if let Some(a) = report.geotech.assessment() {
        results.push(TestResult::check(
            &format!("{}_hazard_range", prefix),
            (0.0..=10.0).contains(&a.hazard_index),
            format!("hazard {:.2}", a.hazard_index),
        ));
    }

    let again = analyze(input).map(|r| &r == report).unwrap_or(false);
    results.push(TestResult::check(
        &format!("{}_idempotent", prefix),
        again,
        "same input, same report",
    ));
    results
}

// ── 4. Length override ──────────────────────────────────────────────────

fn validate_length_override(verbose: bool) -> Vec<TestResult> {
    println!("--- Cut & Cover Length Override ---");
    let mut results = Vec::new();
    for ground in GroundCategory::all() {
        for length in [CUT_AND_COVER_MAX_LENGTH, CUT_AND_COVER_MAX_LENGTH + 1.0, 20_000.0] {
            let rows = match compare_methods(&ComparisonScenario::new(length, *ground)) {
                Ok(rows) => rows,
                Err(e) => {
                    results.push(TestResult::check("override_rows", false, e.to_string()));
                    continue;
                }
            };
            let cut = rows
                .iter()
                .find(|r| r.method == ConstructionMethod::CutAndCover)
                .map(|r| r.suitability);
            let forced_low = length > CUT_AND_COVER_MAX_LENGTH;
            let ok = match cut {
                Some(s) => !forced_low || s == Suitability::Low,
                None => false,
            };
            if verbose {
                println!("  {:?} {:>7.0} m -> {:?}", ground, length, cut);
            }
            results.push(TestResult::check(
                &format!("override_{:?}_{:.0}", ground, length),
                ok,
                format!("cut-and-cover rated {:?}", cut),
            ));
        }
    }
    results
}

// ── 5. Cache ────────────────────────────────────────────────────────────

fn validate_cache(verbose: bool) -> Vec<TestResult> {
    println!("--- Report Cache ---");
    let mut results = Vec::new();
    let mut cache = AnalysisCache::default();
    let mut input = AnalysisInput::default();

    for depth in [controls::DEPTH.min, 20.0, controls::DEPTH.min, 20.0] {
        input.design.depth = depth;
        if let Err(e) = cache.get_or_analyze(&input) {
            results.push(TestResult::check("cache_analyze", false, e.to_string()));
            return results;
        }
    }
    if verbose {
        println!("  {} hits, {} misses", cache.hits(), cache.misses());
    }
    results.push(TestResult::check(
        "cache_hits",
        cache.hits() == 2 && cache.misses() == 2,
        format!("{} hits, {} misses", cache.hits(), cache.misses()),
    ));
    results
}
