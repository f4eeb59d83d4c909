//! Pure tunnel design logic for TunnelViz.
//!
//! This crate holds the geometry and geotechnical analysis engine. It is
//! independent of any renderer, UI or network service. Functions take plain
//! data and return results, so they are unit-testable and can sit behind any
//! front end.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`alignment`] | Curved 3D centreline from radius and grade, local frames |
//! | [`cache`] | Memoization of reports keyed by the encoded input |
//! | [`comparison`] | Cost, duration and suitability per construction method |
//! | [`constants`] | Overridable engine constants and editor control ranges |
//! | [`cross_section`] | Excavated area, perimeter, lining bounds |
//! | [`design`] | Tunnel design parameters, validation, clamping, advisories |
//! | [`engine`] | End-to-end analysis pipeline producing a `DesignReport` |
//! | [`error`] | Error taxonomy for invalid input and missing geology |
//! | [`geology`] | Materials, layers, default stack, stack validation |
//! | [`geotech`] | Overburden, support pressure, stand-up time, hazard index |
//! | [`natm`] | Shotcrete shell and rock bolt layout, stage gating |
//! | [`segmental`] | TBM ring and segment layout with staggered joints |
//! | [`settings`] | Water table, excavation stage, display toggles |
//! | [`stratigraphy`] | Active layer lookup and overburden accumulation |

pub mod alignment;
pub mod cache;
pub mod comparison;
pub mod constants;
pub mod cross_section;
pub mod design;
pub mod engine;
pub mod error;
pub mod geology;
pub mod geotech;
pub mod natm;
pub mod segmental;
pub mod settings;
pub mod stratigraphy;
