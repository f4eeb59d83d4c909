//! Error types for the analysis engine.
//!
//! The engine assumes validated input. These errors are raised at the
//! boundary so a bad snapshot fails loudly instead of producing NaN geometry.

use thiserror::Error;

/// A single invalid design parameter.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DesignError {
    #[error("width must be positive, got {0}")]
    NonPositiveWidth(f32),

    #[error("height must be positive, got {0}")]
    NonPositiveHeight(f32),

    #[error("wall thickness must be positive, got {0}")]
    NonPositiveWallThickness(f32),

    #[error("wall thickness {thickness} must be less than half the width ({half_width})")]
    WallTooThick { thickness: f32, half_width: f32 },

    #[error("wall thickness {thickness} must be less than half the height ({half_height})")]
    WallTooThickForHeight { thickness: f32, half_height: f32 },

    #[error("depth must be positive, got {0}")]
    NonPositiveDepth(f32),

    #[error("ring width must be positive, got {0}")]
    NonPositiveRingWidth(f32),

    #[error("bolt spacing must be positive, got {0}")]
    NonPositiveBoltSpacing(f32),

    #[error("bolt length must be positive, got {0}")]
    NonPositiveBoltLength(f32),

    #[error("segment count {count} outside {min}..={max}")]
    SegmentCountOutOfRange { count: u32, min: u32, max: u32 },

    #[error("horizontal radius {radius} is below the minimum of {floor}")]
    RadiusBelowFloor { radius: f32, floor: f32 },

    #[error("field `{0}` is not a finite number")]
    NonFinite(&'static str),

    #[error("engine constant `{name}` has unusable value {value}")]
    InvalidConstant { name: &'static str, value: f32 },

    #[error("{what} count {count} exceeds the limit of {max}")]
    TooManyElements {
        what: &'static str,
        count: f32,
        max: u32,
    },
}

/// Problems with a layer stack or a depth lookup against it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StratigraphyError {
    #[error("layer stack is empty")]
    EmptyStack,

    #[error("layer `{id}` has non-positive thickness {thickness}")]
    NonPositiveThickness { id: String, thickness: f32 },

    #[error("layer id `{0}` appears more than once")]
    DuplicateLayerId(String),

    #[error("layer `{id}` has RQD {rqd}, expected 0..=100")]
    RqdOutOfRange { id: String, rqd: f32 },

    #[error("layer `{id}` carries an index that does not match its material class")]
    MismatchedIndex { id: String },

    #[error("target depth {0} is negative")]
    NegativeDepth(f32),

    #[error("depth {depth} exceeds the stack thickness {stack_thickness}")]
    DepthExceedsStack { depth: f32, stack_thickness: f32 },
}

/// Invalid method comparison scenario.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComparisonError {
    #[error("tunnel length must be a positive finite number, got {0}")]
    InvalidLength(f64),

    #[error("base rate for {method} must be positive, got {rate}")]
    NonPositiveRate { method: &'static str, rate: f32 },

    #[error("{method} duration for a {length} m tunnel does not fit in a day count")]
    DurationOverflow { method: &'static str, length: f64 },
}

/// Umbrella error for the full analysis pipeline.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("invalid design: {}", format_list(.0))]
    InvalidDesign(Vec<DesignError>),

    #[error("invalid engine constants: {}", format_list(.0))]
    InvalidConstants(Vec<DesignError>),

    #[error("invalid layer stack: {}", format_list(.0))]
    InvalidLayers(Vec<StratigraphyError>),

    #[error(transparent)]
    Stratigraphy(#[from] StratigraphyError),

    #[error(transparent)]
    Comparison(#[from] ComparisonError),

    #[error("failed to build cache key: {0}")]
    CacheKey(#[from] bincode::Error),
}

fn format_list<E: std::fmt::Display>(errors: &[E]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
