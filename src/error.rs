//! Error types for parameter handling, batch evaluation and registration.
//!
//! - [`ParameterError`]: declaration and parse-time validation failures. Fatal
//!   to startup; every entry-level variant names the full entry path.
//! - [`EvaluationError`]: contract breaches by the host (shape mismatches) and
//!   the numeric-domain failure raised under [`OverpressurePolicy::Reject`].
//! - [`GeometryError`]: invalid extents or radii for the stock geometry models.
//! - [`RegistryError`]: postprocessor lookup and registration failures.
//!
//! [`OverpressurePolicy::Reject`]: crate::liquidus::OverpressurePolicy::Reject

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParameterError {
    #[error("entry `{path}` is already declared")]
    DuplicateEntry { path: String },

    #[error("entry `{path}` has not been declared")]
    UndeclaredEntry { path: String },

    /// The declared default does not satisfy its own pattern.
    #[error("default value `{value}` of entry `{path}` does not match pattern {pattern}")]
    InvalidDefault {
        path: String,
        value: String,
        pattern: String,
    },

    #[error("value `{value}` for entry `{path}` does not match pattern {pattern}")]
    InvalidValue {
        path: String,
        value: String,
        pattern: String,
    },

    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("unbalanced subsection: {0}")]
    UnbalancedSubsection(String),

    #[error("expected a JSON object for subsection `{0}`")]
    NotASection(String),

    #[error("invalid JSON parameter input: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while evaluating a batch of sample points.
///
/// All variants except [`EvaluationError::PressureOutOfRange`] and
/// [`EvaluationError::NonFinitePressure`] are integration bugs on the host side
/// and are reported as internal inconsistencies.
#[derive(Debug, Error, PartialEq)]
pub enum EvaluationError {
    #[error("internal inconsistency: {points} evaluation points but {solutions} solution vectors")]
    BatchSizeMismatch { points: usize, solutions: usize },

    #[error("internal inconsistency: {inputs} sample points but {outputs} result slots")]
    OutputSizeMismatch { inputs: usize, outputs: usize },

    #[error(
        "internal inconsistency: solution vector {point} has {found} components, expected {expected}"
    )]
    ComponentCountMismatch {
        point: usize,
        found: usize,
        expected: usize,
    },

    #[error(
        "internal inconsistency: temperature component {index} is outside a solution of {n_components} components"
    )]
    TemperatureIndexOutOfRange { index: usize, n_components: usize },

    #[error("non-finite pressure {pressure} at sample point {point} (depth {depth})")]
    NonFinitePressure {
        point: usize,
        depth: f64,
        pressure: f64,
    },

    #[error(
        "pressure {pressure} at sample point {point} (depth {depth}) exceeds the liquidus pressure scale {limit}"
    )]
    PressureOutOfRange {
        point: usize,
        depth: f64,
        pressure: f64,
        limit: f64,
    },
}

/// Rejected geometry construction; the stock models validate their extents up front.
#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("box extents must be finite and positive, got {0:?}")]
    InvalidExtents([f64; 3]),

    #[error("box origin must be finite, got {0:?}")]
    InvalidOrigin([f64; 3]),

    #[error("shell radii must be finite with 0 <= inner < outer, got inner {inner}, outer {outer}")]
    InvalidRadii { inner: f64, outer: f64 },
}

#[derive(Debug, Error, PartialEq)]
pub enum RegistryError {
    #[error("a visualization postprocessor named `{0}` is already registered")]
    DuplicateName(String),

    #[error("no visualization postprocessor named `{0}` is registered")]
    UnknownPostprocessor(String),
}
