//! Error types for engine, spring and shape construction.

use crate::objects::BodyId;
use thiserror::Error;

/// Invalid configuration detected at construction time.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A value that must be strictly positive and finite was not.
    #[error("{field} must be positive and finite, got {value}")]
    NotPositive {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// A value that must be non-negative and finite was not.
    #[error("{field} must be non-negative and finite, got {value}")]
    Negative {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// A value fell outside its allowed closed range.
    #[error("{field} must be within [{min}, {max}], got {value}")]
    OutOfRange {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f64,
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },

    /// A vector field contained NaN or infinity.
    #[error("{field} must be finite")]
    NonFinite {
        /// Name of the offending field.
        field: &'static str,
    },

    /// An integer count that must be at least one was zero.
    #[error("{field} must be at least 1")]
    ZeroCount {
        /// Name of the offending field.
        field: &'static str,
    },
}

/// Invalid shape geometry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShapeError {
    /// Circle radius or rectangle extent was not positive and finite.
    #[error("shape dimension must be positive and finite, got {0}")]
    InvalidDimension(f64),

    /// Polygon has fewer than three vertices.
    #[error("polygon needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),

    /// Polygon has a NaN or infinite vertex.
    #[error("polygon vertex {0} is not finite")]
    NonFiniteVertex(usize),

    /// Polygon encloses no area.
    #[error("polygon is degenerate (zero area)")]
    Degenerate,

    /// Polygon is not convex.
    #[error("polygon is not convex (reflex turn at vertex {0})")]
    NotConvex(usize),
}

/// Errors returned by [`Engine`](crate::Engine) operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// The engine or a body spec was configured incorrectly.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// A body shape was malformed.
    #[error("invalid shape: {0}")]
    Shape(#[from] ShapeError),

    /// The id refers to a removed or never-created body.
    #[error("body {0} not found")]
    BodyNotFound(BodyId),

    /// Input would make a body's state non-finite.
    #[error("non-finite {quantity} for body {id}")]
    NumericInstability {
        /// The body the input was aimed at.
        id: BodyId,
        /// What was rejected ("impulse", "force", ...).
        quantity: &'static str,
    },
}

impl ConfigError {
    pub(crate) fn check_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
        if value.is_finite() && value > 0.0 {
            Ok(())
        } else {
            Err(ConfigError::NotPositive { field, value })
        }
    }

    pub(crate) fn check_non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
        if value.is_finite() && value >= 0.0 {
            Ok(())
        } else {
            Err(ConfigError::Negative { field, value })
        }
    }

    pub(crate) fn check_range(
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    ) -> Result<(), ConfigError> {
        if value.is_finite() && value >= min && value <= max {
            Ok(())
        } else {
            Err(ConfigError::OutOfRange { field, value, min, max })
        }
    }
}
