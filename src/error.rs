//! Error taxonomy for the statistics engine and its parsing boundary.

use thiserror::Error;

/// Reasons a sample cannot be turned into a [`crate::stats::Computation`].
///
/// Every variant is detected before any statistic is produced, so an error
/// never comes with a partial result.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum StatsError {
    /// No numeric values were supplied, or none survived filtering.
    #[error("at least one valid numeric value is required")]
    EmptyInput,

    /// Values and weights must be positionally paired.
    #[error("values and weights must have the same length (got {values} values and {weights} weights)")]
    LengthMismatch { values: usize, weights: usize },

    /// A statistic would divide by zero.
    #[error("{statistic} is undefined: {divisor} is zero")]
    DegenerateDivision {
        statistic: &'static str,
        divisor: &'static str,
    },

    /// A NaN or infinite observation reached the engine.
    #[error("value #{index} is not a finite number ({value})")]
    NonFiniteValue { index: usize, value: f64 },

    /// Weights must be finite and not negative.
    #[error("weight #{index} must be a finite number >= 0 (got {weight})")]
    InvalidWeight { index: usize, weight: f64 },

    /// An intermediate result left the representable f64 range.
    #[error("{statistic} overflowed the floating-point range")]
    Overflow { statistic: &'static str },
}

/// Result type for engine and parser operations.
pub type Result<T> = std::result::Result<T, StatsError>;
