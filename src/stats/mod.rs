//! Descriptive statistics over a weighted sample.
//!
//! [`StatsEngine::compute`] turns positionally paired values and weights into
//! a [`Computation`]: the rounded [`StatsResult`], the frequency table and a
//! [`DerivationTrace`] whose lines agree with the reported figures.

pub mod engine;
pub mod frequency;
pub mod rounding;
pub mod trace;
pub mod types;

pub use engine::{DEFAULT_ROUNDING_DIGITS, StatsEngine};
pub use frequency::{FrequencyBuilder, FrequencyTable};
pub use trace::Notation;
pub use types::{Computation, DerivationTrace, FrequencyEntry, Statistic, StatsResult};

use crate::error::Result;

/// Computes with the default engine (two decimals, plain notation).
pub fn compute(values: &[f64], weights: &[f64], use_weights: bool) -> Result<Computation> {
    StatsEngine::default().compute(values, weights, use_weights)
}
