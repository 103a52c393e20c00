//! The statistics engine.

use tracing::{debug, trace};

use crate::error::{Result, StatsError};
use crate::stats::frequency::FrequencyBuilder;
use crate::stats::rounding::{MAX_ROUNDING_DIGITS, round_to};
use crate::stats::trace::{Notation, TraceWriter};
use crate::stats::types::{Computation, StatsResult};

/// Default number of decimals for reported figures.
pub const DEFAULT_ROUNDING_DIGITS: u32 = 2;

/// Full-precision figures behind a [`StatsResult`].
#[derive(Debug, Clone, Default)]
pub(crate) struct Intermediates {
    pub n: usize,
    pub sum: f64,
    pub mean: f64,
    pub total_weight: f64,
    pub weighted_sum: f64,
    pub weighted_mean: f64,
    pub sorted: Vec<f64>,
    pub median: f64,
    pub sq_dev_sum: f64,
    pub weighted_sq_dev_sum: f64,
    pub variance: f64,
    pub weighted_variance: f64,
    pub std_dev: f64,
    pub weighted_std_dev: f64,
    pub coef_var: f64,
    pub weighted_coef_var: f64,
}

/// Stateless calculator for descriptive statistics.
///
/// Every statistic is derived from full-precision intermediates; rounding to
/// `rounding_digits` happens only on the reported figures. An engine holds
/// no per-call state, so one instance may be shared across threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsEngine {
    rounding_digits: u32,
    notation: Notation,
}

impl Default for StatsEngine {
    fn default() -> Self {
        Self {
            rounding_digits: DEFAULT_ROUNDING_DIGITS,
            notation: Notation::Plain,
        }
    }
}

impl StatsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decimals for reported figures, capped at [`MAX_ROUNDING_DIGITS`].
    pub fn with_rounding_digits(mut self, digits: u32) -> Self {
        self.rounding_digits = digits.min(MAX_ROUNDING_DIGITS);
        self
    }

    pub fn with_notation(mut self, notation: Notation) -> Self {
        self.notation = notation;
        self
    }

    pub fn rounding_digits(&self) -> u32 {
        self.rounding_digits
    }

    pub fn notation(&self) -> Notation {
        self.notation
    }

    /// Computes every statistic, the frequency table and the derivation trace.
    ///
    /// With `use_weights` off, `weights` is ignored (it may be empty) and each
    /// observation weighs `1`; the weighted fields then equal their plain
    /// counterparts and the trace omits the weighted lines.
    ///
    /// # Errors
    ///
    /// - [`StatsError::EmptyInput`] if `values` is empty.
    /// - [`StatsError::LengthMismatch`] if weighting is on and the lengths differ.
    /// - [`StatsError::NonFiniteValue`] / [`StatsError::InvalidWeight`] for bad entries.
    /// - [`StatsError::DegenerateDivision`] for a zero total weight or a zero
    ///   mean under the coefficient of variation.
    /// - [`StatsError::Overflow`] if a statistic leaves the f64 range.
    pub fn compute(&self, values: &[f64], weights: &[f64], use_weights: bool) -> Result<Computation> {
        let unit_weights;
        let weights = if use_weights {
            weights
        } else {
            unit_weights = vec![1.0; values.len()];
            unit_weights.as_slice()
        };

        validate(values, weights)?;
        let inter = derive(values, weights)?;

        let table = FrequencyBuilder::from_values(values);
        let no_mode = table.no_mode();
        debug!(
            n = inter.n,
            distinct = table.entries().len(),
            max_freq = table.max_freq(),
            use_weights,
            "Sample summarized"
        );

        let d = self.rounding_digits;
        let result = StatsResult {
            mean: round_to(inter.mean, d),
            weighted_mean: round_to(inter.weighted_mean, d),
            mode: table.modes(),
            no_mode,
            median: round_to(inter.median, d),
            variance: round_to(inter.variance, d),
            weighted_variance: round_to(inter.weighted_variance, d),
            std_dev: round_to(inter.std_dev, d),
            weighted_std_dev: round_to(inter.weighted_std_dev, d),
            coef_var: round_to(inter.coef_var, d),
            weighted_coef_var: round_to(inter.weighted_coef_var, d),
        };

        let trace = TraceWriter {
            notation: self.notation,
            digits: d,
            weighted: use_weights,
            inter: &inter,
            result: &result,
            frequency: &table,
        }
        .assemble();

        Ok(Computation {
            result,
            frequency: table.into_entries(),
            trace,
            weighted: use_weights,
        })
    }
}

/// Rejects any input the formulas cannot take, before anything is computed.
fn validate(values: &[f64], weights: &[f64]) -> Result<()> {
    if values.is_empty() {
        return Err(StatsError::EmptyInput);
    }

    if values.len() != weights.len() {
        return Err(StatsError::LengthMismatch {
            values: values.len(),
            weights: weights.len(),
        });
    }

    if let Some((index, &value)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(StatsError::NonFiniteValue { index, value });
    }

    if let Some((index, &weight)) = weights
        .iter()
        .enumerate()
        .find(|(_, w)| !w.is_finite() || **w < 0.0)
    {
        return Err(StatsError::InvalidWeight { index, weight });
    }

    Ok(())
}

/// Runs the formulas in order on validated input.
fn derive(values: &[f64], weights: &[f64]) -> Result<Intermediates> {
    let n = values.len();

    let total_weight = finite("total weight", weights.iter().sum())?;
    if total_weight == 0.0 {
        return Err(StatsError::DegenerateDivision {
            statistic: "weighted mean",
            divisor: "total weight",
        });
    }

    // central tendency
    let sum: f64 = values.iter().sum();
    let mean = finite("mean", sum / n as f64)?;
    let weighted_sum: f64 = values.iter().zip(weights).map(|(x, w)| x * w).sum();
    let weighted_mean = finite("weighted mean", weighted_sum / total_weight)?;

    // a mean within rounding noise of zero is treated as zero
    let magnitude: f64 = values.iter().map(|x| x.abs()).sum();
    if negligible(mean, magnitude) {
        return Err(StatsError::DegenerateDivision {
            statistic: "coefficient of variation",
            divisor: "mean",
        });
    }
    let weighted_magnitude: f64 = values
        .iter()
        .zip(weights)
        .map(|(x, w)| (x * w).abs())
        .sum();
    if negligible(weighted_mean, weighted_magnitude / total_weight * n as f64) {
        return Err(StatsError::DegenerateDivision {
            statistic: "weighted coefficient of variation",
            divisor: "weighted mean",
        });
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let median = if n % 2 == 1 {
        sorted[n / 2]
    } else {
        finite("median", (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0)?
    };

    // dispersion
    let sq_dev_sum: f64 = values.iter().map(|x| (x - mean).powi(2)).sum();
    let variance = finite("variance", sq_dev_sum / n as f64)?;
    let weighted_sq_dev_sum: f64 = values
        .iter()
        .zip(weights)
        .map(|(x, w)| w * (x - weighted_mean).powi(2))
        .sum();
    let weighted_variance = finite("weighted variance", weighted_sq_dev_sum / total_weight)?;

    let std_dev = variance.sqrt();
    let weighted_std_dev = weighted_variance.sqrt();

    let coef_var = finite("coefficient of variation", std_dev / mean * 100.0)?;
    let weighted_coef_var = finite(
        "weighted coefficient of variation",
        weighted_std_dev / weighted_mean * 100.0,
    )?;

    trace!(sum, weighted_sum, total_weight, sq_dev_sum, "Intermediates derived");

    Ok(Intermediates {
        n,
        sum,
        mean,
        total_weight,
        weighted_sum,
        weighted_mean,
        sorted,
        median,
        sq_dev_sum,
        weighted_sq_dev_sum,
        variance,
        weighted_variance,
        std_dev,
        weighted_std_dev,
        coef_var,
        weighted_coef_var,
    })
}

/// True when `centre` is no larger than the summation error a mean over data
/// of absolute size `magnitude` can carry.
fn negligible(centre: f64, magnitude: f64) -> bool {
    magnitude.is_finite() && centre.abs() <= f64::EPSILON * magnitude
}

fn finite(statistic: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(StatsError::Overflow { statistic })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::types::Statistic;

    fn unweighted(values: &[f64]) -> Computation {
        StatsEngine::new().compute(values, &[], false).unwrap()
    }

    #[test]
    fn test_reference_scenario() {
        let c = unweighted(&[10.0, 20.0, 20.0, 30.0]);
        let r = &c.result;

        assert_eq!(r.mean, 20.0);
        assert_eq!(r.median, 20.0);
        assert_eq!(r.mode, vec![20.0]);
        assert!(!r.no_mode);
        assert_eq!(r.variance, 50.0);
        assert_eq!(r.std_dev, 7.07);
        assert_eq!(r.coef_var, 35.36);
    }

    #[test]
    fn test_weighted_mean_scenario() {
        let c = StatsEngine::new()
            .compute(&[1.0, 2.0, 3.0, 4.0], &[4.0, 3.0, 2.0, 1.0], true)
            .unwrap();

        assert_eq!(c.result.weighted_mean, 2.0);
        assert_eq!(c.result.mean, 2.5);
        // Σw(x-2)² = 4 + 0 + 2 + 4 = 10 → 10 / 10
        assert_eq!(c.result.weighted_variance, 1.0);
        assert_eq!(c.result.weighted_std_dev, 1.0);
        assert_eq!(c.result.weighted_coef_var, 50.0);
        assert!(c.weighted);
    }

    #[test]
    fn test_unweighted_ignores_weights_argument() {
        let a = StatsEngine::new().compute(&[1.0, 2.0, 4.0], &[9.0], false).unwrap();
        let b = unweighted(&[1.0, 2.0, 4.0]);
        assert_eq!(a, b);
        assert_eq!(a.result.weighted_mean, a.result.mean);
    }

    #[test]
    fn test_multimodal() {
        let c = unweighted(&[5.0, 3.0, 3.0, 2.0, 2.0]);
        assert_eq!(c.result.mode, vec![2.0, 3.0]);
        assert!(!c.result.no_mode);
    }

    #[test]
    fn test_no_mode() {
        let c = unweighted(&[3.0, 1.0, 2.0]);
        assert!(c.result.no_mode);
        assert!(c.result.mode.is_empty());
        assert_eq!(c.result.median, 2.0);
    }

    #[test]
    fn test_single_value() {
        let c = unweighted(&[7.0]);
        assert_eq!(c.result.mean, 7.0);
        assert_eq!(c.result.median, 7.0);
        assert_eq!(c.result.variance, 0.0);
        assert_eq!(c.result.coef_var, 0.0);
        assert!(c.result.no_mode);
    }

    #[test]
    fn test_even_median_averages_middle_pair() {
        let c = unweighted(&[4.0, 1.0, 3.0, 2.0]);
        assert_eq!(c.result.median, 2.5);
    }

    #[test]
    fn test_rounding_digits() {
        let c = StatsEngine::new()
            .with_rounding_digits(0)
            .compute(&[10.0, 20.0, 20.0, 30.0], &[], false)
            .unwrap();
        assert_eq!(c.result.std_dev, 7.0);
        assert_eq!(c.result.coef_var, 35.0);
    }

    #[test]
    fn test_rounding_digits_are_capped() {
        let engine = StatsEngine::new().with_rounding_digits(40);
        assert_eq!(engine.rounding_digits(), MAX_ROUNDING_DIGITS);
    }

    #[test]
    fn test_frequency_in_first_seen_order() {
        let c = unweighted(&[30.0, 10.0, 30.0]);
        assert_eq!(c.frequency.len(), 2);
        assert_eq!(c.frequency[0].value, 30.0);
        assert_eq!(c.frequency[0].count, 2);
    }

    #[test]
    fn test_empty_input() {
        let err = StatsEngine::new().compute(&[], &[], false).unwrap_err();
        assert_eq!(err, StatsError::EmptyInput);
    }

    #[test]
    fn test_length_mismatch() {
        let err = StatsEngine::new()
            .compute(&[1.0, 2.0], &[1.0], true)
            .unwrap_err();
        assert_eq!(
            err,
            StatsError::LengthMismatch {
                values: 2,
                weights: 1
            }
        );
    }

    #[test]
    fn test_zero_total_weight() {
        let err = StatsEngine::new()
            .compute(&[1.0, 2.0], &[0.0, 0.0], true)
            .unwrap_err();
        assert!(matches!(err, StatsError::DegenerateDivision { divisor: "total weight", .. }));
    }

    #[test]
    fn test_zero_mean() {
        let err = StatsEngine::new()
            .compute(&[-1.0, 1.0], &[], false)
            .unwrap_err();
        assert!(matches!(err, StatsError::DegenerateDivision { divisor: "mean", .. }));
    }

    #[test]
    fn test_zero_weighted_mean() {
        let err = StatsEngine::new()
            .compute(&[-2.0, 1.0, 4.0], &[1.0, 2.0, 0.0], true)
            .unwrap_err();
        assert!(matches!(
            err,
            StatsError::DegenerateDivision { divisor: "weighted mean", .. }
        ));
    }

    #[test]
    fn test_near_zero_mean_is_degenerate() {
        // 0.1 + 0.2 - 0.3 sums to 5.55e-17, not 0.0
        let err = StatsEngine::new()
            .compute(&[0.1, 0.2, -0.3], &[], false)
            .unwrap_err();
        assert!(matches!(err, StatsError::DegenerateDivision { divisor: "mean", .. }));
    }

    #[test]
    fn test_near_zero_weighted_mean_is_degenerate() {
        let err = StatsEngine::new()
            .compute(&[0.1, 0.2, -0.3, 5.0], &[1.0, 1.0, 1.0, 0.0], true)
            .unwrap_err();
        assert!(matches!(
            err,
            StatsError::DegenerateDivision { divisor: "weighted mean", .. }
        ));
    }

    #[test]
    fn test_small_but_real_mean_is_kept() {
        let c = unweighted(&[1e-9, 2e-9, 3e-9]);
        assert_eq!(c.result.mean, 0.0);
        assert_eq!(c.result.coef_var, 40.82);
    }

    #[test]
    fn test_non_finite_value() {
        let err = StatsEngine::new()
            .compute(&[1.0, f64::NAN], &[], false)
            .unwrap_err();
        assert!(matches!(err, StatsError::NonFiniteValue { index: 1, .. }));
    }

    #[test]
    fn test_negative_weight() {
        let err = StatsEngine::new()
            .compute(&[1.0, 2.0], &[1.0, -1.0], true)
            .unwrap_err();
        assert!(matches!(err, StatsError::InvalidWeight { index: 1, .. }));
    }

    #[test]
    fn test_overflow() {
        let err = StatsEngine::new()
            .compute(&[f64::MAX, f64::MAX], &[], false)
            .unwrap_err();
        assert!(matches!(err, StatsError::Overflow { .. }));
    }

    #[test]
    fn test_total_weight_overflow() {
        let err = StatsEngine::new()
            .compute(&[1.0, 2.0], &[f64::MAX, f64::MAX], true)
            .unwrap_err();
        assert!(matches!(err, StatsError::Overflow { statistic: "total weight" }));
    }

    #[test]
    fn test_trace_reports_unrounded_and_rounded() {
        let c = unweighted(&[10.0, 20.0, 20.0, 30.0]);

        assert_eq!(
            c.trace.steps(Statistic::Mean),
            ["Σ x_i (i = 1..4) = 80", "x̄ = 80 / 4 = 20.00"]
        );
        assert_eq!(
            c.trace.steps(Statistic::Median),
            ["sorted data: 10, 20, 20, 30", "x̃ = (20 + 20) / 2 = 20.00"]
        );
        assert_eq!(
            c.trace.steps(Statistic::Mode),
            ["frequencies: {10: 1, 20: 2, 30: 1}", "mode(s): 20"]
        );
        assert_eq!(
            c.trace.steps(Statistic::Variance),
            ["Σ (x_i - x̄)² = 200", "σ² = 200 / 4 = 50.00"]
        );
        assert_eq!(
            c.trace.steps(Statistic::StdDev),
            ["σ = √σ² = √50 = 7.07"]
        );
        assert_eq!(
            c.trace.steps(Statistic::CoefVar),
            ["CV = σ / x̄ × 100% = 7.0710678118654755 / 20 × 100% = 35.36%"]
        );
    }

    #[test]
    fn test_trace_weighted_lines() {
        let c = StatsEngine::new()
            .compute(&[1.0, 2.0, 3.0, 4.0], &[4.0, 3.0, 2.0, 1.0], true)
            .unwrap();

        let mean = c.trace.steps(Statistic::Mean);
        assert_eq!(mean.len(), 5);
        assert_eq!(mean[4], "x̄w = Σ w_i·x_i / Σ w_i = 20 / 10 = 2.00");
        assert_eq!(c.trace.steps(Statistic::Variance).len(), 4);
        assert_eq!(c.trace.steps(Statistic::StdDev)[1], "σw = √σ²w = √1 = 1.00");
        assert_eq!(c.trace.steps(Statistic::CoefVar).len(), 2);
    }

    #[test]
    fn test_trace_unweighted_has_no_weighted_lines() {
        let c = unweighted(&[1.0, 2.0, 3.0, 4.0]);
        for stat in Statistic::ALL {
            assert!(
                c.trace.steps(stat).iter().all(|l| !l.contains('w')),
                "{stat} mentions weights"
            );
        }
    }

    #[test]
    fn test_trace_odd_median_and_no_mode() {
        let c = unweighted(&[3.0, 1.0, 2.0]);
        assert_eq!(c.trace.steps(Statistic::Median)[1], "x̃ = x_(2) = 2.00");
        assert_eq!(
            c.trace.steps(Statistic::Mode),
            ["no mode (every frequency ≤ 1)"]
        );
    }

    #[test]
    fn test_trace_latex() {
        let c = StatsEngine::new()
            .with_notation(Notation::Latex)
            .compute(&[10.0, 20.0, 20.0, 30.0], &[], false)
            .unwrap();

        assert_eq!(
            c.trace.steps(Statistic::Mean),
            [
                "\\displaystyle \\sum_{i=1}^{4} x_i = 80",
                "\\bar{x} = \\frac{80}{4} = 20.00"
            ]
        );
        assert_eq!(
            c.trace.steps(Statistic::StdDev),
            ["\\sigma = \\sqrt{\\sigma^2} = \\sqrt{50} = 7.07"]
        );
    }

    #[test]
    fn test_compute_is_deterministic() {
        let values = [0.1, 0.2, 0.3, 0.3, 7.5];
        let weights = [1.0, 0.5, 2.0, 1.0, 3.0];
        let engine = StatsEngine::new();

        let a = engine.compute(&values, &weights, true).unwrap();
        let b = engine.compute(&values, &weights, true).unwrap();
        assert_eq!(a, b);
    }
}
