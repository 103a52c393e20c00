//! Data types produced by the statistics engine.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Scalar statistics for one sample, every figure rounded for display.
///
/// All fields are always present; `Default` gives the zeroed record a caller
/// can show before anything has been computed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResult {
    pub mean: f64,
    pub weighted_mean: f64,
    /// Modal values in ascending order. Empty when `no_mode` is set.
    pub mode: Vec<f64>,
    pub no_mode: bool,
    pub median: f64,

    // dispersion (population)
    pub variance: f64,
    pub weighted_variance: f64,
    pub std_dev: f64,
    pub weighted_std_dev: f64,

    // percentages
    pub coef_var: f64,
    pub weighted_coef_var: f64,
}

/// One distinct value and how often it occurs in the sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrequencyEntry {
    pub value: f64,
    pub count: usize,
}

impl FrequencyEntry {
    /// Axis/table label for the value.
    pub fn label(&self) -> String {
        self.value.to_string()
    }
}

/// Statistics that carry a derivation trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Statistic {
    Mean,
    Mode,
    Median,
    Variance,
    StdDev,
    CoefVar,
}

impl Statistic {
    pub const ALL: [Statistic; 6] = [
        Statistic::Mean,
        Statistic::Mode,
        Statistic::Median,
        Statistic::Variance,
        Statistic::StdDev,
        Statistic::CoefVar,
    ];

    /// Key used in serialized traces.
    pub fn key(self) -> &'static str {
        match self {
            Statistic::Mean => "mean",
            Statistic::Mode => "mode",
            Statistic::Median => "median",
            Statistic::Variance => "variance",
            Statistic::StdDev => "stdDev",
            Statistic::CoefVar => "coefVar",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Statistic::Mean => "Mean",
            Statistic::Mode => "Mode",
            Statistic::Median => "Median",
            Statistic::Variance => "Variance",
            Statistic::StdDev => "Std. Dev.",
            Statistic::CoefVar => "Coeff. Var.",
        }
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Formula substitutions that led to each reported statistic.
///
/// Display-only: nothing in the engine reads these strings back.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DerivationTrace {
    steps: BTreeMap<Statistic, Vec<String>>,
}

impl DerivationTrace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one line to the trace of `statistic`.
    pub fn push(&mut self, statistic: Statistic, line: impl Into<String>) {
        self.steps.entry(statistic).or_default().push(line.into());
    }

    /// Lines for `statistic`, in the order they were derived.
    pub fn steps(&self, statistic: Statistic) -> &[String] {
        self.steps
            .get(&statistic)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Everything one call to the engine produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Computation {
    pub result: StatsResult,
    /// Distinct values in first-seen order.
    pub frequency: Vec<FrequencyEntry>,
    pub trace: DerivationTrace,
    /// Whether weights took part; when false every weight was `1`.
    pub weighted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_result_is_zeroed() {
        let r = StatsResult::default();
        assert_eq!(r.mean, 0.0);
        assert!(r.mode.is_empty());
        assert!(!r.no_mode);
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let json = serde_json::to_value(StatsResult::default()).unwrap();
        assert!(json.get("weightedMean").is_some());
        assert!(json.get("noMode").is_some());
        assert!(json.get("weightedCoefVar").is_some());
    }

    #[test]
    fn test_trace_keeps_line_order() {
        let mut trace = DerivationTrace::new();
        trace.push(Statistic::Mean, "first");
        trace.push(Statistic::Mean, "second");

        assert_eq!(trace.steps(Statistic::Mean), ["first", "second"]);
        assert!(trace.steps(Statistic::Mode).is_empty());
    }

    #[test]
    fn test_trace_serializes_by_key() {
        let mut trace = DerivationTrace::new();
        trace.push(Statistic::StdDev, "σ = 1");

        let json = serde_json::to_value(&trace).unwrap();
        assert_eq!(json["stdDev"][0], "σ = 1");
    }

    #[test]
    fn test_frequency_label() {
        let e = FrequencyEntry {
            value: 2.5,
            count: 1,
        };
        assert_eq!(e.label(), "2.5");
        let e = FrequencyEntry {
            value: 20.0,
            count: 2,
        };
        assert_eq!(e.label(), "20");
    }
}
