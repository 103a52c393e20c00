//! Derivation trace assembly.
//!
//! Lines are built from the very numbers the engine computed: unrounded
//! intermediates print in shortest round-trip form, reported figures print
//! with the configured number of decimals.

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::stats::engine::Intermediates;
use crate::stats::frequency::FrequencyTable;
use crate::stats::rounding::format_fixed;
use crate::stats::types::{DerivationTrace, Statistic, StatsResult};

/// How formula lines are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Notation {
    /// Unicode text (Σ, x̄, σ², √).
    #[default]
    Plain,
    /// KaTeX-compatible expressions.
    Latex,
}

#[derive(Debug, Error)]
#[error("unknown notation '{0}' (expected 'plain' or 'latex')")]
pub struct ParseNotationError(String);

impl FromStr for Notation {
    type Err = ParseNotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" | "text" => Ok(Notation::Plain),
            "latex" | "katex" => Ok(Notation::Latex),
            _ => Err(ParseNotationError(s.to_string())),
        }
    }
}

impl fmt::Display for Notation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notation::Plain => f.write_str("plain"),
            Notation::Latex => f.write_str("latex"),
        }
    }
}

/// Builds the trace for one computation.
pub(crate) struct TraceWriter<'a> {
    pub notation: Notation,
    pub digits: u32,
    pub weighted: bool,
    pub inter: &'a Intermediates,
    pub result: &'a StatsResult,
    pub frequency: &'a FrequencyTable,
}

impl TraceWriter<'_> {
    pub fn assemble(&self) -> DerivationTrace {
        let mut trace = DerivationTrace::new();
        self.mean(&mut trace);
        self.mode(&mut trace);
        self.median(&mut trace);
        self.variance(&mut trace);
        self.std_dev(&mut trace);
        self.coef_var(&mut trace);
        trace
    }

    fn fixed(&self, v: f64) -> String {
        format_fixed(v, self.digits)
    }

    fn mean(&self, trace: &mut DerivationTrace) {
        let i = self.inter;
        let mean = self.fixed(self.result.mean);

        match self.notation {
            Notation::Plain => {
                trace.push(Statistic::Mean, format!("Σ x_i (i = 1..{}) = {}", i.n, i.sum));
                trace.push(Statistic::Mean, format!("x̄ = {} / {} = {mean}", i.sum, i.n));
            }
            Notation::Latex => {
                trace.push(
                    Statistic::Mean,
                    format!("\\displaystyle \\sum_{{i=1}}^{{{}}} x_i = {}", i.n, i.sum),
                );
                trace.push(
                    Statistic::Mean,
                    format!("\\bar{{x}} = \\frac{{{}}}{{{}}} = {mean}", i.sum, i.n),
                );
            }
        }

        if !self.weighted {
            return;
        }

        let wmean = self.fixed(self.result.weighted_mean);
        match self.notation {
            Notation::Plain => {
                trace.push(Statistic::Mean, format!("Σ w_i = {}", i.total_weight));
                trace.push(Statistic::Mean, format!("Σ w_i·x_i = {}", i.weighted_sum));
                trace.push(
                    Statistic::Mean,
                    format!(
                        "x̄w = Σ w_i·x_i / Σ w_i = {} / {} = {wmean}",
                        i.weighted_sum, i.total_weight
                    ),
                );
            }
            Notation::Latex => {
                trace.push(
                    Statistic::Mean,
                    format!("\\displaystyle \\sum w_i = {}", i.total_weight),
                );
                trace.push(
                    Statistic::Mean,
                    format!("\\displaystyle \\sum w_i x_i = {}", i.weighted_sum),
                );
                trace.push(
                    Statistic::Mean,
                    format!(
                        "\\bar{{x}}_{{\\text{{w}}}} = \\frac{{\\sum w_i x_i}}{{\\sum w_i}} = \\frac{{{}}}{{{}}} = {wmean}",
                        i.weighted_sum, i.total_weight
                    ),
                );
            }
        }
    }

    fn mode(&self, trace: &mut DerivationTrace) {
        if self.result.no_mode {
            let line = match self.notation {
                Notation::Plain => "no mode (every frequency ≤ 1)".to_string(),
                Notation::Latex => "\\text{no mode (every frequency } \\le 1)".to_string(),
            };
            trace.push(Statistic::Mode, line);
            return;
        }

        let pairs: Vec<String> = self
            .frequency
            .entries()
            .iter()
            .map(|e| format!("{}: {}", e.value, e.count))
            .collect();
        let modes: Vec<String> = self.result.mode.iter().map(f64::to_string).collect();

        match self.notation {
            Notation::Plain => {
                trace.push(
                    Statistic::Mode,
                    format!("frequencies: {{{}}}", pairs.join(", ")),
                );
                trace.push(Statistic::Mode, format!("mode(s): {}", modes.join(", ")));
            }
            Notation::Latex => {
                trace.push(
                    Statistic::Mode,
                    format!("\\text{{frequencies: }} \\{{{}\\}}", pairs.join(",\\; ")),
                );
                trace.push(
                    Statistic::Mode,
                    format!("\\text{{mode(s): }} {}", modes.join(",\\; ")),
                );
            }
        }
    }

    fn median(&self, trace: &mut DerivationTrace) {
        let sorted: Vec<String> = self.inter.sorted.iter().map(f64::to_string).collect();
        let median = self.fixed(self.result.median);
        let n = self.inter.sorted.len();

        match self.notation {
            Notation::Plain => {
                trace.push(
                    Statistic::Median,
                    format!("sorted data: {}", sorted.join(", ")),
                );
                let line = if n % 2 == 1 {
                    format!("x̃ = x_({}) = {median}", n / 2 + 1)
                } else {
                    format!(
                        "x̃ = ({} + {}) / 2 = {median}",
                        self.inter.sorted[n / 2 - 1],
                        self.inter.sorted[n / 2]
                    )
                };
                trace.push(Statistic::Median, line);
            }
            Notation::Latex => {
                trace.push(
                    Statistic::Median,
                    format!("\\text{{sorted data: }} {}", sorted.join(",\\;")),
                );
                let line = if n % 2 == 1 {
                    format!("\\tilde{{x}} = x_{{({})}} = {median}", n / 2 + 1)
                } else {
                    format!(
                        "\\tilde{{x}} = \\frac{{{} + {}}}{{2}} = {median}",
                        self.inter.sorted[n / 2 - 1],
                        self.inter.sorted[n / 2]
                    )
                };
                trace.push(Statistic::Median, line);
            }
        }
    }

    fn variance(&self, trace: &mut DerivationTrace) {
        let i = self.inter;
        let variance = self.fixed(self.result.variance);

        match self.notation {
            Notation::Plain => {
                trace.push(
                    Statistic::Variance,
                    format!("Σ (x_i - x̄)² = {}", i.sq_dev_sum),
                );
                trace.push(
                    Statistic::Variance,
                    format!("σ² = {} / {} = {variance}", i.sq_dev_sum, i.n),
                );
            }
            Notation::Latex => {
                trace.push(
                    Statistic::Variance,
                    format!(
                        "\\displaystyle \\sum (x_i - \\bar{{x}})^{{2}} = {}",
                        i.sq_dev_sum
                    ),
                );
                trace.push(
                    Statistic::Variance,
                    format!(
                        "\\sigma^2 = \\frac{{\\sum (x_i - \\bar{{x}})^{{2}}}}{{n}} = \\frac{{{}}}{{{}}} = {variance}",
                        i.sq_dev_sum, i.n
                    ),
                );
            }
        }

        if !self.weighted {
            return;
        }

        let wvariance = self.fixed(self.result.weighted_variance);
        match self.notation {
            Notation::Plain => {
                trace.push(
                    Statistic::Variance,
                    format!("Σ w_i·(x_i - x̄w)² = {}", i.weighted_sq_dev_sum),
                );
                trace.push(
                    Statistic::Variance,
                    format!(
                        "σ²w = {} / {} = {wvariance}",
                        i.weighted_sq_dev_sum, i.total_weight
                    ),
                );
            }
            Notation::Latex => {
                trace.push(
                    Statistic::Variance,
                    format!(
                        "\\displaystyle \\sum w_i (x_i - \\bar{{x}}_{{\\text{{w}}}})^{{2}} = {}",
                        i.weighted_sq_dev_sum
                    ),
                );
                trace.push(
                    Statistic::Variance,
                    format!(
                        "\\sigma^2_{{\\text{{w}}}} = \\frac{{\\sum w_i (x_i - \\bar{{x}}_{{\\text{{w}}}})^{{2}}}}{{\\sum w_i}} = \\frac{{{}}}{{{}}} = {wvariance}",
                        i.weighted_sq_dev_sum, i.total_weight
                    ),
                );
            }
        }
    }

    fn std_dev(&self, trace: &mut DerivationTrace) {
        let i = self.inter;
        let sd = self.fixed(self.result.std_dev);
        let line = match self.notation {
            Notation::Plain => format!("σ = √σ² = √{} = {sd}", i.variance),
            Notation::Latex => {
                format!("\\sigma = \\sqrt{{\\sigma^2}} = \\sqrt{{{}}} = {sd}", i.variance)
            }
        };
        trace.push(Statistic::StdDev, line);

        if !self.weighted {
            return;
        }

        let wsd = self.fixed(self.result.weighted_std_dev);
        let line = match self.notation {
            Notation::Plain => format!("σw = √σ²w = √{} = {wsd}", i.weighted_variance),
            Notation::Latex => format!(
                "\\sigma_{{\\text{{w}}}} = \\sqrt{{\\sigma^2_{{\\text{{w}}}}}} = \\sqrt{{{}}} = {wsd}",
                i.weighted_variance
            ),
        };
        trace.push(Statistic::StdDev, line);
    }

    fn coef_var(&self, trace: &mut DerivationTrace) {
        let i = self.inter;
        let cv = self.fixed(self.result.coef_var);
        let line = match self.notation {
            Notation::Plain => format!(
                "CV = σ / x̄ × 100% = {} / {} × 100% = {cv}%",
                i.std_dev, i.mean
            ),
            Notation::Latex => format!(
                "CV = \\frac{{\\sigma}}{{\\bar{{x}}}} \\times 100\\% = \\frac{{{}}}{{{}}} \\times 100\\% = {cv}\\%",
                i.std_dev, i.mean
            ),
        };
        trace.push(Statistic::CoefVar, line);

        if !self.weighted {
            return;
        }

        let wcv = self.fixed(self.result.weighted_coef_var);
        let line = match self.notation {
            Notation::Plain => format!(
                "CVw = σw / x̄w × 100% = {} / {} × 100% = {wcv}%",
                i.weighted_std_dev, i.weighted_mean
            ),
            Notation::Latex => format!(
                "CV_{{\\text{{w}}}} = \\frac{{\\sigma_{{\\text{{w}}}}}}{{\\bar{{x}}_{{\\text{{w}}}}}} \\times 100\\% = \\frac{{{}}}{{{}}} \\times 100\\% = {wcv}\\%",
                i.weighted_std_dev, i.weighted_mean
            ),
        };
        trace.push(Statistic::CoefVar, line);
    }
}
