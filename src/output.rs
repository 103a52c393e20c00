//! Output formatting for computed statistics.
//!
//! Supports pretty-printing, JSON serialization, a text report and CSV export
//! of the frequency table.

use anyhow::Result;
use std::io::Write;
use tracing::debug;

use crate::stats::rounding::format_fixed;
use crate::stats::{Computation, FrequencyEntry, Statistic};

/// Logs a computation using Rust's debug pretty-print format.
pub fn print_pretty(computation: &Computation) {
    debug!("{:#?}", computation);
}

/// Serializes a computation as pretty-printed JSON.
pub fn to_json(computation: &Computation) -> Result<String> {
    Ok(serde_json::to_string_pretty(computation)?)
}

/// Writes the frequency table as `value,count` CSV.
pub fn write_frequency_csv<W: Write>(writer: W, entries: &[FrequencyEntry]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.serialize(("value", "count"))?;
    for entry in entries {
        writer.serialize((entry.label(), entry.count))?;
    }
    writer.flush()?;
    Ok(())
}

/// Renders one card per statistic followed by the frequency table.
///
/// `digits` must match the engine's rounding so figures print as computed.
pub fn render_text(computation: &Computation, digits: u32) -> String {
    let r = &computation.result;
    let fixed = |v: f64| format_fixed(v, digits);
    let mut out = String::new();

    for stat in Statistic::ALL {
        let (figure, weighted_figure) = match stat {
            Statistic::Mean => (fixed(r.mean), Some(fixed(r.weighted_mean))),
            Statistic::Mode => {
                let modes: Vec<String> = r.mode.iter().map(f64::to_string).collect();
                (modes.join(", "), None)
            }
            Statistic::Median => (fixed(r.median), None),
            Statistic::Variance => (fixed(r.variance), Some(fixed(r.weighted_variance))),
            Statistic::StdDev => (fixed(r.std_dev), Some(fixed(r.weighted_std_dev))),
            Statistic::CoefVar => (
                format!("{}%", fixed(r.coef_var)),
                Some(format!("{}%", fixed(r.weighted_coef_var))),
            ),
        };

        if stat == Statistic::Mode && r.no_mode {
            out.push_str("There's no mode\n");
        } else {
            out.push_str(&format!("{}: {figure}\n", stat.label()));
        }
        if let Some(weighted_figure) = weighted_figure.filter(|_| computation.weighted) {
            out.push_str(&format!("Weighted {}: {weighted_figure}\n", stat.label()));
        }
        for line in computation.trace.steps(stat) {
            out.push_str(&format!("    {line}\n"));
        }
        out.push('\n');
    }

    let width = computation
        .frequency
        .iter()
        .map(|e| e.label().chars().count())
        .max()
        .unwrap_or(0)
        .max("Value".len());

    out.push_str(&format!("{:<width$}  Count\n", "Value"));
    for entry in &computation.frequency {
        out.push_str(&format!("{:<width$}  {}\n", entry.label(), entry.count));
    }

    out
}
