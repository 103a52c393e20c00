//! Input parsing for free-form text and CSV rows.
//!
//! Tokens that are not finite numbers are dropped here, never in the
//! engine; each parse reports how many it dropped.

use anyhow::{Context, Result};
use std::io::Read;
use tracing::debug;

use crate::error::StatsError;

/// Numbers parsed from free-form text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedSample {
    pub values: Vec<f64>,
    /// Non-empty tokens that were not finite numbers.
    pub discarded: usize,
}

/// Values with their positionally paired weights.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PairedSample {
    pub values: Vec<f64>,
    pub weights: Vec<f64>,
    /// Tokens or rows dropped while parsing.
    pub discarded: usize,
}

/// Parses a token as a finite number. `"inf"` and `"NaN"` are rejected.
fn parse_finite(token: &str) -> Option<f64> {
    token.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Splits `text` on commas, semicolons and whitespace and keeps the numeric tokens.
pub fn parse_numbers(text: &str) -> ParsedSample {
    let mut sample = ParsedSample::default();

    for token in text
        .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .filter(|t| !t.is_empty())
    {
        match parse_finite(token) {
            Some(v) => sample.values.push(v),
            None => sample.discarded += 1,
        }
    }

    debug!(
        kept = sample.values.len(),
        discarded = sample.discarded,
        "Parsed free-form numbers"
    );
    sample
}

/// Parses separate value and weight fields that must pair up one to one.
///
/// # Errors
///
/// [`StatsError::EmptyInput`] when no value survives filtering, and
/// [`StatsError::LengthMismatch`] when the filtered lists differ in length.
pub fn parse_pairs(values_text: &str, weights_text: &str) -> Result<PairedSample, StatsError> {
    let values = parse_numbers(values_text);
    let weights = parse_numbers(weights_text);

    if values.values.is_empty() {
        return Err(StatsError::EmptyInput);
    }
    if values.values.len() != weights.values.len() {
        return Err(StatsError::LengthMismatch {
            values: values.values.len(),
            weights: weights.values.len(),
        });
    }

    Ok(PairedSample {
        values: values.values,
        weights: weights.values,
        discarded: values.discarded + weights.discarded,
    })
}

/// Reads `value[,weight]` records from CSV.
///
/// A record whose value is not a finite number is dropped together with its
/// weight. A blank or non-numeric weight counts as `1`, and so does every
/// weight when `use_weights` is off.
///
/// # Errors
///
/// Returns an error if the CSV cannot be read, or [`StatsError::EmptyInput`]
/// if no record holds a usable value.
pub fn read_rows<R: Read>(reader: R, use_weights: bool) -> Result<PairedSample> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(reader);

    let mut sample = PairedSample::default();

    for (line, record) in rdr.records().enumerate() {
        let record = record.with_context(|| format!("Failed to read CSV record {}", line + 1))?;

        if record.iter().all(str::is_empty) {
            continue;
        }

        let Some(value) = record.get(0).and_then(parse_finite) else {
            sample.discarded += 1;
            continue;
        };

        let weight = if use_weights {
            record.get(1).and_then(parse_finite).unwrap_or(1.0)
        } else {
            1.0
        };

        sample.values.push(value);
        sample.weights.push(weight);
    }

    debug!(
        rows = sample.values.len(),
        discarded = sample.discarded,
        use_weights,
        "Read CSV rows"
    );

    if sample.values.is_empty() {
        return Err(StatsError::EmptyInput.into());
    }

    Ok(sample)
}
