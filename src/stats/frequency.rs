//! Frequency distribution and mode detection.

use std::collections::HashMap;

use crate::stats::types::FrequencyEntry;

/// Distinct values of a sample with their occurrence counts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrequencyTable {
    entries: Vec<FrequencyEntry>,
    max_freq: usize,
}

impl FrequencyTable {
    /// Entries in first-seen order.
    pub fn entries(&self) -> &[FrequencyEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<FrequencyEntry> {
        self.entries
    }

    /// Highest occurrence count, `0` for an empty table.
    pub fn max_freq(&self) -> usize {
        self.max_freq
    }

    /// Total number of observations counted.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|e| e.count).sum()
    }

    /// True when no value repeats.
    pub fn no_mode(&self) -> bool {
        self.max_freq <= 1
    }

    /// Values occurring `max_freq` times, ascending. Empty when [`Self::no_mode`].
    pub fn modes(&self) -> Vec<f64> {
        if self.no_mode() {
            return Vec::new();
        }

        let mut modes: Vec<f64> = self
            .entries
            .iter()
            .filter(|e| e.count == self.max_freq)
            .map(|e| e.value)
            .collect();
        modes.sort_by(f64::total_cmp);
        modes
    }
}

/// Groups values by exact floating-point equality.
#[derive(Debug, Default)]
pub struct FrequencyBuilder {
    index: HashMap<u64, usize>,
    entries: Vec<FrequencyEntry>,
}

impl FrequencyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: f64) {
        match self.index.get(&key(value)) {
            Some(&i) => self.entries[i].count += 1,
            None => {
                self.index.insert(key(value), self.entries.len());
                self.entries.push(FrequencyEntry {
                    // -0.0 joins the 0.0 category
                    value: if value == 0.0 { 0.0 } else { value },
                    count: 1,
                });
            }
        }
    }

    pub fn build(self) -> FrequencyTable {
        let max_freq = self.entries.iter().map(|e| e.count).max().unwrap_or(0);
        FrequencyTable {
            entries: self.entries,
            max_freq,
        }
    }

    /// Builds the table for a whole slice in one go.
    pub fn from_values(values: &[f64]) -> FrequencyTable {
        let mut builder = Self::new();
        for &v in values {
            builder.push(v);
        }
        builder.build()
    }
}

/// Hash key honouring `==`: both zeros share a key. NaN never reaches here.
fn key(value: f64) -> u64 {
    if value == 0.0 { 0 } else { value.to_bits() }
}
