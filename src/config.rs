use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::stats::rounding::MAX_ROUNDING_DIGITS;
use crate::stats::{DEFAULT_ROUNDING_DIGITS, Notation, StatsEngine};

pub const DEFAULT_LOG_FILE_PATH: &str = "logs/descriptive_stats.log";

/// Runtime settings for the calculator.
///
/// Read from a JSON file, every key optional:
/// ```json
/// {
///   "rounding_digits": 3,
///   "notation": "latex",
///   "log_file_path": "logs/stats.log"
/// }
/// ```
/// Environment variables (`STATS_ROUNDING_DIGITS`, `STATS_NOTATION`,
/// `LOG_FILE_PATH`) override the file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub rounding_digits: u32,
    pub notation: Notation,
    pub log_file_path: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rounding_digits: DEFAULT_ROUNDING_DIGITS,
            notation: Notation::Plain,
            log_file_path: DEFAULT_LOG_FILE_PATH.to_string(),
        }
    }
}

impl Settings {
    /// Loads settings from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file '{path}'"))?;
        let settings: Settings = serde_json::from_str(&content)
            .with_context(|| format!("Invalid settings file '{path}'"))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Applies `STATS_ROUNDING_DIGITS`, `STATS_NOTATION` and `LOG_FILE_PATH`
    /// as looked up by `lookup`.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(digits) = lookup("STATS_ROUNDING_DIGITS") {
            self.rounding_digits = digits
                .trim()
                .parse()
                .with_context(|| format!("STATS_ROUNDING_DIGITS is not a number: '{digits}'"))?;
        }

        if let Some(notation) = lookup("STATS_NOTATION") {
            self.notation = notation.parse()?;
        }

        if let Some(path) = lookup("LOG_FILE_PATH") {
            self.log_file_path = path;
        }

        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        if self.rounding_digits > MAX_ROUNDING_DIGITS {
            bail!(
                "rounding_digits must be between 0 and {MAX_ROUNDING_DIGITS} (got {})",
                self.rounding_digits
            );
        }
        Ok(())
    }

    /// Engine configured from these settings.
    pub fn engine(&self) -> StatsEngine {
        StatsEngine::new()
            .with_rounding_digits(self.rounding_digits)
            .with_notation(self.notation)
    }
}
