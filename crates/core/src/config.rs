//! Runtime configuration for regression runs.

use std::path::PathBuf;

use crate::constants::{DEFAULT_DELTA, DEFAULT_GOLDEN_COPY_DIR};
use crate::errors::{Error, Result};

pub const GOLDEN_COPY_DIR_ENV: &str = "REGRESSION_GOLDEN_COPY_DIR";
pub const DELTA_ENV: &str = "REGRESSION_DELTA";
pub const COMPARE_PROPERTIES_ENV: &str = "REGRESSION_COMPARE_PROPERTIES";
pub const REPORT_DIR_ENV: &str = "REGRESSION_REPORT_DIR";

/// Settings shared by golden copy creation and regression checks.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionConfig {
    /// Directory holding `<view>.<snapshot>` golden copies.
    pub golden_copy_dir: PathBuf,
    /// Absolute tolerance for numeric comparisons.
    pub delta: f64,
    /// Also report keys whose values match but whose properties differ.
    pub compare_properties: bool,
    /// Where failure reports are written, if anywhere.
    pub report_dir: Option<PathBuf>,
}

impl Default for RegressionConfig {
    fn default() -> Self {
        Self {
            golden_copy_dir: PathBuf::from(DEFAULT_GOLDEN_COPY_DIR),
            delta: DEFAULT_DELTA,
            compare_properties: false,
            report_dir: None,
        }
    }
}

impl RegressionConfig {
    /// Builds a configuration from `REGRESSION_*` environment variables,
    /// falling back to defaults for anything unset.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(dir) = lookup(GOLDEN_COPY_DIR_ENV).filter(|v| !v.trim().is_empty()) {
            config.golden_copy_dir = PathBuf::from(dir);
        }

        if let Some(raw) = lookup(DELTA_ENV) {
            config.delta = parse_delta(&raw)?;
        }

        if let Some(raw) = lookup(COMPARE_PROPERTIES_ENV) {
            config.compare_properties = parse_flag(COMPARE_PROPERTIES_ENV, &raw)?;
        }

        config.report_dir = lookup(REPORT_DIR_ENV)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        Ok(config)
    }

    pub fn with_delta(mut self, delta: f64) -> Result<Self> {
        validate_delta(delta)?;
        self.delta = delta;
        Ok(self)
    }
}

fn parse_delta(raw: &str) -> Result<f64> {
    let delta = raw.trim().parse::<f64>().map_err(|e| {
        Error::InvalidConfigValue(format!("{}='{}': {}", DELTA_ENV, raw, e))
    })?;
    validate_delta(delta)?;
    Ok(delta)
}

fn validate_delta(delta: f64) -> Result<()> {
    if !delta.is_finite() || delta < 0.0 {
        return Err(Error::InvalidConfigValue(format!(
            "delta must be a finite, non-negative number, got {}",
            delta
        )));
    }
    Ok(())
}

fn parse_flag(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(Error::InvalidConfigValue(format!(
            "{}='{}' is not a boolean",
            key, other
        ))),
    }
}
