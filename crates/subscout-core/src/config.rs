//! Detection configuration
//!
//! Thresholds used by the subscription detector and the tool adapter.
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a two-layer resolution:
//! 1. Check for override (explicit path, or ~/.local/share/subscout/config/detection.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Keys missing from an override keep their default values.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/detection.toml");

/// Detection configuration
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionConfig {
    /// Default lookback window in months
    pub timeframe_months: u32,
    /// Default lower bound of the amount band (inclusive)
    pub min_amount: f64,
    /// Default upper bound of the amount band (inclusive)
    pub max_amount: f64,
    /// A gap is on cadence when within this fraction of the mean gap
    pub interval_tolerance: f64,
    /// Share of gaps that must be on cadence (0.7 = 70%)
    pub regular_share: f64,
    /// Days since the last payment after which a thin series looks inactive
    pub inactive_after_days: i64,
    /// Only series with fewer occurrences than this are checked for inactivity
    pub inactive_max_occurrences: usize,
    /// Monthly total above which a savings tip is emitted
    pub savings_tip_threshold: f64,
    /// Fraction of the monthly total quoted in the savings tip
    pub savings_rate: f64,
    /// Maximum records requested from the transaction source
    pub fetch_limit: usize,
    /// Seconds before a transaction fetch is abandoned
    pub fetch_timeout_secs: u64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            timeframe_months: 6,
            min_amount: 1.00,
            max_amount: 999.99,
            interval_tolerance: 0.2,
            regular_share: 0.7,
            inactive_after_days: 90,
            inactive_max_occurrences: 3,
            savings_tip_threshold: 50.0,
            savings_rate: 0.10,
            fetch_limit: 500,
            fetch_timeout_secs: 30,
        }
    }
}

impl DetectionConfig {
    /// Load configuration (override first, then embedded default)
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        match resolve_config_path(override_path) {
            Some(path) => {
                debug!("Loading detection config from {}", path.display());
                let content = fs::read_to_string(&path)
                    .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;
                parse_config(&content)
            }
            None => {
                if let Some(path) = override_path {
                    warn!(
                        "Config file {} not found, using built-in defaults",
                        path.display()
                    );
                }
                parse_config(DEFAULT_CONFIG)
            }
        }
    }

    /// Check that thresholds are usable
    pub fn validate(&self) -> Result<()> {
        if self.min_amount < 0.0 || self.max_amount < self.min_amount {
            return Err(Error::Config(format!(
                "Invalid amount band: {:.2}..{:.2}",
                self.min_amount, self.max_amount
            )));
        }
        if !(0.0..=1.0).contains(&self.regular_share) {
            return Err(Error::Config(format!(
                "regular_share must be between 0 and 1, got {}",
                self.regular_share
            )));
        }
        if self.interval_tolerance < 0.0 {
            return Err(Error::Config(format!(
                "interval_tolerance must not be negative, got {}",
                self.interval_tolerance
            )));
        }
        if self.timeframe_months == 0 {
            return Err(Error::Config("timeframe_months must be at least 1".into()));
        }
        Ok(())
    }
}

/// Get the default override path (~/.local/share/subscout/config/detection.toml)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("subscout").join("config").join("detection.toml"))
}

/// Path of the override file that would be used, if one exists
pub fn resolve_config_path(override_path: Option<&Path>) -> Option<PathBuf> {
    match override_path {
        Some(path) => path.exists().then(|| path.to_path_buf()),
        None => default_config_path().filter(|p| p.exists()),
    }
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    defaults: Option<RawDefaults>,
    regularity: Option<RawRegularity>,
    warnings: Option<RawWarnings>,
    fetch: Option<RawFetch>,
}

#[derive(Debug, Deserialize)]
struct RawDefaults {
    timeframe_months: Option<u32>,
    min_amount: Option<f64>,
    max_amount: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawRegularity {
    interval_tolerance: Option<f64>,
    regular_share: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawWarnings {
    inactive_after_days: Option<i64>,
    inactive_max_occurrences: Option<usize>,
    savings_tip_threshold: Option<f64>,
    savings_rate: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawFetch {
    limit: Option<usize>,
    timeout_secs: Option<u64>,
}

/// Parse config from TOML content
pub fn parse_config(content: &str) -> Result<DetectionConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = DetectionConfig::default();

    if let Some(d) = raw.defaults {
        if let Some(v) = d.timeframe_months {
            config.timeframe_months = v;
        }
        if let Some(v) = d.min_amount {
            config.min_amount = v;
        }
        if let Some(v) = d.max_amount {
            config.max_amount = v;
        }
    }

    if let Some(r) = raw.regularity {
        if let Some(v) = r.interval_tolerance {
            config.interval_tolerance = v;
        }
        if let Some(v) = r.regular_share {
            config.regular_share = v;
        }
    }

    if let Some(w) = raw.warnings {
        if let Some(v) = w.inactive_after_days {
            config.inactive_after_days = v;
        }
        if let Some(v) = w.inactive_max_occurrences {
            config.inactive_max_occurrences = v;
        }
        if let Some(v) = w.savings_tip_threshold {
            config.savings_tip_threshold = v;
        }
        if let Some(v) = w.savings_rate {
            config.savings_rate = v;
        }
    }

    if let Some(f) = raw.fetch {
        if let Some(v) = f.limit {
            config.fetch_limit = v;
        }
        if let Some(v) = f.timeout_secs {
            config.fetch_timeout_secs = v;
        }
    }

    config.validate()?;
    Ok(config)
}
