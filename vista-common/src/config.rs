//! Configuration management for the Vista core.
//!
//! Configuration lives in a single JSON file at `~/.vista/config.json`.
//!
//! # Configuration Priority
//!
//! 1. Environment variables (VISTA_* prefix)
//! 2. Explicit config file values
//! 3. Default values
//!
//! # Environment Variable Mapping
//!
//! - `VISTA_LOG_LEVEL` → observability.log_level
//! - `VISTA_LOG_FORMAT` → observability.log_format
//! - `VISTA_PAGE_SIZE` → screening.page_size
//! - `VISTA_DEBOUNCE_MS` → screening.debounce_ms
//! - `VISTA_FORECAST_PERIOD` → valuation.forecast_period

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Get the configuration directory path.
pub fn config_dir() -> PathBuf {
    directories::UserDirs::new()
        .map_or_else(|| PathBuf::from(".vista"), |dirs| dirs.home_dir().join(".vista"))
}

/// Get the configuration file path.
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration shared by every Vista crate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Logging configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Screening filter compiler settings
    #[serde(default)]
    pub screening: ScreeningConfig,

    /// Peer-multiple valuation settings
    #[serde(default)]
    pub valuation: ValuationConfig,
}

impl Config {
    /// Load configuration from the default path.
    pub fn load() -> Result<Self> {
        let path = config_path();
        if !path.exists() {
            tracing::info!("Config file not found, using defaults");
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Load configuration with environment variable overrides.
    pub fn load_with_env() -> Result<Self> {
        let mut config = Self::load()?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup.
    ///
    /// Unparseable numeric values are ignored and the existing value is kept.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup("VISTA_LOG_LEVEL") {
            self.observability.log_level = level;
        }
        if let Some(format) = lookup("VISTA_LOG_FORMAT") {
            self.observability.log_format = format;
        }

        if let Some(size) = lookup("VISTA_PAGE_SIZE") {
            match size.parse() {
                Ok(s) => self.screening.page_size = s,
                Err(_) => tracing::warn!(value = %size, "Ignoring invalid VISTA_PAGE_SIZE"),
            }
        }
        if let Some(ms) = lookup("VISTA_DEBOUNCE_MS") {
            match ms.parse() {
                Ok(m) => self.screening.debounce_ms = m,
                Err(_) => tracing::warn!(value = %ms, "Ignoring invalid VISTA_DEBOUNCE_MS"),
            }
        }

        if let Some(period) = lookup("VISTA_FORECAST_PERIOD") {
            self.valuation.forecast_period = period;
        }
    }
}

// ============================================================================
// Observability Configuration
// ============================================================================

/// Observability configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level", alias = "level")]
    pub log_level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format", alias = "format")]
    pub log_format: String,

    /// Additional module targets forced to `warn`.
    #[serde(default)]
    pub excluded_targets: Vec<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
            excluded_targets: Vec::new(),
        }
    }
}

// ============================================================================
// Screening Configuration
// ============================================================================

/// Settings for the screening filter-body compiler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningConfig {
    /// Rows requested per page when the payload is first delivered
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Quiet period before a compiled payload is delivered (milliseconds)
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl ScreeningConfig {
    /// Debounce quiet period as a `Duration`.
    pub fn quiet_period(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for ScreeningConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

// ============================================================================
// Valuation Configuration
// ============================================================================

/// Settings for the peer-multiple valuation engine and its data loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationConfig {
    /// Forecast period key used to pick peer multiples (e.g. "2025F")
    #[serde(default = "default_forecast_period")]
    pub forecast_period: String,

    /// Number of leading peers selected after a symbol change
    #[serde(default = "default_initial_selection")]
    pub initial_selection: usize,

    /// Scale applied to EBITDA so it matches the unit of debt and cash
    #[serde(default = "default_ebitda_unit")]
    pub ebitda_unit: f64,

    /// Label of the aggregate row returned by the peer comparison provider
    #[serde(default = "default_aggregate_row_label")]
    pub aggregate_row_label: String,
}

impl Default for ValuationConfig {
    fn default() -> Self {
        Self {
            forecast_period: default_forecast_period(),
            initial_selection: default_initial_selection(),
            ebitda_unit: default_ebitda_unit(),
            aggregate_row_label: default_aggregate_row_label(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "pretty".into()
}
fn default_page_size() -> u32 {
    20
}
fn default_debounce_ms() -> u64 {
    400
}
fn default_forecast_period() -> String {
    "2025F".into()
}
fn default_initial_selection() -> usize {
    3
}
fn default_ebitda_unit() -> f64 {
    1_000_000.0 // EBITDA arrives in millions
}
fn default_aggregate_row_label() -> String {
    "Median".into()
}
