//! Configuration module.
//!
//! Handles loading, validating, and merging `pixel-prime.toml`. Stock
//! defaults are the base layer; a user file only needs the keys it wants to
//! change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [search]
//! rounds = 25            # Miller-Rabin rounds for large candidates (1-64)
//! sieve_limit = 65536    # Sieve out candidates with a prime factor below this
//! window = 1024          # Odd candidates sieved per window
//! # max_distance = 1000000  # Give up this far above the starting value
//! # timeout_secs = 600      # Give up after this many seconds
//!
//! [render]
//! font_family = "Square"
//! font_url = "./square.woff"
//! font_size = "9px"
//!
//! [processing]
//! max_processes = 4      # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILENAME: &str = "pixel-prime.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Top-level configuration loaded from `pixel-prime.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrimeConfig {
    /// Prime search tuning.
    pub search: SearchConfig,
    /// HTML output styling.
    pub render: RenderConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl PrimeConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=64).contains(&self.search.rounds) {
            return Err(ConfigError::Validation(
                "search.rounds must be 1-64".into(),
            ));
        }
        if !(3..=MAX_SIEVE_LIMIT).contains(&self.search.sieve_limit) {
            return Err(ConfigError::Validation(format!(
                "search.sieve_limit must be 3-{MAX_SIEVE_LIMIT}"
            )));
        }
        if self.search.window < 16 {
            return Err(ConfigError::Validation(
                "search.window must be at least 16".into(),
            ));
        }
        if self.search.timeout_secs == Some(0) {
            return Err(ConfigError::Validation(
                "search.timeout_secs must be positive when set".into(),
            ));
        }
        for (key, value) in [
            ("render.font_family", &self.render.font_family),
            ("render.font_url", &self.render.font_url),
            ("render.font_size", &self.render.font_size),
        ] {
            if value.contains(['\'', '"', '<', '>', ';', '{', '}']) {
                return Err(ConfigError::Validation(format!(
                    "{key} must not contain quotes, angle brackets, braces or semicolons"
                )));
            }
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be positive when set".into(),
            ));
        }
        Ok(())
    }
}

/// Upper bound on `search.sieve_limit`; residues are stored as `u32`.
pub const MAX_SIEVE_LIMIT: u32 = 1 << 24;

/// Prime search tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    /// Miller–Rabin rounds for candidates above the deterministic bound.
    pub rounds: u32,
    /// Candidates with a prime factor below this are discarded by sieving.
    pub sieve_limit: u32,
    /// Odd candidates per sieve window.
    pub window: usize,
    /// Give up (`SearchExhausted`) once this far above the starting value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_distance: Option<u64>,
    /// Give up once the search has run this many seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            rounds: 25,
            sieve_limit: 65_536,
            window: 1024,
            max_distance: None,
            timeout_secs: None,
        }
    }
}

/// HTML output styling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// CSS font family name used for the digits.
    pub font_family: String,
    /// URL of the font file, relative to the generated page.
    pub font_url: String,
    /// CSS font size of the digits.
    pub font_size: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            font_family: "Square".to_string(),
            font_url: "./square.woff".to_string(),
            font_size: "9px".to_string(),
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel primality-testing workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(PrimeConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto the stock defaults, then deserialize and
/// validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<PrimeConfig, ConfigError> {
    let base = stock_defaults_value();
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: PrimeConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, falling back to stock defaults when the file is
/// absent.
pub fn load_config(path: &Path) -> Result<PrimeConfig, ConfigError> {
    resolve_config(load_raw_config(path)?)
}

/// Returns a fully-commented stock `pixel-prime.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# pixel-prime configuration
# =========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Prime search
# ---------------------------------------------------------------------------
[search]
# Miller-Rabin rounds for candidates above 3.3e24 (below that the test is
# exact). Each round lets a composite through with probability <= 1/4.
rounds = 25

# Candidates with a prime factor below this bound are discarded by a sieve
# before any Miller-Rabin round runs.
sieve_limit = 65536

# Odd candidates sieved (and tested in parallel) per step.
window = 1024

# Stop with an error if no prime is found this far above the starting value.
# max_distance = 1000000

# Stop with an error after this many seconds.
# timeout_secs = 600

# ---------------------------------------------------------------------------
# HTML output
# ---------------------------------------------------------------------------
[render]
font_family = "Square"

# Font file referenced by the page, relative to the HTML file.
font_url = "./square.woff"

font_size = "9px"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel primality-testing workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
