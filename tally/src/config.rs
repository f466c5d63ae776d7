//! Startup configuration
//!
//! Read from `TALLY_*` environment variables by the stdio driver. A value
//! that does not parse is logged and replaced by its default.

use crate::parser::parse_rate_pair;
use tally_calc::{AngleMode, Radix, WordSize};
use thiserror::Error;
use tracing::warn;

pub const ENV_MODE: &str = "TALLY_MODE";
pub const ENV_WORD_SIZE: &str = "TALLY_WORD_SIZE";
pub const ENV_RADIX: &str = "TALLY_RADIX";
pub const ENV_ANGLE: &str = "TALLY_ANGLE";
pub const ENV_RATES: &str = "TALLY_RATES";

pub const DEFAULT_MODE: &str = "standard";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{var}: invalid value '{value}'")]
    InvalidValue { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TallyConfig {
    /// Mode shown at startup
    pub mode: String,
    pub word_size: WordSize,
    pub radix: Radix,
    pub angle: AngleMode,
    /// Currency rate overrides applied at startup
    pub rates: Vec<(String, f64)>,
}

impl Default for TallyConfig {
    fn default() -> Self {
        TallyConfig {
            mode: DEFAULT_MODE.to_string(),
            word_size: WordSize::default(),
            radix: Radix::default(),
            angle: AngleMode::default(),
            rates: Vec::new(),
        }
    }
}

impl TallyConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from any variable lookup; unset variables keep their defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = TallyConfig::default();

        if let Some(mode) = lookup(ENV_MODE).filter(|m| !m.trim().is_empty()) {
            config.mode = mode.trim().to_string();
        }
        if let Some(value) = lookup(ENV_WORD_SIZE) {
            match WordSize::parse(&value) {
                Ok(word) => config.word_size = word,
                Err(_) => report(ConfigError::InvalidValue { var: ENV_WORD_SIZE, value }),
            }
        }
        if let Some(value) = lookup(ENV_RADIX) {
            match Radix::parse(&value) {
                Ok(radix) => config.radix = radix,
                Err(_) => report(ConfigError::InvalidValue { var: ENV_RADIX, value }),
            }
        }
        if let Some(value) = lookup(ENV_ANGLE) {
            match AngleMode::parse(&value) {
                Some(angle) => config.angle = angle,
                None => report(ConfigError::InvalidValue { var: ENV_ANGLE, value }),
            }
        }
        if let Some(value) = lookup(ENV_RATES) {
            config.rates = parse_rates(&value);
        }

        config
    }
}

/// `USD=0.14,EUR=0.13`; bad pairs are skipped
fn parse_rates(value: &str) -> Vec<(String, f64)> {
    value
        .split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| match parse_rate_pair(pair) {
            Ok(rate) => Some(rate),
            Err(_) => {
                report(ConfigError::InvalidValue { var: ENV_RATES, value: pair.to_string() });
                None
            }
        })
        .collect()
}

fn report(err: ConfigError) {
    warn!(error = %err, "ignoring configuration value, using default");
}
