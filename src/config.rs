//! Runtime configuration
//!
//! Loaded from the environment (and `.env` via dotenv in the binaries).

use crate::error::FinanceError;
use crate::pipeline::builder::{DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_CURRENCY};
use crate::time::{SystemClock, DEFAULT_TIMEZONE};
use crate::Result;
use std::env;

pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, PartialEq)]
pub struct FinanceConfig {
    /// Classifier confidence below which a category must be confirmed
    pub confidence_threshold: f64,
    /// IANA zone used to stamp `ts_iso`
    pub timezone: String,
    pub currency: String,
    pub port: u16,
}

impl Default for FinanceConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            timezone: DEFAULT_TIMEZONE.to_string(),
            currency: DEFAULT_CURRENCY.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl FinanceConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup("LIFEOS_CONFIDENCE_THRESHOLD") {
            config.confidence_threshold = parse_threshold(&raw)?;
        }

        if let Some(tz) = lookup("LIFEOS_TIMEZONE") {
            SystemClock::from_name(tz.trim())?;
            config.timezone = tz.trim().to_string();
        }

        if let Some(currency) = lookup("LIFEOS_CURRENCY") {
            let currency = currency.trim().to_uppercase();
            if currency.is_empty() {
                return Err(FinanceError::InvalidConfig("LIFEOS_CURRENCY is empty".to_string()));
            }
            config.currency = currency;
        }

        if let Some(port) = lookup("PORT").or_else(|| lookup("API_PORT")) {
            config.port = port.trim().parse().map_err(|_| {
                FinanceError::InvalidConfig(format!("PORT must be a port number, got '{}'", port))
            })?;
        }

        Ok(config)
    }

    pub fn clock(&self) -> Result<SystemClock> {
        SystemClock::from_name(&self.timezone)
    }
}

fn parse_threshold(raw: &str) -> Result<f64> {
    let value: f64 = raw.trim().parse().map_err(|_| {
        FinanceError::InvalidConfig(format!(
            "LIFEOS_CONFIDENCE_THRESHOLD must be a number, got '{}'",
            raw
        ))
    })?;

    if !(0.0..=1.0).contains(&value) {
        return Err(FinanceError::InvalidConfig(format!(
            "LIFEOS_CONFIDENCE_THRESHOLD must be within [0, 1], got {}",
            value
        )));
    }

    Ok(value)
}
