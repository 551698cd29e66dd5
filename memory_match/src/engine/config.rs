//! Engine configuration.

use serde::{Deserialize, Serialize};
use std::{env, str::FromStr, time::Duration};
use thiserror::Error;

use crate::game::{
    GameRules,
    constants::{
        DEFAULT_BEST_RESULTS_KEY, DEFAULT_CATALOG_RETRIES, DEFAULT_CATALOG_RETRY_DELAY_MS,
        DEFAULT_MATCH_DELAY_MS, DEFAULT_MAX_DECK_SIZE, DEFAULT_MIN_DECK_SIZE,
        DEFAULT_SESSION_KEY,
    },
};

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} has invalid value {value:?}: {reason}")]
    InvalidVar {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Smallest allowed deck (default: 4)
    pub min_deck_size: usize,

    /// Largest allowed deck (default: 20)
    pub max_deck_size: usize,

    /// Delay before a revealed pair is settled, in milliseconds (default: 500)
    pub match_delay_ms: u64,

    /// Persist the session after every change (default: true)
    pub autosave: bool,

    /// Storage key of the in-progress session
    pub session_key: String,

    /// Storage key of the best results
    pub best_results_key: String,

    /// Catalog retries after the first failed fetch (default: 3)
    pub catalog_retries: u32,

    /// Delay before the first catalog retry, in milliseconds (default: 1000)
    pub catalog_retry_delay_ms: u64,

    /// Fixed RNG seed for reproducible decks
    pub rng_seed: Option<u64>,

    /// Capacity of each subscriber's event channel (default: 64)
    pub event_buffer: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_deck_size: DEFAULT_MIN_DECK_SIZE,
            max_deck_size: DEFAULT_MAX_DECK_SIZE,
            match_delay_ms: DEFAULT_MATCH_DELAY_MS,
            autosave: true,
            session_key: DEFAULT_SESSION_KEY.to_string(),
            best_results_key: DEFAULT_BEST_RESULTS_KEY.to_string(),
            catalog_retries: DEFAULT_CATALOG_RETRIES,
            catalog_retry_delay_ms: DEFAULT_CATALOG_RETRY_DELAY_MS,
            rng_seed: None,
            event_buffer: 64,
        }
    }
}

impl EngineConfig {
    /// Create configuration from environment variables
    ///
    /// Unset variables keep their default:
    /// - `MM_MIN_DECK_SIZE`, `MM_MAX_DECK_SIZE`: deck size range
    /// - `MM_MATCH_DELAY_MS`: pair resolution delay
    /// - `MM_AUTOSAVE`: `true`/`false`
    /// - `MM_SESSION_KEY`, `MM_BEST_RESULTS_KEY`: storage keys
    /// - `MM_CATALOG_RETRIES`: catalog retry count
    /// - `MM_RNG_SEED`: fixed shuffle seed
    ///
    /// # Errors
    ///
    /// `ConfigError` if a variable does not parse or the result fails
    /// [`EngineConfig::validate`].
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            min_deck_size: parse_var("MM_MIN_DECK_SIZE")?.unwrap_or(defaults.min_deck_size),
            max_deck_size: parse_var("MM_MAX_DECK_SIZE")?.unwrap_or(defaults.max_deck_size),
            match_delay_ms: parse_var("MM_MATCH_DELAY_MS")?.unwrap_or(defaults.match_delay_ms),
            autosave: parse_var("MM_AUTOSAVE")?.unwrap_or(defaults.autosave),
            session_key: env::var("MM_SESSION_KEY").unwrap_or(defaults.session_key),
            best_results_key: env::var("MM_BEST_RESULTS_KEY")
                .unwrap_or(defaults.best_results_key),
            catalog_retries: parse_var("MM_CATALOG_RETRIES")?
                .unwrap_or(defaults.catalog_retries),
            catalog_retry_delay_ms: defaults.catalog_retry_delay_ms,
            rng_seed: parse_var("MM_RNG_SEED")?,
            event_buffer: defaults.event_buffer,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_deck_size < 2 || self.min_deck_size % 2 != 0 {
            return Err(ConfigError::Invalid(format!(
                "min_deck_size must be an even number of at least 2, got {}",
                self.min_deck_size
            )));
        }
        if self.max_deck_size < self.min_deck_size {
            return Err(ConfigError::Invalid(format!(
                "max_deck_size {} is below min_deck_size {}",
                self.max_deck_size, self.min_deck_size
            )));
        }
        if self.session_key.is_empty() || self.best_results_key.is_empty() {
            return Err(ConfigError::Invalid(
                "storage keys must not be empty".to_string(),
            ));
        }
        if self.session_key == self.best_results_key {
            return Err(ConfigError::Invalid(
                "session_key and best_results_key must differ".to_string(),
            ));
        }
        if self.event_buffer == 0 {
            return Err(ConfigError::Invalid(
                "event_buffer must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn rules(&self) -> GameRules {
        GameRules {
            min_deck_size: self.min_deck_size,
            max_deck_size: self.max_deck_size,
            match_delay: Duration::from_millis(self.match_delay_ms),
        }
    }

    pub fn catalog_retry_delay(&self) -> Duration {
        Duration::from_millis(self.catalog_retry_delay_ms)
    }
}

fn parse_var<T>(var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::InvalidVar {
                var,
                reason: e.to_string(),
                value,
            }),
        Err(_) => Ok(None),
    }
}
