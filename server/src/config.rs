//! Configuration management for the server.
//!
//! Loads configuration from environment variables with sensible defaults.
//! A variable that is set but unparseable is an error, not a silent default.

use listkeeper_runtime::SequencerConfig;
use std::fmt::Display;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Listen address variable
pub const ADDR_VAR: &str = "LISTKEEPER_ADDR";
/// Data file variable
pub const DATA_FILE_VAR: &str = "LISTKEEPER_DATA_FILE";
/// Command channel capacity variable
pub const CHANNEL_CAPACITY_VAR: &str = "LISTKEEPER_CHANNEL_CAPACITY";
/// Per-request deadline variable, in milliseconds
pub const REQUEST_TIMEOUT_VAR: &str = "LISTKEEPER_REQUEST_TIMEOUT_MS";
/// Final save deadline variable, in seconds
pub const SHUTDOWN_TIMEOUT_VAR: &str = "LISTKEEPER_SHUTDOWN_TIMEOUT_SECS";
/// Metrics toggle variable
pub const METRICS_VAR: &str = "LISTKEEPER_METRICS";

/// A configuration variable had an unusable value
#[derive(Debug, Error)]
#[error("invalid value {value:?} for {var}: {reason}")]
pub struct ConfigError {
    /// Variable name
    pub var: &'static str,
    /// Raw value
    pub value: String,
    /// Why it was rejected
    pub reason: String,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (default `0.0.0.0:8080`)
    pub addr: SocketAddr,
    /// JSON file holding the list (default `todos.json`)
    pub data_file: PathBuf,
    /// Channel capacity and request deadline for the sequencer
    pub sequencer: SequencerConfig,
    /// How long to wait for the final save (default 5s)
    pub shutdown_timeout: Duration,
    /// Whether to install the Prometheus recorder (default true)
    pub metrics_enabled: bool,
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] naming the first variable with a bad value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] naming the first variable with a bad value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = SequencerConfig::default();

        let addr =
            parse(&lookup, ADDR_VAR)?.unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 8080)));
        let data_file = lookup(DATA_FILE_VAR)
            .filter(|path| !path.trim().is_empty())
            .map_or_else(|| PathBuf::from("todos.json"), PathBuf::from);

        let channel_capacity =
            positive(&lookup, CHANNEL_CAPACITY_VAR)?.unwrap_or(defaults.channel_capacity);
        let request_timeout = positive(&lookup, REQUEST_TIMEOUT_VAR)?.map(Duration::from_millis);
        let shutdown_timeout = positive(&lookup, SHUTDOWN_TIMEOUT_VAR)?.unwrap_or(5);
        let metrics_enabled = flag(&lookup, METRICS_VAR)?.unwrap_or(true);

        Ok(Self {
            addr,
            data_file,
            sequencer: SequencerConfig::new(channel_capacity, request_timeout),
            shutdown_timeout: Duration::from_secs(shutdown_timeout),
            metrics_enabled,
        })
    }
}

fn parse<T>(
    lookup: impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    let Some(value) = lookup(var) else {
        return Ok(None);
    };
    value.trim().parse().map(Some).map_err(|err: T::Err| ConfigError {
        var,
        reason: err.to_string(),
        value,
    })
}

fn positive<T>(
    lookup: impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr + Default + PartialEq + ToString,
    T::Err: Display,
{
    match parse::<T>(lookup, var)? {
        Some(value) if value == T::default() => Err(ConfigError {
            var,
            value: value.to_string(),
            reason: "must be greater than zero".to_string(),
        }),
        other => Ok(other),
    }
}

fn flag(
    lookup: impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<bool>, ConfigError> {
    let Some(value) = lookup(var) else {
        return Ok(None);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" => Ok(Some(false)),
        _ => Err(ConfigError {
            var,
            value,
            reason: "expected true or false".to_string(),
        }),
    }
}
