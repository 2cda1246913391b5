//! Server configuration parsed from environment variables.

use std::time::Duration;

use crate::events::bus::DEFAULT_CAPACITY;
use crate::events::stream::DEFAULT_HEARTBEAT;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("invalid {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub stream_heartbeat: Duration,
    pub stream_buffer: usize,
    pub cors_allow_any: bool,
}

impl Config {
    /// Build typed config from the process environment.
    ///
    /// Required:
    /// - `DATABASE_URL`
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `DB_MAX_CONNECTIONS`: default 5
    /// - `STREAM_HEARTBEAT_SECS`: default 25
    /// - `STREAM_BUFFER`: per-subscriber event buffer, default 16
    /// - `CORS_ALLOW_ANY`: default true
    ///
    /// # Errors
    ///
    /// Returns an error if `DATABASE_URL` is missing or any value fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// See [`Config::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let port = parse_or("PORT", lookup("PORT"), DEFAULT_PORT)?;
        let db_max_connections = nonzero(
            "DB_MAX_CONNECTIONS",
            parse_or("DB_MAX_CONNECTIONS", lookup("DB_MAX_CONNECTIONS"), DEFAULT_DB_MAX_CONNECTIONS)?,
        )?;
        let heartbeat_secs = nonzero(
            "STREAM_HEARTBEAT_SECS",
            parse_or("STREAM_HEARTBEAT_SECS", lookup("STREAM_HEARTBEAT_SECS"), DEFAULT_HEARTBEAT.as_secs())?,
        )?;
        let stream_buffer = nonzero("STREAM_BUFFER", parse_or("STREAM_BUFFER", lookup("STREAM_BUFFER"), DEFAULT_CAPACITY)?)?;
        let cors_allow_any = parse_bool("CORS_ALLOW_ANY", lookup("CORS_ALLOW_ANY"), true)?;

        Ok(Self {
            database_url,
            port,
            db_max_connections,
            stream_heartbeat: Duration::from_secs(heartbeat_secs),
            stream_buffer,
            cors_allow_any,
        })
    }
}

fn parse_or<T: std::str::FromStr>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(default),
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid { key, value: value.to_owned() }),
    }
}

fn nonzero<T: Default + PartialEq>(key: &'static str, value: T) -> Result<T, ConfigError> {
    if value == T::default() {
        return Err(ConfigError::Zero(key));
    }
    Ok(value)
}

fn parse_bool(key: &'static str, raw: Option<String>, default: bool) -> Result<bool, ConfigError> {
    match raw.as_deref().map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) if v.is_empty() => Ok(default),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::Invalid { key, value: v }),
        },
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
