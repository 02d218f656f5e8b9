//! Server configuration parsed from environment variables.

use crate::record::Roster;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_MAX_LIST_LIMIT: usize = 500;
pub const DEFAULT_REVIEWERS: &str = "Reviewer 1,Reviewer 2,Reviewer 3";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid PORT: {0}")]
    InvalidPort(String),
    #[error("FEEDBACK_REVIEWERS names no reviewers")]
    EmptyRoster,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    /// `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub roster: Roster,
    pub max_list_limit: usize,
}

impl ServerConfig {
    /// Build typed server config from environment variables.
    ///
    /// All optional:
    /// - `PORT`: default 3000
    /// - `DATABASE_URL`: Postgres URL; in-memory store when absent or blank
    /// - `DB_MAX_CONNECTIONS`: default 5
    /// - `FEEDBACK_REVIEWERS`: comma-separated reviewer names
    /// - `FEEDBACK_MAX_LIST_LIMIT`: default 500
    ///
    /// # Errors
    ///
    /// Returns an error for an unparsable `PORT` or an empty roster.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match std::env::var("PORT") {
            Ok(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::InvalidPort(raw))?,
            Err(_) => DEFAULT_PORT,
        };

        let database_url = match std::env::var("DATABASE_URL") {
            Ok(url) if !url.trim().is_empty() => Some(url),
            _ => None,
        };

        let roster = match std::env::var("FEEDBACK_REVIEWERS") {
            Ok(raw) => Roster::parse(&raw),
            Err(_) => Roster::parse(DEFAULT_REVIEWERS),
        };
        if roster.is_empty() {
            return Err(ConfigError::EmptyRoster);
        }

        Ok(Self {
            port,
            database_url,
            db_max_connections: env_parse("DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS),
            roster,
            max_list_limit: env_parse("FEEDBACK_MAX_LIST_LIMIT", DEFAULT_MAX_LIST_LIMIT),
        })
    }
}

/// Parse an env var, falling back to `default` when unset or unparsable.
pub fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
