//! Server configuration, read from the environment once at startup.

use chrono::Duration;
use std::env;
use thiserror::Error;

/// A configuration variable is missing or unparseable.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    /// A variable is set but cannot be parsed.
    #[error("invalid value for {name}: {value}")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// The offending value.
        value: String,
    },
}

/// Everything the server needs to boot.
///
/// Built once in `main` and passed down explicitly; nothing else reads the
/// environment after startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// HMAC secret for signing access tokens.
    pub jwt_secret: String,
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Access token lifetime.
    pub token_ttl: Duration,
    /// Connection pool size.
    pub database_max_connections: u32,
}

impl Config {
    /// Read configuration from the environment.
    ///
    /// `DATABASE_URL`, `JWT_SECRET` and `PORT` are required; the server
    /// refuses to boot without them rather than limping along with
    /// defaults. `HOST` defaults to `0.0.0.0`, `TOKEN_TTL_SECS` to 3600
    /// and `DATABASE_MAX_CONNECTIONS` to 10.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a required variable is absent or a value
    /// does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            database_url: require("DATABASE_URL")?,
            jwt_secret: require("JWT_SECRET")?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse(require("PORT")?, "PORT")?,
            token_ttl: Duration::seconds(parse(
                env::var("TOKEN_TTL_SECS").unwrap_or_else(|_| "3600".to_string()),
                "TOKEN_TTL_SECS",
            )?),
            database_max_connections: parse(
                env::var("DATABASE_MAX_CONNECTIONS").unwrap_or_else(|_| "10".to_string()),
                "DATABASE_MAX_CONNECTIONS",
            )?,
        })
    }

    /// The socket address string to bind.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::Missing(name))
}

fn parse<T: std::str::FromStr>(value: String, name: &'static str) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::Invalid { name, value })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parse_rejects_garbage() {
        let err = parse::<u16>("not-a-port".to_string(), "PORT").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "PORT", .. }));
    }

    #[test]
    fn bind_addr_joins_host_and_port() {
        let config = Config {
            database_url: "postgres://localhost/gatherly".to_string(),
            jwt_secret: "secret".to_string(),
            host: "127.0.0.1".to_string(),
            port: 5000,
            token_ttl: Duration::hours(1),
            database_max_connections: 10,
        };
        assert_eq!(config.bind_addr(), "127.0.0.1:5000");
    }
}
