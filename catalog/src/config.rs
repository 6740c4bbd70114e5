//! Server configuration from environment variables.
//!
//! | Variable | Default |
//! |---|---|
//! | `DATABASE_URL` | `sqlite://catalog.db?mode=rwc` |
//! | `CATALOG_HOST` | `0.0.0.0` |
//! | `CATALOG_PORT` | `3000` |
//! | `CATALOG_ADMIN_TOKEN` | unset: every mutation is rejected |
//! | `CATALOG_CORS_ORIGIN` | unset: any origin |

use std::{env, fmt::Display, net::IpAddr, net::SocketAddr, str::FromStr};

use axum::http::HeaderValue;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://catalog.db?mode=rwc";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid {key} value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub host: IpAddr,
    pub port: u16,
    pub admin_token: Option<String>,
    pub cors_origin: Option<String>,
}

impl Config {
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] when a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] when a value is present but cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            database_url: try_load(&lookup, "DATABASE_URL", DEFAULT_DATABASE_URL)?,
            host: try_load(&lookup, "CATALOG_HOST", "0.0.0.0")?,
            port: try_load(&lookup, "CATALOG_PORT", "3000")?,
            admin_token: optional(&lookup, "CATALOG_ADMIN_TOKEN"),
            cors_origin: optional(&lookup, "CATALOG_CORS_ORIGIN"),
        })
    }

    #[must_use]
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// CORS restricted to the configured origin, or open to any origin.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] when the origin is not a valid header value.
    pub fn cors_layer(&self) -> Result<CorsLayer, ConfigError> {
        let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
        match &self.cors_origin {
            Some(origin) => {
                let origin = origin
                    .parse::<HeaderValue>()
                    .map_err(|e| ConfigError::Invalid {
                        key: "CATALOG_CORS_ORIGIN",
                        value: origin.clone(),
                        reason: e.to_string(),
                    })?;
                Ok(layer.allow_origin(origin))
            }
            None => Ok(layer.allow_origin(Any)),
        }
    }
}

fn optional(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    let value = lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    if value.is_none() {
        info!("{key} not set");
    }
    value
}

fn try_load<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: &str,
) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let value = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    match value.trim().parse::<T>() {
        Ok(parsed) => Ok(parsed),
        Err(e) => {
            warn!("Invalid {key} value: {e}");
            Err(ConfigError::Invalid {
                key,
                reason: e.to_string(),
                value,
            })
        }
    }
}
