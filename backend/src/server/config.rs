//! Layered settings (environment, config file) and the resolved server
//! configuration built from them.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;
use vitalwatch::outbound::persistence::DbPool;
use zeroize::Zeroizing;

const DEFAULT_ML_HOST: &str = "127.0.0.1";
const DEFAULT_ML_PORT: u16 = 8000;
const DEFAULT_WARN_COOLDOWN_MS: u64 = 60_000;
const DEFAULT_PROBE_TIMEOUT_MS: u64 = 500;
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_TOKEN_TTL_HOURS: i64 = 24 * 7;
const MAX_TOKEN_TTL_HOURS: i64 = 24 * 366 * 10;
const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:5173,http://localhost:3000";
const DEVELOPMENT_TOKEN_SECRET: &str = "vitalwatch-development-secret";

/// ML service location and fallback behaviour (`ML_*`).
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ML")]
pub struct MlSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
    /// `false` turns predictor outages into 502 responses.
    #[ortho_config(default = true)]
    pub allow_fallback: bool,
    /// Minimum gap between repeated reachability warnings.
    pub warn_cooldown_ms: Option<u64>,
    pub probe_timeout_ms: Option<u64>,
    pub request_timeout_ms: Option<u64>,
}

impl MlSettings {
    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_ML_HOST)
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_ML_PORT)
    }

    pub fn warn_cooldown(&self) -> Duration {
        Duration::from_millis(self.warn_cooldown_ms.unwrap_or(DEFAULT_WARN_COOLDOWN_MS))
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms.unwrap_or(DEFAULT_PROBE_TIMEOUT_MS))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(
            self.request_timeout_ms
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS),
        )
    }

    /// Base URL the predictor routes are joined onto.
    pub fn base_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&format!("http://{}:{}/", self.host(), self.port()))
    }
}

/// HTTP binding, persistence, and token settings (`APP_*`).
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "APP")]
pub struct AppSettings {
    pub bind_addr: Option<String>,
    /// Postgres URL; in-memory adapters are used when absent.
    pub database_url: Option<String>,
    pub token_secret: Option<String>,
    pub token_ttl_hours: Option<i64>,
    /// Comma-separated WebSocket Origin allow-list.
    pub allowed_origins: Option<String>,
}

/// Reasons settings cannot be turned into a [`ServerConfig`].
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address {value}: {source}")]
    BindAddr {
        value: String,
        source: std::net::AddrParseError,
    },
    #[error("invalid allowed origin {value}: {source}")]
    Origin {
        value: String,
        source: url::ParseError,
    },
    #[error("APP_TOKEN_SECRET must be set in release builds")]
    MissingTokenSecret,
    #[error("APP_TOKEN_TTL_HOURS must be between 1 and 87840, got {0}")]
    TokenTtl(i64),
}

impl AppSettings {
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.trim().parse().map_err(|source| SettingsError::BindAddr {
            value: value.to_owned(),
            source,
        })
    }

    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn allowed_origins(&self) -> Result<Vec<Url>, SettingsError> {
        self.allowed_origins
            .as_deref()
            .unwrap_or(DEFAULT_ALLOWED_ORIGINS)
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(|origin| {
                Url::parse(origin).map_err(|source| SettingsError::Origin {
                    value: origin.to_owned(),
                    source,
                })
            })
            .collect()
    }

    /// Token lifetime in seconds. Hours outside `1..=MAX_TOKEN_TTL_HOURS`
    /// are rejected so expiry arithmetic cannot overflow.
    pub fn token_ttl_seconds(&self) -> Result<i64, SettingsError> {
        let hours = self.token_ttl_hours.unwrap_or(DEFAULT_TOKEN_TTL_HOURS);
        if !(1..=MAX_TOKEN_TTL_HOURS).contains(&hours) {
            return Err(SettingsError::TokenTtl(hours));
        }
        hours.checked_mul(3600).ok_or(SettingsError::TokenTtl(hours))
    }

    /// Configured secret, or the development secret when `allow_dev` holds.
    pub fn token_secret(&self, allow_dev: bool) -> Result<Zeroizing<String>, SettingsError> {
        match self.token_secret.as_deref().filter(|s| !s.is_empty()) {
            Some(secret) => Ok(Zeroizing::new(secret.to_owned())),
            None if allow_dev => {
                tracing::warn!("APP_TOKEN_SECRET unset; using development token secret");
                Ok(Zeroizing::new(DEVELOPMENT_TOKEN_SECRET.to_owned()))
            }
            None => Err(SettingsError::MissingTokenSecret),
        }
    }
}

/// Fully resolved configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) allowed_origins: Vec<Url>,
    pub(crate) token_secret: Zeroizing<String>,
    pub(crate) token_ttl_seconds: i64,
    pub(crate) ml: MlSettings,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    /// Resolve settings. Release builds refuse to start without a token
    /// secret.
    pub fn from_settings(app: &AppSettings, ml: MlSettings) -> Result<Self, SettingsError> {
        Ok(Self {
            bind_addr: app.bind_addr()?,
            allowed_origins: app.allowed_origins()?,
            token_secret: app.token_secret(cfg!(debug_assertions))?,
            token_ttl_seconds: app.token_ttl_seconds()?,
            ml,
            db_pool: None,
        })
    }

    /// Attach a database connection pool for persistence adapters.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }
}
