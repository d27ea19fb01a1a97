//! Application settings and configuration
//!
//! This module provides configuration management for the application,
//! loading settings from environment variables with sensible defaults.

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::PathBuf;

/// Application environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[value(alias = "dev")]
    Development,
    #[value(alias = "stage")]
    Staging,
    #[value(alias = "prod")]
    Production,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Staging => write!(f, "staging"),
            Environment::Production => write!(f, "production"),
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::Development
    }
}

impl std::str::FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "staging" | "stage" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            _ => anyhow::bail!(
                "Invalid environment: {}. Expected: development, staging, or production",
                s
            ),
        }
    }
}

/// Upstream data source configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    /// Countries listing endpoint
    pub countries_api_url: String,
    /// USD-based exchange rate endpoint
    pub exchange_rate_api_url: String,
    /// Per-request timeout for both sources
    pub timeout_seconds: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            countries_api_url:
                "https://restcountries.com/v2/all?fields=name,capital,region,population,flag,currencies"
                    .to_string(),
            exchange_rate_api_url: "https://open.er-api.com/v6/latest/USD".to_string(),
            timeout_seconds: 30,
        }
    }
}

/// Main application settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    // App settings
    pub app_name: String,
    pub app_version: String,
    pub environment: Environment,
    pub log_level: String,

    // Server settings
    pub host: String,
    pub port: u16,

    // Database settings
    pub database_url: String,

    // Upstream data sources
    pub upstream: UpstreamConfig,

    // Where the summary artifact is written/read
    pub cache_dir: PathBuf,
}

impl Settings {
    /// Load settings from environment variables with defaults
    pub fn load() -> Result<Self> {
        // Load .env file if it exists (ignored in production typically)
        dotenvy::dotenv().ok();

        let defaults = UpstreamConfig::default();

        let settings = Self {
            // App settings
            app_name: env_or_default("APP_NAME", "country-currency-api"),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            environment: env_or_default("ENVIRONMENT", "development")
                .parse()
                .unwrap_or_default(),
            log_level: env_or_default("LOG_LEVEL", "info"),

            // Server settings
            host: env_or_default("HOST", "0.0.0.0"),
            port: env_or_default("PORT", "3000")
                .parse()
                .context("Invalid PORT value")?,

            // Database settings
            database_url: env_or_default("DATABASE_URL", "sqlite://countries.db?mode=rwc"),

            // Upstream data sources
            upstream: UpstreamConfig {
                countries_api_url: env_or_default(
                    "COUNTRIES_API_URL",
                    &defaults.countries_api_url,
                ),
                exchange_rate_api_url: env_or_default(
                    "EXCHANGE_RATE_API_URL",
                    &defaults.exchange_rate_api_url,
                ),
                timeout_seconds: env_or_default("UPSTREAM_TIMEOUT_SECONDS", "30")
                    .parse()
                    .unwrap_or(defaults.timeout_seconds),
            },

            // Artifact cache
            cache_dir: PathBuf::from(env_or_default("CACHE_DIR", "cache")),
        };

        settings.validate()?;

        Ok(settings)
    }

    /// Validate settings
    fn validate(&self) -> Result<()> {
        if self.port == 0 {
            anyhow::bail!("Port cannot be 0");
        }

        if self.upstream.timeout_seconds == 0 {
            anyhow::bail!("Upstream timeout must be > 0");
        }

        if self.database_url.is_empty() {
            anyhow::bail!("DATABASE_URL cannot be empty");
        }

        Ok(())
    }

    /// Get the server address string (host:port)
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Path of the summary artifact inside the cache directory
    pub fn summary_image_path(&self) -> PathBuf {
        self.cache_dir.join("summary.svg")
    }
}

/// Get an environment variable or return a default value
fn env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
