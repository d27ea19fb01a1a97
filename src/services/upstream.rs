//! External data gateway
//!
//! This module fetches the raw country listing from RestCountries and the
//! USD exchange-rate table from the Exchange Rate API over a shared reqwest
//! client with a bounded timeout. Transport failures are mapped to typed
//! errors; no retries are performed here, a refresh pass makes exactly one
//! attempt per source.

use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

use crate::config::UpstreamConfig;

/// Human-readable source names, used in error details and logs
pub const COUNTRIES_SOURCE: &str = "RestCountries API";
pub const RATES_SOURCE: &str = "Exchange Rate API";

/// Errors that can occur when calling an upstream source
#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("{source_name} request timed out")]
    Timeout { source_name: String },

    #[error("Could not fetch data from {source_name}: {detail}")]
    Unavailable { source_name: String, detail: String },
}

impl UpstreamError {
    fn from_reqwest(source_name: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UpstreamError::Timeout {
                source_name: source_name.to_string(),
            }
        } else {
            UpstreamError::Unavailable {
                source_name: source_name.to_string(),
                detail: err.to_string(),
            }
        }
    }
}

/// One country as returned by the RestCountries v2 listing
#[derive(Debug, Clone, Deserialize)]
pub struct RawCountry {
    pub name: String,
    #[serde(default)]
    pub capital: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub population: i64,
    /// Flag image URL
    #[serde(default)]
    pub flag: Option<String>,
    #[serde(default)]
    pub currencies: Option<Vec<RawCurrency>>,
}

/// One currency entry of a raw country
#[derive(Debug, Clone, Deserialize)]
pub struct RawCurrency {
    #[serde(default)]
    pub code: Option<String>,
}

/// Envelope of the Exchange Rate API response; only the rate table matters
#[derive(Debug, Deserialize)]
struct RatesResponse {
    rates: HashMap<String, f64>,
}

/// Client for both upstream sources
pub struct UpstreamClient {
    http: Client,
    config: UpstreamConfig,
}

impl UpstreamClient {
    /// Create a gateway with the timeout applied to every request
    pub fn new(config: UpstreamConfig) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self { http, config })
    }

    /// Fetch the raw country listing
    pub async fn fetch_countries(&self) -> Result<Vec<RawCountry>, UpstreamError> {
        tracing::debug!(url = %self.config.countries_api_url, "Fetching country listing");

        let countries: Vec<RawCountry> = self
            .http
            .get(&self.config.countries_api_url)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| UpstreamError::from_reqwest(COUNTRIES_SOURCE, e))?
            .json()
            .await
            .map_err(|e| UpstreamError::from_reqwest(COUNTRIES_SOURCE, e))?;

        tracing::info!(count = countries.len(), "Fetched country listing");

        Ok(countries)
    }

    /// Fetch the USD-based exchange rate table (currency code -> rate)
    pub async fn fetch_exchange_rates(&self) -> Result<HashMap<String, f64>, UpstreamError> {
        tracing::debug!(url = %self.config.exchange_rate_api_url, "Fetching exchange rates");

        let response: RatesResponse = self
            .http
            .get(&self.config.exchange_rate_api_url)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| UpstreamError::from_reqwest(RATES_SOURCE, e))?
            .json()
            .await
            .map_err(|e| UpstreamError::from_reqwest(RATES_SOURCE, e))?;

        tracing::info!(count = response.rates.len(), "Fetched exchange rates");

        Ok(response.rates)
    }
}
