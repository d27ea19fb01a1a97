//! Database data models
//!
//! This module defines the rows stored in the SQLite database and the
//! filter/sort options accepted by the query layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One country row, keyed uniquely by case-sensitive name.
///
/// `exchange_rate` and `estimated_gdp` are null together: both are set when
/// the country's first currency has an entry in the USD rate table, and both
/// are absent otherwise.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CountryRecord {
    pub id: i64,

    /// Unique key (case-sensitive at the storage level)
    pub name: String,

    pub capital: Option<String>,

    pub region: Option<String>,

    pub population: i64,

    /// ISO-style code of the country's first listed currency
    pub currency_code: Option<String>,

    /// Local currency units per 1 USD
    pub exchange_rate: Option<f64>,

    /// population x U / exchange_rate, U uniform in [1000, 2000)
    pub estimated_gdp: Option<f64>,

    pub flag_url: Option<String>,

    /// Set on every write
    pub last_refreshed_at: DateTime<Utc>,
}

/// A merged country ready to be upserted (timestamp assigned at write time).
#[derive(Debug, Clone, PartialEq)]
pub struct NewCountry {
    pub name: String,
    pub capital: Option<String>,
    pub region: Option<String>,
    pub population: i64,
    pub currency_code: Option<String>,
    pub exchange_rate: Option<f64>,
    pub estimated_gdp: Option<f64>,
    pub flag_url: Option<String>,
}

/// Singleton aggregate row (id = 1), overwritten wholesale after every
/// successful refresh pass.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RefreshMetadata {
    /// Null until the first successful refresh
    pub last_refreshed_at: Option<DateTime<Utc>>,
    pub total_countries: i64,
}

/// Sort keys accepted by the listing endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    GdpAsc,
    GdpDesc,
    NameAsc,
    NameDesc,
}

impl SortKey {
    /// Parse a query-string value; unknown values are ignored rather than
    /// rejected, matching the listing endpoint's lenient contract.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "gdp_asc" => Some(SortKey::GdpAsc),
            "gdp_desc" => Some(SortKey::GdpDesc),
            "name_asc" => Some(SortKey::NameAsc),
            "name_desc" => Some(SortKey::NameDesc),
            _ => None,
        }
    }

    /// The ORDER BY clause for this key.
    pub fn order_clause(&self) -> &'static str {
        match self {
            SortKey::GdpAsc => "estimated_gdp ASC",
            SortKey::GdpDesc => "estimated_gdp DESC",
            SortKey::NameAsc => "name ASC",
            SortKey::NameDesc => "name DESC",
        }
    }
}

/// Filters for the listing endpoint; region and currency are exact-match and
/// AND-combined when both are present.
#[derive(Debug, Clone, Default)]
pub struct CountryFilters {
    pub region: Option<String>,
    pub currency: Option<String>,
    pub sort: Option<SortKey>,
}
