//! Refresh pipeline
//!
//! One pass: fetch both upstream sources concurrently, merge and upsert each
//! country sequentially, recompute the metadata singleton, then render the
//! summary artifact. If either fetch fails, nothing is written. A failure
//! mid-loop leaves records upserted earlier in the pass committed; there is
//! no cross-record transaction. Concurrent passes are not coordinated, the
//! last writer wins per record.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::db::CountryRepository;
use crate::error::ApiError;
use crate::services::merge::merge_country;
use crate::services::summary::{SummaryInput, SummaryRenderer};
use crate::services::upstream::{RawCountry, UpstreamClient};

/// How many countries the summary artifact lists
const TOP_COUNTRIES_LIMIT: i64 = 5;

/// Result of one successful refresh pass
#[derive(Debug, Clone, Serialize)]
pub struct RefreshOutcome {
    pub total_processed: usize,
    pub total_countries: i64,
}

/// Orchestrates the fetch-merge-upsert-summarize cycle
pub struct RefreshService {
    upstream: Arc<UpstreamClient>,
    repository: CountryRepository,
    renderer: Arc<SummaryRenderer>,
}

impl RefreshService {
    /// Create a new refresh service
    pub fn new(
        upstream: Arc<UpstreamClient>,
        repository: CountryRepository,
        renderer: Arc<SummaryRenderer>,
    ) -> Self {
        Self {
            upstream,
            repository,
            renderer,
        }
    }

    /// Run one refresh pass to completion.
    pub async fn run(&self) -> Result<RefreshOutcome, ApiError> {
        // Both sources are fetched together; either failure aborts the pass
        // before any record is written.
        let (countries, rates) = tokio::join!(
            self.upstream.fetch_countries(),
            self.upstream.fetch_exchange_rates()
        );
        let countries = countries?;
        let rates = rates?;

        self.apply(countries, &rates).await
    }

    /// Merge, upsert, recompute metadata, and render from already-fetched
    /// upstream data.
    pub(crate) async fn apply(
        &self,
        countries: Vec<RawCountry>,
        rates: &HashMap<String, f64>,
    ) -> Result<RefreshOutcome, ApiError> {
        let mut rng = StdRng::from_entropy();
        let mut processed = 0usize;

        for raw in &countries {
            let record = merge_country(raw, rates, &mut rng);
            self.repository.upsert(&record).await?;
            processed += 1;
        }

        // Metadata is recomputed once, after the per-record loop
        let metadata = self.repository.recompute_metadata().await?;

        let top = self
            .repository
            .top_by_estimated_gdp(TOP_COUNTRIES_LIMIT)
            .await?;
        self.renderer.render(&SummaryInput {
            total_countries: metadata.total_countries,
            top_countries: &top,
            last_refreshed: metadata.last_refreshed_at,
        })?;

        tracing::info!(
            total_processed = processed,
            total_countries = metadata.total_countries,
            "Refresh pass completed"
        );

        Ok(RefreshOutcome {
            total_processed: processed,
            total_countries: metadata.total_countries,
        })
    }
}
