//! Application state container
//!
//! This module defines the shared application state that is passed
//! to all request handlers via Axum's state extraction.

use std::sync::Arc;

use crate::config::Settings;
use crate::db::{self, CountryRepository};
use crate::services::{RefreshService, SummaryRenderer, UpstreamClient};

/// Shared application state
///
/// Holds the persistence handle and services the handlers need. Cheaply
/// cloneable; the pool and services are Arc-backed.
#[derive(Clone)]
pub struct AppState {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Country table + metadata singleton access
    pub repository: CountryRepository,

    /// Refresh pipeline
    pub refresh: Arc<RefreshService>,
}

impl AppState {
    /// Create a new application state
    ///
    /// Connects to the database, bootstraps the schema, and wires the
    /// upstream gateway, repository, and renderer together. Fails if the
    /// database cannot be initialized.
    pub async fn new(settings: Settings) -> anyhow::Result<Self> {
        let settings = Arc::new(settings);

        tracing::debug!(database_url = %settings.database_url, "Connecting to database");
        let pool = db::connect(&settings.database_url).await?;
        let repository = CountryRepository::new(pool);

        let upstream = Arc::new(UpstreamClient::new(settings.upstream.clone())?);
        let renderer = Arc::new(SummaryRenderer::new(settings.summary_image_path()));
        let refresh = Arc::new(RefreshService::new(
            upstream,
            repository.clone(),
            renderer,
        ));

        tracing::info!("Application state initialized");

        Ok(Self {
            settings,
            repository,
            refresh,
        })
    }
}
