//! Country endpoints
//!
//! Handlers for the refresh trigger, the listing/lookup/delete surface, and
//! the summary artifact.

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::db::models::{CountryFilters, CountryRecord, SortKey};
use crate::error::ApiError;
use crate::server::state::AppState;

/// Response for a successful refresh pass
#[derive(Serialize)]
pub struct RefreshResponse {
    pub message: String,
    pub total_processed: usize,
    pub total_countries: i64,
}

/// Response for a successful delete
#[derive(Serialize)]
pub struct DeleteResponse {
    pub message: String,
    pub deleted: String,
}

/// Query parameters accepted by the listing endpoint
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub region: Option<String>,
    pub currency: Option<String>,
    pub sort: Option<String>,
}

impl ListQuery {
    fn into_filters(self) -> CountryFilters {
        CountryFilters {
            region: self.region,
            currency: self.currency,
            // Unknown sort values are ignored, not rejected
            sort: self.sort.as_deref().and_then(SortKey::parse),
        }
    }
}

/// Trigger one synchronous refresh pass.
///
/// POST /countries/refresh
pub async fn refresh(State(state): State<AppState>) -> Result<Json<RefreshResponse>, ApiError> {
    let outcome = state.refresh.run().await?;

    Ok(Json(RefreshResponse {
        message: "Countries data refreshed successfully".to_string(),
        total_processed: outcome.total_processed,
        total_countries: outcome.total_countries,
    }))
}

/// List countries with optional filters and sort.
///
/// GET /countries?region=&currency=&sort=
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<CountryRecord>>, ApiError> {
    let countries = state.repository.find_all(&query.into_filters()).await?;
    Ok(Json(countries))
}

/// Look up one country by name (case-insensitive).
///
/// GET /countries/:name
pub async fn get_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<CountryRecord>, ApiError> {
    let country = state
        .repository
        .find_by_name(&name)
        .await?
        .ok_or_else(|| ApiError::NotFound("Country not found".to_string()))?;

    Ok(Json(country))
}

/// Delete one country by name (case-insensitive).
///
/// DELETE /countries/:name
pub async fn delete_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let removed = state.repository.delete_by_name(&name).await?;
    if removed == 0 {
        return Err(ApiError::NotFound("Country not found".to_string()));
    }

    tracing::info!(name = %name, "Country deleted");

    Ok(Json(DeleteResponse {
        message: "Country deleted successfully".to_string(),
        deleted: name,
    }))
}

/// Serve the summary artifact rendered by the last refresh pass.
///
/// GET /countries/image
pub async fn summary_image(State(state): State<AppState>) -> Result<Response, ApiError> {
    let path = state.settings.summary_image_path();

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(ApiError::NotFound("Summary image not found".to_string()));
        }
        Err(err) => return Err(ApiError::Internal(err.into())),
    };

    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], bytes).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_maps_to_filters() {
        let query = ListQuery {
            region: Some("Europe".to_string()),
            currency: Some("EUR".to_string()),
            sort: Some("name_asc".to_string()),
        };
        let filters = query.into_filters();
        assert_eq!(filters.region.as_deref(), Some("Europe"));
        assert_eq!(filters.currency.as_deref(), Some("EUR"));
        assert_eq!(filters.sort, Some(SortKey::NameAsc));
    }

    #[test]
    fn test_unknown_sort_is_ignored() {
        let query = ListQuery {
            sort: Some("population_desc".to_string()),
            ..Default::default()
        };
        assert_eq!(query.into_filters().sort, None);
    }
}
