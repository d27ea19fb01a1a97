//! Refresh status endpoint

use axum::{extract::State, Json};

use crate::db::models::RefreshMetadata;
use crate::error::ApiError;
use crate::server::state::AppState;

/// Report the metadata of the last successful refresh pass.
///
/// GET /status
pub async fn get_status(State(state): State<AppState>) -> Result<Json<RefreshMetadata>, ApiError> {
    let metadata = state.repository.get_metadata().await?;
    Ok(Json(metadata))
}
