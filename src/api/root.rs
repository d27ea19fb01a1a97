//! Service descriptor endpoint

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::server::state::AppState;

/// Human-readable service title shown in the descriptor
pub const SERVICE_TITLE: &str = "Country Currency & Exchange API";

/// Static service descriptor listing every endpoint.
///
/// GET /
pub async fn service_descriptor(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "message": SERVICE_TITLE,
        "version": state.settings.app_version,
        "endpoints": {
            "refresh": "POST /countries/refresh",
            "getCountries": "GET /countries",
            "getCountry": "GET /countries/:name",
            "deleteCountry": "DELETE /countries/:name",
            "status": "GET /status",
            "image": "GET /countries/image"
        }
    }))
}
