//! Application routing
//!
//! This module defines all HTTP routes for the application.

use axum::{
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};

use crate::api::{countries, root, status};
use crate::middleware::logging::log_request;
use crate::server::state::AppState;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    // The literal /image segment takes precedence over the :name capture,
    // so "image" is never interpreted as a country name.
    let countries_routes = Router::new()
        .route("/refresh", axum::routing::post(countries::refresh))
        .route("/image", get(countries::summary_image))
        .route("/", get(countries::list))
        .route(
            "/:name",
            get(countries::get_by_name).delete(countries::delete_by_name),
        );

    Router::new()
        .route("/", get(root::service_descriptor))
        .nest("/countries", countries_routes)
        .route("/status", get(status::get_status))
        .fallback(route_not_found)
        .layer(create_cors_layer())
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

/// 404 body for unmatched routes
async fn route_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Route not found" })),
    )
}

/// Create CORS layer with permissive settings
fn create_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Environment, Settings, UpstreamConfig};
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn test_router() -> (Router, tempfile::TempDir) {
        let dir = tempfile::TempDir::new().unwrap();
        let settings = Settings {
            app_name: "country-currency-api".to_string(),
            app_version: "1.0.0".to_string(),
            environment: Environment::Development,
            log_level: "info".to_string(),
            host: "127.0.0.1".to_string(),
            port: 3000,
            database_url: "sqlite::memory:".to_string(),
            upstream: UpstreamConfig::default(),
            cache_dir: dir.path().to_path_buf(),
        };
        let state = AppState::new(settings).await.unwrap();
        (create_router(state), dir)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_service_descriptor_lists_endpoints() {
        let (router, _dir) = test_router().await;
        let response = router
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Country Currency & Exchange API");
        assert_eq!(body["endpoints"]["refresh"], "POST /countries/refresh");
        assert_eq!(body["endpoints"]["image"], "GET /countries/image");
    }

    #[tokio::test]
    async fn test_unmatched_route_returns_404_body() {
        let (router, _dir) = test_router().await;
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/nowhere")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Route not found");
    }

    #[tokio::test]
    async fn test_status_starts_zeroed() {
        let (router, _dir) = test_router().await;
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/status")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["total_countries"], 0);
        assert!(body["last_refreshed_at"].is_null());
    }

    #[tokio::test]
    async fn test_listing_is_empty_before_first_refresh() {
        let (router, _dir) = test_router().await;
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/countries?region=Europe&sort=name_asc")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_image_route_wins_over_name_capture() {
        // Before the first refresh the artifact is missing, so the literal
        // /image route answers with its own 404 body rather than the
        // country lookup's.
        let (router, _dir) = test_router().await;
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/countries/image")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Summary image not found");
    }

    #[tokio::test]
    async fn test_missing_country_returns_404() {
        let (router, _dir) = test_router().await;
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/countries/Atlantis")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Country not found");
    }

    #[tokio::test]
    async fn test_delete_missing_country_returns_404() {
        let (router, _dir) = test_router().await;
        let response = router
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/countries/Atlantis")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
