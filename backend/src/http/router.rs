//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        .route("/config", get(handlers::get_config))
        .route("/opacity", put(handlers::set_opacity))
        // Date navigation
        .route("/dates", get(handlers::get_dates))
        .route("/dates/select", post(handlers::select_date))
        .route("/dates/step", post(handlers::step_date))
        // Pipeline
        .route("/refresh", post(handlers::refresh))
        .route("/histogram", get(handlers::get_histogram));

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1", api_v1)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{MapController, SceneMap};
    use crate::source::{MemorySource, PipelineConfig};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn app(source: MemorySource) -> Router {
        let config = PipelineConfig::default();
        let controller = MapController::from_config(&config, Arc::new(source), SceneMap::new());
        let _ = controller.initialize().await;
        create_router(AppState::new(Arc::new(controller), Arc::new(config)))
    }

    async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(match body {
                Some(v) => Body::from(v.to_string()),
                None => Body::empty(),
            })
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_health_without_index() {
        let (status, body) = send(app(MemorySource::new()).await, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["time_index"], "unavailable");
    }

    #[tokio::test]
    async fn test_dates_unavailable_without_index() {
        let (status, body) = send(app(MemorySource::new()).await, "GET", "/v1/dates", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["code"], "NO_DATA");
    }

    #[tokio::test]
    async fn test_dates_published_after_startup() {
        let source = MemorySource::new();
        let router = app(source.clone()).await;

        source.insert_json("index.json", &json!({"dates": ["2026-01-01", "2026-01-08"], "latest": "2026-01-08"}));
        let (status, body) = send(router.clone(), "GET", "/v1/dates", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["active"], "2026-01-08");

        source.insert_json(
            "index.json",
            &json!({"dates": ["2026-01-01", "2026-01-08", "2026-01-15"], "latest": "2026-01-15"}),
        );
        let (_, body) = send(router, "GET", "/v1/dates", None).await;
        assert_eq!(body["keys"].as_array().unwrap().len(), 3);
        assert_eq!(body["active"], "2026-01-08");
    }

    #[tokio::test]
    async fn test_config_and_opacity() {
        let router = app(MemorySource::new()).await;
        let (status, body) = send(router.clone(), "GET", "/v1/config", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["layers"].as_array().unwrap().len(), 6);
        assert_eq!(body["opacity"]["label"], "70%");
        assert_eq!(body["tiles"]["ndvi"]["layer"], "MODIS_Terra_NDVI_8Day");

        let (status, body) = send(router.clone(), "PUT", "/v1/opacity", Some(json!({"percent": 140}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["percent"], 100);

        let (_, body) = send(router, "GET", "/v1/config", None).await;
        assert_eq!(body["opacity"]["fraction"], 1.0);
    }

    #[tokio::test]
    async fn test_step_rejects_unknown_direction() {
        let source = MemorySource::new();
        source.insert_json("index.json", &json!({"dates": ["2026-01-01"], "latest": "2026-01-01"}));
        let (status, body) = send(
            app(source).await,
            "POST",
            "/v1/dates/step",
            Some(json!({"direction": "sideways"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_histogram_error_statuses() {
        let source = MemorySource::new();
        source.insert_json("index.json", &json!({"dates": ["2026-01-01"], "latest": "2026-01-01"}));
        let router = app(source.clone()).await;

        let (status, _) = send(router.clone(), "GET", "/v1/histogram", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        source.insert_json("2026-01-01/ndvi_hist.json", &json!({"bins": [0.0, 1.0], "counts": [1, 2]}));
        let (status, body) = send(router, "GET", "/v1/histogram", None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "FORMAT_ERROR");
        assert_eq!(body["details"], "memory://2026-01-01/ndvi_hist.json");
    }
}
