//! HTTP surface.
//!
//! Thin axum shell over [`Analyzer`]: JSON body extraction, CORS, the
//! liveness probe and the JSON 404. All pipeline decisions stay in
//! `analysis`.

use crate::analysis::Analyzer;
use crate::error::AnalysisError;
use crate::models::{AnalysisRequest, AnalysisResponse, HealthStatus, RouteNotFound};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tracing::{debug, error};

/// Routes listed in the 404 body.
pub const AVAILABLE_ROUTES: [&str; 2] = ["GET /health", "POST /api/analyze"];

/// Shared state for the HTTP server.
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
}

impl AppState {
    pub fn new(analyzer: Analyzer) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/api/analyze",
            post(analyze_handler).fallback(not_found_handler),
        )
        .fallback(not_found_handler)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Liveness probe.
async fn health_handler() -> Json<HealthStatus> {
    Json(HealthStatus::ok())
}

/// `POST /api/analyze`.
///
/// An unreadable body is treated like a missing subject.
async fn analyze_handler(
    State(state): State<AppState>,
    body: Result<Json<AnalysisRequest>, JsonRejection>,
) -> Result<Json<AnalysisResponse>, AnalysisError> {
    let subject = match body {
        Ok(Json(request)) => request.subject,
        Err(rejection) => {
            debug!("Unreadable analyze body: {}", rejection);
            None
        }
    };

    state.analyzer.analyze(subject).await.map(Json)
}

async fn not_found_handler() -> (StatusCode, Json<RouteNotFound>) {
    (
        StatusCode::NOT_FOUND,
        Json(RouteNotFound {
            error: "Route non trouvée".to_string(),
            available_routes: AVAILABLE_ROUTES.iter().map(|r| r.to_string()).collect(),
        }),
    )
}

/// Render a handler panic as an unhandled-failure envelope.
fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "panique inconnue".to_string()
    };

    error!("Handler panicked: {}", detail);
    AnalysisError::unhandled(format!("Erreur interne du serveur: {}", detail)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Roster;
    use crate::error::ANALYSIS_FAILED;
    use crate::generation::testing::{fenced_records, StubClient};
    use crate::generation::{GenerationClient, GenerationPayload};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Method, Request};
    use serde_json::Value;
    use tower::ServiceExt;

    fn test_app(stub: &Arc<StubClient>) -> Router {
        build_router(AppState::new(Analyzer::new(stub.clone(), Roster::default())))
    }

    fn analyze_request(body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/api/analyze")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_analyze_success() {
        let stub = Arc::new(StubClient::new().reply_text(fenced_records(8)));
        let (status, json) = send(
            test_app(&stub),
            analyze_request(r#"{"subject": "la solitude numérique"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
        assert_eq!(json["subject"], "la solitude numérique");
        assert_eq!(json["analysis"].as_array().unwrap().len(), 8);
        assert_eq!(json["analysis"][0]["thinker"], "Penseur 0");
        assert!(json["analysis"][0]["generalApproach"].is_string());
        assert!(json["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[tokio::test]
    async fn test_analyze_short_subject() {
        let stub = Arc::new(StubClient::new());
        let (status, json) = send(test_app(&stub), analyze_request(r#"{"subject": "abcd"}"#)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Le sujet doit contenir au moins 5 caractères");
        assert!(json.get("message").is_none());
        assert_eq!(stub.calls(), 0);
    }

    #[tokio::test]
    async fn test_analyze_missing_or_malformed_body() {
        let stub = Arc::new(StubClient::new());
        for body in ["{}", "not json", r#"{"subject": 12345}"#] {
            let (status, _) = send(test_app(&stub), analyze_request(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body: {}", body);
        }
        assert_eq!(stub.calls(), 0);
    }

    #[tokio::test]
    async fn test_analyze_upstream_failure() {
        let stub = Arc::new(StubClient::new().reply_err(AnalysisError::Upstream {
            status: 429,
            raw_body: "quota exhausted".to_string(),
        }));
        let (status, json) = send(
            test_app(&stub),
            analyze_request(r#"{"subject": "la solitude numérique"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], ANALYSIS_FAILED);
        assert!(json["message"].as_str().unwrap().contains("429"));
    }

    #[tokio::test]
    async fn test_analyze_malformed_generation_then_recovery() {
        let stub = Arc::new(
            StubClient::new()
                .reply_text("```json\n{ pas du json\n```")
                .reply_text("```json\n[]\n```"),
        );
        let app = test_app(&stub);

        let (status, json) = send(
            app.clone(),
            analyze_request(r#"{"subject": "la solitude numérique"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], ANALYSIS_FAILED);

        let (status, json) = send(app, analyze_request(r#"{"subject": "la solitude numérique"}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["analysis"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_concurrent_requests_are_independent() {
        let mut stub = StubClient::new();
        for _ in 0..5 {
            stub = stub.reply_text(fenced_records(8));
        }
        let stub = Arc::new(stub);
        let app = test_app(&stub);

        let requests = (0..5).map(|_| {
            send(
                app.clone(),
                analyze_request(r#"{"subject": "la solitude numérique"}"#),
            )
        });
        let results = futures::future::join_all(requests).await;

        for (status, json) in results {
            assert_eq!(status, StatusCode::OK);
            assert_eq!(json["analysis"].as_array().unwrap().len(), 8);
        }
        assert_eq!(stub.calls(), 5);
    }

    struct PanickingClient;

    #[async_trait]
    impl GenerationClient for PanickingClient {
        async fn generate(&self, _payload: &GenerationPayload) -> Result<String, AnalysisError> {
            panic!("upstream exploded")
        }
    }

    #[tokio::test]
    async fn test_panic_becomes_internal_error() {
        let app = build_router(AppState::new(Analyzer::new(
            Arc::new(PanickingClient),
            Roster::default(),
        )));
        let (status, json) = send(app, analyze_request(r#"{"subject": "la solitude numérique"}"#)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], ANALYSIS_FAILED);
        assert!(json["message"].as_str().unwrap().contains("upstream exploded"));
    }

    #[tokio::test]
    async fn test_health() {
        let stub = Arc::new(StubClient::new());
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, json) = send(test_app(&stub), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "OK");
        assert!(json["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_wrong_method_is_not_found() {
        let stub = Arc::new(StubClient::new());
        let request = Request::builder().uri("/api/analyze").body(Body::empty()).unwrap();
        let (status, json) = send(test_app(&stub), request).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "Route non trouvée");
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let stub = Arc::new(StubClient::new());
        let request = Request::builder().uri("/api/unknown").body(Body::empty()).unwrap();
        let (status, json) = send(test_app(&stub), request).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "Route non trouvée");
        assert_eq!(
            json["availableRoutes"],
            serde_json::json!(["GET /health", "POST /api/analyze"])
        );
    }
}
