//! Router assembly: HTTP endpoints, WebSocket upgrade, static files, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;
pub mod ws;

/// Build the application router with:
/// - WebSocket at `/ws`
/// - REST-ish API under `/api/v1/...`
/// - Static SPA from STATIC_DIR (default `./static`) with index fallback
/// - CORS (allow any origin/method/headers); adjust for production if needed
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    let static_dir = std::env::var("STATIC_DIR").unwrap_or_else(|_| "./static".into());
    let static_service = ServeDir::new(&static_dir)
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new(format!("{}/index.html", static_dir)));

    Router::new()
        // WebSocket
        .route("/ws", get(ws::ws_upgrade))
        // HTTP API
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/scenarios", get(http::http_list_scenarios))
        .route("/api/v1/scenario", get(http::http_get_scenario))
        .route("/api/v1/grade", post(http::http_post_grade))
        .route("/api/v1/progress", get(http::http_get_progress))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Frontend fallback
        .fallback_service(static_service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router {
        build_router(Arc::new(AppState::from_config(None)))
    }

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn post_grade(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/grade")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn perfect_request(mode: &str) -> Value {
        json!({
            "scenarioId": "separator-fire",
            "mode": mode,
            "datasheet": {
                "setPressure": 150.0,
                "relievingTemperature": 560.0,
                "requiredFlow": 21500.0,
                "molecularWeight": 28.0,
                "compressibilityFactor": 0.96,
                "specificHeatRatio": 1.27,
                "dischargeDestination": "flare",
                "superimposedBackpressure": 10.0,
                "builtUpBackpressure": 12.0
            },
            "answers": { "relievingCase": "fire_case", "valveStyle": "bellows", "orificeLetter": "J" },
            "explanationText": "Pool fire governs; flare backpressure calls for bellows."
        })
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(app(), get("/api/v1/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "ok": true }));
    }

    #[tokio::test]
    async fn test_grade_perfect() {
        let (status, body) = send(app(), post_grade(perfect_request("standard"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["score"], 100);
        assert_eq!(body["xp"], 100);
        assert_eq!(body["passed"], true);
        assert_eq!(body["mistakes"], json!([]));
        assert_eq!(body["missingFields"], json!([]));
        assert_eq!(body["correctAnswers"]["orificeLetter"], "J");
        assert_eq!(body["breakdown"]["decisions"]["max"], 35);
    }

    #[tokio::test]
    async fn test_grade_reports_missing_fields_in_order() {
        let mut req = perfect_request("standard");
        req["datasheet"].as_object_mut().unwrap().remove("builtUpBackpressure");
        req["datasheet"].as_object_mut().unwrap().remove("specificHeatRatio");
        req["answers"]["valveStyle"] = json!("conventional");
        req["telemetry"] = json!({ "hintsUsed": 3, "attemptNumber": 2 });
        let (status, body) = send(app(), post_grade(req)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["missingFields"], json!(["specificHeatRatio", "builtUpBackpressure"]));
        assert_eq!(body["breakdown"]["decisions"]["score"], 23);
        assert_eq!(body["breakdown"]["discipline"]["score"], 14);
        assert!(body["mistakes"][0].as_str().unwrap().contains("conventional"));
    }

    #[tokio::test]
    async fn test_hard_on_ineligible_scenario_is_422() {
        let mut req = perfect_request("hard");
        req["scenarioId"] = json!("pump-blocked-discharge");
        let (status, body) = send(app(), post_grade(req)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "eligibility");
        assert!(body.get("score").is_none());
    }

    #[tokio::test]
    async fn test_out_of_enum_is_400_with_detail() {
        let mut req = perfect_request("standard");
        req["answers"]["orificeLetter"] = json!("Z");
        let (status, body) = send(app(), post_grade(req)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation");
        assert!(!body["details"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_scenario_is_404_generic() {
        let mut req = perfect_request("standard");
        req["scenarioId"] = json!("secret-scenario");
        let (status, body) = send(app(), post_grade(req)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(!body["message"].as_str().unwrap().contains("secret-scenario"));
    }

    #[tokio::test]
    async fn test_scenarios_listing_and_lookup() {
        let (status, body) = send(app(), get("/api/v1/scenarios")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 4);

        let (status, body) = send(app(), get("/api/v1/scenario?scenarioId=boiler-drum")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "steam");
        assert!(body["requiredFields"].as_array().unwrap().contains(&json!("notes")));

        let (status, _) = send(app(), get("/api/v1/scenario")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_progress_after_grading() {
        let app = app();
        let mut req = perfect_request("hard");
        req["playerId"] = json!("kim");
        let (status, _) = send(app.clone(), post_grade(req)).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) =
            send(app.clone(), get("/api/v1/progress?playerId=kim&scenarioId=separator-fire")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["attempts"], 1);
        assert_eq!(body["bestScore"], 100);
        assert_eq!(body["bestXp"], 200);

        let (status, _) = send(app, get("/api/v1/progress?playerId=lee&scenarioId=separator-fire")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
