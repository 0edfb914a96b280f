//! HTTP Endpoints
//!
//! REST surface for driving calls over the machine's audio path.

use std::sync::Arc;

use axum::{
    extract::{Json, State},
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use voiceline_agent::{ConversationManager, EndReason};
use voiceline_core::{DialogHistory, PredictionBackend, SpeechSynthesizer, UtteranceSource};
use voiceline_llm::PredictionClient;
use voiceline_pipeline::{LiveRecognizer, StreamingSpeaker};

use crate::metrics::{metrics_handler, record_request};
use crate::state::AppState;
use crate::ServerError;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let cors_layer = build_cors_layer(
        &state.settings.server.cors_origins,
        state.settings.server.cors_enabled,
    );

    Router::new()
        // Call endpoint
        .route("/answer", post(answer_call))
        // Health check
        .route("/health", get(health_check))
        // Prometheus metrics
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

/// Build CORS layer from configured origins
///
/// - If cors_enabled is false, returns the permissive layer
/// - If cors_origins is empty, any origin is accepted
/// - Otherwise, only the configured origins are accepted
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        return CorsLayer::permissive();
    }

    if origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any);
    }

    // Parse configured origins
    let parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    if parsed_origins.is_empty() {
        tracing::error!("All configured CORS origins are invalid, accepting any origin");
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any);
    }

    tracing::info!("CORS configured with {} origins", parsed_origins.len());
    CorsLayer::new()
        .allow_origin(parsed_origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .allow_credentials(true)
}

/// Completed call summary returned to the webhook caller
#[derive(Debug, Serialize)]
struct CallAnswer {
    call_id: Uuid,
    status: &'static str,
    end_reason: EndReason,
    turns: usize,
    history: DialogHistory,
}

/// Answer a call
///
/// Runs a full conversation over the local microphone and speakers and
/// returns once the caller has hung up. The response carries the dialog
/// history, so a telephony webhook gets the whole exchange in one body.
async fn answer_call(State(state): State<AppState>) -> Result<Json<CallAnswer>, ServerError> {
    record_request("answer");

    // One microphone, one playback device: overlapping calls are rejected.
    let Ok(_guard) = state.audio_guard.try_lock() else {
        return Err(ServerError::Busy);
    };

    let settings = &state.settings;
    let source: Arc<dyn UtteranceSource> =
        Arc::new(LiveRecognizer::new(settings.recognition.clone()));
    let predictor: Arc<dyn PredictionBackend> = Arc::new(
        PredictionClient::new(settings.prediction.clone())
            .map_err(|e| ServerError::Internal(e.to_string()))?,
    );
    let speaker: Arc<dyn SpeechSynthesizer> = Arc::new(
        StreamingSpeaker::new(settings.synthesis.clone())
            .map_err(|e| ServerError::Internal(e.to_string()))?,
    );

    let manager =
        ConversationManager::new(source, predictor, speaker, settings.conversation.clone());
    tracing::info!(call_id = %manager.call_id(), "answering call");

    let report = manager.run().await?;

    Ok(Json(CallAnswer {
        call_id: report.call_id,
        status: "completed",
        end_reason: report.end_reason,
        turns: report.turns,
        history: report.history,
    }))
}

/// Health check
async fn health_check() -> Json<serde_json::Value> {
    record_request("health");

    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;
    use voiceline_config::Settings;

    #[test]
    fn test_router_creation() {
        let state = AppState::new(Settings::default());
        let _ = create_router(state);
    }

    #[tokio::test]
    async fn test_health_route_responds() {
        let app = create_router(AppState::new(Settings::default()));

        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_overlapping_call_is_rejected() {
        let state = AppState::new(Settings::default());
        let _guard = state.audio_guard.clone().try_lock_owned().unwrap();

        // The guard is held, so the handler bails out before touching
        // any audio device or network.
        let app = create_router(state);
        let response = app
            .oneshot(Request::post("/answer").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_cors_layer_accepts_configured_origins() {
        let origins = vec!["http://localhost:3000".to_string()];
        let _ = build_cors_layer(&origins, true);
        let _ = build_cors_layer(&[], true);
        let _ = build_cors_layer(&[], false);
    }
}
