//! HTTP Endpoints
//!
//! REST API for the tutor.

use std::time::Duration;

use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::{HeaderValue, Method, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tutor_agent::{TutorRequest, TutorResponse};
use tutor_config::ServerConfig;
use tutor_core::{ConversationTurn, ProficiencyLevel, Span};

use crate::metrics::{metrics_handler, record_fallback, record_request, record_stage_latency};
use crate::state::AppState;
use crate::ServerError;

const INDEX_HTML: &str = include_str!("../static/index.html");

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let cors_layer = build_cors_layer(&state.settings.server);
    let timeout = Duration::from_secs(state.settings.server.timeout_seconds);

    Router::new()
        .route("/", get(index))
        .route("/chat", post(chat))
        // Health check
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        // Prometheus metrics
        .route("/metrics", get(metrics_handler))
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

/// Build CORS layer from configured origins
///
/// - If cors_enabled is false, any origin is allowed (the browser UI may
///   be served from elsewhere during development)
/// - If cors_origins is empty, defaults to localhost:3000
/// - Otherwise, uses the configured origins
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    if !config.cors_enabled {
        tracing::debug!("CORS restrictions disabled, allowing all origins");
        return CorsLayer::permissive();
    }

    let methods = [Method::GET, Method::POST, Method::OPTIONS];

    let parsed_origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    if parsed_origins.is_empty() {
        tracing::info!("No valid CORS origins configured, defaulting to localhost:3000");
        return CorsLayer::new()
            .allow_origin(HeaderValue::from_static("http://localhost:3000"))
            .allow_methods(methods)
            .allow_headers(Any);
    }

    tracing::info!("CORS configured with {} origins", parsed_origins.len());
    CorsLayer::new()
        .allow_origin(parsed_origins)
        .allow_methods(methods)
        .allow_headers(Any)
}

/// `/chat` request body
///
/// Every field is optional so that a missing message reaches the agent and
/// gets the same answer as an empty one.
#[derive(Debug, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub history: Option<Vec<ConversationTurn>>,
    #[serde(default)]
    pub level: Option<ProficiencyLevel>,
}

impl From<ChatRequest> for TutorRequest {
    fn from(req: ChatRequest) -> Self {
        TutorRequest {
            message: req.message.unwrap_or_default(),
            history: req.history.unwrap_or_default(),
            level: req.level,
        }
    }
}

/// `/chat` response body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub original: String,
    pub corrected: String,
    pub diff_markup: Vec<Span>,
    pub diff_html: String,
    pub reply: String,
    pub retrieved_knowledge: String,
}

impl From<TutorResponse> for ChatResponse {
    fn from(res: TutorResponse) -> Self {
        ChatResponse {
            original: res.correction.original,
            corrected: res.correction.final_text,
            diff_markup: res.correction.markup,
            diff_html: res.diff_html,
            reply: res.reply,
            retrieved_knowledge: res.knowledge,
        }
    }
}

/// Correct a learner message and reply to it
async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let result = handle_chat(&state, payload).await;

    let status = match &result {
        Ok(_) => StatusCode::OK,
        Err(e) => e.status_code(),
    };
    record_request(status);

    match result {
        Ok(body) => Json(body).into_response(),
        Err(e) => {
            tracing::warn!(status = %status, error = %e, "Chat request rejected");
            e.into_response()
        },
    }
}

async fn handle_chat(
    state: &AppState,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<ChatResponse, ServerError> {
    let Json(request) = payload.map_err(|e| ServerError::InvalidRequest(e.body_text()))?;

    let response = state.agent.handle(request.into()).await?;

    for (stage, elapsed) in response.timings.iter() {
        record_stage_latency(stage, elapsed);
    }
    for stage in response.fallbacks.iter().copied() {
        record_fallback(stage);
    }

    Ok(response.into())
}

/// Browser chat UI
async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Liveness probe
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Readiness probe: the generative model must answer
async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let llm_status =
        match tokio::time::timeout(Duration::from_secs(2), state.agent.model_available()).await {
            Ok(true) => "ok",
            Ok(false) => "unreachable",
            Err(_) => "timeout",
        };
    let ready = llm_status == "ok";

    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(serde_json::json!({
            "ready": ready,
            "checks": {
                "llm": { "status": llm_status },
            },
        })),
    )
}
