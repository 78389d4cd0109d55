use axum::{
    Router,
    body::Body,
    extract::{Path, State, rejection::JsonRejection},
    http::{
        HeaderName, HeaderValue, Request, StatusCode,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    middleware::{Next, from_fn},
    response::{Json, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use std::{sync::Arc, time::Duration};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{Instrument, error, info, warn};
use uuid::Uuid;
use wardrobe_flow::{
    Command, CrawlRequest, CrawlResponse, FlowRunner, InMemorySessionStorage, StepGraph,
    WizardError, WizardSnapshot, formatter::templates,
};

use crate::{
    config::ServiceConfig,
    models::{AdvanceRequest, HealthResponse},
};

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<Value>)>;
type ApiError = (StatusCode, Json<Value>);

const CRAWLER_FAILURE: &str = "Failed to fetch fashion recommendations";

fn error_body(status: StatusCode, message: &str, details: &str) -> ApiError {
    (
        status,
        Json(json!({
            "error": message,
            "details": details
        })),
    )
}

fn wizard_error(session_id: &str, e: WizardError) -> ApiError {
    let details = e.to_string();
    match e {
        WizardError::InvalidTransition { .. } => {
            warn!(session_id = %session_id, error = %details, "Rejected wizard command");
            error_body(StatusCode::CONFLICT, "Invalid transition", &details)
        }
        WizardError::SessionNotFound(_) => {
            error_body(StatusCode::NOT_FOUND, "Session not found", &details)
        }
        // Submissions fail inside the session and show up as the snapshot's
        // `error`; this arm covers callers that await a formatter directly.
        WizardError::FormatterFailure(_) | WizardError::MalformedResponse(_) => {
            error!(session_id = %session_id, error = %details, "Formatter error");
            error_body(StatusCode::BAD_GATEWAY, "Formatter failed", &details)
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub flow_runner: FlowRunner,
    pub crawler_delay: Duration,
}

impl AppState {
    pub fn new(config: &ServiceConfig) -> Self {
        let flow_runner = FlowRunner::new(
            Arc::new(StepGraph::wardrobe()),
            config.formatter(),
            Arc::new(InMemorySessionStorage::new()),
        );

        Self {
            flow_runner,
            crawler_delay: config.crawler_delay,
        }
    }
}

pub fn create_app(config: &ServiceConfig) -> Router {
    build_router(AppState::new(config))
}

/// Wildcard origin with the headers browser clients send alongside an API key.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers([
            AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            CONTENT_TYPE,
        ])
}

/// Middleware to add correlation ID to all requests
async fn correlation_id_middleware(mut request: Request<Body>, next: Next) -> Response {
    let correlation_id = Uuid::new_v4().to_string();

    if let Ok(value) = HeaderValue::from_str(&correlation_id) {
        request.headers_mut().insert("x-correlation-id", value);
    }

    let span = tracing::info_span!("http_request", correlation_id = %correlation_id);
    next.run(request).instrument(span).await
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/fashion-crawler", post(fashion_crawler))
        .route("/wizard", post(create_wizard))
        .route("/wizard/{session_id}", get(get_wizard).delete(delete_wizard))
        .route("/wizard/{session_id}/start", post(start_wizard))
        .route("/wizard/{session_id}/advance", post(advance_wizard))
        .route("/wizard/{session_id}/back", post(back_wizard))
        .route("/wizard/{session_id}/submit", post(submit_wizard))
        .route("/wizard/{session_id}/reset", post(reset_wizard))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(correlation_id_middleware))
        .with_state(app_state)
}

async fn root() -> Json<Value> {
    Json(json!({
        "service": "Fashion Wardrobe Service",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Questionnaire-driven outfit suggestions built from fixed templates",
        "endpoints": {
            "POST /fashion-crawler": "Format a recommendation for a set of answers",
            "POST /wizard": "Start a questionnaire session",
            "GET /wizard/{session_id}": "Current step, answers and any result",
            "POST /wizard/{session_id}/start": "Leave the welcome screen",
            "POST /wizard/{session_id}/advance": "Answer the current question",
            "POST /wizard/{session_id}/back": "Return to the previous question",
            "POST /wizard/{session_id}/submit": "Request the recommendation",
            "POST /wizard/{session_id}/reset": "Start over",
            "DELETE /wizard/{session_id}": "Discard the session",
            "GET /health": "Health check"
        }
    }))
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

async fn fashion_crawler(
    State(state): State<AppState>,
    payload: Result<Json<CrawlRequest>, JsonRejection>,
) -> ApiResult<CrawlResponse> {
    let Json(request) = payload.map_err(|rejection| {
        error!(error = %rejection, "Rejected fashion crawler request");
        error_body(StatusCode::BAD_REQUEST, CRAWLER_FAILURE, &rejection.body_text())
    })?;
    info!(request = ?request, "Fashion crawler request received");

    let answers = request.answers();
    let query = templates::build_search_query(&answers);
    info!(query = %query, "Search query");

    if !state.crawler_delay.is_zero() {
        tokio::time::sleep(state.crawler_delay).await;
    }

    let response = templates::crawl_response(&answers);
    info!(
        count = response.recommendations.len(),
        "Recommendations assembled"
    );
    Ok(Json(response))
}

async fn create_wizard(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<WizardSnapshot>), ApiError> {
    let snapshot = state.flow_runner.create_session().await.map_err(|e| {
        error!("Failed to create session: {}", e);
        error_body(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to create session",
            &e.to_string(),
        )
    })?;
    Ok((StatusCode::CREATED, Json(snapshot)))
}

async fn run_command(state: &AppState, session_id: &str, command: Command) -> ApiResult<WizardSnapshot> {
    state
        .flow_runner
        .run(session_id, command)
        .await
        .map(Json)
        .map_err(|e| wizard_error(session_id, e))
}

async fn get_wizard(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<WizardSnapshot> {
    run_command(&state, &session_id, Command::Refresh).await
}

async fn start_wizard(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<WizardSnapshot> {
    run_command(&state, &session_id, Command::Start).await
}

async fn advance_wizard(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    payload: Result<Json<AdvanceRequest>, JsonRejection>,
) -> ApiResult<WizardSnapshot> {
    let Json(request) = payload.map_err(|rejection| {
        warn!(session_id = %session_id, error = %rejection, "Rejected advance request");
        error_body(StatusCode::BAD_REQUEST, "Invalid answer", &rejection.body_text())
    })?;
    run_command(&state, &session_id, Command::Advance(request.value)).await
}

async fn back_wizard(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<WizardSnapshot> {
    run_command(&state, &session_id, Command::Back).await
}

async fn submit_wizard(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<WizardSnapshot> {
    run_command(&state, &session_id, Command::Submit).await
}

async fn reset_wizard(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<WizardSnapshot> {
    run_command(&state, &session_id, Command::Reset).await
}

async fn delete_wizard(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .flow_runner
        .delete(&session_id)
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(|e| wizard_error(&session_id, e))
}
