//! HTTP API for the in-app assistant widget.
//!
//! Sessions live in memory, keyed by UUID, and are lost on restart. Each
//! session is one [`ConversationSession`] plus the viewer it is talking to.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Health check (returns version) |
//! | `GET`  | `/suggestions?path=/admin/drills` | Starter suggestions for a route |
//! | `POST` | `/ask` | One-shot match, no session |
//! | `POST` | `/sessions` | Create a session |
//! | `GET`  | `/sessions/{id}` | Session state and full message log |
//! | `POST` | `/sessions/{id}/open` | Show the widget (greets the first time) |
//! | `POST` | `/sessions/{id}/close` | Hide the widget |
//! | `POST` | `/sessions/{id}/messages` | Submit a query or suggestion |
//! | `DELETE` | `/sessions/{id}` | Drop a session when its widget unmounts |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "not_found", "message": "no session with id: ..." } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404),
//! `too_many_sessions` (429).

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

use coachdesk_core::assistant::Assistant;
use coachdesk_core::role::{Viewer, ViewerRole};
use coachdesk_core::select::Answer;
use coachdesk_core::session::{ConversationSession, Message, Phase};
use coachdesk_core::suggest::Suggestion;

use crate::config::Config;

struct SessionSlot {
    session: ConversationSession,
    viewer: Viewer,
}

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
struct AppState {
    assistant: Assistant,
    sessions: Arc<Mutex<HashMap<String, SessionSlot>>>,
    max_sessions: usize,
}

/// Build the router without binding a socket.
pub fn router(assistant: Assistant, max_sessions: usize) -> Router {
    let state = AppState {
        assistant,
        sessions: Arc::new(Mutex::new(HashMap::new())),
        max_sessions,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/suggestions", get(handle_suggestions))
        .route("/ask", post(handle_ask))
        .route("/sessions", post(handle_create_session))
        .route(
            "/sessions/{id}",
            get(handle_get_session).delete(handle_delete_session),
        )
        .route("/sessions/{id}/open", post(handle_open))
        .route("/sessions/{id}/close", post(handle_close))
        .route("/sessions/{id}/messages", post(handle_submit))
        .layer(cors)
        .with_state(state)
}

/// Starts the assistant HTTP server on `[server].bind`.
///
/// Runs until the process is terminated.
pub async fn run_server(config: &Config, assistant: Assistant) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let app = router(assistant, config.server.max_sessions);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(bind = %bind_addr, "assistant server listening");
    println!("Assistant server listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request",
        message: message.into(),
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found",
        message: message.into(),
    }
}

fn too_many_sessions(limit: usize) -> AppError {
    AppError {
        status: StatusCode::TOO_MANY_REQUESTS,
        code: "too_many_sessions",
        message: format!("session limit of {} reached", limit),
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ GET /suggestions ============

#[derive(Deserialize)]
struct SuggestionParams {
    #[serde(default)]
    path: Option<String>,
}

#[derive(Serialize)]
struct SuggestionResponse {
    path: String,
    suggestions: Vec<Suggestion>,
}

async fn handle_suggestions(
    State(state): State<AppState>,
    Query(params): Query<SuggestionParams>,
) -> Json<SuggestionResponse> {
    let path = params.path.unwrap_or_else(|| "/".to_string());
    let suggestions = state.assistant.suggestions_for(&path).to_vec();
    Json(SuggestionResponse { path, suggestions })
}

// ============ POST /ask ============

#[derive(Deserialize)]
struct AskRequest {
    query: String,
    #[serde(default)]
    role: Option<ViewerRole>,
}

#[derive(Serialize)]
struct AskResponse {
    #[serde(rename = "match")]
    answer: Answer,
}

async fn handle_ask(
    State(state): State<AppState>,
    Json(req): Json<AskRequest>,
) -> Result<Json<AskResponse>, AppError> {
    let role = req.role.unwrap_or(ViewerRole::Visitor);
    let answer = state
        .assistant
        .answer(&req.query, &role)
        .map(|m| m.to_answer())
        .ok_or_else(|| bad_request("query must not be empty"))?;
    Ok(Json(AskResponse { answer }))
}

// ============ Sessions ============

#[derive(Deserialize)]
struct CreateSessionRequest {
    #[serde(default)]
    role: Option<ViewerRole>,
    #[serde(default)]
    first_name: Option<String>,
}

#[derive(Serialize)]
struct SessionView {
    id: String,
    phase: Phase,
    open: bool,
    role: ViewerRole,
    messages: Vec<Message>,
}

impl SessionView {
    fn of(id: &str, slot: &SessionSlot) -> Self {
        Self {
            id: id.to_string(),
            phase: slot.session.phase(),
            open: slot.session.is_open(),
            role: slot.viewer.role,
            messages: slot.session.messages().to_vec(),
        }
    }
}

async fn handle_create_session(
    State(state): State<AppState>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<SessionView>), AppError> {
    let mut viewer = Viewer::new(req.role.unwrap_or(ViewerRole::Visitor));
    if let Some(name) = req.first_name {
        viewer = viewer.with_first_name(name);
    }

    let mut sessions = state.sessions.lock().await;
    if sessions.len() >= state.max_sessions {
        tracing::warn!(limit = state.max_sessions, "session limit reached");
        return Err(too_many_sessions(state.max_sessions));
    }

    let id = Uuid::new_v4().to_string();
    let slot = SessionSlot {
        session: state.assistant.session(),
        viewer,
    };
    let view = SessionView::of(&id, &slot);
    sessions.insert(id.clone(), slot);
    tracing::debug!(session = %id, role = %view.role, "session created");

    Ok((StatusCode::CREATED, Json(view)))
}

async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, AppError> {
    let sessions = state.sessions.lock().await;
    let slot = sessions
        .get(&id)
        .ok_or_else(|| not_found(format!("no session with id: {}", id)))?;
    Ok(Json(SessionView::of(&id, slot)))
}

async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let mut sessions = state.sessions.lock().await;
    sessions
        .remove(&id)
        .ok_or_else(|| not_found(format!("no session with id: {}", id)))?;
    tracing::debug!(session = %id, remaining = sessions.len(), "session deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn handle_open(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, AppError> {
    let mut sessions = state.sessions.lock().await;
    let slot = sessions
        .get_mut(&id)
        .ok_or_else(|| not_found(format!("no session with id: {}", id)))?;
    slot.session.open(&slot.viewer);
    Ok(Json(SessionView::of(&id, slot)))
}

async fn handle_close(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, AppError> {
    let mut sessions = state.sessions.lock().await;
    let slot = sessions
        .get_mut(&id)
        .ok_or_else(|| not_found(format!("no session with id: {}", id)))?;
    slot.session.close(&slot.viewer);
    Ok(Json(SessionView::of(&id, slot)))
}

#[derive(Deserialize)]
struct SubmitRequest {
    query: String,
    /// Replaces the session viewer's role for this and later submissions.
    #[serde(default)]
    role: Option<ViewerRole>,
}

#[derive(Serialize)]
struct SubmitResponse {
    phase: Phase,
    messages: Vec<Message>,
}

async fn handle_submit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, AppError> {
    let mut sessions = state.sessions.lock().await;
    let slot = sessions
        .get_mut(&id)
        .ok_or_else(|| not_found(format!("no session with id: {}", id)))?;

    if let Some(role) = req.role {
        slot.viewer.role = role;
    }
    let messages = slot.session.submit(&req.query, &slot.viewer).to_vec();

    Ok(Json(SubmitResponse {
        phase: slot.session.phase(),
        messages,
    }))
}
