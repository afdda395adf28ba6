//! HTTP API for the companion service.
//!
//! ## Endpoints
//!
//! - `POST /chat` — run one turn: keyword override or delegated generation,
//!   plus emotion classification of the user's utterance.
//! - `POST /reset` — reset a session's history and clear its log.
//! - `GET /log` — enumerate a session's recorded turns.
//!
//! Validation failures return 400 before any delegate is invoked; delegate
//! failures map to 502 and delegate timeouts to 504. An error payload is
//! always JSON `{"error": ...}` — never a fabricated reply.

use crate::config::ServerConfig;
use crate::error::{Result, SolaceError};
use crate::model::{EmotionModel, top_emotion};
use crate::registry::{DEFAULT_SESSION_ID, SessionRegistry};
use crate::responder::Responder;
use crate::transcript::ChatTurn;
use axum::Router;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::info;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// `POST /chat` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The user's utterance.
    #[serde(default)]
    pub message: Option<String>,
    /// Session identifier; omitted means the shared default session.
    #[serde(default)]
    pub session: Option<String>,
}

/// `POST /chat` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// The reply delivered (canned or generated).
    pub response: String,
    /// Top-1 emotion label for the user's utterance.
    pub emotion: String,
    /// Classifier confidence in `0.0..=1.0`.
    pub score: f32,
}

/// `POST /reset` request body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResetRequest {
    /// Session identifier; omitted means the shared default session.
    #[serde(default)]
    pub session: Option<String>,
}

/// `POST /reset` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetResponse {
    /// Confirmation message.
    pub message: String,
}

/// `GET /log` query parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogQuery {
    /// Session identifier; omitted means the shared default session.
    #[serde(default)]
    pub session: Option<String>,
}

/// JSON error payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}

// ---------------------------------------------------------------------------
// Shared application state
// ---------------------------------------------------------------------------

/// Shared state for axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Keyword override + generation orchestrator.
    pub responder: Arc<Responder>,
    /// Emotion-classification delegate.
    pub emotion: Arc<dyn EmotionModel>,
    /// Per-session conversation state.
    pub registry: Arc<SessionRegistry>,
}

impl AppState {
    /// Assemble the handler state from its collaborators.
    pub fn new(
        responder: Arc<Responder>,
        emotion: Arc<dyn EmotionModel>,
        registry: Arc<SessionRegistry>,
    ) -> Self {
        Self {
            responder,
            emotion,
            registry,
        }
    }
}

/// Build the API router over the given state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/chat", post(handle_chat))
        .route("/reset", post(handle_reset))
        .route("/log", get(handle_log))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// ApiServer
// ---------------------------------------------------------------------------

/// The running HTTP API, serving in a background task.
pub struct ApiServer {
    /// The address the server is listening on.
    addr: SocketAddr,
    /// Handle to the background server task.
    handle: JoinHandle<()>,
}

impl ApiServer {
    /// Bind `{config.host}:{config.port}` (port `0` auto-assigns) and begin
    /// serving in a background tokio task.
    ///
    /// # Errors
    ///
    /// Returns an error if the TCP listener cannot bind.
    pub async fn start(state: AppState, config: &ServerConfig) -> Result<Self> {
        let app = router(state);

        let bind_addr = format!("{}:{}", config.host, config.port);
        let listener = TcpListener::bind(&bind_addr)
            .await
            .map_err(|e| SolaceError::Config(format!("API bind failed on {bind_addr}: {e}")))?;
        let addr = listener
            .local_addr()
            .map_err(|e| SolaceError::Config(format!("failed to get local addr: {e}")))?;

        info!("API listening on http://{addr}");

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("API server error: {e}");
            }
        });

        Ok(Self { addr, handle })
    }

    /// Returns the address the server is listening on.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Returns the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Abort the server task.
    pub fn shutdown(&self) {
        self.handle.abort();
    }
}

impl Drop for ApiServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

type ApiError = (StatusCode, Json<ErrorResponse>);

fn into_api_error(err: SolaceError) -> ApiError {
    let status = match err {
        SolaceError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        SolaceError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        SolaceError::Generation(_) | SolaceError::Classification(_) | SolaceError::Tokenizer(_) => {
            StatusCode::BAD_GATEWAY
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

/// `POST /chat` — run one conversational turn.
async fn handle_chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> std::result::Result<Json<ChatResponse>, ApiError> {
    let message = request.message.unwrap_or_default();
    if message.trim().is_empty() {
        return Err(into_api_error(SolaceError::InvalidRequest(
            "message must not be empty".to_owned(),
        )));
    }

    let session_id = request.session.as_deref().unwrap_or(DEFAULT_SESSION_ID);
    let entry = state.registry.checkout(session_id);
    let mut entry = entry.lock().await;

    let response = state
        .responder
        .respond(&mut entry.session, &message)
        .await
        .map_err(into_api_error)?;

    let ranking = state
        .emotion
        .classify(&message)
        .await
        .map_err(into_api_error)?;
    let top = top_emotion(ranking).map_err(into_api_error)?;

    entry.log.record(ChatTurn::now(
        message,
        response.clone(),
        top.label.clone(),
        top.score,
    ));

    Ok(Json(ChatResponse {
        response,
        emotion: top.label,
        score: top.score,
    }))
}

/// `POST /reset` — reset one session's history and clear its log.
async fn handle_reset(
    State(state): State<AppState>,
    Json(request): Json<ResetRequest>,
) -> Json<ResetResponse> {
    let session_id = request.session.as_deref().unwrap_or(DEFAULT_SESSION_ID);
    let entry = state.registry.checkout(session_id);
    let mut entry = entry.lock().await;

    entry.session.reset();
    entry.log.clear();
    info!("session {session_id:?} reset");

    Json(ResetResponse {
        message: "Conversation reset.".to_owned(),
    })
}

/// `GET /log` — enumerate one session's recorded turns, oldest first.
async fn handle_log(
    State(state): State<AppState>,
    Query(query): Query<LogQuery>,
) -> Json<Vec<ChatTurn>> {
    let session_id = query.session.as_deref().unwrap_or(DEFAULT_SESSION_ID);
    let entry = state.registry.checkout(session_id);
    let entry = entry.lock().await;
    Json(entry.log.turns().to_vec())
}
