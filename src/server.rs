//! HTTP transport: the ask endpoint and the session transcript reads.
//!
//! Wires the database, item store, and answer generator into an axum router.
//! Sync rusqlite work runs under `spawn_blocking`; the generator call is the
//! only await that blocks for non-trivial wall time and carries its own
//! timeout inside the pipeline.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

use crate::ask::{self, context::AskSource};
use crate::config::HindsightConfig;
use crate::db;
use crate::generate::{AnswerGenerator, GeminiGenerator};
use crate::items::store::SqliteItemStore;
use crate::session::{self, Role};

/// Shared per-process state behind every handler.
#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Connection>>,
    store: Arc<SqliteItemStore>,
    generator: Arc<dyn AnswerGenerator>,
    config: Arc<HindsightConfig>,
}

impl AppState {
    pub fn new(
        db: Arc<Mutex<Connection>>,
        generator: Arc<dyn AnswerGenerator>,
        config: Arc<HindsightConfig>,
    ) -> Self {
        let store = Arc::new(SqliteItemStore::new(Arc::clone(&db)));
        Self {
            db,
            store,
            generator,
            config,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AskRequest {
    pub query: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AskResponse {
    pub session_id: String,
    pub answer: String,
    pub sources: Vec<AskSource>,
    pub followups: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
}

enum ApiError {
    Validation(String),
    NotFound(&'static str),
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg),
            Self::NotFound(what) => (StatusCode::NOT_FOUND, "NOT_FOUND", what.to_string()),
            Self::Internal(err) => {
                tracing::error!(error = %err, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "internal error".to_string(),
                )
            }
        };
        (status, Json(ErrorBody { error: message, code })).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

/// Build the API router over the given state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/ask", post(handle_ask))
        .route("/api/ask/sessions", get(handle_list_sessions))
        .route("/api/ask/sessions/{id}", get(handle_session_messages))
        .with_state(state)
}

async fn handle_ask(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
    let query_chars = request.query.chars().count();
    if query_chars == 0 || query_chars > 2000 {
        return Err(ApiError::Validation(
            "query must be between 1 and 2000 characters".to_string(),
        ));
    }

    let owner = &state.config.owner;
    tracing::info!(query_len = request.query.len(), "ask received");

    // Record the user turn before answering — transcript order is contractual
    let session_id = {
        let db = Arc::clone(&state.db);
        let user_id = owner.user_id.clone();
        let query = request.query.clone();
        let session_id = request.session_id.clone();
        tokio::task::spawn_blocking(move || -> anyhow::Result<String> {
            let conn = db
                .lock()
                .map_err(|e| anyhow::anyhow!("db lock poisoned: {e}"))?;
            let session_id =
                session::get_or_create_session(&conn, &user_id, session_id.as_deref())?;
            session::record_message(&conn, &session_id, Role::User, &query, &[])?;
            Ok(session_id)
        })
        .await
        .map_err(|e| anyhow::anyhow!("db task failed: {e}"))??
    };

    let outcome = ask::answer_query(
        state.store.as_ref(),
        state.generator.as_ref(),
        Utc::now(),
        &owner.user_id,
        &owner.display_name,
        &request.query,
    )
    .await?;

    // Record the assistant turn
    {
        let db = Arc::clone(&state.db);
        let session = session_id.clone();
        let answer = outcome.answer.clone();
        let sources = outcome.sources.clone();
        tokio::task::spawn_blocking(move || -> anyhow::Result<()> {
            let conn = db
                .lock()
                .map_err(|e| anyhow::anyhow!("db lock poisoned: {e}"))?;
            session::record_message(&conn, &session, Role::Assistant, &answer, &sources)?;
            Ok(())
        })
        .await
        .map_err(|e| anyhow::anyhow!("db task failed: {e}"))??;
    }

    Ok(Json(AskResponse {
        session_id,
        answer: outcome.answer,
        sources: outcome.sources,
        followups: outcome.followups,
    }))
}

async fn handle_list_sessions(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let db = Arc::clone(&state.db);
    let user_id = state.config.owner.user_id.clone();
    let sessions = tokio::task::spawn_blocking(move || -> anyhow::Result<_> {
        let conn = db
            .lock()
            .map_err(|e| anyhow::anyhow!("db lock poisoned: {e}"))?;
        session::list_sessions(&conn, &user_id)
    })
    .await
    .map_err(|e| anyhow::anyhow!("db task failed: {e}"))??;

    Ok(Json(serde_json::json!({ "sessions": sessions })))
}

async fn handle_session_messages(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let db = Arc::clone(&state.db);
    let user_id = state.config.owner.user_id.clone();
    let found = tokio::task::spawn_blocking(move || -> anyhow::Result<_> {
        let conn = db
            .lock()
            .map_err(|e| anyhow::anyhow!("db lock poisoned: {e}"))?;
        session::session_messages(&conn, &user_id, &id)
    })
    .await
    .map_err(|e| anyhow::anyhow!("db task failed: {e}"))??;

    match found {
        Some((session, messages)) => Ok(Json(serde_json::json!({
            "session": session,
            "messages": messages,
        }))),
        None => Err(ApiError::NotFound("session not found")),
    }
}

/// Start the HTTP server with the configured database and generator.
pub async fn serve(config: HindsightConfig) -> anyhow::Result<()> {
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);

    let db_path = config.resolved_db_path();
    let conn = db::open_database(&db_path)?;
    tracing::info!(db = %db_path.display(), "database ready");

    if config.generator.api_key.is_empty() {
        tracing::warn!("no generator API key configured — answers will use the fallback template");
    }

    let db = Arc::new(Mutex::new(conn));
    let generator: Arc<dyn AnswerGenerator> = Arc::new(
        GeminiGenerator::new(&config.generator)
            .map_err(|e| anyhow::anyhow!("failed to build generator client: {e}"))?,
    );
    let state = AppState::new(db, generator, Arc::new(config));

    let app = router(state);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "ask server listening at http://{bind_addr}/api/ask");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c()
                .await
                .expect("failed to listen for ctrl-c");
            tracing::info!("shutting down ask server");
        })
        .await?;

    Ok(())
}
