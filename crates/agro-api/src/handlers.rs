//! Route handler functions for all API endpoints.
//!
//! Each handler extracts path parameters and JSON bodies via axum extractors,
//! locks the session for the whole interaction, runs it through the advisor
//! and returns JSON responses.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use agro_chat::{Answer, TranscriptEntry};
use agro_core::config::TranscriptOrder;
use agro_core::types::CropSelection;

use crate::error::ApiError;
use crate::page::PAGE_HTML;
use crate::state::{AppState, SessionSlot, StoredSession};

// =============================================================================
// Request types
// =============================================================================

/// Body for PUT /api/sessions/{id}/crop.
#[derive(Debug, Deserialize)]
pub struct SelectCropRequest {
    /// "cassava", "yam", "maize" or "all".
    pub crop: String,
}

/// Body for POST /api/sessions/{id}/ask.
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

// =============================================================================
// Response types
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct IndexSize {
    pub crop: CropSelection,
    pub passages: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub policy: String,
    pub open_sessions: usize,
    pub indexes: Vec<IndexSize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CropOption {
    pub value: CropSelection,
    pub label: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CropsResponse {
    pub crops: Vec<CropOption>,
}

/// A session as the page renders it. `transcript` is in display order.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub selected_crop: Option<CropSelection>,
    pub greeted: bool,
    pub question_count: usize,
    pub transcript_order: TranscriptOrder,
    pub transcript: Vec<TranscriptEntry>,
}

impl SessionView {
    fn new(id: Uuid, session: &StoredSession, order: TranscriptOrder) -> Self {
        Self {
            id,
            created_at: session.created_at,
            selected_crop: session.state.selected_crop,
            greeted: session.state.greeted,
            question_count: session.state.question_count(),
            transcript_order: order,
            transcript: session.state.display(order).into_iter().cloned().collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    /// `null` when the question was blank.
    pub answer: Option<Answer>,
    pub session: SessionView,
}

// =============================================================================
// Helpers
// =============================================================================

fn parse_session_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest(format!("Invalid session id: '{}'", raw)))
}

fn session_slot(state: &AppState, id: &Uuid) -> Result<SessionSlot, ApiError> {
    state
        .sessions
        .slot(id)
        .ok_or_else(|| ApiError::NotFound(format!("Session {} not found", id)))
}

fn display_order(state: &AppState) -> TranscriptOrder {
    state.advisor.settings().transcript_order
}

// =============================================================================
// Handlers
// =============================================================================

/// GET / - serve the single-page advisor.
pub async fn page() -> impl IntoResponse {
    Html(PAGE_HTML)
}

/// GET /health - health check with index sizes.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let indexes = state
        .advisor
        .indexes()
        .sizes()
        .into_iter()
        .map(|(crop, passages)| IndexSize { crop, passages })
        .collect();

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        policy: state.advisor.policy_name().to_string(),
        open_sessions: state.sessions.len(),
        indexes,
    })
}

/// GET /api/crops - the crop selector options.
pub async fn crops() -> Json<CropsResponse> {
    let crops = CropSelection::options()
        .into_iter()
        .map(|value| CropOption {
            value,
            label: value.label().to_string(),
        })
        .collect();
    Json(CropsResponse { crops })
}

/// POST /api/sessions - open a session.
pub async fn create_session(State(state): State<AppState>) -> impl IntoResponse {
    let (id, session) = state.sessions.create();
    tracing::info!(session = %id, "Session opened");
    (
        StatusCode::CREATED,
        Json(SessionView::new(id, &session, display_order(&state))),
    )
}

/// GET /api/sessions/{id}
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let id = parse_session_id(&id)?;
    let slot = session_slot(&state, &id)?;
    let session = slot.lock().await;
    Ok(Json(SessionView::new(id, &session, display_order(&state))))
}

/// DELETE /api/sessions/{id}
pub async fn end_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_session_id(&id)?;
    if state.sessions.remove(&id) {
        tracing::info!(session = %id, "Session ended");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Session {} not found", id)))
    }
}

/// PUT /api/sessions/{id}/crop
pub async fn select_crop(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SelectCropRequest>,
) -> Result<Json<SessionView>, ApiError> {
    let id = parse_session_id(&id)?;
    let selection: CropSelection = req
        .crop
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Unknown crop: '{}'", req.crop)))?;

    let slot = session_slot(&state, &id)?;
    let mut session = slot.lock().await;
    if !state.sessions.contains(&id) {
        return Err(ApiError::NotFound(format!("Session {} not found", id)));
    }
    session.state = state.advisor.select_crop(&session.state, selection);
    Ok(Json(SessionView::new(id, &session, display_order(&state))))
}

/// POST /api/sessions/{id}/ask
///
/// A blank question is accepted and ignored: 200 with `answer: null`.
/// Asks against one session wait for each other; each sees the transcript
/// left by the one before.
pub async fn ask(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
    let id = parse_session_id(&id)?;
    let slot = session_slot(&state, &id)?;
    let mut session = slot.lock().await;

    let interaction = state.advisor.ask(&session.state, &req.question).await?;

    // The session may have been ended while the advisor was working.
    if interaction.answer.is_some() && !state.sessions.contains(&id) {
        return Err(ApiError::NotFound(format!("Session {} ended", id)));
    }
    session.state = interaction.state;

    Ok(Json(AskResponse {
        answer: interaction.answer,
        session: SessionView::new(id, &session, display_order(&state)),
    }))
}
