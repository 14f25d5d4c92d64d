//! Axum REST API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::db;
use crate::digest;
use crate::errors::{IndexerError, Result};
use crate::events::EventRecord;
use crate::projection::{self, AuditSummary};

#[derive(Clone)]
pub struct ApiState {
    pub pool: SqlitePool,
}

pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/events", get(get_all_events))
        .route("/audits/:id/events", get(get_audit_events))
        .route("/audits/:id/summary", get(get_audit_summary))
        .route("/projects/:address/audits", get(get_project_audits))
        .route("/digest/code", post(code_digest))
        .route("/digest/finding", post(finding_digest))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ─────────────────────────────────────────────────────────
// Request / response shapes
// ─────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct EventsResponse {
    pub audit_id: u64,
    pub count: usize,
    pub events: Vec<EventRecord>,
}

#[derive(Serialize)]
pub struct AllEventsResponse {
    pub count: usize,
    pub events: Vec<EventRecord>,
}

#[derive(Serialize)]
pub struct ProjectAuditsResponse {
    pub project: String,
    pub audit_ids: Vec<u64>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Deserialize)]
pub struct CodeDigestRequest {
    pub contract_uri: String,
    #[serde(default)]
    pub bytecode: Option<String>,
}

#[derive(Serialize)]
pub struct CodeDigestResponse {
    pub code_hash: String,
}

#[derive(Deserialize)]
pub struct FindingDigestRequest {
    pub title: String,
    pub description: String,
}

#[derive(Serialize)]
pub struct FindingDigestResponse {
    pub finding_hash: String,
}

// ─────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /events`
///
/// Returns all indexed events across all audits.
pub async fn get_all_events(State(state): State<Arc<ApiState>>) -> Result<Json<AllEventsResponse>> {
    let events = db::get_all_events(&state.pool).await?;
    Ok(Json(AllEventsResponse {
        count: events.len(),
        events,
    }))
}

/// `GET /audits/:id/events`
pub async fn get_audit_events(
    State(state): State<Arc<ApiState>>,
    Path(audit_id): Path<u64>,
) -> Result<Json<EventsResponse>> {
    let events = db::get_events_for_audit(&state.pool, &audit_id.to_string()).await?;
    Ok(Json(EventsResponse {
        audit_id,
        count: events.len(),
        events,
    }))
}

/// `GET /audits/:id/summary`
///
/// Folds the audit's events into an [`AuditSummary`]; 404 when nothing has
/// been indexed for it.
pub async fn get_audit_summary(
    State(state): State<Arc<ApiState>>,
    Path(audit_id): Path<u64>,
) -> Result<Json<AuditSummary>> {
    let events = db::get_events_for_audit(&state.pool, &audit_id.to_string()).await?;
    projection::summarize(audit_id, &events)
        .map(Json)
        .ok_or_else(|| IndexerError::NotFound(format!("audit {audit_id}")))
}

/// `GET /projects/:address/audits`
pub async fn get_project_audits(
    State(state): State<Arc<ApiState>>,
    Path(project): Path<String>,
) -> Result<Json<ProjectAuditsResponse>> {
    let audit_ids = db::get_project_audit_ids(&state.pool, &project).await?;
    Ok(Json(ProjectAuditsResponse { project, audit_ids }))
}

/// `POST /digest/code`
pub async fn code_digest(Json(req): Json<CodeDigestRequest>) -> Result<Json<CodeDigestResponse>> {
    let code_hash = digest::code_hash(&req.contract_uri, req.bytecode.as_deref())?;
    Ok(Json(CodeDigestResponse { code_hash }))
}

/// `POST /digest/finding`
pub async fn finding_digest(Json(req): Json<FindingDigestRequest>) -> Json<FindingDigestResponse> {
    Json(FindingDigestResponse {
        finding_hash: digest::finding_hash(&req.title, &req.description),
    })
}
