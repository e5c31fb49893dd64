//! HTTP handlers for listing, voting and reset.
//!
//! Bodies are parsed by hand from raw bytes so that a missing or mistyped
//! field maps to the vote taxonomy (`InvalidEntryId`, `InvalidIdentity`)
//! instead of a generic extractor rejection. The identity is normalized
//! here too, so a bad email never reaches storage.

use crate::error::ApiError;
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use votebox_core::{Entry, EntryId, Identity, IdentityError, VoteError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteRequest {
    pub id: EntryId,
    pub identity: Identity,
}

impl VoteRequest {
    /// Parses `{ "id": <integer>, "email": <string> }`, checking `id` first.
    pub fn from_body(body: &[u8]) -> Result<Self, ApiError> {
        let value = parse_json(body)?;
        let id = value
            .get("id")
            .and_then(Value::as_i64)
            .ok_or(ApiError::Vote(VoteError::InvalidEntryId))?;
        let email = value
            .get("email")
            .and_then(Value::as_str)
            .ok_or(ApiError::Vote(VoteError::InvalidIdentity(
                IdentityError::Missing,
            )))?;
        let identity = Identity::parse(email).map_err(VoteError::from)?;
        Ok(Self { id, identity })
    }
}

#[derive(Debug, Serialize)]
pub struct VoteResponse {
    pub ok: bool,
    pub project: Option<Entry>,
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub ok: bool,
}

pub async fn projects_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Entry>>, ApiError> {
    let entries = run_blocking(&state, |state| state.list_entries()).await?;
    Ok(Json(entries))
}

pub async fn vote_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<VoteResponse>, ApiError> {
    let request = VoteRequest::from_body(&body)?;
    let (_, project) = run_blocking(&state, move |state| {
        state.cast_vote(request.id, &request.identity)
    })
    .await?;
    Ok(Json(VoteResponse { ok: true, project }))
}

pub async fn reset_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ResetResponse>, ApiError> {
    // A missing secret or unreadable body is checked like a wrong secret.
    let secret = parse_json(&body)
        .ok()
        .and_then(|value| value.get("secret").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_default();
    run_blocking(&state, move |state| state.reset(&secret)).await?;
    Ok(Json(ResetResponse { ok: true }))
}

fn parse_json(body: &[u8]) -> Result<Value, ApiError> {
    serde_json::from_slice(body).map_err(|_| ApiError::MalformedPayload)
}

/// Runs SQLite work off the async executor.
async fn run_blocking<T, F>(state: &Arc<AppState>, work: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&AppState) -> Result<T, ApiError> + Send + 'static,
{
    let state = Arc::clone(state);
    tokio::task::spawn_blocking(move || work(&state))
        .await
        .map_err(|err| ApiError::Internal(format!("blocking task failed: {err}")))?
}
