//! Request intake handlers
//!
//! The intake flow: validate the submission, fetch a rule snapshot, run the
//! pure evaluator, layer on caller-side add-ons, and (for real submissions)
//! persist the accepted request. A denial is a domain answer, not an HTTP
//! error: both handlers return 200 with `outcome: "deny"`.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::AppState;
use crate::db;
use crate::error::{Error, Result};
use crate::policy::{self, Decision, RequestCandidate};
use crate::pricing::{self, Quote};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub organization_id: String,
    pub song_title: String,
    pub song_artist: String,
    #[serde(default)]
    pub is_fast_track: bool,
    pub base_price_cents: i64,
    /// Total songs in the submission this request belongs to; drives the
    /// bundle discount. Defaults to a single-song submission.
    #[serde(default = "default_songs_in_submission")]
    pub songs_in_submission: u32,
}

fn default_songs_in_submission() -> u32 {
    1
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub decision: Decision,
    /// Present only when the request was admitted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote: Option<Quote>,
    /// Persisted request id; absent for quotes and denials
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/requests/quote - evaluate without persisting (dry run)
pub async fn quote(
    State(state): State<AppState>,
    Json(req): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>> {
    let candidate = validate(req.clone_for_candidate())?;
    let snapshot = db::rules::load_snapshot(&state.db, &candidate.organization_id, candidate.submitted_at).await?;

    let decision = policy::evaluate(&candidate, &snapshot);
    let quote = quote_if_allowed(&state, &decision, &candidate, req.songs_in_submission).await?;

    Ok(Json(SubmitResponse {
        decision,
        quote,
        request_id: None,
    }))
}

/// POST /api/v1/requests - evaluate and, when admitted, persist
pub async fn submit(
    State(state): State<AppState>,
    Json(req): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>> {
    let candidate = validate(req.clone_for_candidate())?;
    let snapshot = db::rules::load_snapshot(&state.db, &candidate.organization_id, candidate.submitted_at).await?;

    let decision = policy::evaluate(&candidate, &snapshot);

    if !decision.is_allowed() {
        info!(
            organization = %candidate.organization_id,
            title = %candidate.song_title,
            "Request denied: {:?}",
            decision.reasons
        );
        return Ok(Json(SubmitResponse {
            decision,
            quote: None,
            request_id: None,
        }));
    }

    let quote = quote_if_allowed(&state, &decision, &candidate, req.songs_in_submission).await?;
    let request_id = db::requests::record_accepted(&state.db, &candidate, decision.final_price_cents).await?;

    info!(
        organization = %candidate.organization_id,
        title = %candidate.song_title,
        price_cents = decision.final_price_cents,
        "Request accepted: {}",
        request_id
    );

    Ok(Json(SubmitResponse {
        decision,
        quote,
        request_id: Some(request_id),
    }))
}

// ============================================================================
// Helpers
// ============================================================================

impl SubmitRequest {
    fn clone_for_candidate(&self) -> RequestCandidate {
        RequestCandidate {
            organization_id: self.organization_id.clone(),
            song_title: self.song_title.clone(),
            song_artist: self.song_artist.clone(),
            is_fast_track: self.is_fast_track,
            base_price_cents: self.base_price_cents,
            submitted_at: spinreq_common::time::now(),
        }
    }
}

/// Input validation the evaluator assumes has already happened
fn validate(candidate: RequestCandidate) -> Result<RequestCandidate> {
    if candidate.organization_id.trim().is_empty() {
        return Err(Error::BadRequest("organization_id must not be empty".into()));
    }
    if candidate.song_title.trim().is_empty() {
        return Err(Error::BadRequest("song_title must not be empty".into()));
    }
    if candidate.song_artist.trim().is_empty() {
        return Err(Error::BadRequest("song_artist must not be empty".into()));
    }
    if candidate.base_price_cents < 0 {
        return Err(Error::BadRequest("base_price_cents must not be negative".into()));
    }
    Ok(candidate)
}

async fn quote_if_allowed(
    state: &AppState,
    decision: &Decision,
    candidate: &RequestCandidate,
    songs_in_submission: u32,
) -> Result<Option<Quote>> {
    if !decision.is_allowed() {
        return Ok(None);
    }
    let addons = db::settings::get_addon_settings(&state.db).await?;
    Ok(Some(pricing::build_quote(
        decision.final_price_cents,
        candidate.is_fast_track,
        songs_in_submission,
        &addons,
    )))
}
