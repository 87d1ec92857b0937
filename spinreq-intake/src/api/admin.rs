//! Admin rule-management handlers
//!
//! Thin CRUD over the rule store. No pagination or sorting; organizations
//! keep these lists small by nature.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::AppState;
use crate::db::rules;
use crate::error::Result;
use crate::policy::{DuplicateDetectionConfig, LibraryBoundaryConfig};
use spinreq_common::db::models::{BlacklistRow, LibraryRow, PricingRuleRow};

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: String,
}

// ============================================================================
// Blacklist
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct AddBlacklistRequest {
    pub song_title: String,
    pub song_artist: String,
    pub reason: Option<String>,
}

pub async fn list_blacklist(
    State(state): State<AppState>,
    Path(org): Path<String>,
) -> Result<Json<Vec<BlacklistRow>>> {
    Ok(Json(rules::list_blacklist(&state.db, &org).await?))
}

pub async fn add_blacklist(
    State(state): State<AppState>,
    Path(org): Path<String>,
    Json(req): Json<AddBlacklistRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>)> {
    let id = rules::add_blacklist_entry(
        &state.db,
        &org,
        &req.song_title,
        &req.song_artist,
        req.reason.as_deref(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

pub async fn delete_blacklist(
    State(state): State<AppState>,
    Path((org, id)): Path<(String, String)>,
) -> Result<StatusCode> {
    rules::delete_blacklist_entry(&state.db, &org, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Music library (boundary list)
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct AddLibraryRequest {
    pub song_title: String,
    pub song_artist: String,
    pub genre: Option<String>,
    pub bpm: Option<i64>,
    pub key_signature: Option<String>,
    pub notes: Option<String>,
}

pub async fn list_library(
    State(state): State<AppState>,
    Path(org): Path<String>,
) -> Result<Json<Vec<LibraryRow>>> {
    Ok(Json(rules::list_library(&state.db, &org).await?))
}

pub async fn add_library(
    State(state): State<AppState>,
    Path(org): Path<String>,
    Json(req): Json<AddLibraryRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>)> {
    let id = rules::add_library_entry(
        &state.db,
        &org,
        &req.song_title,
        &req.song_artist,
        req.genre.as_deref(),
        req.bpm,
        req.key_signature.as_deref(),
        req.notes.as_deref(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

pub async fn delete_library(
    State(state): State<AppState>,
    Path((org, id)): Path<(String, String)>,
) -> Result<StatusCode> {
    rules::delete_library_entry(&state.db, &org, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Pricing overrides
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct AddPricingRuleRequest {
    pub song_title: String,
    pub song_artist: String,
    /// -1 = deny, 0 = free, >0 = fixed price
    pub custom_price_cents: i64,
    #[serde(default = "default_true")]
    pub applies_to_fast_track: bool,
    #[serde(default = "default_true")]
    pub applies_to_regular: bool,
    pub notes: Option<String>,
}

fn default_true() -> bool {
    true
}

pub async fn list_pricing_rules(
    State(state): State<AppState>,
    Path(org): Path<String>,
) -> Result<Json<Vec<PricingRuleRow>>> {
    Ok(Json(rules::list_pricing_rules(&state.db, &org).await?))
}

pub async fn add_pricing_rule(
    State(state): State<AppState>,
    Path(org): Path<String>,
    Json(req): Json<AddPricingRuleRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>)> {
    let id = rules::add_pricing_rule(
        &state.db,
        &org,
        &req.song_title,
        &req.song_artist,
        req.custom_price_cents,
        req.applies_to_fast_track,
        req.applies_to_regular,
        req.notes.as_deref(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

pub async fn delete_pricing_rule(
    State(state): State<AppState>,
    Path((org, id)): Path<(String, String)>,
) -> Result<StatusCode> {
    rules::delete_pricing_rule(&state.db, &org, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Singleton configs
// ============================================================================

pub async fn get_duplicate_rules(
    State(state): State<AppState>,
    Path(org): Path<String>,
) -> Result<Json<DuplicateDetectionConfig>> {
    Ok(Json(rules::get_duplicate_rules(&state.db, &org).await?))
}

pub async fn put_duplicate_rules(
    State(state): State<AppState>,
    Path(org): Path<String>,
    Json(config): Json<DuplicateDetectionConfig>,
) -> Result<Json<DuplicateDetectionConfig>> {
    rules::set_duplicate_rules(&state.db, &org, &config).await?;
    Ok(Json(config))
}

pub async fn get_library_settings(
    State(state): State<AppState>,
    Path(org): Path<String>,
) -> Result<Json<LibraryBoundaryConfig>> {
    Ok(Json(rules::get_library_settings(&state.db, &org).await?))
}

pub async fn put_library_settings(
    State(state): State<AppState>,
    Path(org): Path<String>,
    Json(config): Json<LibraryBoundaryConfig>,
) -> Result<Json<LibraryBoundaryConfig>> {
    rules::set_library_settings(&state.db, &org, &config).await?;
    Ok(Json(config))
}
