//! Database row models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BlacklistRow {
    pub id: String,
    pub organization_id: String,
    pub song_title: String,
    pub song_artist: String,
    pub normalized_title: String,
    pub normalized_artist: String,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LibraryRow {
    pub id: String,
    pub organization_id: String,
    pub song_title: String,
    pub song_artist: String,
    pub normalized_title: String,
    pub normalized_artist: String,
    pub genre: Option<String>,
    pub bpm: Option<i64>,
    pub key_signature: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PricingRuleRow {
    pub id: String,
    pub organization_id: String,
    pub song_title: String,
    pub song_artist: String,
    pub normalized_title: String,
    pub normalized_artist: String,
    pub custom_price_cents: i64,
    pub applies_to_fast_track: bool,
    pub applies_to_regular: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct DuplicateRulesRow {
    pub organization_id: String,
    pub enabled: bool,
    pub action: String,
    pub time_window_minutes: i64,
    pub premium_multiplier: f64,
    pub premium_fixed_cents: Option<i64>,
    pub match_by_exact_title: bool,
    pub match_by_exact_artist: bool,
    pub match_case_sensitive: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CrowdRequestRow {
    pub id: String,
    pub organization_id: String,
    pub song_title: String,
    pub song_artist: String,
    pub normalized_title: String,
    pub normalized_artist: String,
    pub is_fast_track: bool,
    pub base_price_cents: i64,
    pub final_price_cents: i64,
    pub accepted_at: DateTime<Utc>,
}
