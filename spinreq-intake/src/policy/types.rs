//! Rule snapshot and candidate types
//!
//! These are plain values, deliberately decoupled from the database layer:
//! the evaluator only ever sees an immutable snapshot the caller assembled.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use spinreq_common::normalize_track_string;

/// Sentinel custom price meaning "deny this song"
pub const DENY_PRICE_CENTS: i64 = -1;

/// What to do when a rule triggers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RuleAction {
    Deny,
    PremiumPrice,
    #[default]
    Allow,
}

impl RuleAction {
    /// Parse the database representation. Unknown values fall back to
    /// Allow: a malformed rule must never deny a request on its own.
    pub fn from_db(s: &str) -> Self {
        match s {
            "deny" => RuleAction::Deny,
            "premium_price" => RuleAction::PremiumPrice,
            _ => RuleAction::Allow,
        }
    }

    pub fn as_db(&self) -> &'static str {
        match self {
            RuleAction::Deny => "deny",
            RuleAction::PremiumPrice => "premium_price",
            RuleAction::Allow => "allow",
        }
    }
}

/// A submitted request awaiting an admission decision. Ephemeral: the
/// evaluator never persists it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestCandidate {
    pub organization_id: String,
    pub song_title: String,
    pub song_artist: String,
    pub is_fast_track: bool,
    pub base_price_cents: i64,
    pub submitted_at: DateTime<Utc>,
}

/// A blacklisted (title, artist) pair. Matching is always case-insensitive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlacklistEntry {
    pub song_title: String,
    pub song_artist: String,
    pub normalized_title: String,
    pub normalized_artist: String,
    pub reason: Option<String>,
}

impl BlacklistEntry {
    pub fn new(title: &str, artist: &str, reason: Option<String>) -> Self {
        Self {
            song_title: title.to_string(),
            song_artist: artist.to_string(),
            normalized_title: normalize_track_string(title),
            normalized_artist: normalize_track_string(artist),
            reason,
        }
    }
}

/// An entry in the organization's music library (boundary list)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryEntry {
    pub song_title: String,
    pub song_artist: String,
    pub normalized_title: String,
    pub normalized_artist: String,
    pub genre: Option<String>,
    pub bpm: Option<i64>,
    pub key_signature: Option<String>,
    pub notes: Option<String>,
}

impl LibraryEntry {
    pub fn new(title: &str, artist: &str) -> Self {
        Self {
            song_title: title.to_string(),
            song_artist: artist.to_string(),
            normalized_title: normalize_track_string(title),
            normalized_artist: normalize_track_string(artist),
            genre: None,
            bpm: None,
            key_signature: None,
            notes: None,
        }
    }
}

/// A per-song pricing override. An exact match within the rule's
/// applicability scope replaces the computed price entirely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingOverrideRule {
    pub song_title: String,
    pub song_artist: String,
    pub normalized_title: String,
    pub normalized_artist: String,
    /// -1 = deny, 0 = free, >0 = fixed price
    pub custom_price_cents: i64,
    pub applies_to_fast_track: bool,
    pub applies_to_regular: bool,
    pub notes: Option<String>,
}

impl PricingOverrideRule {
    pub fn new(title: &str, artist: &str, custom_price_cents: i64) -> Self {
        Self {
            song_title: title.to_string(),
            song_artist: artist.to_string(),
            normalized_title: normalize_track_string(title),
            normalized_artist: normalize_track_string(artist),
            custom_price_cents,
            applies_to_fast_track: true,
            applies_to_regular: true,
            notes: None,
        }
    }

    /// Whether this rule covers the candidate's request type. A rule with
    /// both flags false applies to nothing.
    pub fn applies_to(&self, is_fast_track: bool) -> bool {
        if is_fast_track {
            self.applies_to_fast_track
        } else {
            self.applies_to_regular
        }
    }
}

/// Duplicate-detection configuration, one per organization.
/// `Default` is the safe "missing row" reading: feature off.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateDetectionConfig {
    pub enabled: bool,
    pub action: RuleAction,
    pub time_window_minutes: i64,
    pub premium_multiplier: f64,
    pub premium_fixed_cents: Option<i64>,
    pub match_by_exact_title: bool,
    pub match_by_exact_artist: bool,
    pub match_case_sensitive: bool,
}

impl Default for DuplicateDetectionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            action: RuleAction::Allow,
            time_window_minutes: 60,
            premium_multiplier: 1.0,
            premium_fixed_cents: None,
            match_by_exact_title: true,
            match_by_exact_artist: true,
            match_case_sensitive: false,
        }
    }
}

/// Library-boundary configuration, one per organization.
/// `Default` is the safe "missing row" reading: feature off.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryBoundaryConfig {
    pub enabled: bool,
    pub action: RuleAction,
    pub premium_multiplier: f64,
    pub premium_fixed_cents: Option<i64>,
}

impl Default for LibraryBoundaryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            action: RuleAction::Allow,
            premium_multiplier: 1.0,
            premium_fixed_cents: None,
        }
    }
}

/// A previously accepted request, as seen by duplicate detection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcceptedRequest {
    pub song_title: String,
    pub song_artist: String,
    pub accepted_at: DateTime<Utc>,
}

impl AcceptedRequest {
    pub fn new(title: &str, artist: &str, accepted_at: DateTime<Utc>) -> Self {
        Self {
            song_title: title.to_string(),
            song_artist: artist.to_string(),
            accepted_at,
        }
    }
}

/// One consistent read of an organization's rule set
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleSnapshot {
    pub blacklist: Vec<BlacklistEntry>,
    pub library: Vec<LibraryEntry>,
    pub pricing_overrides: Vec<PricingOverrideRule>,
    #[serde(default)]
    pub duplicate_config: DuplicateDetectionConfig,
    #[serde(default)]
    pub library_config: LibraryBoundaryConfig,
    /// Accepted requests within (at least) the duplicate time window
    pub recent_accepted: Vec<AcceptedRequest>,
}
