//! Request admission and pricing evaluator
//!
//! Pure decision function: no I/O, no shared state, signals only through
//! the returned [`Decision`]. Rules apply in strict precedence order and
//! the first decisive rule wins:
//!
//! 1. Blacklist (always deny, beats everything)
//! 2. Pricing override (replaces the price outright, or denies at -1)
//! 3. Library boundary (only when enabled, only for out-of-library songs)
//! 4. Duplicate detection (only when enabled)
//!
//! Library and duplicate premiums are the one composing pair: when both
//! trigger, the duplicate multiplier applies on top of the
//! library-adjusted price.

use chrono::{DateTime, Duration, Utc};
use spinreq_common::normalize::{normalize_track_string, normalize_with_case};

use super::decision::{Adjustment, Decision, Outcome};
use super::types::{
    DuplicateDetectionConfig, RequestCandidate, RuleAction, RuleSnapshot, DENY_PRICE_CENTS,
};

/// Evaluate a candidate against an organization's rule snapshot.
///
/// Idempotent: identical inputs always produce the identical decision.
pub fn evaluate(candidate: &RequestCandidate, snapshot: &RuleSnapshot) -> Decision {
    let title = normalize_track_string(&candidate.song_title);
    let artist = normalize_track_string(&candidate.song_artist);

    // 1. Blacklist: terminal deny, price zeroed
    if let Some(entry) = snapshot
        .blacklist
        .iter()
        .find(|e| e.normalized_title == title && e.normalized_artist == artist)
    {
        return Decision::deny(
            0,
            vec![Adjustment::Blacklisted {
                reason: entry.reason.clone(),
            }],
        );
    }

    // 2. Pricing override: terminal either way, skips steps 3 and 4
    if let Some(rule) = snapshot.pricing_overrides.iter().find(|r| {
        r.normalized_title == title
            && r.normalized_artist == artist
            && r.applies_to(candidate.is_fast_track)
    }) {
        if rule.custom_price_cents == DENY_PRICE_CENTS {
            return Decision::deny(candidate.base_price_cents, vec![Adjustment::OverrideDenied]);
        }
        return Decision::allow(
            rule.custom_price_cents,
            vec![Adjustment::PriceOverride {
                price_cents: rule.custom_price_cents,
            }],
        );
    }

    let mut price = candidate.base_price_cents;
    let mut reasons = Vec::new();

    // 3. Library boundary: applies only to songs absent from the library
    let lib = &snapshot.library_config;
    if lib.enabled {
        let in_library = snapshot
            .library
            .iter()
            .any(|e| e.normalized_title == title && e.normalized_artist == artist);

        if !in_library {
            match lib.action {
                RuleAction::Deny => {
                    return Decision::deny(price, vec![Adjustment::OutOfLibraryDenied]);
                }
                RuleAction::PremiumPrice => {
                    price = apply_premium(price, lib.premium_multiplier, lib.premium_fixed_cents);
                    reasons.push(Adjustment::OutOfLibraryPremium { price_cents: price });
                }
                RuleAction::Allow => {}
            }
        }
    }

    // 4. Duplicate detection: multiplier applies to the step-3-adjusted price
    let dup = &snapshot.duplicate_config;
    if dup.enabled {
        if let Some(minutes_ago) = find_duplicate(candidate, snapshot) {
            match dup.action {
                RuleAction::Deny => {
                    reasons.push(Adjustment::DuplicateDenied { minutes_ago });
                    return Decision {
                        outcome: Outcome::Deny,
                        final_price_cents: price,
                        reasons,
                    };
                }
                RuleAction::PremiumPrice => {
                    price = apply_premium(price, dup.premium_multiplier, dup.premium_fixed_cents);
                    reasons.push(Adjustment::DuplicatePremium {
                        price_cents: price,
                        minutes_ago,
                    });
                }
                RuleAction::Allow => {}
            }
        }
    }

    Decision::allow(price, reasons)
}

/// Scan prior accepted requests for a duplicate, honoring the config's
/// match flags. Returns the age of the most recent match in whole minutes.
///
/// Window bounds are inclusive below, exclusive above:
/// `submitted_at - window <= accepted_at < submitted_at`.
fn find_duplicate(candidate: &RequestCandidate, snapshot: &RuleSnapshot) -> Option<i64> {
    let cfg = &snapshot.duplicate_config;

    // With neither field required to match, the rule has no matching
    // criterion and does not apply.
    if !cfg.match_by_exact_title && !cfg.match_by_exact_artist {
        return None;
    }

    let title = normalize_with_case(&candidate.song_title, cfg.match_case_sensitive);
    let artist = normalize_with_case(&candidate.song_artist, cfg.match_case_sensitive);

    let window_start = candidate.submitted_at - Duration::minutes(cfg.time_window_minutes);

    snapshot
        .recent_accepted
        .iter()
        .filter(|prior| {
            in_window(prior.accepted_at, window_start, candidate.submitted_at)
                && field_matches(cfg, &title, &prior.song_title, cfg.match_by_exact_title)
                && field_matches(cfg, &artist, &prior.song_artist, cfg.match_by_exact_artist)
        })
        .map(|prior| (candidate.submitted_at - prior.accepted_at).num_minutes())
        .min()
}

fn in_window(t: DateTime<Utc>, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
    t >= start && t < end
}

fn field_matches(
    cfg: &DuplicateDetectionConfig,
    candidate_norm: &str,
    prior_raw: &str,
    required: bool,
) -> bool {
    if !required {
        return true;
    }
    normalize_with_case(prior_raw, cfg.match_case_sensitive) == candidate_norm
}

/// Apply a premium adjustment. A fixed price replaces the computed value
/// outright; otherwise the multiplier rounds half-up to the nearest cent.
/// Multiplier rules pass a base of zero or less through unchanged.
fn apply_premium(base_cents: i64, multiplier: f64, fixed_cents: Option<i64>) -> i64 {
    if let Some(fixed) = fixed_cents {
        return fixed;
    }
    if base_cents <= 0 {
        return base_cents;
    }
    round_half_up(base_cents as f64 * multiplier)
}

fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}
