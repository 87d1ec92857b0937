//! Caller-side pricing add-ons
//!
//! Fast-track fee and bundle discount are additive line items layered on
//! top of the evaluator's decision by the intake flow. They are orthogonal
//! to admission: the evaluator never sees them.

use serde::{Deserialize, Serialize};

/// Add-on knobs, loaded from the settings table
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AddonSettings {
    /// Flat fee added to fast-track requests
    pub fast_track_fee_cents: i64,
    /// Percentage off the summed quote for multi-song submissions (0-100)
    pub bundle_discount_percent: i64,
}

impl Default for AddonSettings {
    fn default() -> Self {
        Self {
            fast_track_fee_cents: 1000,
            bundle_discount_percent: 0,
        }
    }
}

/// An itemized quote for an admitted request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// The evaluator's final price
    pub admission_price_cents: i64,
    /// Fast-track fee, zero when not fast-tracked
    pub fast_track_fee_cents: i64,
    /// Bundle discount, zero for single-song submissions
    pub bundle_discount_cents: i64,
    /// Sum of the above, floored at zero
    pub total_cents: i64,
}

/// Build the itemized quote for one admitted song.
///
/// `songs_in_submission` is the size of the whole submission; the bundle
/// discount only applies when it exceeds one.
pub fn build_quote(
    admission_price_cents: i64,
    is_fast_track: bool,
    songs_in_submission: u32,
    settings: &AddonSettings,
) -> Quote {
    let fast_track_fee_cents = if is_fast_track {
        settings.fast_track_fee_cents
    } else {
        0
    };

    let subtotal = admission_price_cents + fast_track_fee_cents;

    let bundle_discount_cents = if songs_in_submission > 1 && subtotal > 0 {
        let percent = settings.bundle_discount_percent.clamp(0, 100);
        round_half_up(subtotal as f64 * percent as f64 / 100.0)
    } else {
        0
    };

    Quote {
        admission_price_cents,
        fast_track_fee_cents,
        bundle_discount_cents,
        total_cents: (subtotal - bundle_discount_cents).max(0),
    }
}

fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}
