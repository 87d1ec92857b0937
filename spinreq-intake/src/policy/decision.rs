//! Admission decision types

use serde::{Deserialize, Serialize};

/// Final admission outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Allow,
    Deny,
}

/// An applied rule, in the order the evaluator applied it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Adjustment {
    /// Blacklist hit; always terminal
    Blacklisted { reason: Option<String> },
    /// Pricing override with custom_price_cents = -1
    OverrideDenied,
    /// Pricing override set the final price outright
    PriceOverride { price_cents: i64 },
    /// Candidate not in the library, boundary action = deny
    OutOfLibraryDenied,
    /// Candidate not in the library, boundary action = premium_price
    OutOfLibraryPremium { price_cents: i64 },
    /// Duplicate within the window, action = deny
    DuplicateDenied { minutes_ago: i64 },
    /// Duplicate within the window, action = premium_price
    DuplicatePremium { price_cents: i64, minutes_ago: i64 },
}

/// The evaluator's answer: outcome, final price, and the ordered list of
/// rules that fired. An empty reason list means the base price survived
/// untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub outcome: Outcome,
    pub final_price_cents: i64,
    pub reasons: Vec<Adjustment>,
}

impl Decision {
    pub fn allow(final_price_cents: i64, reasons: Vec<Adjustment>) -> Self {
        Self {
            outcome: Outcome::Allow,
            final_price_cents,
            reasons,
        }
    }

    pub fn deny(final_price_cents: i64, reasons: Vec<Adjustment>) -> Self {
        Self {
            outcome: Outcome::Deny,
            final_price_cents,
            reasons,
        }
    }

    pub fn is_allowed(&self) -> bool {
        self.outcome == Outcome::Allow
    }
}
