//! Request admission and pricing policy
//!
//! The decision core of the service: a pure function of
//! (request candidate, organization rule snapshot) that answers
//! {allow | deny, final price, ordered reasons}.
//!
//! The snapshot is an immutable value assembled by the caller (see
//! `db::rules::load_snapshot`); evaluation performs no I/O, cannot fail at
//! runtime, and may be invoked concurrently for unrelated requests without
//! coordination.

pub mod decision;
pub mod evaluator;
pub mod types;

pub use decision::{Adjustment, Decision, Outcome};
pub use evaluator::evaluate;
pub use types::{
    AcceptedRequest, BlacklistEntry, DuplicateDetectionConfig, LibraryBoundaryConfig, LibraryEntry,
    PricingOverrideRule, RequestCandidate, RuleAction, RuleSnapshot,
};
