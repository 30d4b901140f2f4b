//! Reconciliation of crawled products against the reference catalog

mod matcher;
mod rules;

pub use matcher::{normalize_text, reconcile, same_text, Outcome};
pub use rules::MatchRules;
