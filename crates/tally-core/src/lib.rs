//! Tally Core Library
//!
//! The transaction classification and learning engine:
//! - Keyword rule set with confidence scoring
//! - Exact-history fallback matching
//! - Auto-apply policy gating unattended classification
//! - Append-only learning log of every human decision
//! - Batch propagation of corrections across repeated merchants
//! - CSV persistence for the transaction table

pub mod apply;
pub mod batch;
pub mod classify;
pub mod error;
pub mod history;
pub mod learning;
pub mod models;
pub mod rules;
pub mod store;

pub use apply::{auto_apply, classify_all, correct, fill_from_history, ClassificationSummary};
pub use batch::apply_to_matching;
pub use classify::{classify, historical_suggestion, AutoApplyPolicy, Suggestion};
pub use error::{Error, Result};
pub use history::HistoryIndex;
pub use learning::{Choice, ChoiceKind, Recorder, Session};
pub use models::{
    duplicate_groups, integrity_violations, Bank, FlowDirection, IntegrityIssue, Transaction,
    UNCATEGORIZED,
};
pub use rules::{Rule, RuleFlow, RuleSet};
