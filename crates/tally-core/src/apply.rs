//! Whole-table passes and single-row correction
//!
//! These operations drive the classifier over a loaded transaction table:
//! an initial bulk classification, the threshold-gated auto-apply pass,
//! the exact-history fill pass, and the manual correction that feeds the
//! learning log. Auto passes deliberately do not write learning entries;
//! the log captures human decisions only.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::classify::{classify, historical_suggestion, AutoApplyPolicy};
use crate::error::{Error, Result};
use crate::history::HistoryIndex;
use crate::learning::Recorder;
use crate::models::{Transaction, UNCATEGORIZED};
use crate::rules::RuleSet;

/// Audit notes written into the transaction table
pub const NOTE_CLASSIFIED: &str = "classified automatically";
pub const NOTE_NEEDS_REVIEW: &str = "needs manual review";
pub const NOTE_AUTO_RULES: &str = "auto-applied (rules)";
pub const NOTE_AUTO_HISTORY: &str = "auto-applied (history)";
pub const NOTE_MANUAL: &str = "validated manually";

/// Outcome of a bulk classification pass
#[derive(Debug, Clone)]
pub struct ClassificationSummary {
    pub total: usize,
    pub classified: usize,
    pub needs_review: usize,
    /// Assigned categories and how many rows each received
    pub by_category: BTreeMap<String, usize>,
}

/// Classify every transaction in place, overwriting prior categories.
pub fn classify_all(transactions: &mut [Transaction], rules: &RuleSet) -> ClassificationSummary {
    let mut summary = ClassificationSummary {
        total: transactions.len(),
        classified: 0,
        needs_review: 0,
        by_category: BTreeMap::new(),
    };

    for transaction in transactions.iter_mut() {
        let suggestion = classify(transaction, rules);
        match suggestion.category {
            Some(category) => {
                *summary.by_category.entry(category.clone()).or_insert(0) += 1;
                transaction.category = Some(category);
                transaction.confidence = suggestion.confidence;
                transaction.note = Some(NOTE_CLASSIFIED.to_string());
                summary.classified += 1;
            }
            None => {
                transaction.category = Some(UNCATEGORIZED.to_string());
                transaction.confidence = 0.0;
                transaction.note = Some(NOTE_NEEDS_REVIEW.to_string());
                summary.needs_review += 1;
            }
        }
    }

    info!(
        total = summary.total,
        classified = summary.classified,
        needs_review = summary.needs_review,
        "bulk classification finished"
    );

    summary
}

/// Apply rule suggestions to still-uncategorized rows when the policy
/// allows it. Returns the number of rows filled.
pub fn auto_apply(
    transactions: &mut [Transaction],
    rules: &RuleSet,
    policy: &AutoApplyPolicy,
) -> usize {
    let mut applied = 0;
    for transaction in transactions.iter_mut() {
        if !transaction.is_uncategorized() {
            continue;
        }
        let suggestion = classify(transaction, rules);
        if policy.should_apply(&suggestion) {
            transaction.category = suggestion.category;
            transaction.confidence = suggestion.confidence;
            transaction.note = Some(NOTE_AUTO_RULES.to_string());
            applied += 1;
        }
    }

    debug!(applied, threshold = policy.threshold(), "auto-apply pass");
    applied
}

/// Fill still-uncategorized rows from exact historical matches.
/// Returns the number of rows filled.
pub fn fill_from_history(transactions: &mut [Transaction], index: &HistoryIndex) -> usize {
    let mut applied = 0;
    for transaction in transactions.iter_mut() {
        if !transaction.is_uncategorized() {
            continue;
        }
        let suggestion = historical_suggestion(transaction, index);
        if let Some(category) = suggestion.category {
            transaction.category = Some(category);
            transaction.confidence = suggestion.confidence;
            transaction.note = Some(NOTE_AUTO_HISTORY.to_string());
            applied += 1;
        }
    }

    debug!(applied, "history fill pass");
    applied
}

/// Manually set one row's category, recording the decision.
///
/// Returns false without touching the log when the row already carries
/// `new_category`.
pub fn correct(
    transactions: &mut [Transaction],
    index: usize,
    new_category: &str,
    rules: &RuleSet,
    recorder: &mut Recorder,
) -> Result<bool> {
    let transaction = transactions
        .get_mut(index)
        .ok_or_else(|| Error::NotFound(format!("transaction #{}", index)))?;

    if transaction.category.as_deref() == Some(new_category) {
        return Ok(false);
    }

    let suggestion = classify(transaction, rules);
    let previous = transaction.category.take();

    transaction.category = Some(new_category.to_string());
    transaction.note = Some(NOTE_MANUAL.to_string());

    recorder.record(transaction, previous.as_deref(), new_category, &suggestion)?;
    Ok(true)
}
