//! The classifier: greedy best-match scan over the rule set
//!
//! Each rule is tested keyword by keyword; the first keyword found in the
//! description accepts the rule as a candidate and no further keywords of
//! that rule are tested. The candidate's confidence is the rule's base
//! confidence plus a fixed bonus when the amount sits near one of the
//! rule's typical amounts. The single best candidate wins; ties keep the
//! earliest-declared rule. This is deliberately not a scored ensemble;
//! reference categorizations depend on this exact tie-break.

use tracing::trace;

use crate::error::{Error, Result};
use crate::history::HistoryIndex;
use crate::models::Transaction;
use crate::rules::RuleSet;

/// Relative tolerance for the typical-amount bonus.
pub const AMOUNT_TOLERANCE: f64 = 0.15;

/// Confidence bonus when the amount matches a typical amount.
pub const AMOUNT_BONUS: f64 = 0.10;

/// Confidence assigned to exact historical matches.
pub const HISTORY_CONFIDENCE: f64 = 0.95;

/// A classification suggestion: best category, or none with confidence 0
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub category: Option<String>,
    pub confidence: f64,
}

impl Suggestion {
    pub fn none() -> Self {
        Self {
            category: None,
            confidence: 0.0,
        }
    }

    pub fn is_match(&self) -> bool {
        self.category.is_some()
    }
}

/// Score a transaction against the rule set.
///
/// Returns the best-matching rule's category and confidence, or an empty
/// suggestion when no rule matches.
pub fn classify(transaction: &Transaction, rules: &RuleSet) -> Suggestion {
    let description = transaction.normalized_description();
    let flow = transaction.flow();

    let mut best = Suggestion::none();

    for rule in rules.rules() {
        if !rule.flow.matches(flow) {
            continue;
        }

        let matched = rule
            .keywords
            .iter()
            .any(|keyword| description.contains(&keyword.to_lowercase()));
        if !matched {
            continue;
        }

        let mut confidence = rule.confidence;
        if amount_is_typical(transaction.amount, &rule.typical_amounts) {
            confidence += AMOUNT_BONUS;
        }

        trace!(rule = %rule.id, confidence, "rule candidate");

        // Strictly greater: equal-confidence ties keep the earlier rule
        if confidence > best.confidence {
            best = Suggestion {
                category: Some(rule.category.clone()),
                confidence,
            };
        }
    }

    best
}

/// Whether `amount` is within the relative tolerance of any typical amount.
///
/// The denominator is the typical amount itself, floored to avoid division
/// by zero on a zero reference value.
fn amount_is_typical(amount: f64, typical_amounts: &[f64]) -> bool {
    typical_amounts
        .iter()
        .any(|&typical| (amount - typical).abs() / typical.max(0.01) < AMOUNT_TOLERANCE)
}

/// Exact-match fallback against previously validated descriptions.
///
/// A distinct suggestion channel from [`classify`]: consulted by explicit
/// user or batch action, never fused into the rule scan.
pub fn historical_suggestion(transaction: &Transaction, index: &HistoryIndex) -> Suggestion {
    match index.lookup(&transaction.description) {
        Some(category) => Suggestion {
            category: Some(category.to_string()),
            confidence: HISTORY_CONFIDENCE,
        },
        None => Suggestion::none(),
    }
}

/// Gate deciding when a suggestion may be applied without human review
#[derive(Debug, Clone, Copy)]
pub struct AutoApplyPolicy {
    threshold: f64,
}

impl AutoApplyPolicy {
    pub const DEFAULT_THRESHOLD: f64 = 0.85;
    pub const MIN_THRESHOLD: f64 = 0.70;
    pub const MAX_THRESHOLD: f64 = 1.00;

    /// Build a policy with the given threshold, rejecting values outside
    /// the accepted 0.70-1.00 range.
    pub fn new(threshold: f64) -> Result<Self> {
        if !(Self::MIN_THRESHOLD..=Self::MAX_THRESHOLD).contains(&threshold) {
            return Err(Error::InvalidData(format!(
                "auto-apply threshold {} outside {:.2}-{:.2}",
                threshold,
                Self::MIN_THRESHOLD,
                Self::MAX_THRESHOLD
            )));
        }
        Ok(Self { threshold })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Whether a suggestion is confident enough to apply unattended.
    pub fn should_apply(&self, suggestion: &Suggestion) -> bool {
        suggestion.is_match() && suggestion.confidence >= self.threshold
    }
}

impl Default for AutoApplyPolicy {
    fn default() -> Self {
        Self {
            threshold: Self::DEFAULT_THRESHOLD,
        }
    }
}
