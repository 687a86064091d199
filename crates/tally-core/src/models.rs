//! Domain models for Tally

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Category label used for rows that have not been classified yet.
///
/// Compared case- and whitespace-insensitively everywhere; see
/// [`is_uncategorized_label`].
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Supported banks for statement ingestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bank {
    Millennium,
    Revolut,
}

impl Bank {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Millennium => "millennium",
            Self::Revolut => "revolut",
        }
    }
}

impl std::str::FromStr for Bank {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "millennium" => Ok(Self::Millennium),
            "revolut" => Ok(Self::Revolut),
            _ => Err(format!("Unknown bank: {}", s)),
        }
    }
}

impl std::fmt::Display for Bank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether money left or entered the account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowDirection {
    Debit,
    Credit,
}

impl FlowDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
        }
    }
}

impl std::fmt::Display for FlowDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A bank-statement transaction
///
/// Exactly one of `debit`/`credit` is expected to be strictly positive and
/// equal to `amount`; [`Transaction::validate`] flags rows that break this.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub bank: Bank,
    pub description: String,
    /// Positive magnitude of the transaction
    pub amount: f64,
    /// Money leaving the account (0 for credits)
    pub debit: f64,
    /// Money entering the account (0 for debits)
    pub credit: f64,
    pub category: Option<String>,
    /// Confidence of the current category, 0.0-1.0
    pub confidence: f64,
    /// Audit annotation (how the category was assigned)
    pub note: Option<String>,
}

/// Debit/credit invariant violations detected by [`Transaction::validate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrityIssue {
    /// Both debit and credit are zero
    NoFlow,
    /// Both debit and credit are strictly positive
    BothFlows,
    /// The positive leg differs from `amount` by more than a cent
    AmountMismatch,
}

impl std::fmt::Display for IntegrityIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::NoFlow => "debit and credit are both zero",
            Self::BothFlows => "debit and credit are both positive",
            Self::AmountMismatch => "amount does not match the positive leg",
        };
        write!(f, "{}", s)
    }
}

impl Transaction {
    /// Flow direction: credit if any money entered, debit otherwise.
    pub fn flow(&self) -> FlowDirection {
        if self.credit > 0.0 {
            FlowDirection::Credit
        } else {
            FlowDirection::Debit
        }
    }

    /// Check the debit/credit invariant. `None` means the row is sound.
    pub fn validate(&self) -> Option<IntegrityIssue> {
        let has_debit = self.debit > 0.0;
        let has_credit = self.credit > 0.0;

        match (has_debit, has_credit) {
            (false, false) => Some(IntegrityIssue::NoFlow),
            (true, true) => Some(IntegrityIssue::BothFlows),
            _ => {
                let leg = if has_credit { self.credit } else { self.debit };
                if (leg - self.amount).abs() > 0.01 {
                    Some(IntegrityIssue::AmountMismatch)
                } else {
                    None
                }
            }
        }
    }

    /// Description after case-folding and trimming; the join key for
    /// historical and batch matching.
    pub fn normalized_description(&self) -> String {
        normalize_description(&self.description)
    }

    /// Whether the row still needs a category.
    pub fn is_uncategorized(&self) -> bool {
        match &self.category {
            None => true,
            Some(c) => is_uncategorized_label(c),
        }
    }

    /// Key for duplicate detection: same day, same description, same amount
    /// (to the cent).
    pub fn duplicate_key(&self) -> (NaiveDate, String, i64) {
        (
            self.date,
            self.normalized_description(),
            (self.amount * 100.0).round() as i64,
        )
    }
}

/// Indices of rows violating the debit/credit invariant, with the issue.
///
/// Violations are reported to the caller, never dropped or corrected.
pub fn integrity_violations(transactions: &[Transaction]) -> Vec<(usize, IntegrityIssue)> {
    transactions
        .iter()
        .enumerate()
        .filter_map(|(i, t)| t.validate().map(|issue| (i, issue)))
        .collect()
}

/// Groups of row indices sharing the same (date, description, amount) key.
/// Only groups with more than one member are returned.
pub fn duplicate_groups(transactions: &[Transaction]) -> Vec<Vec<usize>> {
    let mut groups: std::collections::BTreeMap<(NaiveDate, String, i64), Vec<usize>> =
        std::collections::BTreeMap::new();
    for (i, t) in transactions.iter().enumerate() {
        groups.entry(t.duplicate_key()).or_default().push(i);
    }
    groups.into_values().filter(|g| g.len() > 1).collect()
}

/// Case-fold and trim a description for matching.
pub fn normalize_description(description: &str) -> String {
    description.trim().to_lowercase()
}

/// Whether a category label is the "no category yet" sentinel.
pub fn is_uncategorized_label(label: &str) -> bool {
    label.trim().eq_ignore_ascii_case(UNCATEGORIZED)
}
