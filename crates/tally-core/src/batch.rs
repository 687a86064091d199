//! Batch propagation of a confirmed correction
//!
//! The primary tool for fixing systematic misclassifications: one confirmed
//! category fans out to every transaction with the same bank and the same
//! normalized description. Each row actually changed gets its own learning
//! log entry, carrying the suggestion the classifier would have made for
//! that row.

use tracing::{debug, info};

use crate::classify::classify;
use crate::error::Result;
use crate::learning::Recorder;
use crate::models::Transaction;
use crate::rules::RuleSet;

/// Audit note set on rows changed by batch propagation.
pub const BATCH_NOTE: &str = "validated manually (batch)";

/// Apply `new_category` to every transaction sharing the reference's bank
/// and normalized description.
///
/// Rows already carrying `new_category` are left alone and not recorded.
/// Returns the number of rows actually changed.
pub fn apply_to_matching(
    transactions: &mut [Transaction],
    reference: &Transaction,
    new_category: &str,
    rules: &RuleSet,
    recorder: &mut Recorder,
) -> Result<usize> {
    let bank = reference.bank;
    let description = reference.normalized_description();

    let mut changed = 0;
    for transaction in transactions.iter_mut() {
        if transaction.bank != bank || transaction.normalized_description() != description {
            continue;
        }
        if transaction.category.as_deref() == Some(new_category) {
            continue;
        }

        // Suggestion computed per row for the audit trail
        let suggestion = classify(transaction, rules);
        let previous = transaction.category.take();

        transaction.category = Some(new_category.to_string());
        transaction.note = Some(BATCH_NOTE.to_string());

        recorder.record(transaction, previous.as_deref(), new_category, &suggestion)?;
        changed += 1;

        debug!(
            date = %transaction.date,
            description = %transaction.description,
            category = new_category,
            "batch corrected"
        );
    }

    info!(
        bank = %bank,
        description = %description,
        changed,
        "batch propagation finished"
    );

    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Bank;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn txn(bank: Bank, description: &str, category: &str) -> Transaction {
        Transaction {
            date: NaiveDate::from_ymd_opt(2025, 11, 10).unwrap(),
            bank,
            description: description.to_string(),
            amount: 12.99,
            debit: 12.99,
            credit: 0.0,
            category: Some(category.to_string()),
            confidence: 0.0,
            note: None,
        }
    }

    #[test]
    fn test_counts_only_changed_rows() {
        let dir = TempDir::new().unwrap();
        let mut recorder = Recorder::open(&dir.path().join("learning.json")).unwrap();
        let rules = RuleSet::default();

        let mut table = vec![
            txn(Bank::Millennium, "netflix.com", "Uncategorized"),
            txn(Bank::Millennium, " NETFLIX.COM ", "Uncategorized"),
            txn(Bank::Millennium, "netflix.com", "Entertainment"),
            txn(Bank::Revolut, "netflix.com", "Uncategorized"),
            txn(Bank::Millennium, "pingo doce", "Uncategorized"),
        ];

        let reference = table[0].clone();
        let changed =
            apply_to_matching(&mut table, &reference, "Entertainment", &rules, &mut recorder)
                .unwrap();

        // Two uncategorized Millennium netflix rows change; the already
        // correct one and the other bank/description rows do not
        assert_eq!(changed, 2);
        assert_eq!(recorder.choice_count(), 2);
        assert_eq!(table[0].category.as_deref(), Some("Entertainment"));
        assert_eq!(table[1].category.as_deref(), Some("Entertainment"));
        assert_eq!(table[0].note.as_deref(), Some(BATCH_NOTE));
        assert_eq!(table[3].category.as_deref(), Some("Uncategorized"));
        assert_eq!(table[4].category.as_deref(), Some("Uncategorized"));
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let mut recorder = Recorder::open(&dir.path().join("learning.json")).unwrap();
        let rules = RuleSet::default();

        let mut table = vec![
            txn(Bank::Millennium, "netflix.com", "Uncategorized"),
            txn(Bank::Millennium, "netflix.com", "Uncategorized"),
        ];

        let reference = table[0].clone();
        let first =
            apply_to_matching(&mut table, &reference, "Entertainment", &rules, &mut recorder)
                .unwrap();
        let second =
            apply_to_matching(&mut table, &reference, "Entertainment", &rules, &mut recorder)
                .unwrap();

        assert_eq!(first, 2);
        assert_eq!(second, 0);
        assert_eq!(recorder.choice_count(), 2);
    }

    #[test]
    fn test_records_previous_category_and_suggestion() {
        use crate::rules::{Rule, RuleFlow};

        let dir = TempDir::new().unwrap();
        let mut recorder = Recorder::open(&dir.path().join("learning.json")).unwrap();
        let rules = RuleSet::new(vec![Rule {
            id: "streaming".to_string(),
            category: "Entertainment".to_string(),
            flow: RuleFlow::Debit,
            keywords: vec!["netflix".to_string()],
            confidence: 0.8,
            typical_amounts: vec![],
        }]);

        let mut table = vec![txn(Bank::Millennium, "netflix.com", "Shopping")];
        let reference = table[0].clone();
        apply_to_matching(&mut table, &reference, "Entertainment", &rules, &mut recorder)
            .unwrap();

        let choice = &recorder.sessions()[0].choices[0];
        assert_eq!(choice.previous_category.as_deref(), Some("Shopping"));
        assert_eq!(choice.suggested_category.as_deref(), Some("Entertainment"));
        assert!((choice.suggested_confidence - 0.8).abs() < 1e-9);
    }
}
