//! CSV persistence for the transaction table
//!
//! The engine treats persistence as an external collaborator: the only
//! guarantee it needs is that a write either fully lands or is fully
//! absent. Saves therefore go through a temp file in the destination
//! directory and replace the table atomically.

use std::fs::File;
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};
use crate::models::Transaction;

/// Load a transaction table from CSV.
///
/// Expected header: `date,bank,description,amount,debit,credit,category,
/// confidence,note`. Category and note may be empty.
pub fn load_transactions(path: &Path) -> Result<Vec<Transaction>> {
    let file = File::open(path).map_err(|e| {
        Error::InvalidData(format!("cannot open {}: {}", path.display(), e))
    })?;
    let mut reader = csv::Reader::from_reader(file);

    let mut transactions = Vec::new();
    for row in reader.deserialize() {
        let transaction: Transaction = row?;
        transactions.push(transaction);
    }

    debug!(path = %path.display(), rows = transactions.len(), "loaded transaction table");
    Ok(transactions)
}

/// Save the transaction table, atomically replacing the previous file.
pub fn save_transactions(path: &Path, transactions: &[Transaction]) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let file = tempfile::NamedTempFile::new_in(dir)?;

    {
        let mut writer = csv::Writer::from_writer(&file);
        for transaction in transactions {
            writer.serialize(transaction)?;
        }
        writer.flush()?;
    }

    file.persist(path)
        .map_err(|e| Error::InvalidData(format!("cannot persist {}: {}", path.display(), e)))?;

    debug!(path = %path.display(), rows = transactions.len(), "saved transaction table");
    Ok(())
}

/// Extract (description, category) records from validated transaction
/// tables, for feeding the history index. Rows without a category are
/// skipped here; the sentinel and ambiguity filtering happen in the index
/// build itself.
pub fn load_history_records(paths: &[&Path]) -> Result<Vec<(String, String)>> {
    let mut records = Vec::new();
    for path in paths {
        for transaction in load_transactions(path)? {
            if let Some(category) = transaction.category {
                records.push((transaction.description, category));
            }
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Bank;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn txn(description: &str, category: Option<&str>) -> Transaction {
        Transaction {
            date: NaiveDate::from_ymd_opt(2025, 12, 2).unwrap(),
            bank: Bank::Revolut,
            description: description.to_string(),
            amount: 7.5,
            debit: 7.5,
            credit: 0.0,
            category: category.map(|s| s.to_string()),
            confidence: 0.6,
            note: None,
        }
    }

    #[test]
    fn test_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("table.csv");

        let table = vec![txn("GALP POSTO", Some("Fuel")), txn("MYSTERY", None)];
        save_transactions(&path, &table).unwrap();

        let loaded = load_transactions(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].description, "GALP POSTO");
        assert_eq!(loaded[0].category.as_deref(), Some("Fuel"));
        assert_eq!(loaded[0].bank, Bank::Revolut);
        assert_eq!(loaded[1].category, None);
    }

    #[test]
    fn test_save_replaces_previous_table() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("table.csv");

        save_transactions(&path, &[txn("A", None), txn("B", None)]).unwrap();
        save_transactions(&path, &[txn("C", None)]).unwrap();

        let loaded = load_transactions(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].description, "C");
    }

    #[test]
    fn test_history_records_skip_empty_categories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("validated.csv");
        save_transactions(
            &path,
            &[txn("GALP", Some("Fuel")), txn("UNSET", None)],
        )
        .unwrap();

        let records = load_history_records(&[&path]).unwrap();
        assert_eq!(records, vec![("GALP".to_string(), "Fuel".to_string())]);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(load_transactions(&dir.path().join("missing.csv")).is_err());
    }
}
