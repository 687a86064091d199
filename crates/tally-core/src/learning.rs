//! Correction recorder: the append-only learning log
//!
//! Every accepted or overridden classification is captured as a [`Choice`]
//! inside the currently open [`Session`]. Sessions and choices are only
//! ever appended, never edited or deleted; the log is rewritten to disk
//! after every single `record` call so a crash can lose at most the choice
//! being written, and the rewrite goes through a temp file so it either
//! fully lands or is fully absent.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::classify::Suggestion;
use crate::error::{Error, Result};
use crate::models::{Bank, FlowDirection, Transaction};

/// Confidence stamped on every human decision.
pub const USER_CONFIDENCE: f64 = 0.95;

/// How a recorded choice relates to the system suggestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChoiceKind {
    /// The final category equals the system suggestion
    AcceptedSuggestion,
    /// The user picked something else
    ManualOverride,
}

impl ChoiceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AcceptedSuggestion => "accepted_suggestion",
            Self::ManualOverride => "manual_override",
        }
    }
}

/// Snapshot of the transaction a choice was made about
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionSnapshot {
    pub date: chrono::NaiveDate,
    pub bank: Bank,
    pub description: String,
    pub amount: f64,
    pub flow: FlowDirection,
}

impl TransactionSnapshot {
    fn of(transaction: &Transaction) -> Self {
        Self {
            date: transaction.date,
            bank: transaction.bank,
            description: transaction.description.clone(),
            amount: transaction.amount,
            flow: transaction.flow(),
        }
    }
}

/// One recorded classification decision
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    pub timestamp: DateTime<Utc>,
    pub transaction: TransactionSnapshot,
    /// What the system suggested at decision time
    pub suggested_category: Option<String>,
    pub suggested_confidence: f64,
    /// What the user settled on
    pub final_category: String,
    pub final_confidence: f64,
    pub previous_category: Option<String>,
    pub kind: ChoiceKind,
}

/// A bounded batch of decisions, closed explicitly to stamp totals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: u64,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub finalized: bool,
    pub choices: Vec<Choice>,
    /// Stamped at close: number of choices in the session
    pub total_choices: Option<usize>,
    /// Stamped at close: reclassified count reported by the caller
    pub total_reclassified: Option<usize>,
}

/// On-disk shape of the learning log
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LearningLog {
    created: DateTime<Utc>,
    last_updated: DateTime<Utc>,
    sessions: Vec<Session>,
}

impl LearningLog {
    fn new() -> Self {
        let now = Utc::now();
        Self {
            created: now,
            last_updated: now,
            sessions: Vec::new(),
        }
    }
}

/// The correction recorder
///
/// Owns the learning log file; `record` and `close_session` are the
/// only mutations, both appends.
#[derive(Debug)]
pub struct Recorder {
    path: PathBuf,
    log: LearningLog,
}

impl Recorder {
    /// Open the learning log at `path`, creating a fresh one if the file
    /// does not exist. An unreadable log is replaced rather than guessed
    /// at; the old content is not deleted until the first durable write.
    pub fn open(path: &Path) -> Result<Self> {
        let log = if path.exists() {
            let data = fs::read_to_string(path)?;
            match serde_json::from_str(&data) {
                Ok(log) => log,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "learning log unreadable, starting fresh");
                    LearningLog::new()
                }
            }
        } else {
            LearningLog::new()
        };

        Ok(Self {
            path: path.to_path_buf(),
            log,
        })
    }

    /// Append a choice to the open session, opening one if needed, and
    /// persist the log before returning. A failed write surfaces here and
    /// the in-memory choice is still present for a retry.
    pub fn record(
        &mut self,
        transaction: &Transaction,
        previous_category: Option<&str>,
        final_category: &str,
        suggestion: &Suggestion,
    ) -> Result<()> {
        self.ensure_open_session();

        let kind = if suggestion.category.as_deref() == Some(final_category) {
            ChoiceKind::AcceptedSuggestion
        } else {
            ChoiceKind::ManualOverride
        };

        let choice = Choice {
            timestamp: Utc::now(),
            transaction: TransactionSnapshot::of(transaction),
            suggested_category: suggestion.category.clone(),
            suggested_confidence: suggestion.confidence,
            final_category: final_category.to_string(),
            final_confidence: USER_CONFIDENCE,
            previous_category: previous_category.map(|s| s.to_string()),
            kind,
        };

        debug!(
            description = %choice.transaction.description,
            category = %choice.final_category,
            kind = choice.kind.as_str(),
            "recording choice"
        );

        // The open session is always the last one; ensure_open_session
        // guarantees it exists.
        let session = self
            .log
            .sessions
            .last_mut()
            .ok_or_else(|| Error::Learning("no open session after ensure".to_string()))?;
        session.choices.push(choice);

        self.save()
    }

    /// Finalize the open session with an end timestamp and totals.
    /// A no-op when no session is open or the last one is already closed.
    pub fn close_session(&mut self, total_reclassified: usize) -> Result<()> {
        let Some(session) = self.log.sessions.last_mut() else {
            return Ok(());
        };
        if session.finalized {
            return Ok(());
        }

        session.finalized = true;
        session.ended_at = Some(Utc::now());
        session.total_choices = Some(session.choices.len());
        session.total_reclassified = Some(total_reclassified);

        self.save()
    }

    /// All sessions, oldest first.
    pub fn sessions(&self) -> &[Session] {
        &self.log.sessions
    }

    /// Total choices recorded across all sessions.
    pub fn choice_count(&self) -> usize {
        self.log.sessions.iter().map(|s| s.choices.len()).sum()
    }

    fn ensure_open_session(&mut self) {
        let needs_new = match self.log.sessions.last() {
            Some(session) => session.finalized,
            None => true,
        };
        if needs_new {
            self.log.sessions.push(Session {
                id: self.log.sessions.len() as u64 + 1,
                started_at: Utc::now(),
                ended_at: None,
                finalized: false,
                choices: Vec::new(),
                total_choices: None,
                total_reclassified: None,
            });
        }
    }

    /// Rewrite the log through a temp file in the destination directory so
    /// the replacement is atomic.
    fn save(&mut self) -> Result<()> {
        self.log.last_updated = Utc::now();

        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let file = tempfile::NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&file, &self.log)?;
        file.persist(&self.path)
            .map_err(|e| Error::Learning(format!("cannot persist learning log: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn txn(description: &str) -> Transaction {
        Transaction {
            date: NaiveDate::from_ymd_opt(2025, 12, 1).unwrap(),
            bank: Bank::Revolut,
            description: description.to_string(),
            amount: 12.99,
            debit: 12.99,
            credit: 0.0,
            category: Some("Uncategorized".to_string()),
            confidence: 0.0,
            note: None,
        }
    }

    fn suggestion(category: &str, confidence: f64) -> Suggestion {
        Suggestion {
            category: Some(category.to_string()),
            confidence,
        }
    }

    #[test]
    fn test_record_derives_choice_kind() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("learning.json");
        let mut recorder = Recorder::open(&path).unwrap();

        recorder
            .record(
                &txn("NETFLIX.COM"),
                Some("Uncategorized"),
                "Entertainment",
                &suggestion("Entertainment", 0.8),
            )
            .unwrap();
        recorder
            .record(
                &txn("NETFLIX.COM"),
                Some("Uncategorized"),
                "Subscriptions",
                &suggestion("Entertainment", 0.8),
            )
            .unwrap();

        let session = &recorder.sessions()[0];
        assert_eq!(session.choices[0].kind, ChoiceKind::AcceptedSuggestion);
        assert_eq!(session.choices[1].kind, ChoiceKind::ManualOverride);
        assert!((session.choices[0].final_confidence - USER_CONFIDENCE).abs() < 1e-9);
    }

    #[test]
    fn test_record_is_durable_per_call() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("learning.json");

        {
            let mut recorder = Recorder::open(&path).unwrap();
            recorder
                .record(&txn("GALP"), None, "Fuel", &Suggestion::none())
                .unwrap();
            // Dropped without close_session
        }

        let reopened = Recorder::open(&path).unwrap();
        assert_eq!(reopened.choice_count(), 1);
        assert!(!reopened.sessions()[0].finalized);
    }

    #[test]
    fn test_close_session_stamps_totals() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("learning.json");
        let mut recorder = Recorder::open(&path).unwrap();

        recorder
            .record(&txn("GALP"), None, "Fuel", &Suggestion::none())
            .unwrap();
        recorder
            .record(&txn("BP"), None, "Fuel", &Suggestion::none())
            .unwrap();
        recorder.close_session(17).unwrap();

        let session = &recorder.sessions()[0];
        assert!(session.finalized);
        assert!(session.ended_at.is_some());
        assert_eq!(session.total_choices, Some(2));
        assert_eq!(session.total_reclassified, Some(17));
    }

    #[test]
    fn test_close_session_twice_is_noop() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("learning.json");
        let mut recorder = Recorder::open(&path).unwrap();

        recorder
            .record(&txn("GALP"), None, "Fuel", &Suggestion::none())
            .unwrap();
        recorder.close_session(5).unwrap();
        let first_end = recorder.sessions()[0].ended_at;

        recorder.close_session(99).unwrap();
        assert_eq!(recorder.sessions().len(), 1);
        assert_eq!(recorder.sessions()[0].total_reclassified, Some(5));
        assert_eq!(recorder.sessions()[0].ended_at, first_end);
    }

    #[test]
    fn test_close_without_open_session_is_noop() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("learning.json");
        let mut recorder = Recorder::open(&path).unwrap();
        recorder.close_session(0).unwrap();
        assert!(recorder.sessions().is_empty());
    }

    #[test]
    fn test_record_after_close_opens_new_session() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("learning.json");
        let mut recorder = Recorder::open(&path).unwrap();

        recorder
            .record(&txn("GALP"), None, "Fuel", &Suggestion::none())
            .unwrap();
        recorder.close_session(1).unwrap();
        recorder
            .record(&txn("BP"), None, "Fuel", &Suggestion::none())
            .unwrap();

        assert_eq!(recorder.sessions().len(), 2);
        assert_eq!(recorder.sessions()[0].id, 1);
        assert_eq!(recorder.sessions()[1].id, 2);
        // Closing never touches prior sessions' choices
        assert_eq!(recorder.sessions()[0].choices.len(), 1);
    }

    #[test]
    fn test_log_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("learning.json");

        {
            let mut recorder = Recorder::open(&path).unwrap();
            recorder
                .record(&txn("GALP"), None, "Fuel", &suggestion("Fuel", 0.7))
                .unwrap();
            recorder.close_session(1).unwrap();
        }

        let reopened = Recorder::open(&path).unwrap();
        assert_eq!(reopened.sessions().len(), 1);
        let choice = &reopened.sessions()[0].choices[0];
        assert_eq!(choice.final_category, "Fuel");
        assert_eq!(choice.suggested_category.as_deref(), Some("Fuel"));
        assert_eq!(choice.transaction.flow, FlowDirection::Debit);
    }
}
