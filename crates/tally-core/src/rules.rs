//! Rule repository: the hand-authored keyword rules driving classification
//!
//! Rules are static configuration loaded once per process. The file format
//! is a JSON array; array order is declaration order and is preserved,
//! because the classifier breaks confidence ties in favor of the
//! earliest-declared rule.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::FlowDirection;

/// Base confidence used when a rule omits the field.
pub const DEFAULT_RULE_CONFIDENCE: f64 = 0.5;

/// Which transaction flow a rule applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleFlow {
    Debit,
    Credit,
    Both,
}

impl RuleFlow {
    pub fn matches(&self, flow: FlowDirection) -> bool {
        match self {
            Self::Both => true,
            Self::Debit => flow == FlowDirection::Debit,
            Self::Credit => flow == FlowDirection::Credit,
        }
    }
}

/// A single category-inference rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    /// Target category label (free-form, defined by the rule author)
    pub category: String,
    pub flow: RuleFlow,
    /// Case-insensitive substrings, tested in order; any match qualifies
    pub keywords: Vec<String>,
    /// Base confidence, 0.0-1.0
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    /// Reference magnitudes; a transaction amount near one of these earns
    /// a confidence bonus
    #[serde(default)]
    pub typical_amounts: Vec<f64>,
}

fn default_confidence() -> f64 {
    DEFAULT_RULE_CONFIDENCE
}

/// The rule repository: an ordered, immutable collection of rules
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Load a rule set from a JSON array file.
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path).map_err(|e| {
            Error::Rules(format!("cannot read rule set {}: {}", path.display(), e))
        })?;
        let rules: Vec<Rule> = serde_json::from_str(&data)?;
        if rules.is_empty() {
            return Err(Error::Rules(format!(
                "rule set {} contains no rules",
                path.display()
            )));
        }
        Ok(Self { rules })
    }

    /// Rules in declaration order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Distinct target categories, sorted for display.
    pub fn categories(&self) -> Vec<String> {
        let mut cats: Vec<String> = self.rules.iter().map(|r| r.category.clone()).collect();
        cats.sort();
        cats.dedup();
        cats
    }
}
