//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `classify` - Classification passes (classify, auto, fill, suggest)
//! - `learning` - Correction commands touching the log (set, batch, close, sessions)
//! - `status` - Table inspection (status, check, categories)

pub mod classify;
pub mod learning;
pub mod status;

// Re-export command functions for main.rs
pub use classify::*;
pub use learning::*;
pub use status::*;

use std::path::Path;

use anyhow::{Context, Result};
use tally_core::{store, RuleSet, Transaction};

/// Load the rule set, with a pointer at the expected format on failure.
pub fn load_rules(path: &Path) -> Result<RuleSet> {
    RuleSet::load(path).with_context(|| {
        format!(
            "cannot load rule set from {} (expected a JSON array of rules)",
            path.display()
        )
    })
}

/// Load the transaction table.
pub fn load_table(path: &Path) -> Result<Vec<Transaction>> {
    store::load_transactions(path)
        .with_context(|| format!("cannot load transaction table from {}", path.display()))
}

/// Save the transaction table back.
pub fn save_table(path: &Path, table: &[Transaction]) -> Result<()> {
    store::save_transactions(path, table)
        .with_context(|| format!("cannot save transaction table to {}", path.display()))
}

/// Truncate a string for table display.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a very long description", 10), "a very lo…");
    }
}
