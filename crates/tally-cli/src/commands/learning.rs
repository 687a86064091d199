//! Correction commands: everything that writes the learning log

use std::path::Path;

use anyhow::{bail, Context, Result};
use tally_core::{apply_to_matching, correct, Recorder};

use super::{load_rules, load_table, save_table, truncate};

pub fn cmd_set(
    rules_path: &Path,
    table_path: &Path,
    log_path: &Path,
    row: usize,
    category: &str,
) -> Result<()> {
    let rules = load_rules(rules_path)?;
    let mut table = load_table(table_path)?;
    let mut recorder = Recorder::open(log_path).context("cannot open learning log")?;

    let changed = correct(&mut table, row, category, &rules, &mut recorder)?;
    if changed {
        save_table(table_path, &table)?;
        println!("✅ Row {} set to {}", row, category);
    } else {
        println!("Row {} already carries {}; nothing recorded.", row, category);
    }

    Ok(())
}

pub fn cmd_batch(
    rules_path: &Path,
    table_path: &Path,
    log_path: &Path,
    row: usize,
    category: &str,
) -> Result<()> {
    let rules = load_rules(rules_path)?;
    let mut table = load_table(table_path)?;
    let mut recorder = Recorder::open(log_path).context("cannot open learning log")?;

    let Some(reference) = table.get(row).cloned() else {
        bail!("row {} not found (table has {} rows)", row, table.len());
    };

    let changed = apply_to_matching(&mut table, &reference, category, &rules, &mut recorder)?;
    if changed > 0 {
        save_table(table_path, &table)?;
    }

    println!(
        "🔁 Applied {} to {} rows matching {} │ {}",
        category,
        changed,
        reference.bank,
        truncate(&reference.description, 40)
    );

    Ok(())
}

pub fn cmd_close(table_path: &Path, log_path: &Path) -> Result<()> {
    let table = load_table(table_path)?;
    let categorized = table.iter().filter(|t| !t.is_uncategorized()).count();

    let mut recorder = Recorder::open(log_path).context("cannot open learning log")?;
    let open = recorder.sessions().last().map(|s| !s.finalized).unwrap_or(false);
    recorder.close_session(categorized)?;

    if open {
        println!("✅ Session closed ({} rows categorized)", categorized);
    } else {
        println!("No open session.");
    }

    Ok(())
}

pub fn cmd_sessions(log_path: &Path) -> Result<()> {
    let recorder = Recorder::open(log_path).context("cannot open learning log")?;

    if recorder.sessions().is_empty() {
        println!("No learning sessions recorded yet.");
        return Ok(());
    }

    println!();
    println!("📚 Learning Sessions");
    println!("   ─────────────────────────────────────────────────────────────");

    for session in recorder.sessions() {
        let state = if session.finalized { "closed" } else { "open" };
        println!(
            "   #{} │ {} │ {} │ {} choices │ reclassified: {}",
            session.id,
            session.started_at.format("%Y-%m-%d %H:%M"),
            state,
            session.choices.len(),
            session
                .total_reclassified
                .map(|n| n.to_string())
                .unwrap_or_else(|| "-".to_string()),
        );

        for choice in &session.choices {
            println!(
                "      {} │ {} → {} ({})",
                truncate(&choice.transaction.description, 32),
                choice.previous_category.as_deref().unwrap_or("-"),
                choice.final_category,
                choice.kind.as_str()
            );
        }
    }

    Ok(())
}
