//! Classification pass commands

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tally_core::{
    auto_apply, classify, classify_all, fill_from_history, historical_suggestion, store,
    AutoApplyPolicy, HistoryIndex,
};

use super::{load_rules, load_table, save_table, truncate};

pub fn cmd_classify(rules_path: &Path, table_path: &Path) -> Result<()> {
    let rules = load_rules(rules_path)?;
    let mut table = load_table(table_path)?;

    let summary = classify_all(&mut table, &rules);
    save_table(table_path, &table)?;

    println!();
    println!("📊 Classified {} transactions", summary.total);
    println!("   automatic:    {}", summary.classified);
    println!("   needs review: {}", summary.needs_review);

    if !summary.by_category.is_empty() {
        println!();
        println!("   By category:");
        for (category, count) in &summary.by_category {
            println!("   {:>4} │ {}", count, category);
        }
    }

    Ok(())
}

pub fn cmd_auto(rules_path: &Path, table_path: &Path, threshold: f64) -> Result<()> {
    let policy = AutoApplyPolicy::new(threshold)
        .context("invalid --threshold (accepted range is 0.70-1.00)")?;
    let rules = load_rules(rules_path)?;
    let mut table = load_table(table_path)?;

    let applied = auto_apply(&mut table, &rules, &policy);
    if applied > 0 {
        save_table(table_path, &table)?;
    }

    println!(
        "⚡ Applied {} suggestions at confidence >= {:.2}",
        applied,
        policy.threshold()
    );
    Ok(())
}

pub fn cmd_fill(table_path: &Path, history_paths: &[PathBuf]) -> Result<()> {
    let index = build_history_index(history_paths)?;
    let mut table = load_table(table_path)?;

    let applied = fill_from_history(&mut table, &index);
    if applied > 0 {
        save_table(table_path, &table)?;
    }

    println!(
        "📚 Filled {} rows from {} known descriptions",
        applied,
        index.len()
    );
    Ok(())
}

pub fn cmd_suggest(
    rules_path: &Path,
    table_path: &Path,
    row: usize,
    history_paths: &[PathBuf],
) -> Result<()> {
    let rules = load_rules(rules_path)?;
    let table = load_table(table_path)?;
    let Some(transaction) = table.get(row) else {
        bail!("row {} not found (table has {} rows)", row, table.len());
    };

    println!();
    println!(
        "   {} │ {} │ {:.2} ({})",
        transaction.date,
        truncate(&transaction.description, 50),
        transaction.amount,
        transaction.flow()
    );

    let suggestion = classify(transaction, &rules);
    match &suggestion.category {
        Some(category) => println!(
            "   rules:   {} (confidence {:.0}%)",
            category,
            suggestion.confidence * 100.0
        ),
        None => println!("   rules:   no match"),
    }

    if !history_paths.is_empty() {
        let index = build_history_index(history_paths)?;
        let historical = historical_suggestion(transaction, &index);
        match &historical.category {
            Some(category) => println!(
                "   history: {} (confidence {:.0}%)",
                category,
                historical.confidence * 100.0
            ),
            None => println!("   history: no exact match"),
        }
    }

    Ok(())
}

fn build_history_index(paths: &[PathBuf]) -> Result<HistoryIndex> {
    let refs: Vec<&Path> = paths.iter().map(|p| p.as_path()).collect();
    let records = store::load_history_records(&refs).context("cannot load validated tables")?;
    Ok(HistoryIndex::build(records))
}
