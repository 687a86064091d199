//! Table inspection commands

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;
use tally_core::{duplicate_groups, integrity_violations};

use super::{load_rules, load_table, truncate};

pub fn cmd_status(table_path: &Path) -> Result<()> {
    let table = load_table(table_path)?;

    let total = table.len();
    let categorized = table.iter().filter(|t| !t.is_uncategorized()).count();
    let pending = total - categorized;

    println!();
    println!("📊 {} transactions", total);
    if total > 0 {
        println!(
            "   categorized: {} ({:.1}%)",
            categorized,
            categorized as f64 / total as f64 * 100.0
        );
        println!("   pending:     {}", pending);
    }

    let mut by_category: BTreeMap<&str, usize> = BTreeMap::new();
    for transaction in &table {
        if let Some(category) = transaction.category.as_deref() {
            *by_category.entry(category).or_insert(0) += 1;
        }
    }

    if !by_category.is_empty() {
        println!();
        println!("   By category:");
        for (category, count) in by_category {
            println!("   {:>4} │ {}", count, category);
        }
    }

    Ok(())
}

pub fn cmd_check(table_path: &Path) -> Result<()> {
    let table = load_table(table_path)?;

    let violations = integrity_violations(&table);
    if violations.is_empty() {
        println!("✅ No debit/credit violations.");
    } else {
        println!("⚠️  {} rows violate the debit/credit invariant:", violations.len());
        for (row, issue) in &violations {
            let t = &table[*row];
            println!(
                "   row {} │ {} │ {} │ {}",
                row,
                t.date,
                truncate(&t.description, 40),
                issue
            );
        }
    }

    let duplicates = duplicate_groups(&table);
    if duplicates.is_empty() {
        println!("✅ No duplicate rows by date/description/amount.");
    } else {
        println!("⚠️  {} duplicate groups:", duplicates.len());
        for group in &duplicates {
            let first = &table[group[0]];
            println!(
                "   rows {:?} │ {} │ {} │ {:.2}",
                group,
                first.date,
                truncate(&first.description, 40),
                first.amount
            );
        }
    }

    Ok(())
}

pub fn cmd_categories(rules_path: &Path) -> Result<()> {
    let rules = load_rules(rules_path)?;

    println!();
    println!("🏷️  {} categories from {} rules", rules.categories().len(), rules.len());
    for category in rules.categories() {
        println!("   {}", category);
    }

    Ok(())
}
