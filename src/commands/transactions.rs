// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{arg, money, opt_arg};
use crate::db::LedgerRepository;
use crate::models::{MoneyRecord, RecordKind, next_id};
use crate::utils::{
    lenient_date, maybe_print_json, month_key, parse_date, parse_decimal, parse_month,
    pretty_table,
};
use anyhow::{Result, bail};
use rust_decimal::Decimal;
use tracing::info;

pub fn handle(repo: &mut dyn LedgerRepository, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(repo, sub)?,
        Some(("list", sub)) => list(repo, sub)?,
        Some(("rm", sub)) => rm(repo, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(repo: &mut dyn LedgerRepository, sub: &clap::ArgMatches) -> Result<()> {
    let kind = RecordKind::parse(arg(sub, "kind")).unwrap_or(RecordKind::Expense);
    let date = parse_date(arg(sub, "date"))?.to_string();
    let amount = parse_decimal(arg(sub, "amount"))?;
    if amount < Decimal::ZERO {
        bail!("Amount must not be negative");
    }
    let name = arg(sub, "name");
    if name.is_empty() {
        bail!("Name must not be empty");
    }

    let mut snap = repo.load()?;
    let base_amount = money(&snap)?.to_base(amount);
    let existing = snap.records.iter().map(|r| r.id.as_str());
    let mut record = match kind {
        RecordKind::Income => {
            let id = next_id("inc", existing);
            MoneyRecord::income(&id, &date, name, base_amount)
        }
        RecordKind::Expense => {
            let Some(category) = opt_arg(sub, "category") else {
                bail!("Expenses need a --category");
            };
            let id = next_id("exp", existing);
            MoneyRecord::expense(&id, &date, &category, name, base_amount)
        }
    };
    record.notes = opt_arg(sub, "notes");

    println!(
        "Recorded {} {}: {} {} on {}",
        kind.as_str().to_lowercase(),
        record.id,
        record.category,
        money(&snap)?.fmt(record.amount),
        record.date
    );
    info!(id = %record.id, kind = kind.as_str(), "Added record");
    snap.records.push(record);
    repo.save(&snap)?;
    Ok(())
}

fn list(repo: &mut dyn LedgerRepository, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let month = opt_arg(sub, "month").map(|s| parse_month(&s)).transpose()?;
    let kind = opt_arg(sub, "kind").and_then(|k| RecordKind::parse(&k));

    let snap = repo.load()?;
    let mut records: Vec<&MoneyRecord> = snap
        .records
        .iter()
        .filter(|r| kind.as_ref().is_none_or(|k| &r.kind == k))
        .filter(|r| {
            month
                .as_deref()
                .is_none_or(|m| lenient_date(&r.date).is_some_and(|d| month_key(d) == m))
        })
        .collect();
    records.sort_by(|a, b| lenient_date(&b.date).cmp(&lenient_date(&a.date)));

    if maybe_print_json(json_flag, jsonl_flag, &records)? {
        return Ok(());
    }
    let fx = money(&snap)?;
    let data = records
        .iter()
        .map(|r| {
            let signed = if r.is_expense() { -r.amount } else { r.amount };
            vec![
                r.id.clone(),
                r.date.clone(),
                r.kind.as_str().to_string(),
                r.category.clone(),
                r.name.clone(),
                fx.fmt(signed),
            ]
        })
        .collect();
    let amount_hdr = format!("Amount ({})", fx.display());
    println!(
        "{}",
        pretty_table(
            &["Id", "Date", "Type", "Category", "Name", amount_hdr.as_str()],
            data
        )
    );
    Ok(())
}

fn rm(repo: &mut dyn LedgerRepository, sub: &clap::ArgMatches) -> Result<()> {
    let id = arg(sub, "id");
    let mut snap = repo.load()?;
    let before = snap.records.len();
    snap.records.retain(|r| r.id != id);
    if snap.records.len() == before {
        bail!("No record with id '{}'", id);
    }
    repo.save(&snap)?;
    println!("Deleted record {}", id);
    Ok(())
}
