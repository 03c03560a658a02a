// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{arg, money, now_from, opt_arg};
use crate::alerts::{BillStatus, reminder_status};
use crate::config::EngineConfig;
use crate::db::LedgerRepository;
use crate::models::{Recurrence, Reminder, Snapshot, next_id};
use crate::utils::{lenient_date, maybe_print_json, parse_date, parse_decimal, pretty_table};
use anyhow::{Result, bail};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
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

#[derive(Debug, Serialize)]
pub struct ReminderRow<'a> {
    #[serde(flatten)]
    pub reminder: &'a Reminder,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<BillStatus>,
}

/// Reminders ordered by due date with their status badge. Unreadable due
/// dates sort last.
pub fn rows(snap: &Snapshot, now: DateTime<Utc>, due_soon_days: i64) -> Vec<ReminderRow<'_>> {
    let mut rows: Vec<ReminderRow> = snap
        .reminders
        .iter()
        .map(|r| ReminderRow {
            reminder: r,
            badge: reminder_status(r, now, due_soon_days),
        })
        .collect();
    rows.sort_by_key(|r| {
        let due = lenient_date(&r.reminder.due_date);
        (due.is_none(), due)
    });
    rows
}

fn add(repo: &mut dyn LedgerRepository, sub: &clap::ArgMatches) -> Result<()> {
    let title = arg(sub, "title").to_string();
    if title.is_empty() {
        bail!("Title must not be empty");
    }
    let amount = parse_decimal(arg(sub, "amount"))?;
    if amount < Decimal::ZERO {
        bail!("Amount must not be negative");
    }
    let due_date = parse_date(arg(sub, "due"))?.to_string();

    let mut snap = repo.load()?;
    let fx = money(&snap)?;
    let reminder = Reminder {
        id: next_id("rem", snap.reminders.iter().map(|r| r.id.as_str())),
        title,
        amount: fx.to_base(amount),
        due_date,
        recurring: Recurrence::from(arg(sub, "recurring").to_string()),
        category: opt_arg(sub, "category"),
        description: opt_arg(sub, "description"),
    };
    println!(
        "Reminder {} added: {} {} due {} ({})",
        reminder.id,
        reminder.title,
        fx.fmt(reminder.amount),
        reminder.due_date,
        reminder.recurring.as_str()
    );
    info!(id = %reminder.id, "Added reminder");
    snap.reminders.push(reminder);
    repo.save(&snap)?;
    Ok(())
}

fn list(repo: &mut dyn LedgerRepository, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let now = now_from(sub)?;
    let cfg = EngineConfig::load(&*repo)?;
    let snap = repo.load()?;

    let rows = rows(&snap, now, cfg.due_soon_days);
    if maybe_print_json(json_flag, jsonl_flag, &rows)? {
        return Ok(());
    }

    let fx = money(&snap)?;
    let data = rows
        .iter()
        .map(|r| {
            vec![
                r.reminder.id.clone(),
                r.reminder.title.clone(),
                fx.fmt(r.reminder.amount),
                r.reminder.due_date.clone(),
                r.reminder.recurring.as_str().to_string(),
                r.badge.map(|b| b.label()).unwrap_or("").to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Id", "Title", "Amount", "Due", "Repeats", "Status"], data)
    );
    Ok(())
}

fn rm(repo: &mut dyn LedgerRepository, sub: &clap::ArgMatches) -> Result<()> {
    let id = arg(sub, "id");
    let mut snap = repo.load()?;
    let before = snap.reminders.len();
    snap.reminders.retain(|r| r.id != id);
    if snap.reminders.len() == before {
        bail!("No reminder with id '{}'", id);
    }
    repo.save(&snap)?;
    println!("Deleted reminder {}", id);
    Ok(())
}
