// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{arg, money, opt_arg, today_from};
use crate::aggregate::{BudgetStatus, budget_status};
use crate::db::LedgerRepository;
use crate::models::{Budget, BudgetPeriod, Snapshot, next_id};
use crate::utils::{maybe_print_json, parse_date, parse_decimal, pretty_table};
use anyhow::{Result, bail};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{info, warn};

pub fn handle(repo: &mut dyn LedgerRepository, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => set(repo, sub)?,
        Some(("list", sub)) => list(repo, sub)?,
        Some(("rm", sub)) => rm(repo, sub)?,
        _ => {}
    }
    Ok(())
}

/// Status of every budget as of `today`, in snapshot order.
pub fn statuses(snap: &Snapshot, today: NaiveDate) -> Vec<BudgetStatus> {
    snap.budgets
        .iter()
        .map(|b| budget_status(b, snap.expenses(), today))
        .collect()
}

fn set(repo: &mut dyn LedgerRepository, sub: &clap::ArgMatches) -> Result<()> {
    let category = arg(sub, "category").to_string();
    if category.is_empty() {
        bail!("Category must not be empty");
    }
    let limit = parse_decimal(arg(sub, "limit"))?;
    if limit < Decimal::ZERO {
        bail!("Limit must not be negative");
    }
    let period = BudgetPeriod::from(arg(sub, "period"));
    if let BudgetPeriod::Unrecognized(raw) = &period {
        warn!(period = %raw, "Unrecognized budget period; it will never accrue spend");
    }
    let start_date = opt_arg(sub, "start")
        .map(|s| parse_date(&s).map(|d| d.to_string()))
        .transpose()?;
    let end_date = opt_arg(sub, "end")
        .map(|s| parse_date(&s).map(|d| d.to_string()))
        .transpose()?;
    if period == BudgetPeriod::OneTime && (start_date.is_none() || end_date.is_none()) {
        warn!("One-time budget without --start and --end will never accrue spend");
    }

    let mut snap = repo.load()?;
    let limit = money(&snap)?.to_base(limit);
    let id = opt_arg(sub, "id")
        .unwrap_or_else(|| next_id("bud", snap.budgets.iter().map(|b| b.id.as_str())));
    let budget = Budget {
        id: id.clone(),
        category,
        limit,
        period,
        start_date,
        end_date,
    };
    println!(
        "Budget {} set: {} {} ({})",
        budget.id,
        budget.category,
        money(&snap)?.fmt(budget.limit),
        budget.period
    );
    match snap.budgets.iter_mut().find(|b| b.id == id) {
        Some(existing) => *existing = budget,
        None => snap.budgets.push(budget),
    }
    repo.save(&snap)?;
    info!(id = %id, "Saved budget");
    Ok(())
}

fn list(repo: &mut dyn LedgerRepository, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let today = today_from(sub)?;
    let snap = repo.load()?;
    let rows = statuses(&snap, today);
    if maybe_print_json(json_flag, jsonl_flag, &rows)? {
        return Ok(());
    }

    let fx = money(&snap)?;
    let data = snap
        .budgets
        .iter()
        .zip(&rows)
        .map(|(b, s)| {
            let window = s
                .window
                .map(|w| format!("{} .. {}", w.start, w.end))
                .unwrap_or_else(|| "-".into());
            vec![
                b.id.clone(),
                b.category.clone(),
                b.period.to_string(),
                window,
                fx.fmt(s.spent),
                fx.fmt(s.limit),
                format!("{}%", s.percent),
                if s.over { "Over".into() } else { "OK".into() },
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Id", "Category", "Period", "Window", "Spent", "Limit", "Used", "Status"],
            data
        )
    );
    Ok(())
}

fn rm(repo: &mut dyn LedgerRepository, sub: &clap::ArgMatches) -> Result<()> {
    let id = arg(sub, "id");
    let mut snap = repo.load()?;
    let before = snap.budgets.len();
    snap.budgets.retain(|b| b.id != id);
    if snap.budgets.len() == before {
        bail!("No budget with id '{}'", id);
    }
    repo.save(&snap)?;
    println!("Deleted budget {}", id);
    Ok(())
}
