// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{money, opt_arg};
use crate::aggregate::{
    Totals, compute_category_breakdown, compute_month_totals, compute_monthly_trend,
    compute_totals, compute_weekly_trend,
};
use crate::db::LedgerRepository;
use crate::models::Snapshot;
use crate::utils::{lenient_date, maybe_print_json, month_key, parse_month, pretty_table};
use anyhow::Result;
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle(repo: &dyn LedgerRepository, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("totals", sub)) => totals(repo, sub)?,
        Some(("by-category", sub)) => by_category(repo, sub)?,
        Some(("trend", sub)) => trend(repo, sub)?,
        _ => {}
    }
    Ok(())
}

/// Totals over the whole ledger, or over one `YYYY-MM` month.
pub fn totals_for(snap: &Snapshot, month: Option<&str>) -> Totals {
    match month {
        Some(m) => compute_month_totals(&snap.records, m),
        None => compute_totals(snap.incomes(), snap.expenses()),
    }
}

#[derive(Serialize)]
struct Bucket {
    period: String,
    income: Decimal,
    expense: Decimal,
}

fn totals(repo: &dyn LedgerRepository, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let month = opt_arg(sub, "month").map(|s| parse_month(&s)).transpose()?;
    let snap = repo.load()?;
    let t = totals_for(&snap, month.as_deref());
    let fx = money(&snap)?;

    if maybe_print_json(json_flag, jsonl_flag, &t)? {
        return Ok(());
    }
    println!(
        "{}",
        pretty_table(
            &["Income", "Expense", "Savings"],
            vec![vec![fx.fmt(t.income), fx.fmt(t.expense), fx.fmt(t.savings)]]
        )
    );
    Ok(())
}

fn by_category(repo: &dyn LedgerRepository, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let month = opt_arg(sub, "month").map(|s| parse_month(&s)).transpose()?;
    let snap = repo.load()?;
    let expenses = snap.expenses().filter(|e| {
        month
            .as_deref()
            .is_none_or(|m| lenient_date(&e.date).is_some_and(|d| month_key(d) == m))
    });
    let breakdown = compute_category_breakdown(expenses);
    let fx = money(&snap)?;

    let pairs: Vec<(&String, &Decimal)> = breakdown.iter().collect();
    if maybe_print_json(json_flag, jsonl_flag, &pairs)? {
        return Ok(());
    }

    let total: Decimal = breakdown.values().copied().sum();
    let mut ordered: Vec<(&String, &Decimal)> = breakdown.iter().collect();
    ordered.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    let data = ordered
        .into_iter()
        .map(|(c, v)| {
            let share = if total > Decimal::ZERO {
                (*v / total * Decimal::ONE_HUNDRED).round_dp(1)
            } else {
                Decimal::ZERO
            };
            vec![c.clone(), fx.fmt(*v), format!("{}%", share)]
        })
        .collect();
    println!("{}", pretty_table(&["Category", "Spent", "Share"], data));
    Ok(())
}

fn trend(repo: &dyn LedgerRepository, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let weekly = sub.get_flag("weekly");
    let snap = repo.load()?;
    let fx = money(&snap)?;

    let buckets: Vec<Bucket> = if weekly {
        compute_weekly_trend(snap.incomes(), snap.expenses())
            .into_iter()
            .map(|p| Bucket {
                period: p.week_start,
                income: p.income,
                expense: p.expense,
            })
            .collect()
    } else {
        compute_monthly_trend(snap.incomes(), snap.expenses())
            .into_iter()
            .map(|p| Bucket {
                period: p.month,
                income: p.income,
                expense: p.expense,
            })
            .collect()
    };

    if maybe_print_json(json_flag, jsonl_flag, &buckets)? {
        return Ok(());
    }

    let data = buckets
        .iter()
        .map(|b| vec![b.period.clone(), fx.fmt(b.income), fx.fmt(b.expense)])
        .collect();
    let period_hdr = if weekly { "Week of" } else { "Month" };
    println!("{}", pretty_table(&[period_hdr, "Income", "Expense"], data));
    Ok(())
}
