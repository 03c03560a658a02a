// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{arg, money, opt_arg};
use crate::aggregate::goal_progress;
use crate::config::EngineConfig;
use crate::db::LedgerRepository;
use crate::distribute::{SurplusPolicy, distribute_with};
use crate::models::{Goal, Snapshot, next_id};
use crate::utils::{maybe_print_json, parse_date, parse_decimal, pretty_table};
use anyhow::{Context, Result, bail};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

pub fn handle(repo: &mut dyn LedgerRepository, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(repo, sub)?,
        Some(("list", sub)) => list(repo, sub)?,
        Some(("distribute", sub)) => distribute(repo, sub)?,
        Some(("rm", sub)) => rm(repo, sub)?,
        _ => {}
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct GoalRow<'a> {
    #[serde(flatten)]
    pub goal: &'a Goal,
    pub progress: u32,
}

pub fn rows(snap: &Snapshot) -> Vec<GoalRow<'_>> {
    snap.goals
        .iter()
        .map(|g| GoalRow {
            goal: g,
            progress: goal_progress(g),
        })
        .collect()
}

fn add(repo: &mut dyn LedgerRepository, sub: &clap::ArgMatches) -> Result<()> {
    let title = arg(sub, "title").to_string();
    if title.is_empty() {
        bail!("Title must not be empty");
    }
    let target = parse_decimal(arg(sub, "target"))?;
    let saved = parse_decimal(arg(sub, "saved"))?;
    if target <= Decimal::ZERO {
        bail!("Target must be greater than zero");
    }
    if saved < Decimal::ZERO {
        bail!("Saved amount must not be negative");
    }
    let deadline = opt_arg(sub, "deadline")
        .map(|s| parse_date(&s).map(|d| d.to_string()))
        .transpose()?;

    let mut snap = repo.load()?;
    let fx = money(&snap)?;
    let goal = Goal {
        id: next_id("g", snap.goals.iter().map(|g| g.id.as_str())),
        title,
        target: fx.to_base(target),
        saved: fx.to_base(saved),
        deadline,
    };
    println!(
        "Goal {} added: {} ({} of {})",
        goal.id,
        goal.title,
        fx.fmt(goal.saved),
        fx.fmt(goal.target)
    );
    info!(id = %goal.id, "Added goal");
    snap.goals.push(goal);
    repo.save(&snap)?;
    Ok(())
}

fn list(repo: &mut dyn LedgerRepository, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let snap = repo.load()?;
    let rows = rows(&snap);
    if maybe_print_json(json_flag, jsonl_flag, &rows)? {
        return Ok(());
    }

    let fx = money(&snap)?;
    let data = rows
        .iter()
        .map(|r| {
            vec![
                r.goal.id.clone(),
                r.goal.title.clone(),
                fx.fmt(r.goal.saved),
                fx.fmt(r.goal.target),
                format!("{}%", r.progress),
                r.goal.deadline.clone().unwrap_or_else(|| "-".into()),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Id", "Title", "Saved", "Target", "Progress", "Deadline"], data)
    );
    Ok(())
}

fn distribute(repo: &mut dyn LedgerRepository, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let dry_run = sub.get_flag("dry-run");
    let amount = parse_decimal(arg(sub, "amount"))?;
    let policy = match opt_arg(sub, "policy") {
        Some(p) => p.parse::<SurplusPolicy>()?,
        None => {
            EngineConfig::load(&*repo)
                .context("Failed to load configuration")?
                .surplus_policy
        }
    };

    let mut snap = repo.load()?;
    let fx = money(&snap)?;
    let result = distribute_with(fx.to_base(amount), &snap.goals, policy);

    if !maybe_print_json(json_flag, jsonl_flag, &result)? {
        let data = result
            .allocations
            .iter()
            .map(|a| {
                let goal = result.goals.iter().find(|g| g.id == a.goal_id);
                vec![
                    a.goal_id.clone(),
                    goal.map(|g| g.title.clone()).unwrap_or_default(),
                    fx.fmt(a.amount),
                    goal.map(|g| fx.fmt(g.saved)).unwrap_or_default(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Goal", "Title", "Allocated", "Saved now"], data)
        );
        if result.unallocated > Decimal::ZERO {
            println!("Unallocated: {}", fx.fmt(result.unallocated));
        }
    }

    if dry_run || result.allocations.is_empty() {
        return Ok(());
    }
    let allocated = result.allocated();
    snap.goals = result.goals;
    repo.save(&snap)?;
    info!(
        allocations = result.allocations.len(),
        %allocated,
        policy = %policy,
        "Applied savings distribution"
    );
    Ok(())
}

fn rm(repo: &mut dyn LedgerRepository, sub: &clap::ArgMatches) -> Result<()> {
    let id = arg(sub, "id");
    let mut snap = repo.load()?;
    let before = snap.goals.len();
    snap.goals.retain(|g| g.id != id);
    if snap.goals.len() == before {
        bail!("No goal with id '{}'", id);
    }
    repo.save(&snap)?;
    println!("Deleted goal {}", id);
    Ok(())
}
