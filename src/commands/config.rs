// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::arg;
use crate::config::{EngineConfig, KEY_BASE_CURRENCY, KEY_DISPLAY_CURRENCY, is_known_key};
use crate::db::{LedgerRepository, MemoryLedger};
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::{Context, Result, bail};
use tracing::info;

pub fn handle(repo: &mut dyn LedgerRepository, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => show(repo, sub)?,
        Some(("set", sub)) => set(repo, sub)?,
        _ => {}
    }
    Ok(())
}

fn show(repo: &mut dyn LedgerRepository, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let cfg = EngineConfig::load(&*repo).context("Stored configuration is invalid")?;
    if maybe_print_json(json_flag, jsonl_flag, &cfg)? {
        return Ok(());
    }
    let snap = repo.load()?;
    let data = vec![
        vec![KEY_BASE_CURRENCY.into(), snap.base_currency],
        vec![KEY_DISPLAY_CURRENCY.into(), snap.display_currency],
        vec!["overspend_ratio".into(), cfg.overspend_ratio.to_string()],
        vec!["bill_lookahead_days".into(), cfg.bill_lookahead_days.to_string()],
        vec!["due_soon_days".into(), cfg.due_soon_days.to_string()],
        vec!["goal_lookahead_days".into(), cfg.goal_lookahead_days.to_string()],
        vec!["achievement_threshold".into(), cfg.achievement_threshold.to_string()],
        vec!["poll_interval_secs".into(), cfg.poll_interval_secs.to_string()],
        vec!["surplus_policy".into(), cfg.surplus_policy.to_string()],
    ];
    println!("{}", pretty_table(&["Key", "Value"], data));
    Ok(())
}

fn set(repo: &mut dyn LedgerRepository, sub: &clap::ArgMatches) -> Result<()> {
    let key = arg(sub, "key");
    let value = arg(sub, "value");
    if !is_known_key(key) {
        bail!("Unknown setting '{}'", key);
    }
    // parse against a scratch store so a bad value is never persisted
    let mut probe = MemoryLedger::default();
    probe.set_setting(key, value)?;
    EngineConfig::load(&probe)?;

    repo.set_setting(key, value)?;
    info!(key, value, "Setting updated");
    println!("{} = {}", key, value);
    Ok(())
}
