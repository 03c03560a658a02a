// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{arg, now_from, opt_arg};
use crate::alerts::{ReadState, custom_notification, derive_alerts, notifications};
use crate::config::EngineConfig;
use crate::currency::CurrencyTable;
use crate::db::LedgerRepository;
use crate::models::Alert;
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::{Result, bail};
use chrono::{DateTime, Utc};
use tracing::{debug, info};

pub fn handle(repo: &mut dyn LedgerRepository, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => list(repo, sub)?,
        Some(("read", sub)) => read(repo, sub)?,
        Some(("read-all", sub)) => read_all(repo, sub)?,
        Some(("add", sub)) => add(repo, sub)?,
        _ => {}
    }
    Ok(())
}

/// The notification list as of `now`: derived alerts merged with user-added
/// ones, read flags applied, newest first.
pub fn current(repo: &dyn LedgerRepository, now: DateTime<Utc>) -> Result<Vec<Alert>> {
    let snap = repo.load()?;
    let cfg = EngineConfig::load(repo)?;
    let derived = derive_alerts(&snap, now, &cfg, CurrencyTable::standard());
    let custom = repo.notifications()?;
    let read = ReadState::new(repo.read_ids()?);
    debug!(
        derived = derived.len(),
        custom = custom.len(),
        "Evaluated notifications"
    );
    Ok(notifications(derived, custom, &read))
}

pub fn unread_count(alerts: &[Alert]) -> usize {
    alerts.iter().filter(|a| !a.read).count()
}

fn list(repo: &mut dyn LedgerRepository, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let only_unread = sub.get_flag("unread");
    let now = now_from(sub)?;
    let mut alerts = current(&*repo, now)?;
    let unread = unread_count(&alerts);
    if only_unread {
        alerts.retain(|a| !a.read);
    }
    if maybe_print_json(json_flag, jsonl_flag, &alerts)? {
        return Ok(());
    }

    let data = alerts
        .iter()
        .map(|a| {
            vec![
                if a.read { " ".into() } else { "*".into() },
                a.id.clone(),
                a.kind.to_string(),
                a.date.clone(),
                a.message.clone(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["", "Id", "Type", "Date", "Message"], data)
    );
    println!("{} unread", unread);
    Ok(())
}

fn read(repo: &mut dyn LedgerRepository, sub: &clap::ArgMatches) -> Result<()> {
    let id = arg(sub, "id");
    if id.is_empty() {
        bail!("Id must not be empty");
    }
    let mut state = ReadState::new(repo.read_ids()?);
    if state.mark_read(id) {
        repo.save_read_ids(state.ids())?;
        info!(id, "Marked notification read");
    }
    println!("Marked {} as read", id);
    Ok(())
}

fn read_all(repo: &mut dyn LedgerRepository, sub: &clap::ArgMatches) -> Result<()> {
    let now = now_from(sub)?;
    let alerts = current(&*repo, now)?;
    let mut state = ReadState::new(repo.read_ids()?);
    let added = state.mark_all_read(&alerts);
    if added > 0 {
        repo.save_read_ids(state.ids())?;
    }
    info!(added, "Marked all notifications read");
    println!("Marked {} notification(s) as read", added);
    Ok(())
}

fn add(repo: &mut dyn LedgerRepository, sub: &clap::ArgMatches) -> Result<()> {
    let message = arg(sub, "message");
    if message.is_empty() {
        bail!("Message must not be empty");
    }
    let kind = opt_arg(sub, "type");
    let now = now_from(sub)?;
    let existing = repo.notifications()?;
    let alert = custom_notification(kind.as_deref(), message, now, &existing);
    repo.add_notification(&alert)?;
    println!("Added notification {}", alert.id);
    Ok(())
}
