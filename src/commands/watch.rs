// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::alerts::{current, unread_count};
use crate::config::EngineConfig;
use crate::db::LedgerRepository;
use crate::poll::Poller;
use crate::utils::parse_now;
use anyhow::{Context, Result};
use chrono::Utc;
use std::collections::HashSet;
use std::sync::mpsc;
use std::time::Duration;
use tracing::{info, warn};

/// Unread alert ids first printed on each evaluation, in tick order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WatchReport {
    pub new_per_tick: Vec<Vec<String>>,
}

impl WatchReport {
    pub fn ticks(&self) -> usize {
        self.new_per_tick.len()
    }
}

pub fn handle(repo: Box<dyn LedgerRepository + Send>, m: &clap::ArgMatches) -> Result<()> {
    run(repo, m, |_| {}).map(|_| ())
}

/// Re-derives notifications every interval and prints the ones not seen
/// before. Runs until `--ticks` evaluations have happened, or forever.
/// `after_tick` runs on the calling thread once each evaluation is done.
pub fn run(
    mut repo: Box<dyn LedgerRepository + Send>,
    m: &clap::ArgMatches,
    mut after_tick: impl FnMut(usize),
) -> Result<WatchReport> {
    let cfg = EngineConfig::load(&*repo)?;
    let interval = match m.get_one::<String>("interval") {
        Some(s) => Duration::from_secs(
            s.trim()
                .parse::<u64>()
                .with_context(|| format!("Invalid interval '{}'", s))?,
        ),
        None => cfg.poll_interval(),
    };
    let fixed_now = m.get_one::<String>("now").map(|s| parse_now(s)).transpose()?;
    let limit = m.get_one::<u64>("ticks").copied();

    info!(interval_secs = interval.as_secs(), "Watching ledger");
    let (done_tx, done_rx) = mpsc::channel::<Vec<String>>();
    let mut seen: HashSet<String> = HashSet::new();
    let poller = Poller::spawn(interval, move || {
        let now = fixed_now.unwrap_or_else(Utc::now);
        if let Err(e) = repo.refresh() {
            warn!(error = %e, "Could not reload ledger");
        }
        let mut fresh = Vec::new();
        match current(&*repo, now) {
            Ok(alerts) => {
                for a in alerts.iter().filter(|a| !a.read) {
                    if seen.insert(a.id.clone()) {
                        println!("[{}] {}: {}", a.date, a.kind, a.message);
                        fresh.push(a.id.clone());
                    }
                }
                info!(unread = unread_count(&alerts), "Evaluated alerts");
            }
            Err(e) => warn!(error = %e, "Alert evaluation failed"),
        }
        let _ = done_tx.send(fresh);
    });

    let mut report = WatchReport::default();
    while limit.is_none_or(|n| (report.ticks() as u64) < n) {
        let Ok(fresh) = done_rx.recv() else {
            break;
        };
        report.new_per_tick.push(fresh);
        after_tick(report.ticks());
    }
    let ticks = poller.stop();
    info!(ticks, "Stopped watching");
    Ok(report)
}
