// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! CLI handlers. Tables show amounts in the display currency; `--json` and
//! `--jsonl` output carries them in the ledger base currency, as stored.

pub mod alerts;
pub mod budgets;
pub mod config;
pub mod currency;
pub mod goals;
pub mod reminders;
pub mod reports;
pub mod transactions;
pub mod watch;

use crate::currency::{Converter, CurrencyTable};
use crate::models::Snapshot;
use crate::utils::parse_now;
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};

/// `--now` when given, the wall clock otherwise.
pub fn now_from(m: &clap::ArgMatches) -> Result<DateTime<Utc>> {
    match m.get_one::<String>("now") {
        Some(s) => parse_now(s),
        None => Ok(Utc::now()),
    }
}

pub fn today_from(m: &clap::ArgMatches) -> Result<NaiveDate> {
    Ok(now_from(m)?.date_naive())
}

/// Converter for the ledger's base and display currency. Fails when the rate
/// table has no entry for the base.
pub(crate) fn money(snapshot: &Snapshot) -> Result<Converter<'_>> {
    let table = CurrencyTable::standard();
    table
        .get(&snapshot.base_currency)
        .with_context(|| format!("Ledger base currency '{}' is not supported", snapshot.base_currency))?;
    Ok(table.converter(&snapshot.base_currency, &snapshot.display_currency))
}

pub(crate) fn arg<'a>(m: &'a clap::ArgMatches, name: &str) -> &'a str {
    m.get_one::<String>(name).map(|s| s.trim()).unwrap_or_default()
}

pub(crate) fn opt_arg(m: &clap::ArgMatches, name: &str) -> Option<String> {
    m.get_one::<String>(name)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
