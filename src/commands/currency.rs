// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::arg;
use crate::config::KEY_DISPLAY_CURRENCY;
use crate::currency::CurrencyTable;
use crate::db::LedgerRepository;
use crate::utils::{maybe_print_json, parse_decimal, pretty_table};
use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

pub fn handle(repo: &mut dyn LedgerRepository, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => list(repo, sub)?,
        Some(("set", sub)) => set(repo, sub)?,
        Some(("convert", sub)) => convert(sub)?,
        _ => {}
    }
    Ok(())
}

#[derive(Serialize)]
struct CurrencyRow<'a> {
    code: &'a str,
    label: &'a str,
    symbol: &'a str,
    rate: Decimal,
    selected: bool,
}

fn list(repo: &mut dyn LedgerRepository, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let snap = repo.load()?;
    let table = CurrencyTable::standard();
    let rows: Vec<CurrencyRow> = table
        .codes()
        .map(|(code, info)| CurrencyRow {
            code,
            label: &info.label,
            symbol: &info.symbol,
            rate: info.rate,
            selected: code.eq_ignore_ascii_case(&snap.display_currency),
        })
        .collect();
    if maybe_print_json(json_flag, jsonl_flag, &rows)? {
        return Ok(());
    }
    let data = rows
        .iter()
        .map(|r| {
            vec![
                if r.selected { "*".into() } else { String::new() },
                r.code.to_string(),
                r.label.to_string(),
                r.symbol.to_string(),
                r.rate.to_string(),
            ]
        })
        .collect();
    let rate_hdr = format!("Per 1 {}", table.base());
    println!(
        "{}",
        pretty_table(&["", "Code", "Name", "Symbol", rate_hdr.as_str()], data)
    );
    Ok(())
}

fn set(repo: &mut dyn LedgerRepository, sub: &clap::ArgMatches) -> Result<()> {
    let code = arg(sub, "code").to_uppercase();
    CurrencyTable::standard()
        .get(&code)
        .with_context(|| format!("Cannot display amounts in '{}'", code))?;
    repo.set_setting(KEY_DISPLAY_CURRENCY, &code)?;
    info!(currency = %code, "Display currency changed");
    println!("Display currency set to {}", code);
    Ok(())
}

fn convert(sub: &clap::ArgMatches) -> Result<()> {
    let amount = parse_decimal(arg(sub, "amount"))?;
    let from = arg(sub, "from").to_uppercase();
    let to = arg(sub, "to").to_uppercase();
    let table = CurrencyTable::standard();
    let base = table.to_base(amount, &from)?;
    // validate before formatting; `format` would fall back silently
    table.get(&to)?;
    println!("{} {} = {}", amount, from, table.format(base, &to));
    Ok(())
}
