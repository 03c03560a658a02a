// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use std::path::Path;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use pennywise::db::{self, JsonLedger, LedgerRepository};
use pennywise::{cli, commands};

fn open_repo(file: Option<&String>) -> Result<Box<dyn LedgerRepository + Send>> {
    Ok(match file {
        Some(path) => Box::new(
            JsonLedger::open(Path::new(path))
                .with_context(|| format!("Could not open ledger file '{}'", path))?,
        ),
        None => Box::new(db::open_or_init().context("Could not open ledger database")?),
    })
}

fn main() -> Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if matches.get_flag("verbose") {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact().with_writer(std::io::stderr))
        .init();

    let file = matches.get_one::<String>("file");
    let mut repo = open_repo(file)?;

    match matches.subcommand() {
        Some(("init", _)) => match file {
            Some(path) => {
                let snap = repo.load()?;
                repo.save(&snap)?;
                println!("Ledger initialized at {}", path);
            }
            None => println!("Database initialized at {}", db::db_path()?.display()),
        },
        Some(("tx", sub)) => commands::transactions::handle(&mut *repo, sub)?,
        Some(("budget", sub)) => commands::budgets::handle(&mut *repo, sub)?,
        Some(("goal", sub)) => commands::goals::handle(&mut *repo, sub)?,
        Some(("reminder", sub)) => commands::reminders::handle(&mut *repo, sub)?,
        Some(("alerts", sub)) => commands::alerts::handle(&mut *repo, sub)?,
        Some(("report", sub)) => commands::reports::handle(&*repo, sub)?,
        Some(("currency", sub)) => commands::currency::handle(&mut *repo, sub)?,
        Some(("config", sub)) => commands::config::handle(&mut *repo, sub)?,
        Some(("watch", sub)) => commands::watch::handle(repo, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
