// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use pennywise::config::EngineConfig;
use pennywise::db::{LedgerRepository, SqliteLedger};
use pennywise::distribute::SurplusPolicy;
use pennywise::utils::parse_now;
use pennywise::{cli, commands};
use rust_decimal::Decimal;

fn run(repo: &mut dyn LedgerRepository, args: &[&str]) -> anyhow::Result<()> {
    let matches = cli::build_cli().get_matches_from(std::iter::once("pennywise").chain(args.iter().copied()));
    match matches.subcommand() {
        Some(("currency", sub)) => commands::currency::handle(repo, sub),
        Some(("config", sub)) => commands::config::handle(repo, sub),
        Some(("report", sub)) => commands::reports::handle(repo, sub),
        Some(("tx", sub)) => commands::transactions::handle(repo, sub),
        Some(("goal", sub)) => commands::goals::handle(repo, sub),
        _ => panic!("command not parsed"),
    }
}

#[test]
fn currency_set_validates_and_persists() {
    let mut repo = SqliteLedger::in_memory().unwrap();
    run(&mut repo, &["currency", "set", "npr"]).unwrap();
    assert_eq!(repo.load().unwrap().display_currency, "NPR");
    assert_eq!(repo.load().unwrap().base_currency, "USD");

    let err = run(&mut repo, &["currency", "set", "XYZ"]).unwrap_err();
    assert!(err.to_string().contains("XYZ"));
    assert_eq!(repo.load().unwrap().display_currency, "NPR");

    run(&mut repo, &["currency", "list", "--json"]).unwrap();
    run(&mut repo, &["currency", "convert", "--amount", "100", "--from", "usd", "--to", "inr"]).unwrap();
    assert!(run(&mut repo, &["currency", "convert", "--amount", "1", "--from", "USD", "--to", "GBP"]).is_err());
}

#[test]
fn config_set_overrides_thresholds() {
    let mut repo = SqliteLedger::in_memory().unwrap();
    run(&mut repo, &["config", "set", "achievement_threshold", "250"]).unwrap();
    run(&mut repo, &["config", "set", "surplus_policy", "skip"]).unwrap();
    let cfg = EngineConfig::load(&repo).unwrap();
    assert_eq!(cfg.achievement_threshold, Decimal::from(250));
    assert_eq!(cfg.surplus_policy, SurplusPolicy::Skip);
    assert_eq!(cfg.bill_lookahead_days, 7);
    run(&mut repo, &["config", "show"]).unwrap();
}

#[test]
fn config_set_rejects_bad_values_without_persisting() {
    let mut repo = SqliteLedger::in_memory().unwrap();
    let err = run(&mut repo, &["config", "set", "bill_lookahead_days", "soon"]).unwrap_err();
    assert!(err.to_string().contains("bill_lookahead_days"));
    assert_eq!(repo.setting("bill_lookahead_days").unwrap(), None);

    let err = run(&mut repo, &["config", "set", "colour", "blue"]).unwrap_err();
    assert!(err.to_string().contains("Unknown setting"));
}

#[test]
fn reports_run_on_an_empty_ledger() {
    let mut repo = SqliteLedger::in_memory().unwrap();
    run(&mut repo, &["report", "totals"]).unwrap();
    run(&mut repo, &["report", "by-category", "--month", "2025-11"]).unwrap();
    run(&mut repo, &["report", "trend", "--weekly", "--jsonl"]).unwrap();
    assert!(run(&mut repo, &["report", "totals", "--month", "2025-13"]).is_err());
}

#[test]
fn euro_based_ledger_keeps_amounts_at_face_value() {
    let mut repo = SqliteLedger::in_memory().unwrap();
    repo.set_setting("base_currency", "EUR").unwrap();
    repo.set_setting("display_currency", "EUR").unwrap();
    run(&mut repo, &["tx", "add", "--kind", "income", "--date", "2025-10-01", "--amount", "100", "--name", "Salary"]).unwrap();
    run(&mut repo, &["tx", "add", "--kind", "expense", "--date", "2025-10-02", "--amount", "200", "--name", "Rent", "--category", "Rent"]).unwrap();

    let snap = repo.load().unwrap();
    assert_eq!(snap.base_currency, "EUR");
    assert_eq!(snap.records[0].amount, Decimal::from(100));
    assert_eq!(snap.records[1].amount, Decimal::from(200));

    let alerts = commands::alerts::current(&repo, parse_now("2025-11-20").unwrap()).unwrap();
    let warning = alerts.iter().find(|a| a.id == "savings-warning").unwrap();
    assert_eq!(warning.message, "Savings dipped to -€100,00. Review spending to stay on track.");
}

#[test]
fn unsupported_base_currency_is_rejected() {
    let mut repo = SqliteLedger::in_memory().unwrap();
    repo.set_setting("base_currency", "XYZ").unwrap();
    let err = run(&mut repo, &["tx", "add", "--kind", "income", "--date", "2025-10-01", "--amount", "5", "--name", "Gift"])
        .unwrap_err();
    assert!(err.to_string().contains("XYZ"));
    assert!(repo.load().unwrap().records.is_empty());
}

#[test]
fn json_amounts_are_in_the_base_currency() {
    let mut repo = SqliteLedger::in_memory().unwrap();
    run(&mut repo, &["currency", "set", "INR"]).unwrap();
    run(&mut repo, &["tx", "add", "--kind", "income", "--date", "2025-11-01", "--amount", "834", "--name", "Gift"]).unwrap();
    run(&mut repo, &["goal", "add", "--title", "Laptop", "--target", "8340"]).unwrap();
    let outputs: [&[&str]; 5] = [
        &["report", "totals", "--json"],
        &["report", "by-category", "--json"],
        &["report", "trend", "--jsonl"],
        &["goal", "list", "--json"],
        &["goal", "distribute", "--amount", "834", "--dry-run", "--json"],
    ];
    for args in outputs {
        run(&mut repo, args).unwrap();
    }

    let snap = repo.load().unwrap();
    assert_eq!(commands::reports::totals_for(&snap, None).income, Decimal::from(10));
    let goals = commands::goals::rows(&snap);
    assert_eq!(goals[0].goal.target, Decimal::from(100));
    assert_eq!(goals[0].progress, 0);
    assert_eq!(snap.goals[0].saved, Decimal::ZERO);
}
