// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use pennywise::db::{LedgerRepository, SqliteLedger};
use pennywise::models::RecordKind;
use pennywise::{cli, commands::reports, commands::transactions};
use rust_decimal::Decimal;

fn run(repo: &mut dyn LedgerRepository, args: &[&str]) -> anyhow::Result<()> {
    let matches = cli::build_cli().get_matches_from(std::iter::once("pennywise").chain(args.iter().copied()));
    if let Some(("tx", tx_m)) = matches.subcommand() {
        transactions::handle(repo, tx_m)
    } else {
        panic!("tx command not parsed");
    }
}

#[test]
fn tx_add_trims_inputs_and_assigns_ids() {
    let mut repo = SqliteLedger::in_memory().unwrap();
    run(&mut repo, &["tx", "add", "--kind", "income", "--date", " 2025-11-01 ", "--amount", " 3500 ", "--name", " Salary "]).unwrap();
    run(&mut repo, &["tx", "add", "--kind", "expense", "--date", "2025-11-02", "--amount", "120", "--name", "Groceries", "--category", " Food "]).unwrap();
    run(&mut repo, &["tx", "add", "--kind", "expense", "--date", "2025-11-03", "--amount", "30", "--name", "Lunch", "--category", "Food"]).unwrap();

    let snap = repo.load().unwrap();
    let ids: Vec<&str> = snap.records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["inc-1", "exp-1", "exp-2"]);
    assert_eq!(snap.records[0].kind, RecordKind::Income);
    assert_eq!(snap.records[0].category, "Income");
    assert_eq!(snap.records[0].name, "Salary");
    assert_eq!(snap.records[1].category, "Food");

    let totals = reports::totals_for(&snap, None);
    assert_eq!(totals.income, Decimal::from(3500));
    assert_eq!(totals.expense, Decimal::from(150));
    assert_eq!(totals.savings, Decimal::from(3350));
    let nov = reports::totals_for(&snap, Some("2025-11"));
    assert_eq!(nov, totals);
    assert_eq!(reports::totals_for(&snap, Some("2025-10")).income, Decimal::ZERO);
}

#[test]
fn tx_amounts_are_stored_in_base_currency() {
    let mut repo = SqliteLedger::in_memory().unwrap();
    repo.set_setting("display_currency", "INR").unwrap();
    run(&mut repo, &["tx", "add", "--kind", "expense", "--date", "2025-11-02", "--amount", "834", "--name", "Dinner", "--category", "Food"]).unwrap();
    let snap = repo.load().unwrap();
    // 834 INR at 83.40 per USD
    assert_eq!(snap.records[0].amount, Decimal::from(10));
}

#[test]
fn tx_add_rejects_bad_input() {
    let mut repo = SqliteLedger::in_memory().unwrap();
    let err = run(&mut repo, &["tx", "add", "--kind", "expense", "--date", "2025-11-02", "--amount", "12", "--name", "Taxi"]).unwrap_err();
    assert!(err.to_string().contains("--category"));
    let err = run(&mut repo, &["tx", "add", "--kind", "income", "--date", "02/11/2025", "--amount", "12", "--name", "Gift"]).unwrap_err();
    assert!(err.to_string().contains("Invalid date"));
    let err = run(&mut repo, &["tx", "add", "--kind", "income", "--date", "2025-11-02", "--amount=-1", "--name", "Gift"]).unwrap_err();
    assert!(err.to_string().contains("negative"));
    assert!(repo.load().unwrap().records.is_empty());
}

#[test]
fn tx_rm_deletes_by_id() {
    let mut repo = SqliteLedger::in_memory().unwrap();
    run(&mut repo, &["tx", "add", "--kind", "income", "--date", "2025-11-01", "--amount", "10", "--name", "Gift"]).unwrap();
    run(&mut repo, &["tx", "list", "--month", "2025-11"]).unwrap();
    run(&mut repo, &["tx", "rm", "--id", "inc-1"]).unwrap();
    assert!(repo.load().unwrap().records.is_empty());
    let err = run(&mut repo, &["tx", "rm", "--id", "inc-1"]).unwrap_err();
    assert!(err.to_string().contains("No record"));
}
