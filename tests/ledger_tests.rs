// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use pennywise::db::{JsonLedger, LedgerRepository, MemoryLedger, SqliteLedger};
use pennywise::models::{
    Alert, AlertKind, Budget, BudgetPeriod, Goal, MoneyRecord, Recurrence, Reminder, Snapshot,
};
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use tempfile::tempdir;

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn sample() -> Snapshot {
    let mut groceries = MoneyRecord::expense("exp-1", "2025-11-02", "Food", "Groceries", dec("120.50"));
    groceries.notes = Some("weekly shop".into());
    Snapshot {
        base_currency: "USD".into(),
        display_currency: "EUR".into(),
        records: vec![
            MoneyRecord::income("inc-1", "2025-11-01", "Salary", dec("3500")),
            groceries,
        ],
        budgets: vec![
            Budget {
                id: "bud-1".into(),
                category: "Food".into(),
                limit: dec("400"),
                period: BudgetPeriod::Monthly,
                start_date: None,
                end_date: None,
            },
            Budget {
                id: "bud-2".into(),
                category: "Travel".into(),
                limit: dec("900"),
                period: BudgetPeriod::from("fortnightly"),
                start_date: Some("2025-11-01".into()),
                end_date: None,
            },
        ],
        goals: vec![Goal {
            id: "g-1".into(),
            title: "Trip".into(),
            target: dec("1500"),
            saved: dec("300.25"),
            deadline: Some("2025-12-01".into()),
        }],
        reminders: vec![Reminder {
            id: "rem-1".into(),
            title: "Rent".into(),
            amount: dec("900"),
            due_date: "2025-11-22".into(),
            recurring: Recurrence::OneTime,
            category: Some("Housing".into()),
            description: None,
        }],
    }
}

fn custom(id: &str, date: &str) -> Alert {
    Alert {
        id: id.into(),
        kind: AlertKind::Other("info".into()),
        message: format!("note {}", id),
        date: date.into(),
        read: false,
    }
}

fn exercise(repo: &mut dyn LedgerRepository) {
    let snap = sample();
    repo.save(&snap).unwrap();
    assert_eq!(repo.load().unwrap(), snap);

    // save replaces, it does not append
    let mut smaller = snap.clone();
    smaller.records.truncate(1);
    smaller.goals.clear();
    repo.save(&smaller).unwrap();
    assert_eq!(repo.load().unwrap(), smaller);

    let ids: BTreeSet<String> = ["bill-rem-1", "savings-warning"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    repo.save_read_ids(&ids).unwrap();
    assert_eq!(repo.read_ids().unwrap(), ids);

    repo.add_notification(&custom("ntf-1", "2025-11-10T08:00:00Z")).unwrap();
    repo.add_notification(&custom("ntf-2", "2025-11-11T08:00:00Z")).unwrap();
    let mut edited = custom("ntf-1", "2025-11-10T08:00:00Z");
    edited.message = "edited".into();
    repo.add_notification(&edited).unwrap();
    let stored = repo.notifications().unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored.iter().find(|a| a.id == "ntf-1").unwrap().message, "edited");

    assert_eq!(repo.setting("overspend_ratio").unwrap(), None);
    repo.set_setting("overspend_ratio", "0.8").unwrap();
    repo.set_setting("overspend_ratio", "0.75").unwrap();
    assert_eq!(repo.setting("overspend_ratio").unwrap().as_deref(), Some("0.75"));
}

#[test]
fn sqlite_ledger_round_trips() {
    let mut repo = SqliteLedger::in_memory().unwrap();
    exercise(&mut repo);
}

#[test]
fn memory_ledger_round_trips() {
    let mut repo = MemoryLedger::default();
    exercise(&mut repo);
}

#[test]
fn json_ledger_round_trips_and_persists() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("ledger.json");
    {
        let mut repo = JsonLedger::open(&path).unwrap();
        exercise(&mut repo);
    }
    let reopened = JsonLedger::open(&path).unwrap();
    let snap = reopened.load().unwrap();
    assert_eq!(snap.records.len(), 1);
    assert_eq!(snap.display_currency, "EUR");
    assert_eq!(reopened.read_ids().unwrap().len(), 2);
    assert_eq!(reopened.setting("overspend_ratio").unwrap().as_deref(), Some("0.75"));
}

#[test]
fn json_ledger_uses_the_original_wire_shape() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ledger.json");
    let mut repo = JsonLedger::open(&path).unwrap();
    repo.save(&sample()).unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["records"][1]["type"], "Expense");
    assert_eq!(raw["reminders"][0]["dueDate"], "2025-11-22");
    assert_eq!(raw["reminders"][0]["recurring"], "One-time");
    assert_eq!(raw["budgets"][1]["period"], "fortnightly");
    assert_eq!(raw["budgets"][1]["startDate"], "2025-11-01");
}

#[test]
fn json_ledger_refresh_sees_other_writers() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ledger.json");
    let mut watcher = JsonLedger::open(&path).unwrap();
    assert!(watcher.load().unwrap().records.is_empty());

    let mut writer = JsonLedger::open(&path).unwrap();
    writer.save(&sample()).unwrap();
    assert!(watcher.load().unwrap().records.is_empty());
    watcher.refresh().unwrap();
    assert_eq!(watcher.load().unwrap().records.len(), 2);
}

#[test]
fn fresh_ledgers_default_to_usd() {
    let repo = SqliteLedger::in_memory().unwrap();
    let snap = repo.load().unwrap();
    assert_eq!(snap.base_currency, "USD");
    assert_eq!(snap.display_currency, "USD");
    assert!(snap.records.is_empty());

    let mut repo = MemoryLedger::default();
    repo.set_setting("base_currency", "EUR").unwrap();
    assert_eq!(repo.load().unwrap().display_currency, "EUR");
}
