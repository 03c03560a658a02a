// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Notification derivation.
//!
//! Alerts are never stored: every evaluation rebuilds them from the snapshot
//! and a clock. Each id is derived from the record that raised it, so the same
//! snapshot and clock always produce the same ids. The only persisted part is
//! the set of ids the user has read.

use crate::aggregate::{compute_month_totals, compute_spent_for_budget, compute_totals, percent_of_limit};
use crate::config::EngineConfig;
use crate::currency::{Converter, CurrencyTable};
use crate::models::{Alert, AlertKind, Reminder, Snapshot, next_id};
use crate::utils::{lenient_date, midnight_utc, month_key};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

pub const SAVINGS_WARNING_ID: &str = "savings-warning";
pub const ACHIEVEMENT_ID: &str = "achievement-500";

/// `ceil((date - now) / 1 day)`, with `date` taken at midnight UTC.
pub fn days_until(date: NaiveDate, now: DateTime<Utc>) -> i64 {
    let ms = (midnight_utc(date) - now).num_milliseconds();
    let whole = ms.div_euclid(DAY_MS);
    if ms.rem_euclid(DAY_MS) == 0 { whole } else { whole + 1 }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "days", rename_all = "kebab-case")]
pub enum BillStatus {
    Overdue(i64),
    DueToday,
    DueSoon(i64),
}

impl BillStatus {
    pub fn from_days_left(days_left: i64, due_soon_within: i64) -> Option<Self> {
        match days_left {
            d if d < 0 => Some(BillStatus::Overdue(-d)),
            0 => Some(BillStatus::DueToday),
            d if d <= due_soon_within => Some(BillStatus::DueSoon(d)),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BillStatus::Overdue(_) => "Overdue",
            BillStatus::DueToday => "Due today",
            BillStatus::DueSoon(_) => "Due soon",
        }
    }

    fn kind(&self) -> AlertKind {
        match self {
            BillStatus::Overdue(_) => AlertKind::Overdue,
            BillStatus::DueToday => AlertKind::DueToday,
            BillStatus::DueSoon(_) => AlertKind::DueSoon,
        }
    }
}

/// Status of a reminder; `None` when it is further out than
/// `due_soon_within` days or its due date cannot be read.
pub fn reminder_status(
    reminder: &Reminder,
    now: DateTime<Utc>,
    due_soon_within: i64,
) -> Option<BillStatus> {
    let due = lenient_date(&reminder.due_date)?;
    BillStatus::from_days_left(days_until(due, now), due_soon_within)
}

fn plural(n: i64) -> &'static str {
    if n == 1 { "" } else { "s" }
}

fn iso(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn derive_alerts(
    snapshot: &Snapshot,
    now: DateTime<Utc>,
    config: &EngineConfig,
    currencies: &CurrencyTable,
) -> Vec<Alert> {
    let money = currencies.converter(&snapshot.base_currency, &snapshot.display_currency);
    let mut alerts = Vec::new();
    overspending(snapshot, now, config, &money, &mut alerts);
    bills(snapshot, now, config, &money, &mut alerts);
    goals(snapshot, now, config, &money, &mut alerts);
    savings(snapshot, now, config, &money, &mut alerts);
    debug!(count = alerts.len(), "Derived alerts");
    alerts
}

fn overspending(
    snapshot: &Snapshot,
    now: DateTime<Utc>,
    config: &EngineConfig,
    money: &Converter<'_>,
    out: &mut Vec<Alert>,
) {
    let today = now.date_naive();
    for budget in &snapshot.budgets {
        if budget.limit <= Decimal::ZERO {
            continue;
        }
        let spent = compute_spent_for_budget(budget, snapshot.expenses(), today);
        if spent > budget.limit * config.overspend_ratio {
            out.push(Alert {
                id: format!("overspending-{}", budget.id),
                kind: AlertKind::Overspending,
                message: format!(
                    "You have used {}% of your {} budget ({} limit).",
                    percent_of_limit(spent, budget.limit),
                    budget.category,
                    money.fmt(budget.limit)
                ),
                date: iso(now),
                read: false,
            });
        }
    }
}

fn bills(
    snapshot: &Snapshot,
    now: DateTime<Utc>,
    config: &EngineConfig,
    money: &Converter<'_>,
    out: &mut Vec<Alert>,
) {
    for rem in &snapshot.reminders {
        let Some(due) = lenient_date(&rem.due_date) else {
            continue;
        };
        let Some(status) = BillStatus::from_days_left(days_until(due, now), config.bill_lookahead_days)
        else {
            continue;
        };
        let head = format!("{} ({})", rem.title, money.fmt(rem.amount));
        let message = match status {
            BillStatus::Overdue(n) => format!("{} is overdue by {} day{}.", head, n, plural(n)),
            BillStatus::DueToday => format!("{} is due today.", head),
            BillStatus::DueSoon(n) => format!("{} is due in {} day{}.", head, n, plural(n)),
        };
        out.push(Alert {
            id: format!("bill-{}", rem.id),
            kind: status.kind(),
            message,
            date: iso(midnight_utc(due)),
            read: false,
        });
    }
}

fn goals(
    snapshot: &Snapshot,
    now: DateTime<Utc>,
    config: &EngineConfig,
    money: &Converter<'_>,
    out: &mut Vec<Alert>,
) {
    for goal in &snapshot.goals {
        let Some(deadline) = goal.deadline.as_deref().and_then(lenient_date) else {
            continue;
        };
        let days = days_until(deadline, now);
        if !(0..=config.goal_lookahead_days).contains(&days) {
            continue;
        }
        let when = if days == 0 {
            "today".to_string()
        } else {
            format!("in {} day{}", days, plural(days))
        };
        let remaining = (goal.target - goal.saved).max(Decimal::ZERO);
        let message = if remaining.is_zero() {
            format!("{} is due {} and fully funded.", goal.title, when)
        } else {
            format!(
                "{} is due {} with {} still to save. Keep saving!",
                goal.title,
                when,
                money.fmt(remaining)
            )
        };
        out.push(Alert {
            id: format!("goal-{}", goal.id),
            kind: AlertKind::Goal,
            message,
            date: iso(midnight_utc(deadline)),
            read: false,
        });
    }
}

fn savings(
    snapshot: &Snapshot,
    now: DateTime<Utc>,
    config: &EngineConfig,
    money: &Converter<'_>,
    out: &mut Vec<Alert>,
) {
    let totals = compute_totals(snapshot.incomes(), snapshot.expenses());
    if totals.savings < Decimal::ZERO {
        out.push(Alert {
            id: SAVINGS_WARNING_ID.to_string(),
            kind: AlertKind::LowSavings,
            message: format!(
                "Savings dipped to {}. Review spending to stay on track.",
                money.fmt(totals.savings)
            ),
            date: iso(now),
            read: false,
        });
    }

    let month = compute_month_totals(&snapshot.records, &month_key(now.date_naive()));
    if money.from_base(month.savings) >= config.achievement_threshold {
        out.push(Alert {
            id: ACHIEVEMENT_ID.to_string(),
            kind: AlertKind::Achievement,
            message: format!("You saved {} this month!", money.fmt(month.savings)),
            date: iso(now),
            read: false,
        });
    }
}

/// Ids of alerts the user has already seen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReadState {
    ids: BTreeSet<String>,
}

impl ReadState {
    pub fn new(ids: BTreeSet<String>) -> Self {
        ReadState { ids }
    }

    pub fn ids(&self) -> &BTreeSet<String> {
        &self.ids
    }

    pub fn is_read(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn mark_read(&mut self, id: &str) -> bool {
        self.ids.insert(id.to_string())
    }

    /// Adds every given alert id; returns how many were new.
    pub fn mark_all_read(&mut self, alerts: &[Alert]) -> usize {
        alerts
            .iter()
            .filter(|a| self.ids.insert(a.id.clone()))
            .count()
    }

    pub fn unread_count(&self, alerts: &[Alert]) -> usize {
        alerts.iter().filter(|a| !self.is_read(&a.id)).count()
    }
}

fn sort_key(date: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(date)
        .map(|d| d.with_timezone(&Utc))
        .ok()
        .or_else(|| lenient_date(date).map(midnight_utc))
}

/// Merges derived and user-added notifications into the list the bell shows:
/// one entry per id (later entries win), read flags applied, newest first.
pub fn notifications(derived: Vec<Alert>, custom: Vec<Alert>, read: &ReadState) -> Vec<Alert> {
    let mut merged: Vec<Alert> = Vec::new();
    let mut slots: HashMap<String, usize> = HashMap::new();
    for alert in derived.into_iter().chain(custom) {
        match slots.get(&alert.id) {
            Some(&i) => merged[i] = alert,
            None => {
                slots.insert(alert.id.clone(), merged.len());
                merged.push(alert);
            }
        }
    }
    for a in merged.iter_mut() {
        a.read = read.is_read(&a.id);
    }
    merged.sort_by(|a, b| sort_key(&b.date).cmp(&sort_key(&a.date)));
    merged
}

/// A user-added notification with the next free `ntf-N` id.
pub fn custom_notification(
    kind: Option<&str>,
    message: &str,
    now: DateTime<Utc>,
    existing: &[Alert],
) -> Alert {
    Alert {
        id: next_id("ntf", existing.iter().map(|a| a.id.as_str())),
        kind: AlertKind::from(kind.unwrap_or("info").to_string()),
        message: message.to_string(),
        date: iso(now),
        read: false,
    }
}
