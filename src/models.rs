// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category label carried by every income record.
pub const INCOME_CATEGORY: &str = "Income";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    #[serde(alias = "income")]
    Income,
    #[serde(alias = "expense")]
    Expense,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Income => "Income",
            RecordKind::Expense => "Expense",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Some(RecordKind::Income),
            "expense" => Some(RecordKind::Expense),
            _ => None,
        }
    }
}

/// An income or expense entry. Amounts are always in the base currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoneyRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: RecordKind,
    pub date: String, // YYYY-MM-DD, parsed leniently
    pub amount: Decimal,
    pub category: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt: Option<String>,
}

impl MoneyRecord {
    pub fn income(id: &str, date: &str, name: &str, amount: Decimal) -> Self {
        MoneyRecord {
            id: id.to_string(),
            kind: RecordKind::Income,
            date: date.to_string(),
            amount,
            category: INCOME_CATEGORY.to_string(),
            name: name.to_string(),
            notes: None,
            receipt: None,
        }
    }

    pub fn expense(id: &str, date: &str, category: &str, name: &str, amount: Decimal) -> Self {
        MoneyRecord {
            id: id.to_string(),
            kind: RecordKind::Expense,
            date: date.to_string(),
            amount,
            category: category.to_string(),
            name: name.to_string(),
            notes: None,
            receipt: None,
        }
    }

    pub fn is_income(&self) -> bool {
        self.kind == RecordKind::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == RecordKind::Expense
    }
}

/// How a budget's active window is resolved.
///
/// Unknown period strings are kept verbatim so they survive a load/save
/// round trip, but they never resolve to a window.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BudgetPeriod {
    Monthly,
    Weekly,
    Yearly,
    OneTime,
    Unrecognized(String),
}

impl BudgetPeriod {
    pub fn as_str(&self) -> &str {
        match self {
            BudgetPeriod::Monthly => "monthly",
            BudgetPeriod::Weekly => "weekly",
            BudgetPeriod::Yearly => "yearly",
            BudgetPeriod::OneTime => "one-time",
            BudgetPeriod::Unrecognized(raw) => raw.as_str(),
        }
    }
}

impl From<String> for BudgetPeriod {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "monthly" => BudgetPeriod::Monthly,
            "weekly" => BudgetPeriod::Weekly,
            "yearly" => BudgetPeriod::Yearly,
            "one-time" | "one_time" | "onetime" | "custom" => BudgetPeriod::OneTime,
            _ => BudgetPeriod::Unrecognized(raw),
        }
    }
}

impl From<&str> for BudgetPeriod {
    fn from(raw: &str) -> Self {
        BudgetPeriod::from(raw.to_string())
    }
}

impl From<BudgetPeriod> for String {
    fn from(p: BudgetPeriod) -> Self {
        p.as_str().to_string()
    }
}

impl fmt::Display for BudgetPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub id: String,
    pub category: String,
    pub limit: Decimal, // base currency
    pub period: BudgetPeriod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    pub title: String,
    pub target: Decimal,
    pub saved: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Recurrence {
    Monthly,
    Weekly,
    Yearly,
    OneTime,
}

impl Recurrence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recurrence::Monthly => "Monthly",
            Recurrence::Weekly => "Weekly",
            Recurrence::Yearly => "Yearly",
            Recurrence::OneTime => "One-time",
        }
    }
}

impl From<String> for Recurrence {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "weekly" => Recurrence::Weekly,
            "yearly" => Recurrence::Yearly,
            "one-time" | "one_time" | "onetime" => Recurrence::OneTime,
            // the reminder form defaults to monthly
            _ => Recurrence::Monthly,
        }
    }
}

impl From<Recurrence> for String {
    fn from(r: Recurrence) -> Self {
        r.as_str().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub id: String,
    pub title: String,
    pub amount: Decimal,
    pub due_date: String,
    pub recurring: Recurrence,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AlertKind {
    Overspending,
    DueSoon,
    DueToday,
    Overdue,
    Goal,
    LowSavings,
    Achievement,
    /// User-added notification types ("info" by default).
    Other(String),
}

impl AlertKind {
    pub fn as_str(&self) -> &str {
        match self {
            AlertKind::Overspending => "overspending",
            AlertKind::DueSoon => "due-soon",
            AlertKind::DueToday => "due-today",
            AlertKind::Overdue => "overdue",
            AlertKind::Goal => "goal",
            AlertKind::LowSavings => "low-savings",
            AlertKind::Achievement => "achievement",
            AlertKind::Other(raw) => raw.as_str(),
        }
    }
}

impl From<String> for AlertKind {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "overspending" => AlertKind::Overspending,
            "due-soon" | "upcoming-bill" => AlertKind::DueSoon,
            "due-today" => AlertKind::DueToday,
            "overdue" => AlertKind::Overdue,
            "goal" => AlertKind::Goal,
            "low-savings" => AlertKind::LowSavings,
            "achievement" => AlertKind::Achievement,
            _ => AlertKind::Other(raw),
        }
    }
}

impl From<AlertKind> for String {
    fn from(k: AlertKind) -> Self {
        k.as_str().to_string()
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A notification. Derived alerts are recomputed on every evaluation; the
/// `read` flag is joined in from the persisted read-id set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub message: String,
    pub date: String, // ISO timestamp
    #[serde(default)]
    pub read: bool,
}

/// Everything the engine reads in one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub base_currency: String,
    pub display_currency: String,
    #[serde(default)]
    pub records: Vec<MoneyRecord>,
    #[serde(default)]
    pub budgets: Vec<Budget>,
    #[serde(default)]
    pub goals: Vec<Goal>,
    #[serde(default)]
    pub reminders: Vec<Reminder>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Snapshot {
            base_currency: crate::config::DEFAULT_BASE_CURRENCY.to_string(),
            display_currency: crate::config::DEFAULT_BASE_CURRENCY.to_string(),
            records: Vec::new(),
            budgets: Vec::new(),
            goals: Vec::new(),
            reminders: Vec::new(),
        }
    }
}

impl Snapshot {
    pub fn incomes(&self) -> impl Iterator<Item = &MoneyRecord> {
        self.records.iter().filter(|r| r.is_income())
    }

    pub fn expenses(&self) -> impl Iterator<Item = &MoneyRecord> {
        self.records.iter().filter(|r| r.is_expense())
    }
}

/// Next free id of the form `{prefix}-{n}`.
pub fn next_id<'a>(prefix: &str, existing: impl IntoIterator<Item = &'a str>) -> String {
    let marker = format!("{}-", prefix);
    let max = existing
        .into_iter()
        .filter_map(|id| id.strip_prefix(&marker))
        .filter_map(|n| n.parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    format!("{}{}", marker, max + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_period_survives_round_trip() {
        let b: Budget = serde_json::from_str(
            r#"{"id":"b1","category":"Food","limit":"400","period":"fortnightly"}"#,
        )
        .unwrap();
        assert_eq!(b.period, BudgetPeriod::Unrecognized("fortnightly".into()));
        let out = serde_json::to_string(&b).unwrap();
        assert!(out.contains(r#""period":"fortnightly""#));
    }

    #[test]
    fn custom_period_is_one_time() {
        assert_eq!(BudgetPeriod::from("Custom"), BudgetPeriod::OneTime);
        assert_eq!(BudgetPeriod::from("Monthly"), BudgetPeriod::Monthly);
    }

    #[test]
    fn legacy_upcoming_bill_kind_maps_to_due_soon() {
        assert_eq!(AlertKind::from("upcoming-bill".to_string()), AlertKind::DueSoon);
        assert_eq!(
            AlertKind::from("info".to_string()),
            AlertKind::Other("info".into())
        );
    }

    #[test]
    fn next_id_skips_foreign_ids() {
        let ids = ["goal-1", "goal-7", "bud-9", "goal-x"];
        assert_eq!(next_id("goal", ids), "goal-8");
        assert_eq!(next_id("rem", ids), "rem-1");
    }
}
