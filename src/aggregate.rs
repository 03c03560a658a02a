// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Totals, breakdowns, trend series and budget-vs-spend figures.
//!
//! All functions are pure. Records with unparseable dates are left out of any
//! date-filtered figure but still count toward plain totals.

use crate::models::{Budget, BudgetPeriod, Goal, MoneyRecord};
use crate::utils::{lenient_date, month_bounds, month_key, week_start};
use chrono::{Datelike, Days, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Totals {
    pub income: Decimal,
    pub expense: Decimal,
    pub savings: Decimal,
}

pub fn compute_totals<'a>(
    incomes: impl IntoIterator<Item = &'a MoneyRecord>,
    expenses: impl IntoIterator<Item = &'a MoneyRecord>,
) -> Totals {
    let income: Decimal = incomes.into_iter().map(|r| r.amount).sum();
    let expense: Decimal = expenses.into_iter().map(|r| r.amount).sum();
    Totals {
        income,
        expense,
        savings: income - expense,
    }
}

/// Totals for records dated inside one `YYYY-MM` month.
pub fn compute_month_totals<'a>(
    records: impl IntoIterator<Item = &'a MoneyRecord>,
    month: &str,
) -> Totals {
    let in_month: Vec<&MoneyRecord> = records
        .into_iter()
        .filter(|r| lenient_date(&r.date).is_some_and(|d| month_key(d) == month))
        .collect();
    compute_totals(
        in_month.iter().copied().filter(|r| r.is_income()),
        in_month.iter().copied().filter(|r| r.is_expense()),
    )
}

pub fn compute_category_breakdown<'a>(
    expenses: impl IntoIterator<Item = &'a MoneyRecord>,
) -> BTreeMap<String, Decimal> {
    let mut map = BTreeMap::new();
    for e in expenses {
        *map.entry(e.category.clone()).or_insert(Decimal::ZERO) += e.amount;
    }
    map
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthPoint {
    pub month: String,
    pub income: Decimal,
    pub expense: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekPoint {
    pub week_start: String,
    pub income: Decimal,
    pub expense: Decimal,
}

fn bucketed<'a>(
    incomes: impl IntoIterator<Item = &'a MoneyRecord>,
    expenses: impl IntoIterator<Item = &'a MoneyRecord>,
    key: impl Fn(NaiveDate) -> String,
) -> BTreeMap<String, (Decimal, Decimal)> {
    let mut map: BTreeMap<String, (Decimal, Decimal)> = BTreeMap::new();
    for i in incomes {
        if let Some(d) = lenient_date(&i.date) {
            map.entry(key(d)).or_default().0 += i.amount;
        }
    }
    for e in expenses {
        if let Some(d) = lenient_date(&e.date) {
            map.entry(key(d)).or_default().1 += e.amount;
        }
    }
    map
}

/// Income and expense per `YYYY-MM`, ascending. Keys sort lexicographically,
/// which for this format is chronological.
pub fn compute_monthly_trend<'a>(
    incomes: impl IntoIterator<Item = &'a MoneyRecord>,
    expenses: impl IntoIterator<Item = &'a MoneyRecord>,
) -> Vec<MonthPoint> {
    bucketed(incomes, expenses, month_key)
        .into_iter()
        .map(|(month, (income, expense))| MonthPoint {
            month,
            income,
            expense,
        })
        .collect()
}

/// Income and expense per Sunday-started week, ascending.
pub fn compute_weekly_trend<'a>(
    incomes: impl IntoIterator<Item = &'a MoneyRecord>,
    expenses: impl IntoIterator<Item = &'a MoneyRecord>,
) -> Vec<WeekPoint> {
    bucketed(incomes, expenses, |d| week_start(d).to_string())
        .into_iter()
        .map(|(week_start, (income, expense))| WeekPoint {
            week_start,
            income,
            expense,
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn contains(&self, d: NaiveDate) -> bool {
        self.start <= d && d <= self.end
    }
}

/// Date range a budget currently applies to. Recurring periods are
/// recomputed from `today`; one-time budgets use their stored dates.
pub fn active_window(budget: &Budget, today: NaiveDate) -> Option<DateWindow> {
    match &budget.period {
        BudgetPeriod::Monthly => {
            let (start, end) = month_bounds(today);
            Some(DateWindow { start, end })
        }
        BudgetPeriod::Weekly => {
            let start = week_start(today);
            let end = start.checked_add_days(Days::new(6))?;
            Some(DateWindow { start, end })
        }
        BudgetPeriod::Yearly => Some(DateWindow {
            start: NaiveDate::from_ymd_opt(today.year(), 1, 1)?,
            end: NaiveDate::from_ymd_opt(today.year(), 12, 31)?,
        }),
        BudgetPeriod::OneTime => {
            let start = lenient_date(budget.start_date.as_deref()?)?;
            let end = lenient_date(budget.end_date.as_deref()?)?;
            (start <= end).then_some(DateWindow { start, end })
        }
        BudgetPeriod::Unrecognized(_) => None,
    }
}

pub fn compute_spent_for_budget<'a>(
    budget: &Budget,
    expenses: impl IntoIterator<Item = &'a MoneyRecord>,
    today: NaiveDate,
) -> Decimal {
    let Some(window) = active_window(budget, today) else {
        return Decimal::ZERO;
    };
    expenses
        .into_iter()
        .filter(|e| e.category == budget.category)
        .filter(|e| lenient_date(&e.date).is_some_and(|d| window.contains(d)))
        .map(|e| e.amount)
        .sum()
}

/// `round(numerator / max(1, denominator) * 100)`, half away from zero,
/// never negative.
fn rounded_percent(numerator: Decimal, denominator: Decimal) -> u32 {
    let denom = denominator.max(Decimal::ONE);
    (numerator / denom * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .max(Decimal::ZERO)
        .to_u32()
        .unwrap_or(u32::MAX)
}

pub fn compute_percent_used(spent: Decimal, limit: Decimal) -> u32 {
    rounded_percent(spent, limit).min(100)
}

/// Unclamped percentage, for messages that may read "130%".
pub fn percent_of_limit(spent: Decimal, limit: Decimal) -> u32 {
    rounded_percent(spent, limit)
}

pub fn goal_progress(goal: &Goal) -> u32 {
    rounded_percent(goal.saved, goal.target).min(100)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetStatus {
    pub budget_id: String,
    pub category: String,
    pub limit: Decimal,
    pub spent: Decimal,
    pub percent: u32,
    pub over: bool,
    pub window: Option<DateWindow>,
}

pub fn budget_status<'a>(
    budget: &Budget,
    expenses: impl IntoIterator<Item = &'a MoneyRecord>,
    today: NaiveDate,
) -> BudgetStatus {
    let spent = compute_spent_for_budget(budget, expenses, today);
    BudgetStatus {
        budget_id: budget.id.clone(),
        category: budget.category.clone(),
        limit: budget.limit,
        spent,
        percent: compute_percent_used(spent, budget.limit),
        over: spent > budget.limit,
        window: active_window(budget, today),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn budget(period: &str) -> Budget {
        Budget {
            id: "bud-1".into(),
            category: "Food".into(),
            limit: dec("400"),
            period: BudgetPeriod::from(period),
            start_date: None,
            end_date: None,
        }
    }

    #[test]
    fn totals_from_dashboard_scenario() {
        let incomes = [MoneyRecord::income("inc-1", "2025-11-01", "Salary", dec("3500"))];
        let expenses = [MoneyRecord::expense("exp-1", "2025-11-02", "Food", "Groceries", dec("120"))];
        let t = compute_totals(&incomes, &expenses);
        assert_eq!(t.income, dec("3500"));
        assert_eq!(t.expense, dec("120"));
        assert_eq!(t.savings, dec("3380"));
    }

    #[test]
    fn savings_can_go_negative() {
        let incomes = [MoneyRecord::income("i", "2025-11-01", "Gig", dec("10.10"))];
        let expenses = [
            MoneyRecord::expense("a", "2025-11-02", "Rent", "Rent", dec("900")),
            MoneyRecord::expense("b", "bad-date", "Food", "Snack", dec("0.25")),
        ];
        let t = compute_totals(&incomes, &expenses);
        assert_eq!(t.savings, t.income - t.expense);
        assert_eq!(t.savings, dec("-890.15"));
    }

    #[test]
    fn category_breakdown_sums_per_category() {
        let expenses = [
            MoneyRecord::expense("a", "2025-11-02", "Food", "Groceries", dec("120")),
            MoneyRecord::expense("b", "2025-11-03", "Transport", "Uber", dec("22.5")),
            MoneyRecord::expense("c", "2025-11-09", "Food", "Cafe", dec("8.40")),
        ];
        let m = compute_category_breakdown(&expenses);
        assert_eq!(m.len(), 2);
        assert_eq!(m["Food"], dec("128.40"));
        assert_eq!(m["Transport"], dec("22.5"));
    }

    #[test]
    fn monthly_trend_unions_months_and_fills_zero() {
        let incomes = [
            MoneyRecord::income("i1", "2025-11-01", "Salary", dec("3500")),
            MoneyRecord::income("i2", "2025-09-15", "Salary", dec("3400")),
        ];
        let expenses = [
            MoneyRecord::expense("e1", "2025-10-02", "Food", "Groceries", dec("99")),
            MoneyRecord::expense("e2", "2025-11-20", "Food", "Groceries", dec("1")),
            MoneyRecord::expense("e3", "garbage", "Food", "Groceries", dec("1000")),
        ];
        let trend = compute_monthly_trend(&incomes, &expenses);
        let months: Vec<&str> = trend.iter().map(|p| p.month.as_str()).collect();
        assert_eq!(months, ["2025-09", "2025-10", "2025-11"]);
        assert_eq!(trend[0].expense, Decimal::ZERO);
        assert_eq!(trend[1].income, Decimal::ZERO);
        assert_eq!(trend[2].income, dec("3500"));
        assert_eq!(trend[2].expense, dec("1"));
    }

    #[test]
    fn weekly_trend_groups_by_sunday() {
        let incomes: [MoneyRecord; 0] = [];
        let expenses = [
            MoneyRecord::expense("a", "2025-11-09", "Food", "x", dec("1")),
            MoneyRecord::expense("b", "2025-11-15", "Food", "x", dec("2")),
            MoneyRecord::expense("c", "2025-11-16", "Food", "x", dec("4")),
        ];
        let trend = compute_weekly_trend(&incomes, &expenses);
        assert_eq!(trend.len(), 2);
        assert_eq!(trend[0].week_start, "2025-11-09");
        assert_eq!(trend[0].expense, dec("3"));
        assert_eq!(trend[1].week_start, "2025-11-16");
    }

    #[test]
    fn month_totals_only_count_that_month() {
        let records = [
            MoneyRecord::income("i1", "2025-11-01", "Salary", dec("3500")),
            MoneyRecord::income("i2", "2025-10-01", "Salary", dec("3500")),
            MoneyRecord::expense("e1", "2025-11-02", "Food", "x", dec("120")),
        ];
        let t = compute_month_totals(&records, "2025-11");
        assert_eq!(t.savings, dec("3380"));
    }

    #[test]
    fn monthly_window_follows_today() {
        let w = active_window(&budget("monthly"), day("2025-11-17")).unwrap();
        assert_eq!(w.start, day("2025-11-01"));
        assert_eq!(w.end, day("2025-11-30"));
    }

    #[test]
    fn weekly_and_yearly_windows() {
        let w = active_window(&budget("weekly"), day("2025-11-12")).unwrap();
        assert_eq!((w.start, w.end), (day("2025-11-09"), day("2025-11-15")));
        let y = active_window(&budget("yearly"), day("2025-11-12")).unwrap();
        assert_eq!((y.start, y.end), (day("2025-01-01"), day("2025-12-31")));
    }

    #[test]
    fn one_time_window_uses_stored_dates() {
        let mut b = budget("one-time");
        b.start_date = Some("2025-10-15".into());
        b.end_date = Some("2025-11-15".into());
        let w = active_window(&b, day("2026-03-01")).unwrap();
        assert_eq!((w.start, w.end), (day("2025-10-15"), day("2025-11-15")));

        b.end_date = Some("2025-10-01".into());
        assert!(active_window(&b, day("2026-03-01")).is_none());
        b.end_date = Some("not a date".into());
        assert!(active_window(&b, day("2026-03-01")).is_none());
    }

    #[test]
    fn spent_for_budget_scenario() {
        let expenses = [
            MoneyRecord::expense("a", "2025-11-02", "Food", "Groceries", dec("120")),
            MoneyRecord::expense("b", "2025-11-18", "Food", "Market", dec("130")),
            MoneyRecord::expense("c", "2025-10-30", "Food", "Old", dec("75")),
            MoneyRecord::expense("d", "2025-11-05", "Transport", "Bus", dec("40")),
            MoneyRecord::expense("e", "11/20/2025", "Food", "Bad", dec("999")),
        ];
        let b = budget("monthly");
        let today = day("2025-11-20");
        let spent = compute_spent_for_budget(&b, &expenses, today);
        assert_eq!(spent, dec("250"));
        assert_eq!(compute_percent_used(spent, b.limit), 63);
        let status = budget_status(&b, &expenses, today);
        assert!(!status.over);
        assert_eq!(status.percent, 63);
    }

    #[test]
    fn unrecognized_period_spends_nothing() {
        let expenses = [MoneyRecord::expense("a", "2025-11-02", "Food", "x", dec("120"))];
        let b = budget("fortnightly");
        assert_eq!(compute_spent_for_budget(&b, &expenses, day("2025-11-10")), Decimal::ZERO);
    }

    #[test]
    fn percent_is_clamped() {
        assert_eq!(compute_percent_used(dec("900"), dec("100")), 100);
        assert_eq!(compute_percent_used(dec("5"), Decimal::ZERO), 100);
        assert_eq!(compute_percent_used(dec("0.004"), Decimal::ZERO), 0);
        assert_eq!(compute_percent_used(Decimal::ZERO, dec("100")), 0);
        for (s, l) in [("0", "0"), ("1", "0.5"), ("33", "200"), ("1000", "1")] {
            let p = compute_percent_used(dec(s), dec(l));
            assert!(p <= 100);
        }
        assert_eq!(percent_of_limit(dec("520"), dec("400")), 130);
    }

    #[test]
    fn goal_progress_caps_at_hundred() {
        let mut g = Goal {
            id: "g".into(),
            title: "Fund".into(),
            target: dec("3000"),
            saved: dec("1200"),
            deadline: None,
        };
        assert_eq!(goal_progress(&g), 40);
        g.saved = dec("4000");
        assert_eq!(goal_progress(&g), 100);
    }
}
