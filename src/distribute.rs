// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Greedy allocation of a lump sum across savings goals.
//!
//! Goals are funded most-urgent first (earliest deadline; no deadline is
//! least urgent), larger shortfalls first among equals. Only `saved` changes.

use crate::error::Error;
use crate::models::Goal;
use crate::utils::lenient_date;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// What an already-funded goal receives when the walk reaches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SurplusPolicy {
    /// `leftover / entries still to visit`, so surplus is not stranded when
    /// every goal is already met.
    #[default]
    EqualShare,
    /// Nothing; only goals with a shortfall are funded.
    Skip,
}

impl SurplusPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SurplusPolicy::EqualShare => "equal-share",
            SurplusPolicy::Skip => "skip",
        }
    }
}

impl FromStr for SurplusPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "equal-share" | "equal_share" => Ok(SurplusPolicy::EqualShare),
            "skip" => Ok(SurplusPolicy::Skip),
            other => Err(Error::InvalidData(format!(
                "unknown surplus policy '{}' (use equal-share|skip)",
                other
            ))),
        }
    }
}

impl fmt::Display for SurplusPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Allocation {
    pub goal_id: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Distribution {
    /// Goals in their original order with `saved` updated.
    pub goals: Vec<Goal>,
    /// In funding order.
    pub allocations: Vec<Allocation>,
    /// Left over once the list is exhausted; this is not credited anywhere.
    pub unallocated: Decimal,
}

impl Distribution {
    pub fn allocated(&self) -> Decimal {
        self.allocations.iter().map(|a| a.amount).sum()
    }
}

pub fn remaining(goal: &Goal) -> Decimal {
    (goal.target - goal.saved).max(Decimal::ZERO)
}

// `None` (no or unreadable deadline) sorts after every date.
fn by_urgency(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn distribute(amount: Decimal, goals: &[Goal]) -> Distribution {
    distribute_with(amount, goals, SurplusPolicy::EqualShare)
}

pub fn distribute_with(amount: Decimal, goals: &[Goal], policy: SurplusPolicy) -> Distribution {
    let mut out = goals.to_vec();
    if amount <= Decimal::ZERO {
        return Distribution {
            goals: out,
            allocations: Vec::new(),
            unallocated: Decimal::ZERO,
        };
    }

    let mut order: Vec<(usize, Option<NaiveDate>, Decimal)> = goals
        .iter()
        .enumerate()
        .map(|(i, g)| (i, g.deadline.as_deref().and_then(lenient_date), remaining(g)))
        .collect();
    order.sort_by(|a, b| by_urgency(a.1, b.1).then_with(|| b.2.cmp(&a.2)));

    let total = order.len();
    let mut leftover = amount;
    let mut allocations = Vec::new();
    for (pos, &(idx, _, need)) in order.iter().enumerate() {
        if leftover <= Decimal::ZERO {
            break;
        }
        let share = if need > Decimal::ZERO {
            leftover.min(need)
        } else {
            match policy {
                SurplusPolicy::EqualShare => leftover / Decimal::from(total - pos),
                SurplusPolicy::Skip => continue,
            }
        };
        leftover -= share;
        out[idx].saved += share;
        allocations.push(Allocation {
            goal_id: out[idx].id.clone(),
            amount: share,
        });
    }

    debug!(
        %amount,
        goals = total,
        funded = allocations.len(),
        unallocated = %leftover,
        "Distributed savings"
    );
    Distribution {
        goals: out,
        allocations,
        unallocated: leftover.max(Decimal::ZERO),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn goal(id: &str, target: &str, saved: &str, deadline: Option<&str>) -> Goal {
        Goal {
            id: id.into(),
            title: id.to_uppercase(),
            target: dec(target),
            saved: dec(saved),
            deadline: deadline.map(str::to_string),
        }
    }

    fn saved_sum(goals: &[Goal]) -> Decimal {
        goals.iter().map(|g| g.saved).sum()
    }

    #[test]
    fn most_urgent_shortfall_is_funded_first() {
        let goals = vec![
            goal("a", "1000", "1000", None),
            goal("b", "500", "0", Some("2025-11-25")),
        ];
        let d = distribute(dec("300"), &goals);
        assert_eq!(d.goals[0].saved, dec("1000"));
        assert_eq!(d.goals[1].saved, dec("300"));
        assert_eq!(d.allocations.len(), 1);
        assert_eq!(d.unallocated, Decimal::ZERO);
    }

    #[test]
    fn ties_prefer_bigger_shortfall() {
        let goals = vec![
            goal("small", "100", "0", Some("2026-01-01")),
            goal("big", "900", "0", Some("2026-01-01")),
        ];
        let d = distribute(dec("950"), &goals);
        assert_eq!(d.allocations[0].goal_id, "big");
        assert_eq!(d.goals[1].saved, dec("900"));
        assert_eq!(d.goals[0].saved, dec("50"));
    }

    #[test]
    fn surplus_is_shared_when_everything_is_funded() {
        let goals = vec![
            goal("a", "100", "100", Some("2026-01-01")),
            goal("b", "100", "150", None),
        ];
        let d = distribute(dec("90"), &goals);
        assert_eq!(d.goals[0].saved, dec("145"));
        assert_eq!(d.goals[1].saved, dec("195"));
        assert_eq!(d.allocated(), dec("90"));
    }

    #[test]
    fn skip_policy_leaves_funded_goals_alone() {
        let goals = vec![
            goal("a", "100", "100", Some("2026-01-01")),
            goal("b", "100", "40", None),
        ];
        let d = distribute_with(dec("90"), &goals, SurplusPolicy::Skip);
        assert_eq!(d.goals[0].saved, dec("100"));
        assert_eq!(d.goals[1].saved, dec("100"));
        assert_eq!(d.unallocated, dec("30"));
    }

    #[test]
    fn remainder_past_the_end_is_dropped() {
        let goals = vec![goal("a", "100", "0", Some("2026-01-01"))];
        let d = distribute(dec("250"), &goals);
        assert_eq!(d.goals[0].saved, dec("100"));
        assert_eq!(d.unallocated, dec("150"));
    }

    #[test]
    fn non_positive_amount_is_a_no_op() {
        let goals = vec![goal("a", "100", "10", None)];
        for amt in ["0", "-5"] {
            let d = distribute(dec(amt), &goals);
            assert_eq!(d.goals, goals);
            assert!(d.allocations.is_empty());
        }
    }

    #[test]
    fn only_saved_changes() {
        let goals = vec![
            goal("a", "100", "0", Some("2026-01-01")),
            goal("b", "50", "60", Some("bogus")),
        ];
        let d = distribute(dec("500"), &goals);
        for (before, after) in goals.iter().zip(&d.goals) {
            assert_eq!(before.id, after.id);
            assert_eq!(before.target, after.target);
            assert_eq!(before.deadline, after.deadline);
        }
    }

    #[test]
    fn never_allocates_more_than_the_amount() {
        let goals = vec![
            goal("a", "100", "100", None),
            goal("b", "300", "0", Some("2026-02-01")),
            goal("c", "80", "79.99", Some("2025-12-01")),
            goal("d", "10", "20", Some("2025-12-01")),
        ];
        for amt in ["0.01", "1", "33.49", "100", "299.99", "1000"] {
            let amount = dec(amt);
            let d = distribute(amount, &goals);
            let delta = saved_sum(&d.goals) - saved_sum(&goals);
            assert!(delta <= amount, "{} allocated {}", amt, delta);
            assert_eq!(delta + d.unallocated, amount);
        }
    }

    #[test]
    fn policy_parses_from_settings() {
        assert_eq!("equal-share".parse::<SurplusPolicy>().unwrap(), SurplusPolicy::EqualShare);
        assert_eq!(" Skip ".parse::<SurplusPolicy>().unwrap(), SurplusPolicy::Skip);
        assert!("random".parse::<SurplusPolicy>().is_err());
    }
}
