// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Engine thresholds.
//!
//! Defaults are named constants; each one can be overridden through the
//! repository's `settings` key/value store.

use crate::db::LedgerRepository;
use crate::distribute::SurplusPolicy;
use crate::error::{Error, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_BASE_CURRENCY: &str = "USD";

/// Budgets spending more than this share of their limit raise an alert.
pub const OVERSPEND_PERCENT: i64 = 50;
/// Reminders due within this many days raise a bill alert.
pub const BILL_LOOKAHEAD_DAYS: i64 = 7;
/// Reminders due within this many days get the "Due soon" badge.
pub const DUE_SOON_BADGE_DAYS: i64 = 3;
/// Goals with a deadline this close raise a goal alert.
pub const GOAL_LOOKAHEAD_DAYS: i64 = 14;
/// Monthly savings (display currency) that earn an achievement.
pub const ACHIEVEMENT_THRESHOLD: i64 = 500;
pub const POLL_INTERVAL_SECS: u64 = 300;

pub const KEY_BASE_CURRENCY: &str = "base_currency";
pub const KEY_DISPLAY_CURRENCY: &str = "display_currency";
const KEY_OVERSPEND_RATIO: &str = "overspend_ratio";
const KEY_BILL_LOOKAHEAD: &str = "bill_lookahead_days";
const KEY_DUE_SOON: &str = "due_soon_days";
const KEY_GOAL_LOOKAHEAD: &str = "goal_lookahead_days";
const KEY_ACHIEVEMENT: &str = "achievement_threshold";
const KEY_POLL_INTERVAL: &str = "poll_interval_secs";
const KEY_SURPLUS_POLICY: &str = "surplus_policy";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub overspend_ratio: Decimal,
    pub bill_lookahead_days: i64,
    pub due_soon_days: i64,
    pub goal_lookahead_days: i64,
    pub achievement_threshold: Decimal,
    pub poll_interval_secs: u64,
    pub surplus_policy: SurplusPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            overspend_ratio: Decimal::new(OVERSPEND_PERCENT, 2),
            bill_lookahead_days: BILL_LOOKAHEAD_DAYS,
            due_soon_days: DUE_SOON_BADGE_DAYS,
            goal_lookahead_days: GOAL_LOOKAHEAD_DAYS,
            achievement_threshold: Decimal::from(ACHIEVEMENT_THRESHOLD),
            poll_interval_secs: POLL_INTERVAL_SECS,
            surplus_policy: SurplusPolicy::default(),
        }
    }
}

impl EngineConfig {
    /// Defaults overlaid with whatever the repository has stored.
    pub fn load(repo: &dyn LedgerRepository) -> Result<Self> {
        let mut cfg = EngineConfig::default();
        if let Some(v) = repo.setting(KEY_OVERSPEND_RATIO)? {
            cfg.overspend_ratio = parse_setting(KEY_OVERSPEND_RATIO, &v)?;
        }
        if let Some(v) = repo.setting(KEY_BILL_LOOKAHEAD)? {
            cfg.bill_lookahead_days = parse_setting(KEY_BILL_LOOKAHEAD, &v)?;
        }
        if let Some(v) = repo.setting(KEY_DUE_SOON)? {
            cfg.due_soon_days = parse_setting(KEY_DUE_SOON, &v)?;
        }
        if let Some(v) = repo.setting(KEY_GOAL_LOOKAHEAD)? {
            cfg.goal_lookahead_days = parse_setting(KEY_GOAL_LOOKAHEAD, &v)?;
        }
        if let Some(v) = repo.setting(KEY_ACHIEVEMENT)? {
            cfg.achievement_threshold = parse_setting(KEY_ACHIEVEMENT, &v)?;
        }
        if let Some(v) = repo.setting(KEY_POLL_INTERVAL)? {
            cfg.poll_interval_secs = parse_setting(KEY_POLL_INTERVAL, &v)?;
        }
        if let Some(v) = repo.setting(KEY_SURPLUS_POLICY)? {
            cfg.surplus_policy = v.parse()?;
        }
        Ok(cfg)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}

/// Keys accepted by `EngineConfig::load`, for the CLI's `config set`.
pub fn is_known_key(key: &str) -> bool {
    [
        KEY_OVERSPEND_RATIO,
        KEY_BILL_LOOKAHEAD,
        KEY_DUE_SOON,
        KEY_GOAL_LOOKAHEAD,
        KEY_ACHIEVEMENT,
        KEY_POLL_INTERVAL,
        KEY_SURPLUS_POLICY,
    ]
    .contains(&key)
}

fn parse_setting<T: FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| Error::InvalidData(format!("setting '{}' has invalid value '{}'", key, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryLedger;

    #[test]
    fn defaults_match_named_constants() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.overspend_ratio, Decimal::new(5, 1));
        assert_eq!(cfg.bill_lookahead_days, 7);
        assert_eq!(cfg.goal_lookahead_days, 14);
        assert_eq!(cfg.achievement_threshold, Decimal::from(500));
        assert_eq!(cfg.poll_interval(), Duration::from_secs(300));
    }

    #[test]
    fn stored_settings_override_defaults() {
        let mut repo = MemoryLedger::default();
        repo.set_setting("achievement_threshold", "250").unwrap();
        repo.set_setting("surplus_policy", "skip").unwrap();
        let cfg = EngineConfig::load(&repo).unwrap();
        assert_eq!(cfg.achievement_threshold, Decimal::from(250));
        assert_eq!(cfg.surplus_policy, SurplusPolicy::Skip);
        assert_eq!(cfg.goal_lookahead_days, GOAL_LOOKAHEAD_DAYS);
    }

    #[test]
    fn garbage_setting_is_rejected() {
        let mut repo = MemoryLedger::default();
        repo.set_setting("goal_lookahead_days", "soon").unwrap();
        let err = EngineConfig::load(&repo).unwrap_err();
        assert!(err.to_string().contains("goal_lookahead_days"));
    }
}
