// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Ledger repositories.
//!
//! The engine only ever sees a `Snapshot`; these types load it, store it back
//! (whole-snapshot, last write wins), and keep the shell-owned state that
//! lives beside it: settings, read alert ids, and user-added notifications.

use crate::config::{DEFAULT_BASE_CURRENCY, KEY_BASE_CURRENCY, KEY_DISPLAY_CURRENCY};
use crate::error::{Error, Result};
use crate::models::{
    Alert, AlertKind, Budget, BudgetPeriod, Goal, MoneyRecord, RecordKind, Recurrence, Reminder,
    Snapshot,
};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Pennywise", "pennywise"));

pub trait LedgerRepository {
    fn load(&self) -> Result<Snapshot>;
    fn save(&mut self, snapshot: &Snapshot) -> Result<()>;

    fn read_ids(&self) -> Result<BTreeSet<String>>;
    fn save_read_ids(&mut self, ids: &BTreeSet<String>) -> Result<()>;

    fn notifications(&self) -> Result<Vec<Alert>>;
    fn add_notification(&mut self, alert: &Alert) -> Result<()>;

    fn setting(&self, key: &str) -> Result<Option<String>>;
    fn set_setting(&mut self, key: &str, value: &str) -> Result<()>;

    /// Picks up changes made by other processes. Stores that always read
    /// through to their backing medium have nothing to do.
    fn refresh(&mut self) -> Result<()> {
        Ok(())
    }
}

fn currency_pair(repo: &dyn LedgerRepository) -> Result<(String, String)> {
    let base = repo
        .setting(KEY_BASE_CURRENCY)?
        .unwrap_or_else(|| DEFAULT_BASE_CURRENCY.to_string());
    let display = repo
        .setting(KEY_DISPLAY_CURRENCY)?
        .unwrap_or_else(|| base.clone());
    Ok((base, display))
}

pub fn data_dir() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .ok_or_else(|| Error::DataDir("could not determine platform data dir".into()))?;
    let dir = proj.data_dir();
    fs::create_dir_all(dir)?;
    Ok(dir.to_path_buf())
}

pub fn db_path() -> Result<PathBuf> {
    Ok(data_dir()?.join("pennywise.sqlite"))
}

pub fn open_or_init() -> Result<SqliteLedger> {
    let path = db_path()?;
    SqliteLedger::open(&path)
}

pub struct SqliteLedger {
    conn: Connection,
}

impl SqliteLedger {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        debug!(path = %path.display(), "Opened ledger database");
        Self::with_connection(conn)
    }

    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    pub fn with_connection(conn: Connection) -> Result<Self> {
        init_schema(&conn)?;
        Ok(SqliteLedger { conn })
    }
}

fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS records(
        id TEXT PRIMARY KEY,
        kind TEXT NOT NULL CHECK(kind IN ('Income','Expense')),
        date TEXT NOT NULL,
        amount TEXT NOT NULL, -- stored in BASE currency
        category TEXT NOT NULL,
        name TEXT NOT NULL,
        notes TEXT,
        receipt TEXT,
        position INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_records_date ON records(date);

    CREATE TABLE IF NOT EXISTS budgets(
        id TEXT PRIMARY KEY,
        category TEXT NOT NULL,
        amount_limit TEXT NOT NULL, -- stored in BASE currency
        period TEXT NOT NULL,
        start_date TEXT,
        end_date TEXT,
        position INTEGER NOT NULL
    );

    CREATE TABLE IF NOT EXISTS goals(
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        target TEXT NOT NULL,
        saved TEXT NOT NULL DEFAULT '0',
        deadline TEXT,
        position INTEGER NOT NULL
    );

    CREATE TABLE IF NOT EXISTS reminders(
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        amount TEXT NOT NULL,
        due_date TEXT NOT NULL,
        recurring TEXT NOT NULL,
        category TEXT,
        description TEXT,
        position INTEGER NOT NULL
    );

    CREATE TABLE IF NOT EXISTS alert_reads(
        id TEXT PRIMARY KEY
    );

    CREATE TABLE IF NOT EXISTS notifications(
        id TEXT PRIMARY KEY,
        type TEXT NOT NULL,
        message TEXT NOT NULL,
        date TEXT NOT NULL
    );
    "#,
    )?;
    Ok(())
}

fn dec_col(s: String, what: &str) -> Result<Decimal> {
    s.parse::<Decimal>()
        .map_err(|_| Error::InvalidData(format!("invalid {} amount '{}'", what, s)))
}

impl LedgerRepository for SqliteLedger {
    fn load(&self) -> Result<Snapshot> {
        let (base_currency, display_currency) = currency_pair(self)?;

        let mut stmt = self.conn.prepare(
            "SELECT id, kind, date, amount, category, name, notes, receipt FROM records ORDER BY position",
        )?;
        let mut rows = stmt.query([])?;
        let mut records = Vec::new();
        while let Some(r) = rows.next()? {
            let id: String = r.get(0)?;
            let kind_s: String = r.get(1)?;
            let kind = RecordKind::parse(&kind_s)
                .ok_or_else(|| Error::InvalidData(format!("record {} has kind '{}'", id, kind_s)))?;
            records.push(MoneyRecord {
                kind,
                date: r.get(2)?,
                amount: dec_col(r.get(3)?, "record")?,
                category: r.get(4)?,
                name: r.get(5)?,
                notes: r.get(6)?,
                receipt: r.get(7)?,
                id,
            });
        }

        let mut stmt = self.conn.prepare(
            "SELECT id, category, amount_limit, period, start_date, end_date FROM budgets ORDER BY position",
        )?;
        let mut rows = stmt.query([])?;
        let mut budgets = Vec::new();
        while let Some(r) = rows.next()? {
            budgets.push(Budget {
                id: r.get(0)?,
                category: r.get(1)?,
                limit: dec_col(r.get(2)?, "budget")?,
                period: BudgetPeriod::from(r.get::<_, String>(3)?),
                start_date: r.get(4)?,
                end_date: r.get(5)?,
            });
        }

        let mut stmt = self
            .conn
            .prepare("SELECT id, title, target, saved, deadline FROM goals ORDER BY position")?;
        let mut rows = stmt.query([])?;
        let mut goals = Vec::new();
        while let Some(r) = rows.next()? {
            goals.push(Goal {
                id: r.get(0)?,
                title: r.get(1)?,
                target: dec_col(r.get(2)?, "goal target")?,
                saved: dec_col(r.get(3)?, "goal saved")?,
                deadline: r.get(4)?,
            });
        }

        let mut stmt = self.conn.prepare(
            "SELECT id, title, amount, due_date, recurring, category, description FROM reminders ORDER BY position",
        )?;
        let mut rows = stmt.query([])?;
        let mut reminders = Vec::new();
        while let Some(r) = rows.next()? {
            reminders.push(Reminder {
                id: r.get(0)?,
                title: r.get(1)?,
                amount: dec_col(r.get(2)?, "reminder")?,
                due_date: r.get(3)?,
                recurring: Recurrence::from(r.get::<_, String>(4)?),
                category: r.get(5)?,
                description: r.get(6)?,
            });
        }

        Ok(Snapshot {
            base_currency,
            display_currency,
            records,
            budgets,
            goals,
            reminders,
        })
    }

    fn save(&mut self, snapshot: &Snapshot) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute_batch(
            "DELETE FROM records; DELETE FROM budgets; DELETE FROM goals; DELETE FROM reminders;",
        )?;
        for (pos, r) in snapshot.records.iter().enumerate() {
            tx.execute(
                "INSERT INTO records(id, kind, date, amount, category, name, notes, receipt, position)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    r.id,
                    r.kind.as_str(),
                    r.date,
                    r.amount.to_string(),
                    r.category,
                    r.name,
                    r.notes,
                    r.receipt,
                    pos as i64
                ],
            )?;
        }
        for (pos, b) in snapshot.budgets.iter().enumerate() {
            tx.execute(
                "INSERT INTO budgets(id, category, amount_limit, period, start_date, end_date, position)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    b.id,
                    b.category,
                    b.limit.to_string(),
                    b.period.as_str(),
                    b.start_date,
                    b.end_date,
                    pos as i64
                ],
            )?;
        }
        for (pos, g) in snapshot.goals.iter().enumerate() {
            tx.execute(
                "INSERT INTO goals(id, title, target, saved, deadline, position)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    g.id,
                    g.title,
                    g.target.to_string(),
                    g.saved.to_string(),
                    g.deadline,
                    pos as i64
                ],
            )?;
        }
        for (pos, r) in snapshot.reminders.iter().enumerate() {
            tx.execute(
                "INSERT INTO reminders(id, title, amount, due_date, recurring, category, description, position)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    r.id,
                    r.title,
                    r.amount.to_string(),
                    r.due_date,
                    r.recurring.as_str(),
                    r.category,
                    r.description,
                    pos as i64
                ],
            )?;
        }
        for (key, value) in [
            (KEY_BASE_CURRENCY, &snapshot.base_currency),
            (KEY_DISPLAY_CURRENCY, &snapshot.display_currency),
        ] {
            tx.execute(
                "INSERT INTO settings(key, value) VALUES(?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value=excluded.value",
                params![key, value],
            )?;
        }
        tx.commit()?;
        info!(
            records = snapshot.records.len(),
            budgets = snapshot.budgets.len(),
            goals = snapshot.goals.len(),
            reminders = snapshot.reminders.len(),
            "Saved ledger"
        );
        Ok(())
    }

    fn read_ids(&self) -> Result<BTreeSet<String>> {
        let mut stmt = self.conn.prepare("SELECT id FROM alert_reads")?;
        let rows = stmt.query_map([], |r| r.get::<_, String>(0))?;
        let mut out = BTreeSet::new();
        for row in rows {
            out.insert(row?);
        }
        Ok(out)
    }

    fn save_read_ids(&mut self, ids: &BTreeSet<String>) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM alert_reads", [])?;
        for id in ids {
            tx.execute("INSERT INTO alert_reads(id) VALUES (?1)", params![id])?;
        }
        tx.commit()?;
        Ok(())
    }

    fn notifications(&self) -> Result<Vec<Alert>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, type, message, date FROM notifications ORDER BY date DESC, id")?;
        let rows = stmt.query_map([], |r| {
            Ok(Alert {
                id: r.get(0)?,
                kind: AlertKind::from(r.get::<_, String>(1)?),
                message: r.get(2)?,
                date: r.get(3)?,
                read: false,
            })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn add_notification(&mut self, alert: &Alert) -> Result<()> {
        self.conn.execute(
            "INSERT INTO notifications(id, type, message, date) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET type=excluded.type, message=excluded.message, date=excluded.date",
            params![alert.id, alert.kind.as_str(), alert.message, alert.date],
        )?;
        Ok(())
    }

    fn setting(&self, key: &str) -> Result<Option<String>> {
        let v: Option<String> = self
            .conn
            .query_row("SELECT value FROM settings WHERE key=?1", params![key], |r| {
                r.get(0)
            })
            .optional()?;
        Ok(v)
    }

    fn set_setting(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO settings(key, value) VALUES(?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value=excluded.value",
            params![key, value],
        )?;
        Ok(())
    }
}

/// Everything a file or in-memory ledger holds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerState {
    #[serde(default)]
    pub records: Vec<MoneyRecord>,
    #[serde(default)]
    pub budgets: Vec<Budget>,
    #[serde(default)]
    pub goals: Vec<Goal>,
    #[serde(default)]
    pub reminders: Vec<Reminder>,
    #[serde(default)]
    pub settings: BTreeMap<String, String>,
    #[serde(default)]
    pub read_ids: BTreeSet<String>,
    #[serde(default)]
    pub notifications: Vec<Alert>,
}

impl LedgerState {
    fn snapshot(&self) -> Snapshot {
        let base = self
            .settings
            .get(KEY_BASE_CURRENCY)
            .cloned()
            .unwrap_or_else(|| DEFAULT_BASE_CURRENCY.to_string());
        let display = self
            .settings
            .get(KEY_DISPLAY_CURRENCY)
            .cloned()
            .unwrap_or_else(|| base.clone());
        Snapshot {
            base_currency: base,
            display_currency: display,
            records: self.records.clone(),
            budgets: self.budgets.clone(),
            goals: self.goals.clone(),
            reminders: self.reminders.clone(),
        }
    }

    fn store(&mut self, s: &Snapshot) {
        self.records = s.records.clone();
        self.budgets = s.budgets.clone();
        self.goals = s.goals.clone();
        self.reminders = s.reminders.clone();
        self.settings
            .insert(KEY_BASE_CURRENCY.to_string(), s.base_currency.clone());
        self.settings
            .insert(KEY_DISPLAY_CURRENCY.to_string(), s.display_currency.clone());
    }

    fn upsert_notification(&mut self, alert: &Alert) {
        match self.notifications.iter_mut().find(|n| n.id == alert.id) {
            Some(existing) => *existing = alert.clone(),
            None => self.notifications.insert(0, alert.clone()),
        }
    }
}

/// Ledger kept in memory only; the mock persistence layer for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    pub state: LedgerState,
}

impl MemoryLedger {
    pub fn with_snapshot(snapshot: &Snapshot) -> Self {
        let mut state = LedgerState::default();
        state.store(snapshot);
        MemoryLedger { state }
    }
}

impl LedgerRepository for MemoryLedger {
    fn load(&self) -> Result<Snapshot> {
        Ok(self.state.snapshot())
    }

    fn save(&mut self, snapshot: &Snapshot) -> Result<()> {
        self.state.store(snapshot);
        Ok(())
    }

    fn read_ids(&self) -> Result<BTreeSet<String>> {
        Ok(self.state.read_ids.clone())
    }

    fn save_read_ids(&mut self, ids: &BTreeSet<String>) -> Result<()> {
        self.state.read_ids = ids.clone();
        Ok(())
    }

    fn notifications(&self) -> Result<Vec<Alert>> {
        Ok(self.state.notifications.clone())
    }

    fn add_notification(&mut self, alert: &Alert) -> Result<()> {
        self.state.upsert_notification(alert);
        Ok(())
    }

    fn setting(&self, key: &str) -> Result<Option<String>> {
        Ok(self.state.settings.get(key).cloned())
    }

    fn set_setting(&mut self, key: &str, value: &str) -> Result<()> {
        self.state.settings.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Ledger stored as one pretty-printed JSON document, rewritten on every
/// change. A missing file reads as an empty ledger.
pub struct JsonLedger {
    path: PathBuf,
    state: LedgerState,
}

fn read_state(path: &Path) -> Result<LedgerState> {
    if !path.exists() {
        return Ok(LedgerState::default());
    }
    let raw = fs::read_to_string(path)?;
    if raw.trim().is_empty() {
        return Ok(LedgerState::default());
    }
    Ok(serde_json::from_str(&raw)?)
}

impl JsonLedger {
    pub fn open(path: &Path) -> Result<Self> {
        let state = read_state(path)?;
        debug!(path = %path.display(), "Opened JSON ledger");
        Ok(JsonLedger {
            path: path.to_path_buf(),
            state,
        })
    }

    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&self.state)?)?;
        Ok(())
    }
}

impl LedgerRepository for JsonLedger {
    fn load(&self) -> Result<Snapshot> {
        Ok(self.state.snapshot())
    }

    fn save(&mut self, snapshot: &Snapshot) -> Result<()> {
        self.state.store(snapshot);
        self.flush()?;
        info!(path = %self.path.display(), "Saved ledger");
        Ok(())
    }

    fn read_ids(&self) -> Result<BTreeSet<String>> {
        Ok(self.state.read_ids.clone())
    }

    fn save_read_ids(&mut self, ids: &BTreeSet<String>) -> Result<()> {
        self.state.read_ids = ids.clone();
        self.flush()
    }

    fn notifications(&self) -> Result<Vec<Alert>> {
        Ok(self.state.notifications.clone())
    }

    fn add_notification(&mut self, alert: &Alert) -> Result<()> {
        self.state.upsert_notification(alert);
        self.flush()
    }

    fn setting(&self, key: &str) -> Result<Option<String>> {
        Ok(self.state.settings.get(key).cloned())
    }

    fn set_setting(&mut self, key: &str, value: &str) -> Result<()> {
        self.state.settings.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn refresh(&mut self) -> Result<()> {
        self.state = read_state(&self.path)?;
        Ok(())
    }
}
