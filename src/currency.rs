// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Static exchange-rate table and display formatting.
//!
//! Rates are units of the currency per one unit of the base currency; the
//! base itself always has rate 1. Every stored amount is in base currency and
//! is converted only when shown or entered.

use crate::error::{Error, Result};
use num_format::{Locale, ToFormattedString};
use once_cell::sync::Lazy;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyInfo {
    pub label: String,
    pub symbol: String,
    pub rate: Decimal,
    /// num-format locale name used for grouping, e.g. "en" or "de".
    pub locale: String,
}

impl CurrencyInfo {
    pub fn new(label: &str, symbol: &str, rate: Decimal, locale: &str) -> Self {
        CurrencyInfo {
            label: label.to_string(),
            symbol: symbol.to_string(),
            rate,
            locale: locale.to_string(),
        }
    }
}

static STANDARD: Lazy<CurrencyTable> = Lazy::new(|| {
    let mut entries = BTreeMap::new();
    entries.insert(
        "USD".to_string(),
        CurrencyInfo::new("US Dollar", "$", Decimal::ONE, "en"),
    );
    entries.insert(
        "EUR".to_string(),
        CurrencyInfo::new("Euro", "€", Decimal::new(92, 2), "de"),
    );
    entries.insert(
        "NPR".to_string(),
        CurrencyInfo::new("Nepalese Rupee", "रू", Decimal::new(13350, 2), "ne"),
    );
    entries.insert(
        "INR".to_string(),
        CurrencyInfo::new("Indian Rupee", "₹", Decimal::new(8340, 2), "en-IN"),
    );
    CurrencyTable {
        base: "USD".to_string(),
        entries,
    }
});

#[derive(Debug, Clone, PartialEq)]
pub struct CurrencyTable {
    base: String,
    entries: BTreeMap<String, CurrencyInfo>,
}

impl CurrencyTable {
    /// USD-based table with the currencies offered in settings.
    pub fn standard() -> &'static CurrencyTable {
        &STANDARD
    }

    pub fn new(base: &str, entries: BTreeMap<String, CurrencyInfo>) -> Result<Self> {
        let base = base.trim().to_uppercase();
        let mut normalized = BTreeMap::new();
        for (code, mut info) in entries {
            let code = code.trim().to_uppercase();
            if code == base {
                info.rate = Decimal::ONE;
            } else if info.rate <= Decimal::ZERO {
                return Err(Error::InvalidData(format!(
                    "rate for {} must be positive, got {}",
                    code, info.rate
                )));
            }
            normalized.insert(code, info);
        }
        if !normalized.contains_key(&base) {
            return Err(Error::UnknownCurrency(base));
        }
        Ok(CurrencyTable {
            base,
            entries: normalized,
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn codes(&self) -> impl Iterator<Item = (&str, &CurrencyInfo)> {
        self.entries.iter().map(|(c, i)| (c.as_str(), i))
    }

    pub fn get(&self, code: &str) -> Result<&CurrencyInfo> {
        let code = code.trim().to_uppercase();
        self.entries
            .get(&code)
            .ok_or(Error::UnknownCurrency(code))
    }

    pub fn rate(&self, code: &str) -> Result<Decimal> {
        if code.trim().eq_ignore_ascii_case(&self.base) {
            return Ok(Decimal::ONE);
        }
        Ok(self.get(code)?.rate)
    }

    pub fn to_base(&self, amount: Decimal, code: &str) -> Result<Decimal> {
        Ok(amount / self.rate(code)?)
    }

    pub fn from_base(&self, amount: Decimal, code: &str) -> Result<Decimal> {
        Ok(amount * self.rate(code)?)
    }

    /// Renders a base-currency amount in `code`. Unknown codes are shown in
    /// the base currency instead of failing.
    pub fn format(&self, amount_base: Decimal, code: &str) -> String {
        match self.get(code) {
            Ok(info) => render(amount_base * info.rate, info),
            Err(_) => {
                warn!(currency = code, "Unknown display currency, using base");
                match self.entries.get(&self.base) {
                    Some(info) => render(amount_base, info),
                    None => format!("{:.2}", round_cents(amount_base)),
                }
            }
        }
    }

    /// Formatter for a ledger whose amounts are stored in `base` and shown
    /// in `display`. Both codes may differ from the table's own base.
    pub fn converter<'a>(&'a self, base: &'a str, display: &'a str) -> Converter<'a> {
        Converter {
            table: self,
            base,
            display,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Converter<'a> {
    table: &'a CurrencyTable,
    base: &'a str,
    display: &'a str,
}

impl Converter<'_> {
    pub fn base(&self) -> &str {
        self.base
    }

    pub fn display(&self) -> &str {
        self.display
    }

    /// Table rates of the ledger base and the display currency.
    pub fn rates(&self) -> Result<(Decimal, Decimal)> {
        Ok((self.table.rate(self.base)?, self.table.rate(self.display)?))
    }

    /// Base amount expressed in the display currency. Falls back to the
    /// unconverted amount when either code is unknown.
    pub fn from_base(&self, amount: Decimal) -> Decimal {
        self.rates().map(|(b, d)| amount * d / b).unwrap_or(amount)
    }

    pub fn to_base(&self, amount: Decimal) -> Decimal {
        self.rates().map(|(b, d)| amount * b / d).unwrap_or(amount)
    }

    pub fn fmt(&self, amount_base: Decimal) -> String {
        let base = match self.table.get(self.base) {
            Ok(info) => info,
            Err(_) => {
                warn!(currency = self.base, "Unknown base currency, amounts left unconverted");
                return format!("{:.2}", round_cents(amount_base));
            }
        };
        match self.table.get(self.display) {
            Ok(info) => render(amount_base * info.rate / base.rate, info),
            Err(_) => {
                warn!(currency = self.display, "Unknown display currency, using base");
                render(amount_base, base)
            }
        }
    }
}

fn round_cents(v: Decimal) -> Decimal {
    v.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn render(amount: Decimal, info: &CurrencyInfo) -> String {
    let rounded = round_cents(amount);
    let Ok(locale) = Locale::from_name(&info.locale) else {
        return format!("{}{:.2}", info.symbol, rounded);
    };
    let abs = rounded.abs();
    let (Some(whole), Some(cents)) = (
        abs.trunc().to_u64(),
        (abs.fract() * Decimal::ONE_HUNDRED).to_u64(),
    ) else {
        return format!("{}{:.2}", info.symbol, rounded);
    };
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        locale.minus_sign()
    } else {
        ""
    };
    format!(
        "{}{}{}{}{:02}",
        sign,
        info.symbol,
        whole.to_formatted_string(&locale),
        locale.decimal(),
        cents
    )
}
