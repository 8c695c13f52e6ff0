//! Currency codes and the registry of codes the rate feed publishes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// ISO 4217 currency code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Currency(String);

impl Currency {
    /// Create a new currency from code.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().to_uppercase())
    }

    /// Get the currency code.
    pub fn code(&self) -> &str {
        &self.0
    }

    pub fn eur() -> Self {
        Self::new("EUR")
    }

    pub fn usd() -> Self {
        Self::new("USD")
    }

    pub fn jpy() -> Self {
        Self::new("JPY")
    }

    pub fn rub() -> Self {
        Self::new("RUB")
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Currency {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Reference currency of the ECB feed.
pub const ECB_BASE_CURRENCY: &str = "EUR";

/// Every code the ECB reference rate feed has published in its 90-day window.
pub const ECB_CURRENCIES: [&str; 33] = [
    "AUD", "BGN", "BRL", "CAD", "CHF", "CNY", "CZK", "DKK", "EUR", "GBP", "HKD", "HRK", "ISK",
    "HUF", "IDR", "ILS", "INR", "JPY", "KRW", "MXN", "MYR", "NOK", "NZD", "PHP", "PLN", "RON",
    "RUB", "SEK", "SGD", "THB", "TRY", "USD", "ZAR",
];

/// Last day the ECB published a EUR/RUB reference rate.
pub fn rub_last_published() -> NaiveDate {
    NaiveDate::from_ymd_opt(2022, 3, 1).expect("2022-03-01 is a valid date")
}

/// Fixed set of recognised currency codes.
///
/// One code is the base currency: every rate in the feed is quoted per one
/// unit of it. Some currencies stop being published on a given day; after
/// their cutoff they are recognised but no longer valid for conversion.
#[derive(Debug, Clone)]
pub struct CurrencyRegistry {
    base: Currency,
    known: HashSet<Currency>,
    cutoffs: HashMap<Currency, NaiveDate>,
}

impl CurrencyRegistry {
    /// Create a registry from a base currency and the other recognised codes.
    pub fn new(base: Currency, codes: impl IntoIterator<Item = Currency>) -> Self {
        let mut known: HashSet<Currency> = codes.into_iter().collect();
        known.insert(base.clone());
        Self {
            base,
            known,
            cutoffs: HashMap::new(),
        }
    }

    /// Registry matching the ECB euro foreign exchange reference rates.
    pub fn ecb() -> Self {
        Self::new(
            Currency::new(ECB_BASE_CURRENCY),
            ECB_CURRENCIES.iter().map(|c| Currency::new(*c)),
        )
        .with_cutoff(Currency::rub(), rub_last_published())
    }

    /// Mark `currency` as valid up to and including `last_valid`.
    pub fn with_cutoff(mut self, currency: Currency, last_valid: NaiveDate) -> Self {
        self.cutoffs.insert(currency, last_valid);
        self
    }

    /// The currency all rates are quoted against.
    pub fn base(&self) -> &Currency {
        &self.base
    }

    /// Whether the code belongs to the recognised set, regardless of date.
    pub fn is_recognized(&self, currency: &Currency) -> bool {
        self.known.contains(currency)
    }

    /// Resolve a raw code from the feed to a recognised currency.
    ///
    /// Feed tokens must match a recognised code exactly, case included.
    pub fn resolve(&self, code: &str) -> Option<Currency> {
        let currency = Currency(code.to_string());
        self.is_recognized(&currency).then_some(currency)
    }

    /// Last day a currency may be converted, if it has a cutoff.
    pub fn last_valid_date(&self, currency: &Currency) -> Option<NaiveDate> {
        self.cutoffs.get(currency).copied()
    }

    /// Whether `currency` can be converted on `date`.
    pub fn is_valid(&self, currency: &Currency, date: NaiveDate) -> bool {
        if !self.is_recognized(currency) {
            return false;
        }
        match self.cutoffs.get(currency) {
            Some(last_valid) => date <= *last_valid,
            None => true,
        }
    }

    /// All recognised currencies, sorted by code.
    pub fn currencies(&self) -> Vec<Currency> {
        let mut all: Vec<Currency> = self.known.iter().cloned().collect();
        all.sort();
        all
    }

    /// Currencies valid on `date`, sorted by code.
    pub fn valid_on(&self, date: NaiveDate) -> Vec<Currency> {
        self.currencies()
            .into_iter()
            .filter(|c| self.is_valid(c, date))
            .collect()
    }
}

impl Default for CurrencyRegistry {
    fn default() -> Self {
        Self::ecb()
    }
}
