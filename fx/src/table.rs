//! Date-indexed rate table built from a fetched feed document.

use chrono::NaiveDate;
use eurofx_common::{parse_feed_date, Currency, CurrencyRegistry, FxError, FxResult};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use crate::feed::FeedRecord;

/// Rates published on one date, keyed by quote currency.
pub type RateMap = HashMap<Currency, Decimal>;

/// Immutable table of base-relative rates for every date in a feed document.
#[derive(Debug, Clone)]
pub struct RateTable {
    base: Currency,
    rates: BTreeMap<NaiveDate, RateMap>,
    bounds: Option<(NaiveDate, NaiveDate)>,
}

impl RateTable {
    /// Build a table from raw feed records.
    ///
    /// Records may arrive in any order. Fails on the first record with a
    /// malformed date or a currency outside the registry.
    pub fn build(registry: &CurrencyRegistry, records: &[FeedRecord]) -> FxResult<Self> {
        let mut rates = BTreeMap::new();
        let mut bounds: Option<(NaiveDate, NaiveDate)> = None;

        for record in records {
            let date = parse_feed_date(&record.date)?;

            bounds = Some(match bounds {
                None => (date, date),
                Some((earliest, latest)) => (earliest.min(date), latest.max(date)),
            });

            let mut day = RateMap::with_capacity(record.rates.len());
            for rate in &record.rates {
                let currency =
                    registry
                        .resolve(&rate.currency)
                        .ok_or_else(|| FxError::InvalidCurrency {
                            code: rate.currency.clone(),
                        })?;
                day.insert(currency, rate.rate);
            }
            rates.insert(date, day);
        }

        debug!(
            dates = rates.len(),
            earliest = ?bounds.map(|b| b.0),
            latest = ?bounds.map(|b| b.1),
            "Built rate table"
        );

        Ok(Self {
            base: registry.base().clone(),
            rates,
            bounds,
        })
    }

    /// The currency every rate is quoted against.
    pub fn base(&self) -> &Currency {
        &self.base
    }

    /// Oldest date in the table.
    pub fn earliest(&self) -> Option<NaiveDate> {
        self.bounds.map(|(earliest, _)| earliest)
    }

    /// Most recent date in the table.
    pub fn latest(&self) -> Option<NaiveDate> {
        self.bounds.map(|(_, latest)| latest)
    }

    /// Whether rates were published for exactly this date.
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.rates.contains_key(&date)
    }

    /// All rates published on `date`.
    pub fn rates_on(&self, date: NaiveDate) -> Option<&RateMap> {
        self.rates.get(&date)
    }

    /// Rate of `currency` on `date`. The base currency is always 1.
    pub fn rate(&self, date: NaiveDate, currency: &Currency) -> Option<Decimal> {
        let day = self.rates.get(&date)?;
        if *currency == self.base {
            return Some(Decimal::ONE);
        }
        day.get(currency).copied()
    }

    /// Dates in ascending order.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.rates.keys().copied()
    }

    /// Number of dates in the table.
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Check that `date` lies inside `[earliest, latest]`.
    pub fn check_bounds(&self, date: NaiveDate) -> FxResult<()> {
        let (earliest, latest) = self.bounds.ok_or(FxError::EmptyFeed)?;
        if date < earliest || date > latest {
            return Err(FxError::DateOutOfBound {
                date,
                earliest,
                latest,
            });
        }
        Ok(())
    }
}
