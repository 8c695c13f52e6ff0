//! Main FX engine implementation.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use eurofx_common::{Currency, CurrencyRegistry, FxError, FxResult, Money};
use rust_decimal::Decimal;
use tracing::{debug, info, instrument};

use crate::cache::{CacheStats, RateCache, RateCacheConfig};
use crate::conversion::{Conversion, ConversionRequest};
use crate::feed::RateFeed;
use crate::table::RateTable;

/// Configuration for the FX engine.
#[derive(Debug, Clone)]
pub struct FxEngineConfig {
    /// Whether to keep fetched rate tables between conversions.
    pub use_cache: bool,
}

impl Default for FxEngineConfig {
    fn default() -> Self {
        Self { use_cache: true }
    }
}

impl FxEngineConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(value) = std::env::var("EUROFX_CACHE") {
            if let Ok(enabled) = value.parse() {
                config.use_cache = enabled;
            }
        }

        config
    }
}

/// Converts amounts between currencies for a calendar date.
#[async_trait]
pub trait Converter: Send + Sync {
    async fn convert(
        &self,
        date: NaiveDate,
        amount: Decimal,
        from: &Currency,
        to: &Currency,
    ) -> FxResult<Decimal>;
}

/// The main FX engine.
pub struct FxEngine {
    registry: Arc<CurrencyRegistry>,
    cache: RateCache,
}

impl FxEngine {
    /// Create a new FX engine reading rates from `feed`.
    pub fn new(
        feed: Arc<dyn RateFeed>,
        registry: Arc<CurrencyRegistry>,
        config: FxEngineConfig,
    ) -> Self {
        let cache = RateCache::new(
            feed,
            Arc::clone(&registry),
            RateCacheConfig {
                enabled: config.use_cache,
            },
        );
        Self { registry, cache }
    }

    /// Get the rate table covering `date`, going through the cache.
    pub async fn get_rates(&self, date: NaiveDate) -> FxResult<Arc<RateTable>> {
        self.cache.get_rates(date).await
    }

    /// Convert `amount` of `from` into `to` using the reference rates of `date`.
    #[instrument(skip(self, from, to), fields(from = %from, to = %to))]
    pub async fn convert(
        &self,
        date: NaiveDate,
        amount: Decimal,
        from: &Currency,
        to: &Currency,
    ) -> FxResult<Decimal> {
        self.validate_currency(from, date)?;
        self.validate_currency(to, date)?;

        if from == to {
            debug!("Same currency, nothing to convert");
            return Ok(amount);
        }

        let table = self.cache.get_rates(date).await?;
        table.check_bounds(date)?;

        let converted = triangulate(&table, date, amount, from, to)?;

        info!(%date, %amount, %converted, "Conversion completed");

        Ok(converted)
    }

    /// Convert a [`ConversionRequest`] and return the full conversion record.
    pub async fn execute(&self, request: ConversionRequest) -> FxResult<Conversion> {
        let value = self
            .convert(
                request.date,
                request.amount.value,
                &request.amount.currency,
                &request.target_currency,
            )
            .await?;

        Ok(Conversion::new(
            request.date,
            request.amount,
            Money::new(value, request.target_currency),
        ))
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    fn validate_currency(&self, currency: &Currency, date: NaiveDate) -> FxResult<()> {
        if self.registry.is_valid(currency, date) {
            Ok(())
        } else {
            Err(FxError::InvalidCurrency {
                code: currency.code().to_string(),
            })
        }
    }
}

#[async_trait]
impl Converter for FxEngine {
    async fn convert(
        &self,
        date: NaiveDate,
        amount: Decimal,
        from: &Currency,
        to: &Currency,
    ) -> FxResult<Decimal> {
        FxEngine::convert(self, date, amount, from, to).await
    }
}

/// Convert through the table's base currency.
fn triangulate(
    table: &RateTable,
    date: NaiveDate,
    amount: Decimal,
    from: &Currency,
    to: &Currency,
) -> FxResult<Decimal> {
    let overflow = || FxError::Overflow {
        from: from.code().to_string(),
        to: to.code().to_string(),
    };

    if from == table.base() {
        return amount
            .checked_mul(usable_rate(table, date, to)?)
            .ok_or_else(overflow);
    }

    let from_rate = usable_rate(table, date, from)?;
    if to == table.base() {
        return amount.checked_div(from_rate).ok_or_else(overflow);
    }

    let to_rate = usable_rate(table, date, to)?;
    amount
        .checked_mul(to_rate)
        .and_then(|v| v.checked_div(from_rate))
        .ok_or_else(overflow)
}

/// Look up a non-zero rate, reporting gaps instead of treating them as zero.
fn usable_rate(table: &RateTable, date: NaiveDate, currency: &Currency) -> FxResult<Decimal> {
    table
        .rate(date, currency)
        .filter(|rate| !rate.is_zero())
        .ok_or_else(|| FxError::RateUnavailable {
            date,
            currency: currency.code().to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::{FeedDocument, FeedRecord, MockRateFeed};
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn setup_engine(records: Vec<FeedRecord>, use_cache: bool) -> (FxEngine, Arc<MockRateFeed>) {
        let feed = Arc::new(MockRateFeed::new(FeedDocument::new(records)));
        let engine = FxEngine::new(
            feed.clone(),
            Arc::new(CurrencyRegistry::ecb()),
            FxEngineConfig { use_cache },
        );
        (engine, feed)
    }

    fn sample_engine() -> (FxEngine, Arc<MockRateFeed>) {
        setup_engine(
            vec![
                FeedRecord::with_rates("2022-01-03", [("USD", dec!(1.1355)), ("JPY", dec!(130.92))]),
                FeedRecord::with_rates("2022-01-04", [("USD", dec!(2)), ("JPY", dec!(3))]),
                FeedRecord::with_rates("2022-01-06", [("USD", dec!(1.1297))]),
            ],
            true,
        )
    }

    #[tokio::test]
    async fn test_convert_to_base() {
        let (engine, _) = sample_engine();

        let value = engine
            .convert(date(2022, 1, 4), dec!(10), &Currency::usd(), &Currency::eur())
            .await
            .unwrap();

        assert_eq!(value, dec!(5));
    }

    #[tokio::test]
    async fn test_convert_from_base() {
        let (engine, _) = sample_engine();

        let value = engine
            .convert(date(2022, 1, 4), dec!(10), &Currency::eur(), &Currency::jpy())
            .await
            .unwrap();

        assert_eq!(value, dec!(30));
    }

    #[tokio::test]
    async fn test_convert_triangulated() {
        let (engine, _) = sample_engine();

        let value = engine
            .convert(date(2022, 1, 4), dec!(14), &Currency::usd(), &Currency::jpy())
            .await
            .unwrap();

        assert_eq!(value, dec!(21));
    }

    #[tokio::test]
    async fn test_same_currency_skips_fetch() {
        let (engine, feed) = sample_engine();

        let value = engine
            .convert(date(2030, 1, 1), dec!(42.5), &Currency::usd(), &Currency::usd())
            .await
            .unwrap();

        assert_eq!(value, dec!(42.5));
        assert_eq!(feed.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_currencies() {
        let (engine, feed) = sample_engine();

        let result = engine
            .convert(date(2022, 1, 4), dec!(1), &Currency::new("XXX"), &Currency::eur())
            .await;
        assert_eq!(
            result,
            Err(FxError::InvalidCurrency {
                code: "XXX".to_string()
            })
        );

        let result = engine
            .convert(date(2022, 1, 4), dec!(1), &Currency::eur(), &Currency::new("YYY"))
            .await;
        assert_eq!(
            result,
            Err(FxError::InvalidCurrency {
                code: "YYY".to_string()
            })
        );

        // Invalid source wins even when both sides are the same code.
        let result = engine
            .convert(date(2022, 1, 4), dec!(1), &Currency::new("XXX"), &Currency::new("XXX"))
            .await;
        assert!(matches!(result, Err(FxError::InvalidCurrency { .. })));

        assert_eq!(feed.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_rub_after_cutoff() {
        let (engine, _) = setup_engine(
            vec![FeedRecord::with_rates("2022-03-02", [("USD", dec!(1.11))])],
            true,
        );

        let result = engine
            .convert(date(2022, 3, 2), dec!(100), &Currency::rub(), &Currency::eur())
            .await;

        assert_eq!(
            result,
            Err(FxError::InvalidCurrency {
                code: "RUB".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_rub_on_cutoff_day() {
        let (engine, _) = setup_engine(
            vec![FeedRecord::with_rates("2022-03-01", [("RUB", dec!(117.2568))])],
            true,
        );

        let value = engine
            .convert(date(2022, 3, 1), dec!(1), &Currency::eur(), &Currency::rub())
            .await
            .unwrap();

        assert_eq!(value, dec!(117.2568));
    }

    #[tokio::test]
    async fn test_date_out_of_bound() {
        let (engine, _) = sample_engine();

        let before = engine
            .convert(date(2022, 1, 2), dec!(1), &Currency::usd(), &Currency::eur())
            .await;
        assert_eq!(
            before,
            Err(FxError::DateOutOfBound {
                date: date(2022, 1, 2),
                earliest: date(2022, 1, 3),
                latest: date(2022, 1, 6),
            })
        );

        let after = engine
            .convert(date(2022, 1, 7), dec!(1), &Currency::usd(), &Currency::eur())
            .await;
        assert!(matches!(after, Err(FxError::DateOutOfBound { .. })));
    }

    #[tokio::test]
    async fn test_gap_inside_window_is_rate_unavailable() {
        let (engine, _) = sample_engine();

        let result = engine
            .convert(date(2022, 1, 5), dec!(1), &Currency::usd(), &Currency::eur())
            .await;

        assert_eq!(
            result,
            Err(FxError::RateUnavailable {
                date: date(2022, 1, 5),
                currency: "USD".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_currency_missing_on_date() {
        let (engine, _) = sample_engine();

        let result = engine
            .convert(date(2022, 1, 6), dec!(1), &Currency::eur(), &Currency::jpy())
            .await;

        assert_eq!(
            result,
            Err(FxError::RateUnavailable {
                date: date(2022, 1, 6),
                currency: "JPY".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_zero_rate_is_rate_unavailable() {
        let (engine, _) = setup_engine(
            vec![FeedRecord::with_rates("2022-01-04", [("USD", dec!(0))])],
            true,
        );

        let result = engine
            .convert(date(2022, 1, 4), dec!(1), &Currency::usd(), &Currency::eur())
            .await;

        assert!(matches!(result, Err(FxError::RateUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_empty_feed() {
        let (engine, _) = setup_engine(vec![], true);

        let result = engine
            .convert(date(2022, 1, 4), dec!(1), &Currency::usd(), &Currency::eur())
            .await;

        assert_eq!(result, Err(FxError::EmptyFeed));
    }

    #[tokio::test]
    async fn test_overflow_is_reported() {
        let (engine, _) = setup_engine(
            vec![FeedRecord::with_rates(
                "2022-01-04",
                [("USD", dec!(0.5)), ("JPY", dec!(3))],
            )],
            true,
        );

        for (from, to) in [
            (Currency::eur(), Currency::jpy()),
            (Currency::usd(), Currency::eur()),
            (Currency::usd(), Currency::jpy()),
        ] {
            let result = engine
                .convert(date(2022, 1, 4), Decimal::MAX, &from, &to)
                .await;

            assert_eq!(
                result,
                Err(FxError::Overflow {
                    from: from.code().to_string(),
                    to: to.code().to_string(),
                })
            );
        }
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let (engine, feed) = sample_engine();
        feed.fail_with(FxError::Transport { status_code: 503 });

        let result = engine
            .convert(date(2022, 1, 4), dec!(1), &Currency::usd(), &Currency::eur())
            .await;

        assert_eq!(result, Err(FxError::Transport { status_code: 503 }));
    }

    #[tokio::test]
    async fn test_cached_conversions_fetch_once() {
        let (engine, feed) = sample_engine();

        engine
            .convert(date(2022, 1, 3), dec!(1), &Currency::usd(), &Currency::eur())
            .await
            .unwrap();
        engine
            .convert(date(2022, 1, 4), dec!(1), &Currency::usd(), &Currency::jpy())
            .await
            .unwrap();

        assert_eq!(feed.fetch_count(), 1);
        assert_eq!(engine.stats().hits, 1);
    }

    #[tokio::test]
    async fn test_absent_date_refetches_and_replaces() {
        let (engine, feed) = sample_engine();
        engine
            .convert(date(2022, 1, 4), dec!(1), &Currency::usd(), &Currency::eur())
            .await
            .unwrap();

        feed.set_document(FeedDocument::new(vec![FeedRecord::with_rates(
            "2022-01-07",
            [("USD", dec!(4))],
        )]));
        let value = engine
            .convert(date(2022, 1, 7), dec!(8), &Currency::usd(), &Currency::eur())
            .await
            .unwrap();

        assert_eq!(value, dec!(2));
        assert_eq!(feed.fetch_count(), 2);

        // The replacement table no longer covers 2022-01-04.
        let result = engine
            .convert(date(2022, 1, 4), dec!(1), &Currency::usd(), &Currency::eur())
            .await;
        assert!(matches!(result, Err(FxError::DateOutOfBound { .. })));
        assert_eq!(feed.fetch_count(), 3);
    }

    #[tokio::test]
    async fn test_without_cache_every_conversion_fetches() {
        let (engine, feed) = setup_engine(
            vec![FeedRecord::with_rates("2022-01-04", [("USD", dec!(2))])],
            false,
        );

        for _ in 0..3 {
            engine
                .convert(date(2022, 1, 4), dec!(1), &Currency::usd(), &Currency::eur())
                .await
                .unwrap();
        }

        assert_eq!(feed.fetch_count(), 3);
    }

    #[tokio::test]
    async fn test_execute_request() {
        let (engine, _) = sample_engine();
        let request = ConversionRequest::new(
            date(2022, 1, 4),
            Money::new(dec!(100), Currency::usd()),
            Currency::eur(),
        );

        let conversion = engine.execute(request).await.unwrap();

        assert_eq!(conversion.output, Money::new(dec!(50), Currency::eur()));
        assert_eq!(conversion.effective_rate(), dec!(0.5));
    }

    #[tokio::test]
    async fn test_converter_trait_object() {
        let (engine, _) = sample_engine();
        let converter: Arc<dyn Converter> = Arc::new(engine);

        let value = converter
            .convert(date(2022, 1, 4), dec!(100), &Currency::usd(), &Currency::eur())
            .await
            .unwrap();

        assert_eq!(value, dec!(50));
    }

    fn amount_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..100_000_000).prop_map(|cents| Decimal::new(cents, 2))
    }

    fn rate_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..10_000_000).prop_map(|r| Decimal::new(r, 4))
    }

    proptest! {
        #[test]
        fn prop_same_currency_is_identity(amount in amount_strategy(), code in 0usize..33) {
            let (engine, feed) = sample_engine();
            let currency = Currency::new(eurofx_common::ECB_CURRENCIES[code]);

            let value = tokio_test::block_on(
                engine.convert(date(2022, 1, 4), amount, &currency, &currency),
            )
            .unwrap();

            prop_assert_eq!(value, amount);
            prop_assert_eq!(feed.fetch_count(), 0);
        }

        #[test]
        fn prop_from_base_multiplies(amount in amount_strategy(), usd in rate_strategy()) {
            let (engine, _) = setup_engine(
                vec![FeedRecord::with_rates("2022-01-04", [("USD", usd)])],
                true,
            );

            let value = tokio_test::block_on(
                engine.convert(date(2022, 1, 4), amount, &Currency::eur(), &Currency::usd()),
            )
            .unwrap();

            prop_assert_eq!(value, amount * usd);
        }

        #[test]
        fn prop_triangulation_consistent(amount in amount_strategy(), usd in rate_strategy(), jpy in rate_strategy()) {
            let (engine, _) = setup_engine(
                vec![FeedRecord::with_rates("2022-01-04", [("USD", usd), ("JPY", jpy)])],
                true,
            );
            let day = date(2022, 1, 4);

            let direct = tokio_test::block_on(
                engine.convert(day, amount, &Currency::usd(), &Currency::jpy()),
            )
            .unwrap();
            let via_base = tokio_test::block_on(async {
                let eur = engine.convert(day, amount, &Currency::usd(), &Currency::eur()).await?;
                engine.convert(day, eur, &Currency::eur(), &Currency::jpy()).await
            })
            .unwrap();

            prop_assert!((direct - via_base).abs() <= dec!(0.000001));
        }
    }
}
