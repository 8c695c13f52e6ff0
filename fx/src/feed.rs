//! Rate feed trait and the decoded document it produces.

use async_trait::async_trait;
use eurofx_common::FxResult;
use rust_decimal::Decimal;

/// A single published rate: one unit of the base currency buys `rate` units
/// of `currency`.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedRate {
    pub currency: String,
    pub rate: Decimal,
}

/// All rates published for one date, still in raw feed form.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedRecord {
    pub date: String,
    pub rates: Vec<FeedRate>,
}

impl FeedRecord {
    pub fn new(date: impl Into<String>, rates: Vec<FeedRate>) -> Self {
        Self {
            date: date.into(),
            rates,
        }
    }

    /// Convenience constructor from `(code, rate)` pairs.
    pub fn with_rates<'a>(
        date: impl Into<String>,
        rates: impl IntoIterator<Item = (&'a str, Decimal)>,
    ) -> Self {
        Self::new(
            date,
            rates
                .into_iter()
                .map(|(currency, rate)| FeedRate {
                    currency: currency.to_string(),
                    rate,
                })
                .collect(),
        )
    }
}

/// A decoded rate document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedDocument {
    pub records: Vec<FeedRecord>,
}

impl FeedDocument {
    pub fn new(records: Vec<FeedRecord>) -> Self {
        Self { records }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Source of rate documents.
#[async_trait]
pub trait RateFeed: Send + Sync {
    /// Get the feed name.
    fn name(&self) -> &str;

    /// Fetch the full rate document.
    async fn fetch(&self) -> FxResult<FeedDocument>;
}

/// Mock rate feed for testing.
#[cfg(any(test, feature = "test-utils"))]
pub struct MockRateFeed {
    name: String,
    response: parking_lot::Mutex<FxResult<FeedDocument>>,
    fetches: std::sync::atomic::AtomicUsize,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockRateFeed {
    /// Create a mock that always returns `document`.
    pub fn new(document: FeedDocument) -> Self {
        Self {
            name: "MOCK".to_string(),
            response: parking_lot::Mutex::new(Ok(document)),
            fetches: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Replace the document returned by subsequent fetches.
    pub fn set_document(&self, document: FeedDocument) {
        *self.response.lock() = Ok(document);
    }

    /// Make subsequent fetches fail with `error`.
    pub fn fail_with(&self, error: eurofx_common::FxError) {
        *self.response.lock() = Err(error);
    }

    /// Number of fetches performed so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl RateFeed for MockRateFeed {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> FxResult<FeedDocument> {
        self.fetches
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.response.lock().clone()
    }
}
