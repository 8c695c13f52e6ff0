//! eurofx FX Engine
//!
//! Rate cache and conversion engine for daily reference-rate feeds.
//!
//! # Features
//!
//! - Date-indexed rate tables built from a fetched feed document
//! - Single-table cache that refetches only when a date is missing
//! - Per-date currency validity (currencies that stopped being published)
//! - Triangulated conversion through the feed's base currency
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use eurofx_common::{Currency, CurrencyRegistry};
//! use eurofx_fx::{FxEngine, FxEngineConfig};
//!
//! let engine = FxEngine::new(feed, Arc::new(CurrencyRegistry::ecb()), FxEngineConfig::default());
//!
//! let eur = engine
//!     .convert(date, dec!(100), &Currency::usd(), &Currency::eur())
//!     .await?;
//! ```

pub mod engine;
pub mod feed;
pub mod table;
pub mod cache;
pub mod conversion;

pub use engine::{Converter, FxEngine, FxEngineConfig};
pub use feed::{FeedDocument, FeedRate, FeedRecord, RateFeed};
#[cfg(any(test, feature = "test-utils"))]
pub use feed::MockRateFeed;
pub use table::{RateMap, RateTable};
pub use cache::{CacheLookup, CacheStats, RateCache, RateCacheConfig};
pub use conversion::{Conversion, ConversionRequest};
pub use eurofx_common::{FxError, FxResult};
