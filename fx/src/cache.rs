//! Single-table rate cache.
//!
//! The feed publishes at most once per day and every fetch returns the whole
//! 90-day window, so the cache holds one table and reuses it for as long as it
//! contains the requested date. A miss replaces the table wholesale.

use chrono::NaiveDate;
use eurofx_common::{CurrencyRegistry, FxResult};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::feed::RateFeed;
use crate::table::RateTable;

/// Result of looking a date up in the cache.
#[derive(Debug, Clone)]
pub enum CacheLookup {
    Hit(Arc<RateTable>),
    Miss,
}

#[derive(Debug)]
enum CacheState {
    Empty,
    Populated(Arc<RateTable>),
}

impl CacheState {
    fn lookup(&self, date: NaiveDate) -> CacheLookup {
        match self {
            CacheState::Populated(table) if table.contains_date(date) => {
                CacheLookup::Hit(Arc::clone(table))
            }
            _ => CacheLookup::Miss,
        }
    }

    fn refresh(&mut self, table: Arc<RateTable>) {
        *self = CacheState::Populated(table);
    }
}

/// Configuration for rate cache.
#[derive(Debug, Clone)]
pub struct RateCacheConfig {
    /// Whether fetched tables are kept between calls.
    pub enabled: bool,
}

impl Default for RateCacheConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Rate cache owning at most one rate table.
///
/// The check-fetch-replace sequence runs under one async mutex, so concurrent
/// callers never observe a half-replaced table or trigger duplicate fetches
/// for the same miss.
pub struct RateCache {
    feed: Arc<dyn RateFeed>,
    registry: Arc<CurrencyRegistry>,
    state: Mutex<CacheState>,
    config: RateCacheConfig,
    hits: AtomicU64,
    misses: AtomicU64,
    refreshes: AtomicU64,
}

impl RateCache {
    /// Create an empty cache in front of `feed`.
    pub fn new(
        feed: Arc<dyn RateFeed>,
        registry: Arc<CurrencyRegistry>,
        config: RateCacheConfig,
    ) -> Self {
        Self {
            feed,
            registry,
            state: Mutex::new(CacheState::Empty),
            config,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            refreshes: AtomicU64::new(0),
        }
    }

    /// Get a rate table suitable for `date`, fetching a fresh one on a miss.
    pub async fn get_rates(&self, date: NaiveDate) -> FxResult<Arc<RateTable>> {
        if !self.config.enabled {
            return self.fetch_table().await.map(Arc::new);
        }

        let mut state = self.state.lock().await;

        if let CacheLookup::Hit(table) = state.lookup(date) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(%date, "Cache hit");
            return Ok(table);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(%date, "Cache miss");

        let table = Arc::new(self.fetch_table().await?);
        state.refresh(Arc::clone(&table));
        self.refreshes.fetch_add(1, Ordering::Relaxed);

        info!(
            feed = self.feed.name(),
            dates = table.len(),
            earliest = ?table.earliest(),
            latest = ?table.latest(),
            "Rate cache refreshed"
        );

        Ok(table)
    }

    /// Look `date` up without fetching.
    pub async fn lookup(&self, date: NaiveDate) -> CacheLookup {
        self.state.lock().await.lookup(date)
    }

    /// Whether a table is currently cached.
    pub async fn is_populated(&self) -> bool {
        matches!(*self.state.lock().await, CacheState::Populated(_))
    }

    /// Drop the cached table.
    pub async fn clear(&self) {
        *self.state.lock().await = CacheState::Empty;
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            refreshes: self.refreshes.load(Ordering::Relaxed),
        }
    }

    async fn fetch_table(&self) -> FxResult<RateTable> {
        let document = self.feed.fetch().await?;
        RateTable::build(&self.registry, &document.records)
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub refreshes: u64,
}
