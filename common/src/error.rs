//! Error types for eurofx.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised while fetching rates or converting amounts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FxError {
    /// Currency is unknown, or known but not published on the requested date.
    #[error("invalid currency: {code}")]
    InvalidCurrency { code: String },

    /// Date token does not have three dash-separated parts.
    #[error("expected date layout: {expected_layout}, got {token}")]
    InvalidDateFormat {
        token: String,
        expected_layout: String,
    },

    /// A date component could not be parsed.
    #[error("{detail}")]
    DateParse { detail: String },

    /// Requested date lies outside the fetched rate window.
    #[error("date {date} is out of bounds [{earliest}, {latest}]")]
    DateOutOfBound {
        date: NaiveDate,
        earliest: NaiveDate,
        latest: NaiveDate,
    },

    /// No usable rate for the currency on that date (e.g. a holiday gap).
    #[error("no rate for {currency} on {date}")]
    RateUnavailable { date: NaiveDate, currency: String },

    /// The fetched document did not contain a single dated record.
    #[error("rate feed returned no data")]
    EmptyFeed,

    /// Rate source answered with a non-2xx status.
    #[error("rate source returned HTTP {status_code}")]
    Transport { status_code: u16 },

    /// Rate source could not be reached.
    #[error("request failed: {0}")]
    Request(String),

    /// Rate document could not be decoded.
    #[error("failed to decode rate document: {0}")]
    Decode(String),

    /// Decimal arithmetic overflowed.
    #[error("arithmetic overflow converting {from} to {to}")]
    Overflow { from: String, to: String },

    /// Invalid client or engine configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl FxError {
    /// Whether a fetch that failed with this error is worth repeating.
    pub fn is_retryable(&self) -> bool {
        match self {
            FxError::Transport { status_code } => *status_code >= 500,
            FxError::Request(_) => true,
            _ => false,
        }
    }
}

/// Result type for eurofx operations.
pub type FxResult<T> = Result<T, FxError>;
