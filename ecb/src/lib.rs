//! eurofx ECB Feed
//!
//! [`RateFeed`](eurofx_fx::RateFeed) implementation for the European Central
//! Bank euro foreign exchange reference rates. The ECB publishes once per
//! working day and the document covers the last 90 days.

pub mod client;
pub mod config;
pub mod model;

pub use client::EcbClient;
pub use config::{EcbClientConfig, DEFAULT_ECB_URL};
pub use model::decode_document;
