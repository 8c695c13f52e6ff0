//! eurofx Common Types
//!
//! Shared types used across the eurofx crates: currency codes and the
//! registry of recognised currencies, monetary amounts, feed date parsing and
//! the error type every layer reports through.

pub mod currency;
pub mod monetary;
pub mod error;
pub mod time;

pub use currency::*;
pub use monetary::*;
pub use error::*;
pub use time::*;
