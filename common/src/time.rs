//! Feed date parsing.
//!
//! The rate feed stamps every record with a `yyyy-mm-dd` token. Tokens carry no
//! time of day, so they decode into a plain calendar date.

use chrono::NaiveDate;

use crate::error::{FxError, FxResult};

/// Layout reported when a token does not split into three parts.
pub const FEED_DATE_LAYOUT: &str = "yyyy-mm-dd";

/// Parse a feed date token such as `2022-01-04` or `2022-1-4`.
pub fn parse_feed_date(token: &str) -> FxResult<NaiveDate> {
    let parts: Vec<&str> = token.split('-').collect();
    if parts.len() != 3 {
        return Err(FxError::InvalidDateFormat {
            token: token.to_string(),
            expected_layout: FEED_DATE_LAYOUT.to_string(),
        });
    }

    let year: i32 = parse_component(token, "year", parts[0])?;
    let month: u32 = parse_component(token, "month", parts[1])?;
    let day: u32 = parse_component(token, "day", parts[2])?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| FxError::DateParse {
        detail: format!("date {} does not exist in the calendar", token),
    })
}

fn parse_component<T>(token: &str, component: &str, raw: &str) -> FxResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse().map_err(|e| FxError::DateParse {
        detail: format!("failed to parse {} from date: {}, err: {}", component, token, e),
    })
}
