//! XML model of the ECB euro foreign exchange reference rate document.
//!
//! ```xml
//! <gesmes:Envelope ...>
//!   <Cube>
//!     <Cube time="2022-01-04">
//!       <Cube currency="USD" rate="1.1305"/>
//!     </Cube>
//!   </Cube>
//! </gesmes:Envelope>
//! ```

use eurofx_common::{FxError, FxResult};
use eurofx_fx::{FeedDocument, FeedRate, FeedRecord};
use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "Cube", default)]
    cube: OuterCube,
}

#[derive(Debug, Default, Deserialize)]
struct OuterCube {
    #[serde(rename = "Cube", default)]
    days: Vec<DayCube>,
}

#[derive(Debug, Deserialize)]
struct DayCube {
    #[serde(rename = "@time")]
    time: String,
    #[serde(rename = "Cube", default)]
    rates: Vec<RateCube>,
}

#[derive(Debug, Deserialize)]
struct RateCube {
    #[serde(rename = "@currency")]
    currency: String,
    #[serde(rename = "@rate")]
    rate: String,
}

/// Decode a raw ECB rate document.
///
/// Dates and currency codes are passed through untouched; they are validated
/// when the rate table is built.
pub fn decode_document(xml: &str) -> FxResult<FeedDocument> {
    let envelope: Envelope =
        quick_xml::de::from_str(xml).map_err(|e| FxError::Decode(e.to_string()))?;

    let records = envelope
        .cube
        .days
        .into_iter()
        .map(|day| {
            let rates = day
                .rates
                .into_iter()
                .map(|r| {
                    let rate = r.rate.trim().parse::<Decimal>().map_err(|e| {
                        FxError::Decode(format!(
                            "invalid rate {:?} for {} on {}: {}",
                            r.rate, r.currency, day.time, e
                        ))
                    })?;
                    Ok(FeedRate {
                        currency: r.currency,
                        rate,
                    })
                })
                .collect::<FxResult<Vec<_>>>()?;
            Ok(FeedRecord::new(day.time, rates))
        })
        .collect::<FxResult<Vec<_>>>()?;

    Ok(FeedDocument::new(records))
}
