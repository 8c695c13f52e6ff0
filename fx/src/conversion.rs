//! Currency conversion types.

use chrono::NaiveDate;
use eurofx_common::{Currency, Money};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Represents a completed currency conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversion {
    /// Date whose reference rates were applied.
    pub date: NaiveDate,
    /// Input amount.
    pub input: Money,
    /// Output amount.
    pub output: Money,
}

impl Conversion {
    /// Create a new conversion record.
    pub fn new(date: NaiveDate, input: Money, output: Money) -> Self {
        Self {
            date,
            input,
            output,
        }
    }

    /// Get the effective rate used.
    pub fn effective_rate(&self) -> Decimal {
        if self.input.value.is_zero() {
            return Decimal::ZERO;
        }
        self.output.value / self.input.value
    }
}

/// Request to perform a conversion.
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    /// Date of the reference rates to use.
    pub date: NaiveDate,
    /// Amount to convert.
    pub amount: Money,
    /// Target currency.
    pub target_currency: Currency,
}

impl ConversionRequest {
    /// Create a new conversion request.
    pub fn new(date: NaiveDate, amount: Money, target_currency: Currency) -> Self {
        Self {
            date,
            amount,
            target_currency,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_conversion_effective_rate() {
        let date = NaiveDate::from_ymd_opt(2022, 1, 4).unwrap();
        let input = Money::new(dec!(1000), Currency::usd());
        let output = Money::new(dec!(920), Currency::eur());

        let conversion = Conversion::new(date, input, output);

        assert_eq!(conversion.effective_rate(), dec!(0.92));
    }

    #[test]
    fn test_zero_input_effective_rate() {
        let date = NaiveDate::from_ymd_opt(2022, 1, 4).unwrap();
        let conversion = Conversion::new(
            date,
            Money::new(Decimal::ZERO, Currency::usd()),
            Money::new(Decimal::ZERO, Currency::eur()),
        );

        assert_eq!(conversion.effective_rate(), Decimal::ZERO);
    }
}
