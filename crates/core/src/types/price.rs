//! Type-safe price representation in minor currency units.
//!
//! Amounts are integers in the currency's smallest unit (cents) so that
//! cart totals never accumulate floating-point drift. Conversion to a
//! decimal only happens at the display edge.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Price {
    /// Amount in the currency's smallest unit (e.g., cents).
    pub minor_units: u64,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(minor_units: u64, currency_code: CurrencyCode) -> Self {
        Self {
            minor_units,
            currency_code,
        }
    }

    /// Amount in the currency's standard unit (e.g., euros, not cents).
    #[must_use]
    pub fn amount(&self) -> Decimal {
        Decimal::from(self.minor_units) / Decimal::from(100)
    }

    /// Format for display (e.g., "€140.00").
    #[must_use]
    pub fn display(&self) -> String {
        format!("{}{:.2}", self.currency_code.symbol(), self.amount())
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    EUR,
    USD,
    GBP,
}

impl CurrencyCode {
    /// Currency symbol used in formatted prices.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::EUR => "€",
            Self::USD => "$",
            Self::GBP => "£",
        }
    }

    /// The ISO 4217 code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::EUR => "EUR",
            Self::USD => "USD",
            Self::GBP => "GBP",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_formats_two_decimals() {
        assert_eq!(Price::new(14000, CurrencyCode::EUR).display(), "€140.00");
        assert_eq!(Price::new(1999, CurrencyCode::USD).display(), "$19.99");
        assert_eq!(Price::new(5, CurrencyCode::GBP).display(), "£0.05");
        assert_eq!(Price::new(0, CurrencyCode::EUR).display(), "€0.00");
    }

    #[test]
    fn test_amount() {
        assert_eq!(
            Price::new(12345, CurrencyCode::EUR).amount(),
            Decimal::new(12345, 2)
        );
    }
}
