//! Type-safe price representation using decimal arithmetic.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit.
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a price in the store currency (Iranian Rial).
    #[must_use]
    pub const fn irr(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::IRR)
    }

    /// Returns the amount rounded to the currency's minor unit and grouped
    /// with thousands separators, e.g. `12,500,000 IRR`.
    #[must_use]
    pub fn display(&self) -> String {
        let rounded = self
            .amount
            .round_dp(self.currency_code.minor_units())
            .to_string();
        let (sign, unsigned) = rounded
            .strip_prefix('-')
            .map_or(("", rounded.as_str()), |rest| ("-", rest));
        let (int_part, frac_part) = unsigned
            .split_once('.')
            .map_or((unsigned, None), |(i, f)| (i, Some(f)));

        let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
        for (i, c) in int_part.chars().enumerate() {
            if i > 0 && (int_part.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(c);
        }

        match frac_part {
            Some(frac) => format!("{sign}{grouped}.{frac} {}", self.currency_code),
            None => format!("{sign}{grouped} {}", self.currency_code),
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// ISO 4217 currency codes accepted by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    /// Iranian Rial, the store currency. Has no minor unit in practice.
    #[default]
    IRR,
    USD,
    EUR,
}

impl CurrencyCode {
    /// Number of decimal places used when displaying amounts.
    #[must_use]
    pub const fn minor_units(self) -> u32 {
        match self {
            Self::IRR => 0,
            Self::USD | Self::EUR => 2,
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IRR => f.write_str("IRR"),
            Self::USD => f.write_str("USD"),
            Self::EUR => f.write_str("EUR"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_groups_thousands() {
        let price = Price::irr(Decimal::new(12_500_000, 0));
        assert_eq!(price.display(), "12,500,000 IRR");
    }

    #[test]
    fn test_display_small_amount() {
        assert_eq!(Price::irr(Decimal::new(950, 0)).display(), "950 IRR");
        assert_eq!(Price::irr(Decimal::ZERO).display(), "0 IRR");
    }

    #[test]
    fn test_display_rounds_to_minor_units() {
        let irr = Price::irr(Decimal::new(1_234_56, 2));
        assert_eq!(irr.display(), "1,235 IRR");

        let usd = Price::new(Decimal::new(1_234_567, 2), CurrencyCode::USD);
        assert_eq!(usd.display(), "12,345.67 USD");
    }

    #[test]
    fn test_display_negative() {
        let price = Price::irr(Decimal::new(-1_000, 0));
        assert_eq!(price.to_string(), "-1,000 IRR");
    }
}
