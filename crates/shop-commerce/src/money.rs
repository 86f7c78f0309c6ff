//! Money and currency types.
//!
//! Amounts are integers in minor units (cents). Every place that turns a
//! fractional value back into minor units goes through [`round_half_up`].

use crate::error::CommerceError;
use crate::pricing::format_price;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An ISO 4217 currency code, stored upper-case.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency([u8; 3]);

impl Currency {
    pub const USD: Currency = Currency(*b"USD");
    pub const EUR: Currency = Currency(*b"EUR");
    pub const GBP: Currency = Currency(*b"GBP");
    pub const JPY: Currency = Currency(*b"JPY");
    pub const CAD: Currency = Currency(*b"CAD");
    pub const AUD: Currency = Currency(*b"AUD");
    pub const CHF: Currency = Currency(*b"CHF");
    pub const CNY: Currency = Currency(*b"CNY");
    pub const INR: Currency = Currency(*b"INR");
    pub const MXN: Currency = Currency(*b"MXN");
    pub const KRW: Currency = Currency(*b"KRW");
    pub const BRL: Currency = Currency(*b"BRL");

    /// Parse a currency code (case-insensitive).
    pub fn from_code(code: &str) -> Result<Self, CommerceError> {
        let bytes = code.trim().as_bytes();
        match bytes {
            [a, b, c] if bytes.iter().all(u8::is_ascii_alphabetic) => Ok(Currency([
                a.to_ascii_uppercase(),
                b.to_ascii_uppercase(),
                c.to_ascii_uppercase(),
            ])),
            _ => Err(CommerceError::InvalidCurrency(code.to_string())),
        }
    }

    /// The upper-case code (e.g., "USD").
    pub fn code(&self) -> &str {
        std::str::from_utf8(&self.0).unwrap_or("XXX")
    }

    /// The conventional display symbol, if the storefront knows one.
    pub fn symbol(&self) -> Option<&'static str> {
        Some(match &self.0 {
            b"USD" => "$",
            b"EUR" => "\u{20ac}",
            b"GBP" => "\u{00a3}",
            b"JPY" => "\u{00a5}",
            b"CAD" => "CA$",
            b"AUD" => "A$",
            b"CNY" => "CN\u{00a5}",
            b"INR" => "\u{20b9}",
            b"MXN" => "MX$",
            b"KRW" => "\u{20a9}",
            b"BRL" => "R$",
            _ => return None,
        })
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency::USD
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl fmt::Debug for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Currency({})", self.code())
    }
}

impl std::str::FromStr for Currency {
    type Err = CommerceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::from_code(s)
    }
}

impl TryFrom<String> for Currency {
    type Error = CommerceError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Currency::from_code(&s)
    }
}

impl From<Currency> for String {
    fn from(c: Currency) -> Self {
        c.code().to_string()
    }
}

/// Round to the nearest integer, ties toward positive infinity.
///
/// `2.5 -> 3`, `-2.5 -> -2`.
pub fn round_half_up(value: f64) -> i64 {
    let floor = value.floor();
    if value - floor >= 0.5 {
        floor as i64 + 1
    } else {
        floor as i64
    }
}

/// `percent`% of `amount`, rounded half up.
pub fn percent_of(amount: i64, percent: f64) -> i64 {
    round_half_up(amount as f64 * percent / 100.0)
}

/// A monetary value with currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Money {
    /// Amount in minor units.
    pub amount: i64,
    /// The currency.
    pub currency: Currency,
}

impl Money {
    /// Create a new Money value from minor units.
    pub fn new(amount: i64, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Create a zero amount in the given currency.
    pub fn zero(currency: Currency) -> Self {
        Self::new(0, currency)
    }

    /// Check if this is zero.
    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }

    /// Add another Money value.
    pub fn try_add(&self, other: &Money) -> Result<Money, CommerceError> {
        if self.currency != other.currency {
            return Err(CommerceError::CurrencyMismatch {
                expected: self.currency.to_string(),
                got: other.currency.to_string(),
            });
        }
        let amount = self
            .amount
            .checked_add(other.amount)
            .ok_or(CommerceError::Overflow)?;
        Ok(Money::new(amount, self.currency))
    }

    /// Multiply by a quantity.
    pub fn try_multiply(&self, factor: i64) -> Result<Money, CommerceError> {
        let amount = self
            .amount
            .checked_mul(factor)
            .ok_or(CommerceError::Overflow)?;
        Ok(Money::new(amount, self.currency))
    }

    /// Sum Money values, all of which must be in `currency`.
    pub fn try_sum<'a>(
        iter: impl IntoIterator<Item = &'a Money>,
        currency: Currency,
    ) -> Result<Money, CommerceError> {
        iter.into_iter()
            .try_fold(Money::zero(currency), |acc, m| acc.try_add(m))
    }

    /// Calculate a percentage of this amount, rounded half up.
    pub fn percentage(&self, percent: f64) -> Money {
        Money::new(percent_of(self.amount, percent), self.currency)
    }

    /// Format for display (e.g., "$49.99").
    pub fn display(&self) -> String {
        format_price(self.amount, self.currency)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_half_up_boundaries() {
        assert_eq!(round_half_up(2.5), 3);
        assert_eq!(round_half_up(2.4999), 2);
        assert_eq!(round_half_up(-2.5), -2);
        assert_eq!(round_half_up(-2.5001), -3);
        assert_eq!(round_half_up(0.0), 0);
        assert_eq!(round_half_up(0.49999999999999994), 0);
    }

    #[test]
    fn test_percent_of() {
        assert_eq!(percent_of(1999, 10.0), 200);
        assert_eq!(percent_of(25, 10.0), 3);
        assert_eq!(percent_of(0, 10.0), 0);
    }

    #[test]
    fn test_currency_from_code() {
        assert_eq!(Currency::from_code("USD").unwrap(), Currency::USD);
        assert_eq!(Currency::from_code("eur").unwrap(), Currency::EUR);
        assert!(Currency::from_code("EURO").is_err());
        assert!(Currency::from_code("U$D").is_err());
        assert!(Currency::from_code("").is_err());
    }

    #[test]
    fn test_currency_serde_as_code() {
        let json = serde_json::to_string(&Currency::GBP).unwrap();
        assert_eq!(json, "\"GBP\"");

        let parsed: Currency = serde_json::from_str("\"jpy\"").unwrap();
        assert_eq!(parsed, Currency::JPY);
        assert!(serde_json::from_str::<Currency>("\"dollars\"").is_err());
    }

    #[test]
    fn test_currency_symbol() {
        assert_eq!(Currency::USD.symbol(), Some("$"));
        assert_eq!(Currency::CHF.symbol(), None);
    }

    #[test]
    fn test_money_arithmetic() {
        let a = Money::new(1000, Currency::USD);
        let b = Money::new(500, Currency::USD);
        assert_eq!(a.try_add(&b).unwrap().amount, 1500);
        assert_eq!(a.try_multiply(3).unwrap().amount, 3000);

        let total = Money::try_sum([a, b].iter(), Currency::USD).unwrap();
        assert_eq!(total.amount, 1500);
    }

    #[test]
    fn test_money_currency_mismatch() {
        let usd = Money::new(1000, Currency::USD);
        let eur = Money::new(1000, Currency::EUR);
        assert!(matches!(
            usd.try_add(&eur),
            Err(CommerceError::CurrencyMismatch { .. })
        ));
    }

    #[test]
    fn test_money_overflow() {
        let big = Money::new(i64::MAX, Currency::USD);
        assert!(matches!(big.try_multiply(2), Err(CommerceError::Overflow)));
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::new(4999, Currency::USD).display(), "$49.99");
    }
}
