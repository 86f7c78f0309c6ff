//! Price formatting.

use crate::money::Currency;

/// Render minor units as a price, e.g. `format_price(123456, USD)` is
/// `"$1,234.56"`.
///
/// The amount is always divided by 100 and shown with two decimals and
/// en-US grouping. Currencies without a known symbol are prefixed with
/// their code and a space ("CHF 19.99").
pub fn format_price(amount: i64, currency: Currency) -> String {
    let body = format_amount(amount.unsigned_abs());
    let priced = match currency.symbol() {
        Some(symbol) => format!("{symbol}{body}"),
        None => format!("{} {body}", currency.code()),
    };

    if amount < 0 {
        format!("-{priced}")
    } else {
        priced
    }
}

/// Render unsigned minor units as `1,234.56`.
pub fn format_amount(minor: u64) -> String {
    let whole = (minor / 100).to_string();
    let cents = minor % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    format!("{grouped}.{cents:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_usd() {
        assert_eq!(format_price(1999, Currency::USD), "$19.99");
        assert_eq!(format_price(0, Currency::USD), "$0.00");
        assert_eq!(format_price(5, Currency::USD), "$0.05");
    }

    #[test]
    fn test_format_grouping() {
        assert_eq!(format_price(123456, Currency::EUR), "\u{20ac}1,234.56");
        assert_eq!(format_price(100000000, Currency::GBP), "\u{00a3}1,000,000.00");
        assert_eq!(format_amount(99999), "999.99");
    }

    #[test]
    fn test_format_negative() {
        assert_eq!(format_price(-1999, Currency::USD), "-$19.99");
        assert_eq!(
            format_price(i64::MIN, Currency::USD),
            "-$92,233,720,368,547,758.08"
        );
    }

    #[test]
    fn test_format_code_fallback() {
        assert_eq!(format_price(1999, Currency::CHF), "CHF 19.99");
        assert_eq!(format_price(1999, Currency::JPY), "\u{00a5}19.99");
    }
}
