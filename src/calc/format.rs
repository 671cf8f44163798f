// ==========================================
// Numeric formatting
// ==========================================
// Total functions: never panic, never print NaN / inf.
// Rounding follows fixed-point semantics: exact decimal value of the
// f64, ties away from zero. A rounded zero is printed without sign.
// ==========================================

use crate::calc::units::kg_to_lb;
use crate::i18n::Locale;

/// Local currency (córdoba)
pub const DEFAULT_CURRENCY_SYMBOL: &str = "C$";

pub const DEFAULT_NUMBER_DECIMALS: usize = 0;
pub const DEFAULT_PERCENTAGE_DECIMALS: usize = 1;
pub const DEFAULT_WEIGHT_DECIMALS: usize = 1;

/// Largest fractional precision rendered; larger requests are capped
pub const MAX_DECIMALS: usize = 100;

/// Extra digits printed to decide whether a value sits exactly on a tie
const TIE_PROBE_DIGITS: usize = 24;

// ==========================================
// Fixed-point rendering
// ==========================================

/// Add one unit in the last place to an unsigned decimal string
fn increment_decimal(digits: &str) -> String {
    let mut bytes = digits.as_bytes().to_vec();
    let mut i = bytes.len();
    while i > 0 {
        i -= 1;
        match bytes[i] {
            b'.' => continue,
            b'9' => bytes[i] = b'0',
            b => {
                bytes[i] = b + 1;
                return String::from_utf8_lossy(&bytes).into_owned();
            }
        }
    }
    let mut carried = String::with_capacity(bytes.len() + 1);
    carried.push('1');
    carried.push_str(&String::from_utf8_lossy(&bytes));
    carried
}

/// Unsigned fixed-point rendering of a finite, non-negative value
fn fixed_unsigned(abs: f64, decimals: usize) -> String {
    let probe = format!("{:.*}", decimals + TIE_PROBE_DIGITS, abs);
    let tie_at = probe.len() - TIE_PROBE_DIGITS;
    let is_tie = probe.as_bytes()[tie_at] == b'5'
        && probe[tie_at + 1..].bytes().all(|b| b == b'0');

    if !is_tie {
        return format!("{:.*}", decimals, abs);
    }

    let truncated = probe[..tie_at].trim_end_matches('.');
    increment_decimal(truncated)
}

/// `value` with exactly `decimals` fractional digits; `None` when non-finite
fn to_fixed(value: f64, decimals: usize) -> Option<String> {
    if !value.is_finite() {
        return None;
    }
    let body = fixed_unsigned(value.abs(), decimals.min(MAX_DECIMALS));
    let is_zero = body.bytes().all(|b| b == b'0' || b == b'.');
    if value.is_sign_negative() && !is_zero {
        Some(format!("-{}", body))
    } else {
        Some(body)
    }
}

/// Insert `separator` every three integer digits when the integer part has
/// at least `min_digits` digits
fn group_integer(digits: &str, separator: char, min_digits: usize) -> String {
    if digits.len() < min_digits {
        return digits.to_string();
    }
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(c);
    }
    grouped
}

/// Locale-grouped fixed-point rendering
fn to_grouped(value: f64, decimals: usize, locale: Locale) -> Option<String> {
    let fixed = to_fixed(value, decimals)?;
    let (sign, unsigned) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let mut out = String::from(sign);
    out.push_str(&group_integer(
        int_part,
        locale.group_separator(),
        locale.min_grouping_digits(),
    ));
    if let Some(frac) = frac_part {
        out.push(locale.decimal_separator());
        out.push_str(frac);
    }
    Some(out)
}

// ==========================================
// Public formatters
// ==========================================

/// `symbol` + whole-unit amount, grouped in the given locale
pub fn format_currency_in(locale: Locale, value: f64, symbol: &str) -> String {
    match to_grouped(value, 0, locale) {
        Some(amount) => format!("{}{}", symbol, amount),
        None => format!("{}0", symbol),
    }
}

/// `symbol` + whole-unit amount, Spanish grouping ("C$10.000")
pub fn format_currency(value: f64, symbol: &str) -> String {
    format_currency_in(Locale::Es, value, symbol)
}

/// "$1,000.00"
pub fn format_usd(value: f64) -> String {
    match to_grouped(value, 2, Locale::En) {
        Some(amount) => format!("${}", amount),
        None => "$0".to_string(),
    }
}

/// Fixed-decimal string, no grouping
pub fn format_number(value: f64, decimals: usize) -> String {
    to_fixed(value, decimals).unwrap_or_else(|| "0".to_string())
}

/// Fixed-decimal string grouped in the given locale
pub fn format_number_in(locale: Locale, value: f64, decimals: usize) -> String {
    to_grouped(value, decimals, locale).unwrap_or_else(|| "0".to_string())
}

/// "50.0%"
pub fn format_percentage(value: f64, decimals: usize) -> String {
    match to_fixed(value, decimals) {
        Some(fixed) => format!("{}%", fixed),
        None => "0%".to_string(),
    }
}

/// Kilograms rendered as pounds ("2.2 lb")
pub fn format_weight_lb(kg: f64, decimals: usize) -> String {
    format!("{} lb", format_number(kg_to_lb(kg), decimals))
}

/// Kilograms as-is ("1.5 kg")
pub fn format_weight_kg(kg: f64, decimals: usize) -> String {
    match to_fixed(kg, decimals) {
        Some(fixed) => format!("{} kg", fixed),
        None => "0 kg".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(1000.0, DEFAULT_CURRENCY_SYMBOL), "C$1000");
        assert_eq!(format_currency(12345.0, DEFAULT_CURRENCY_SYMBOL), "C$12.345");
        assert_eq!(format_currency(1234567.4, DEFAULT_CURRENCY_SYMBOL), "C$1.234.567");
        assert_eq!(format_currency(0.0, DEFAULT_CURRENCY_SYMBOL), "C$0");
        assert_eq!(format_currency(f64::NAN, DEFAULT_CURRENCY_SYMBOL), "C$0");
        assert_eq!(format_currency(f64::INFINITY, "$"), "$0");
        assert_eq!(format_currency(-15000.0, DEFAULT_CURRENCY_SYMBOL), "C$-15.000");
    }

    #[test]
    fn test_format_currency_english_grouping() {
        assert_eq!(format_currency_in(Locale::En, 1000.0, "$"), "$1,000");
        assert_eq!(format_currency_in(Locale::En, 999.0, "$"), "$999");
    }

    #[test]
    fn test_format_currency_rounds_ties_away_from_zero() {
        assert_eq!(format_currency(2.5, "C$"), "C$3");
        assert_eq!(format_currency(-2.5, "C$"), "C$-3");
        assert_eq!(format_currency(9999.5, "C$"), "C$10.000");
        assert_eq!(format_currency(0.4, "C$"), "C$0");
    }

    #[test]
    fn test_format_usd() {
        assert_eq!(format_usd(1000.0), "$1,000.00");
        assert_eq!(format_usd(99.99), "$99.99");
        assert_eq!(format_usd(1234567.891), "$1,234,567.89");
        assert_eq!(format_usd(f64::NAN), "$0");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(12.3456, 2), "12.35");
        assert_eq!(format_number(10.0, DEFAULT_NUMBER_DECIMALS), "10");
        assert_eq!(format_number(0.125, 2), "0.13");
        assert_eq!(format_number(f64::NAN, 2), "0");
        assert_eq!(format_number_in(Locale::Es, 12345.678, 1), "12.345,7");
    }

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(50.0, DEFAULT_PERCENTAGE_DECIMALS), "50.0%");
        assert_eq!(format_percentage(33.333, 2), "33.33%");
        assert_eq!(format_percentage(f64::NAN, 1), "0%");
        assert_eq!(format_percentage(-12.34, 1), "-12.3%");
    }

    #[test]
    fn test_negative_zero_is_unsigned() {
        assert_eq!(format_number(-0.0, 0), "0");
        assert_eq!(format_percentage(-0.01, 1), "0.0%");
        assert_eq!(format_currency(-0.2, "C$"), "C$0");
    }

    #[test]
    fn test_huge_precision_is_capped() {
        let rendered = format_number(1.5, usize::MAX);
        assert_eq!(rendered.split_once('.').unwrap().1.len(), MAX_DECIMALS);
        assert!(format_percentage(2.0, usize::MAX).ends_with("0%"));
        assert_eq!(format_number(-0.0, usize::MAX).len(), MAX_DECIMALS + 2);
    }

    #[test]
    fn test_format_weight() {
        assert_eq!(format_weight_lb(1.0, DEFAULT_WEIGHT_DECIMALS), "2.2 lb");
        assert_eq!(format_weight_lb(10.0, 2), "22.05 lb");
        assert_eq!(format_weight_lb(f64::NAN, 1), "0.0 lb");
        assert_eq!(format_weight_kg(1.5, DEFAULT_WEIGHT_DECIMALS), "1.5 kg");
        assert_eq!(format_weight_kg(f64::NAN, 1), "0 kg");
    }

    #[test]
    fn test_group_integer() {
        assert_eq!(group_integer("1000", '.', 5), "1000");
        assert_eq!(group_integer("10000", '.', 5), "10.000");
        assert_eq!(group_integer("1000", ',', 4), "1,000");
        assert_eq!(group_integer("100", ',', 4), "100");
    }
}
