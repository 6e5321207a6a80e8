//! Field parsing helpers shared by the entity schemas

use chrono::{NaiveDate, Utc};
use regex::Regex;
use rust_decimal::Decimal;
use sha2::{Digest, Sha256};

/// Parse a monetary amount from a CSV cell.
///
/// Tolerates currency symbols, thousands separators, and parentheses
/// notation for negatives: `"$1,234.56"` -> 1234.56, `"(100.00)"` -> -100.00.
/// Sign is preserved; callers reject negatives where they are invalid.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let s = s.trim();

    let (is_negative, s) = if s.starts_with('(') && s.ends_with(')') {
        (true, &s[1..s.len() - 1])
    } else {
        (false, s)
    };

    // Remove currency symbols, commas, whitespace
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    let mut amount: Decimal = cleaned.parse().ok()?;

    if is_negative && amount > Decimal::ZERO {
        amount = -amount;
    }

    Some(amount)
}

/// Parse an ISO `YYYY-MM-DD` date
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

/// Today's date (UTC)
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Minimal email shape check: local part, `@`, and a dotted domain segment.
/// Not full RFC validation.
pub fn is_email(s: &str) -> bool {
    let email_re = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    email_re.is_match(s.trim())
}

/// First 8 bytes of sha256 over `input`, hex-encoded (16 chars)
pub fn fingerprint16(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let result = hasher.finalize();
    hex::encode(&result[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount_plain() {
        assert_eq!(parse_amount("100"), Some(Decimal::new(100, 0)));
        assert_eq!(parse_amount("12.34"), Some(Decimal::new(1234, 2)));
    }

    #[test]
    fn test_parse_amount_currency_and_commas() {
        assert_eq!(parse_amount("$1,234.56"), Some(Decimal::new(123456, 2)));
        assert_eq!(parse_amount(" $ 50 "), Some(Decimal::new(50, 0)));
    }

    #[test]
    fn test_parse_amount_parentheses_negative() {
        assert_eq!(parse_amount("(100.00)"), Some(Decimal::new(-10000, 2)));
    }

    #[test]
    fn test_parse_amount_invalid() {
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("12.3.4"), None);
    }

    #[test]
    fn test_parse_date_iso_only() {
        assert_eq!(
            parse_date("2025-01-15"),
            NaiveDate::from_ymd_opt(2025, 1, 15)
        );
        assert_eq!(parse_date("01/15/2025"), None);
        assert_eq!(parse_date("not a date"), None);
    }

    #[test]
    fn test_is_email() {
        assert!(is_email("john@example.com"));
        assert!(is_email("a.b+c@mail.example.org"));
        assert!(!is_email("not-an-email"));
        assert!(!is_email("missing@domain"));
        assert!(!is_email("@example.com"));
        assert!(!is_email("two words@example.com"));
    }

    #[test]
    fn test_fingerprint16_stable() {
        let a = fingerprint16("john@example.com|2025-01-15");
        let b = fingerprint16("john@example.com|2025-01-15");
        let c = fingerprint16("john@example.com|2025-01-16");
        assert_eq!(a.len(), 16);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
