//! Helpers for decimal-string amounts.
//!
//! Amounts travel as base-10 strings of arbitrary precision. An empty
//! string means zero.

use num_bigint::{BigInt, BigUint};
use num_traits::Zero;

/// Returns `true` if the amount is empty or numerically zero.
///
/// A non-empty string that does not parse as a base-10 integer is reported
/// as *not* zero. Callers that need to distinguish garbage from real
/// amounts should use [`parse_amount`].
pub fn is_zero_amount(amount: &str) -> bool {
    if amount.is_empty() {
        return true;
    }

    match parse_amount(amount) {
        Some(value) => value.is_zero(),
        None => false,
    }
}

/// Negation of [`is_zero_amount`].
pub fn is_non_zero_amount(amount: &str) -> bool {
    !is_zero_amount(amount)
}

/// Parse a signed base-10 amount.
///
/// Accepts an optional single sign followed by ASCII digits only; digit
/// separators such as `_` are rejected.
pub fn parse_amount(amount: &str) -> Option<BigInt> {
    let digits = amount.strip_prefix(['-', '+']).unwrap_or(amount);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    amount.parse::<BigInt>().ok()
}

/// Exact product of two `u64` values.
pub fn multiply_unsigned(a: u64, b: u64) -> BigUint {
    BigUint::from(a) * BigUint::from(b)
}

/// Unsigned magnitude of a decimal amount.
///
/// Strips leading sign characters and maps the empty amount to `"0"`.
pub fn magnitude_of_amount(amount: &str) -> String {
    let magnitude = amount.trim_start_matches(['-', '+']);
    if magnitude.is_empty() {
        "0".to_string()
    } else {
        magnitude.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_zero_amount() {
        assert!(is_zero_amount(""));
        assert!(is_zero_amount("0"));
        assert!(is_zero_amount("-0"));
        assert!(is_zero_amount("000"));
        assert!(!is_zero_amount("5"));
        assert!(!is_zero_amount("-5"));
    }

    // Test critique: une chaîne invalide n'est PAS considérée comme zéro
    // Comportement permissif hérité des indexeurs, à ne pas "corriger"
    #[test]
    fn test_unparsable_amount_is_not_zero() {
        assert!(!is_zero_amount("abc"));
        assert!(is_non_zero_amount("abc"));
        assert!(parse_amount("abc").is_none());
    }

    // Test critique: les séparateurs `_` ne sont pas des chiffres décimaux
    #[test]
    fn test_digit_separators_are_rejected() {
        assert!(parse_amount("1_000").is_none());
        assert!(parse_amount("_1").is_none());
        assert!(parse_amount("0_0").is_none());
        assert!(!is_zero_amount("0_0"));
        assert!(!is_zero_amount("0_"));
        assert!(is_non_zero_amount("1_000"));
    }

    #[test]
    fn test_sign_handling() {
        assert_eq!(parse_amount("+7"), Some(BigInt::from(7)));
        assert_eq!(parse_amount("-7"), Some(BigInt::from(-7)));
        assert!(parse_amount("--7").is_none());
        assert!(parse_amount("-").is_none());
        assert!(parse_amount(" 7").is_none());
    }

    #[test]
    fn test_large_amounts() {
        // Au-delà de u128
        let huge = "1000000000000000000000000000000000000000000";
        assert!(is_non_zero_amount(huge));
        assert_eq!(parse_amount(huge).unwrap().to_string(), huge);
    }

    #[test]
    fn test_multiply_unsigned() {
        assert_eq!(
            multiply_unsigned(50000, 1_000_000_000).to_string(),
            "50000000000000"
        );
        // Pas d'overflow à la limite 64 bits
        assert_eq!(
            multiply_unsigned(u64::MAX, u64::MAX).to_string(),
            "340282366920938463426481119284349108225"
        );
        assert_eq!(multiply_unsigned(0, u64::MAX).to_string(), "0");
    }

    #[test]
    fn test_magnitude_of_amount() {
        assert_eq!(magnitude_of_amount("-42"), "42");
        assert_eq!(magnitude_of_amount("42"), "42");
        assert_eq!(magnitude_of_amount(""), "0");
        assert_eq!(magnitude_of_amount("-"), "0");
    }
}
