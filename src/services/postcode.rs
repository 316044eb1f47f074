//! Best-effort Australian postcode handling: deriving a postcode from an
//! address and shaping postcode-only searches into a geocodable query.

use regex::Regex;
use std::sync::OnceLock;

fn postcode_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Word boundaries reject 4-digit runs embedded in longer numbers or
    // alphanumeric tokens (unit numbers, "Lot12345", ...).
    RE.get_or_init(|| Regex::new(r"\b(\d{4})\b").expect("Invalid regex pattern defined in code"))
}

/// First standalone 4-digit token in `address`, if any. Best-effort: an
/// address carrying another standalone 4-digit number can mismatch, and an
/// address without one yields None.
#[must_use]
pub fn derive_postcode(address: &str) -> Option<String> {
    postcode_regex()
        .captures(address)
        .map(|caps| caps[1].to_string())
}

/// Query string for geocoding a bare postcode, e.g. "3000, Australia".
#[must_use]
pub fn postcode_query(postcode: &str, country: &str) -> String {
    format!("{}, {}", postcode.trim(), country)
}

/// Australian postcodes are exactly 4 digits.
#[must_use]
pub fn is_plausible_postcode(postcode: &str) -> bool {
    postcode.len() == 4 && postcode.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_postcode_from_address() {
        assert_eq!(
            derive_postcode("12 Main St, Sydney NSW 2000"),
            Some("2000".to_string())
        );
    }

    #[test]
    fn no_four_digit_token_yields_none() {
        assert_eq!(derive_postcode("12 Main St, Sydney"), None);
        assert_eq!(derive_postcode(""), None);
    }

    #[test]
    fn rejects_tokens_embedded_in_longer_numbers() {
        assert_eq!(derive_postcode("Unit 12345, Sydney"), None);
        assert_eq!(derive_postcode("Lot A1234, Sydney"), None);
    }

    #[test]
    fn first_standalone_token_wins() {
        assert_eq!(
            derive_postcode("4000 Main St, Brisbane QLD 4001"),
            Some("4000".to_string())
        );
    }

    #[test]
    fn postcode_query_appends_country() {
        assert_eq!(postcode_query("3000", "Australia"), "3000, Australia");
        assert_eq!(postcode_query(" 2000 ", "Australia"), "2000, Australia");
    }

    #[test]
    fn plausible_postcode_is_four_digits() {
        assert!(is_plausible_postcode("2000"));
        assert!(!is_plausible_postcode("200"));
        assert!(!is_plausible_postcode("20000"));
        assert!(!is_plausible_postcode("2O00"));
    }
}
