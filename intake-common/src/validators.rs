//! Contact field validators
//!
//! Pure predicates gating writes. Input must already be in its final form:
//! no trimming, no case folding, no country-code stripping.

use once_cell::sync::Lazy;
use regex::Regex;

/// `local@domain.tld` shape: non-empty local part, one `@`, dotted domain
static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

/// Ten ASCII digits, leading digit 6-9 (Indian mobile numbers)
static PHONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[6-9][0-9]{9}$").expect("phone pattern is valid"));

/// True iff `s` has the `local@domain.tld` shape
pub fn validate_email(s: &str) -> bool {
    EMAIL_PATTERN.is_match(s)
}

/// True iff `s` is a 10-digit Indian mobile number
pub fn validate_phone(s: &str) -> bool {
    PHONE_PATTERN.is_match(s)
}
