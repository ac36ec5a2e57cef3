//! Phone number normalization.
//!
//! Phone numbers are compared on a fixed-width key: every non-digit is
//! stripped and, when more than [`PHONE_KEY_DIGITS`] digits remain, only the
//! trailing ones are kept. `+91 98765-43210`, `0091 9876543210` and
//! `98765 43210` all normalize to `9876543210`. Shorter numbers are kept as
//! they are. The result contains only ASCII digits, so the function is
//! idempotent.

/// Number of trailing digits that make up the comparable phone key.
pub const PHONE_KEY_DIGITS: usize = 10;

pub fn normalize_phone(value: &str) -> String {
    let digits: String = value.chars().filter(char::is_ascii_digit).collect();
    if digits.len() > PHONE_KEY_DIGITS {
        digits[digits.len() - PHONE_KEY_DIGITS..].to_string()
    } else {
        digits
    }
}
