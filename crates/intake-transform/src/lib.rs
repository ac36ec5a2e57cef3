//! Transform library for lead intake.
//!
//! Every transform is a pure function from an optional raw cell to a
//! normalized string. Absent input is treated like an empty cell.

pub mod normalization;

pub use normalization::{
    PHONE_KEY_DIGITS, lower_case, normalize_phone, parse_leading_int, title_case, trim,
};

use intake_model::TransformKind;

/// Applies a named transform to a raw value.
///
/// `parseInt` yields `"0"` for non-numeric or absent input; quantity fields
/// default to zero rather than failing validation.
pub fn apply(kind: TransformKind, raw: Option<&str>) -> String {
    let value = raw.unwrap_or("");
    match kind {
        TransformKind::None => trim(value),
        TransformKind::TitleCase => title_case(value),
        TransformKind::LowerCase => lower_case(value),
        TransformKind::NormalizePhone => normalize_phone(value),
        TransformKind::ParseInt => parse_leading_int(value).unwrap_or(0).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_input_is_empty_except_parse_int() {
        for kind in TransformKind::ALL {
            let expected = if kind == TransformKind::ParseInt { "0" } else { "" };
            assert_eq!(apply(kind, None), expected, "{kind}");
        }
    }
}
