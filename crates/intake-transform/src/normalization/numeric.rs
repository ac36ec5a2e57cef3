//! Numeric normalization utilities.

/// Parses the leading integer run of a value (optional sign).
///
/// Returns `None` when the trimmed value does not start with digits.
pub fn parse_leading_int(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    let (sign, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1, &trimmed[1..]),
        Some(b'+') => (1, &trimmed[1..]),
        _ => (1, trimmed),
    };
    let end = rest
        .find(|ch: char| !ch.is_ascii_digit())
        .unwrap_or(rest.len());
    if end == 0 {
        return None;
    }
    // Overflowing runs are clamped rather than rejected.
    let magnitude = rest[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(sign * magnitude)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_leading_run() {
        assert_eq!(parse_leading_int("12 boxes"), Some(12));
        assert_eq!(parse_leading_int(" -3"), Some(-3));
        assert_eq!(parse_leading_int("+40kg"), Some(40));
    }

    #[test]
    fn rejects_non_numeric() {
        assert_eq!(parse_leading_int("about 12"), None);
        assert_eq!(parse_leading_int(""), None);
        assert_eq!(parse_leading_int("-"), None);
    }
}
