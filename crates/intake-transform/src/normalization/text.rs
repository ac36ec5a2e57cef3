//! Text normalization utilities.

/// Trims surrounding whitespace.
pub fn trim(value: &str) -> String {
    value.trim().to_string()
}

/// Capitalizes the first letter of each whitespace-separated token and
/// lowercases the rest. Tokens are re-joined with a single space.
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for token in value.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        let mut chars = token.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            for ch in chars {
                out.extend(ch.to_lowercase());
            }
        }
    }
    out
}

pub fn lower_case(value: &str) -> String {
    value.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_case_collapses_whitespace() {
        assert_eq!(title_case("  acme   CORP  "), "Acme Corp");
        assert_eq!(title_case("o'neil traders"), "O'neil Traders");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn lower_case_trims() {
        assert_eq!(lower_case("  Sales@Acme.COM "), "sales@acme.com");
    }
}
