//! Reference value parser.
//!
//! Stored values look like `"Sports News (id: 3f2a-09bc)"`: a display name,
//! optional whitespace, then `(id: <hex-and-dashes>)` closing the string.
//! A single trailing newline after the closing parenthesis is tolerated.

use std::sync::OnceLock;

use regex::Regex;

const REFERENCE_PATTERN: &str = r"^(.*?)\s*\(id:\s*([0-9a-fA-F\-]+)\)$";

/// A reference value split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReference {
    /// The full text the pattern matched.
    pub raw_match: String,
    /// Display name, trimmed.
    pub display_name: String,
    /// Identifier token: hex digits and dashes only.
    pub identifier: String,
}

fn reference_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(REFERENCE_PATTERN).expect("reference pattern is valid"))
}

/// Split a stored reference value. `None` means the value is malformed.
pub fn parse(raw: &str) -> Option<ParsedReference> {
    let text = raw.strip_suffix('\n').unwrap_or(raw);
    let caps = reference_regex().captures(text)?;
    Some(ParsedReference {
        raw_match: caps.get(0)?.as_str().to_string(),
        display_name: caps.get(1)?.as_str().trim().to_string(),
        identifier: caps.get(2)?.as_str().to_string(),
    })
}

/// Inverse of [`parse`] for a name and identifier.
pub fn format_reference(name: &str, identifier: &str) -> String {
    format!("{name} (id: {identifier})")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("News (id: abc-1)", "News", "abc-1")]
    #[case("Sports News (id: 3f2a09bc-1d2e-4f5a-8b9c-0123456789ab)", "Sports News", "3f2a09bc-1d2e-4f5a-8b9c-0123456789ab")]
    #[case("  Padded   (id: FF00)", "Padded", "FF00")]
    #[case("NoSpace(id: 12)", "NoSpace", "12")]
    #[case("Loose (id:42)", "Loose", "42")]
    #[case("Nested (beta) (id: 0e)", "Nested (beta)", "0e")]
    #[case("(id: dead-beef)", "", "dead-beef")]
    fn parses_well_formed_values(
        #[case] raw: &str,
        #[case] name: &str,
        #[case] identifier: &str,
    ) {
        let parsed = parse(raw).expect("should parse");
        assert_eq!(parsed.raw_match, raw);
        assert_eq!(parsed.display_name, name);
        assert_eq!(parsed.identifier, identifier);
    }

    #[rstest]
    #[case("")]
    #[case("News")]
    #[case("News (id: )")]
    #[case("News (id: xyz)")]
    #[case("News (id: abc-1) trailing")]
    #[case("News (ID: abc-1)")]
    #[case("News [id: abc-1]")]
    #[case("News (id: abc 1)")]
    #[case("News (id: abc-1)\n\n")]
    #[case("News (id: abc-1) \n")]
    fn rejects_malformed_values(#[case] raw: &str) {
        assert_eq!(parse(raw), None, "{raw:?} should not parse");
    }

    #[test]
    fn single_trailing_newline_is_tolerated() {
        let parsed = parse("News (id: ab)\n").expect("should parse");
        assert_eq!(parsed.raw_match, "News (id: ab)");
        assert_eq!(parsed.display_name, "News");
        assert_eq!(parsed.identifier, "ab");
    }

    #[test]
    fn format_then_parse_recovers_parts() {
        let value = format_reference("Sports", "abc-1");
        assert_eq!(value, "Sports (id: abc-1)");
        let parsed = parse(&value).expect("parse");
        assert_eq!(parsed.display_name, "Sports");
        assert_eq!(parsed.identifier, "abc-1");
    }
}
