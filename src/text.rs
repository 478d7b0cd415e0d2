//! Normalization and matching of text read from the page.

use crate::{Error, Result};
use regex::Regex;
use std::fmt;

/// Non-breaking space, used by the storefront inside prices.
pub const NBSP: char = '\u{00A0}';

/// Replace non-breaking spaces with plain spaces and trim.
///
/// Idempotent: `normalize(&normalize(s)) == normalize(s)`.
pub fn normalize(raw: &str) -> String {
    raw.replace(NBSP, " ").trim().to_string()
}

/// Normalize `raw`, failing with [`Error::ContentAbsent`] when there is none.
pub fn require_text(field: &str, raw: Option<String>) -> Result<String> {
    match raw {
        Some(s) => Ok(normalize(&s)),
        None => Err(Error::ContentAbsent(field.to_string())),
    }
}

/// Parse a displayed amount such as `"1\u{A0}234"`, `"112,90 €"` or
/// `"1.234,50 €"` into its integer part.
///
/// A `,` or `.` followed by exactly three digits groups thousands. The last
/// separator followed by at most two digits is the decimal point.
pub fn parse_amount(field: &str, raw: &str) -> Result<i64> {
    let parse_err = || Error::Parse {
        field: field.to_string(),
        value: raw.to_string(),
    };
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());

    let compact: String = normalize(raw)
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    let compact = compact.trim_matches(|c| matches!(c, '€' | '$' | '£'));

    let integer = match compact.rfind([',', '.']) {
        Some(i) if compact.len() - i <= 3 => {
            if !all_digits(&compact[i + 1..]) {
                return Err(parse_err());
            }
            &compact[..i]
        }
        _ => compact,
    };

    let mut groups = integer.split([',', '.']);
    let head = groups.next().unwrap_or_default();
    let (sign, head) = match head.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", head),
    };
    let mut digits = format!("{}{}", sign, head);
    for group in groups {
        if group.len() != 3 || !all_digits(group) {
            return Err(parse_err());
        }
        digits.push_str(group);
    }

    if head.is_empty() || !all_digits(head) {
        return Err(parse_err());
    }
    digits.parse().map_err(|_| parse_err())
}

/// Collapse runs of whitespace to one space, as the page renders them.
pub fn collapse_whitespace(raw: &str) -> String {
    normalize(raw).split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Expected text for an assertion.
#[derive(Debug, Clone)]
pub enum TextMatch {
    Exact(String),
    Contains(String),
    Pattern(Regex),
}

impl TextMatch {
    pub fn pattern(source: &str) -> Result<Self> {
        Regex::new(source)
            .map(TextMatch::Pattern)
            .map_err(|e| Error::Config(format!("invalid text pattern '{}': {}", source, e)))
    }

    /// Match against page text after whitespace collapsing.
    pub fn matches(&self, actual: &str) -> bool {
        let actual = collapse_whitespace(actual);
        match self {
            TextMatch::Exact(expected) => actual == collapse_whitespace(expected),
            TextMatch::Contains(expected) => actual.contains(&collapse_whitespace(expected)),
            TextMatch::Pattern(re) => re.is_match(&actual),
        }
    }
}

impl fmt::Display for TextMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextMatch::Exact(s) => write!(f, "text '{}'", s),
            TextMatch::Contains(s) => write!(f, "text containing '{}'", s),
            TextMatch::Pattern(re) => write!(f, "text matching /{}/", re.as_str()),
        }
    }
}

impl From<&str> for TextMatch {
    fn from(s: &str) -> Self {
        TextMatch::Exact(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_nbsp_and_trims() {
        assert_eq!(normalize("  12,90\u{A0}€ \n"), "12,90 €");
    }

    #[test]
    fn normalize_is_idempotent() {
        for raw in ["12,90\u{A0}€", "  Pyjama long  ", "", "\u{A0}\u{A0}", "1\u{A0}234"] {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn require_text_reports_absent_content() {
        assert!(matches!(
            require_text("cart price", None),
            Err(Error::ContentAbsent(f)) if f == "cart price"
        ));
        assert_eq!(
            require_text("cart price", Some(" 9,99\u{A0}€".into())).unwrap(),
            "9,99 €"
        );
    }

    #[test]
    fn parse_amount_handles_grouping() {
        assert_eq!(normalize("1\u{A0}234"), "1 234");
        assert_eq!(parse_amount("cart amount", "1\u{A0}234").unwrap(), 1234);
    }

    #[test]
    fn parse_amount_takes_integer_part() {
        assert_eq!(parse_amount("cart amount", "112,90 €").unwrap(), 112);
        assert_eq!(parse_amount("cart amount", "€45.00").unwrap(), 45);
        assert_eq!(parse_amount("cart amount", "80").unwrap(), 80);
        assert_eq!(parse_amount("cart amount", "99,").unwrap(), 99);
    }

    #[test]
    fn parse_amount_reads_separator_grouping() {
        assert_eq!(parse_amount("cart amount", "1.234,50 €").unwrap(), 1234);
        assert_eq!(parse_amount("cart amount", "12.345,00\u{A0}€").unwrap(), 12345);
        assert_eq!(parse_amount("cart amount", "1.234 €").unwrap(), 1234);
        assert_eq!(parse_amount("cart amount", "€1,234.56").unwrap(), 1234);
        assert_eq!(parse_amount("cart amount", "1.234.567,8").unwrap(), 1234567);
    }

    #[test]
    fn parse_amount_rejects_malformed_grouping() {
        for raw in ["1.23.4,50", "12,3456", "1.2,00", ",50", "1,5x"] {
            assert!(
                matches!(parse_amount("cart amount", raw), Err(Error::Parse { .. })),
                "{raw}"
            );
        }
    }

    #[test]
    fn parse_amount_rejects_non_numeric() {
        for bad in ["abc", "", "€", ",50", "12a"] {
            let err = parse_amount("cart amount", bad).unwrap_err();
            assert!(
                matches!(err, Error::Parse { ref value, .. } if value == bad),
                "{bad}: {err}"
            );
        }
    }

    #[test]
    fn text_match_exact_collapses_whitespace() {
        let m = TextMatch::from("Carte cadeau Kiabi");
        assert!(m.matches("  Carte\u{A0}cadeau\n Kiabi "));
        assert!(!m.matches("Carte cadeau"));
    }

    #[test]
    fn text_match_pattern() {
        let m = TextMatch::pattern("Carte bancaire|Tarjeta de crédito").unwrap();
        assert!(m.matches("Tarjeta de crédito"));
        assert!(!m.matches("Paypal"));
        assert!(TextMatch::pattern("(").is_err());
    }

    #[test]
    fn text_match_contains() {
        let m = TextMatch::Contains("Paypal".into());
        assert!(m.matches("Payer avec Paypal"));
        assert_eq!(m.to_string(), "text containing 'Paypal'");
    }
}
