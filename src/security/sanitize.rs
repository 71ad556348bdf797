//! Query validation and cleaning.
//!
//! Only generic hygiene happens here: markup tags, control characters and
//! encoding debris are stripped and the result is form-encoded. Whether the
//! query actually looks like an email or phone number is the presentation
//! layer's business.

use thiserror::Error;
use url::form_urlencoded;

use crate::lookup::{SearchKind, SearchRequest};

/// Why a query was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("type or query is empty")]
    Empty,
    #[error("unsupported search type '{0}'")]
    InvalidType(String),
}

/// Validate the raw form fields and produce an upstream-ready request.
pub fn validate(kind: &str, raw_query: &str) -> Result<SearchRequest, Rejection> {
    if kind.trim().is_empty() || raw_query.trim().is_empty() {
        return Err(Rejection::Empty);
    }
    let kind: SearchKind = kind
        .parse()
        .map_err(|_| Rejection::InvalidType(kind.to_string()))?;

    let cleaned_query = clean(raw_query);
    if cleaned_query.is_empty() {
        return Err(Rejection::Empty);
    }
    let encoded_query = encode(&cleaned_query);

    Ok(SearchRequest {
        kind,
        cleaned_query,
        encoded_query,
    })
}

/// Strip tags, control characters and encoding artifacts, then trim.
pub fn clean(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_tag = false;
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            // A `<` followed by whitespace or nothing is literal text, not a tag.
            '<' if !in_tag && chars.peek().is_some_and(|next| !next.is_whitespace()) => {
                in_tag = true
            }
            '>' if in_tag => in_tag = false,
            _ if in_tag => {}
            c if is_artifact(c) => {}
            c => out.push(c),
        }
    }

    out.trim().to_string()
}

fn is_artifact(c: char) -> bool {
    c.is_control()
        || matches!(
            c,
            '\u{FEFF}' // byte-order mark
                | '\u{FFFD}' // replacement character
                | '\u{200B}'..='\u{200D}' // zero-width space / joiners
                | '\u{2060}' // word joiner
                | '\u{2028}' | '\u{2029}' // line / paragraph separators
        )
}

/// `application/x-www-form-urlencoded` encoding (space becomes `+`).
pub fn encode(cleaned: &str) -> String {
    form_urlencoded::byte_serialize(cleaned.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_is_encoded() {
        let req = validate("email", "a@b.com").unwrap();
        assert_eq!(req.kind, SearchKind::Email);
        assert_eq!(req.cleaned_query, "a@b.com");
        assert_eq!(req.encoded_query, "a%40b.com");
    }

    #[test]
    fn test_rejects_unknown_type() {
        assert_eq!(
            validate("sql", "x"),
            Err(Rejection::InvalidType("sql".to_string()))
        );
    }

    #[test]
    fn test_rejects_empty_inputs() {
        assert_eq!(validate("email", "   "), Err(Rejection::Empty));
        assert_eq!(validate("", "a@b.com"), Err(Rejection::Empty));
        // Non-empty before cleaning, empty after.
        assert_eq!(validate("username", "<b></b>\u{0}\t"), Err(Rejection::Empty));
    }

    #[test]
    fn test_missing_checked_before_type() {
        assert_eq!(validate("sql", ""), Err(Rejection::Empty));
    }

    #[test]
    fn test_strips_tags_and_controls() {
        assert_eq!(clean("  <script>alert(1)</script>bob\r\n"), "alert(1)bob");
        assert_eq!(clean("ali\u{200B}ce\u{FEFF}"), "alice");
        assert_eq!(clean("a\u{0}b\u{7f}c"), "abc");
    }

    #[test]
    fn test_lone_angle_bracket_kept() {
        assert_eq!(clean("a < b"), "a < b");
        assert_eq!(clean("x <"), "x <");
        assert_eq!(clean("1 < 2 and <i>3</i> > 0"), "1 < 2 and 3 > 0");
        let req = validate("username", "< bob").unwrap();
        assert_eq!(req.cleaned_query, "< bob");
        assert_eq!(req.encoded_query, "%3C+bob");
    }

    #[test]
    fn test_no_format_enforcement() {
        let req = validate("phone", "not a phone").unwrap();
        assert_eq!(req.encoded_query, "not+a+phone");
    }

    #[test]
    fn test_reserved_characters_encoded() {
        assert_eq!(encode("a&b=c#d?e/f"), "a%26b%3Dc%23d%3Fe%2Ff");
        assert_eq!(encode("+15551234567"), "%2B15551234567");
        assert_eq!(encode("example.com"), "example.com");
    }
}
