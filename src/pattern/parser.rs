// Tue Jan 13 2026 - Alex

use crate::pattern::error::PatternError;
use crate::pattern::pattern::{Pattern, PatternElement};

/// Parse IDA-style signature text: whitespace-separated hex byte pairs and
/// `?` / `??` wildcards. Case-insensitive.
pub(crate) fn parse(text: &str) -> Result<Pattern, PatternError> {
    let mut elements = Vec::with_capacity(text.len() / 2);
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c.is_whitespace() {
            continue;
        }

        if c == '?' {
            elements.push(PatternElement::Wildcard);
            if chars.peek() == Some(&'?') {
                chars.next();
            }
            continue;
        }

        let high = hex_value(c).ok_or(PatternError::InvalidCharacter(c))?;
        let low = match chars.next() {
            Some(next) if next.is_ascii_hexdigit() => hex_value(next).unwrap_or(0),
            Some(next) if next.is_whitespace() => return Err(PatternError::IncompleteHexPair),
            Some(next) => return Err(PatternError::InvalidCharacter(next)),
            None => return Err(PatternError::IncompleteHexPair),
        };
        elements.push(PatternElement::Byte((high << 4) | low));
    }

    Ok(Pattern::new(elements))
}

fn hex_value(c: char) -> Option<u8> {
    c.to_digit(16).map(|v| v as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_bytes() {
        let pattern = parse("12 34 56").unwrap();
        assert_eq!(
            pattern.elements(),
            &[
                PatternElement::Byte(0x12),
                PatternElement::Byte(0x34),
                PatternElement::Byte(0x56),
            ]
        );
    }

    #[test]
    fn test_parse_wildcard_forms() {
        let single = parse("48 ? 8B").unwrap();
        let double = parse("48 ?? 8B").unwrap();
        assert_eq!(single, double);
        assert!(single.elements()[1].is_wildcard());
    }

    #[test]
    fn test_parse_adjacent_wildcards() {
        // "????" is two wildcard tokens, not four.
        let pattern = parse("????").unwrap();
        assert_eq!(pattern.len(), 2);
        assert!(pattern.elements().iter().all(|e| e.is_wildcard()));
    }

    #[test]
    fn test_parse_case_insensitive() {
        let lower = parse("ab cd ef").unwrap();
        let upper = parse("AB CD EF").unwrap();
        assert_eq!(lower, upper);
    }

    #[test]
    fn test_parse_empty_is_valid() {
        let pattern = parse("").unwrap();
        assert!(pattern.is_empty());
        let blank = parse("   ").unwrap();
        assert!(blank.is_empty());
    }

    #[test]
    fn test_parse_invalid_character() {
        assert_eq!(
            parse("12 3G 56"),
            Err(PatternError::InvalidCharacter('G'))
        );
        assert_eq!(parse("zz"), Err(PatternError::InvalidCharacter('z')));
    }

    #[test]
    fn test_parse_lone_hex_digit() {
        assert_eq!(parse("12 3"), Err(PatternError::IncompleteHexPair));
        assert_eq!(parse("12 3 4"), Err(PatternError::IncompleteHexPair));
    }
}
