//! Argument parsing utilities.
//!
//! Numbers follow the usual command line conventions: `0x` prefix for hex,
//! a leading `0` for octal, decimal otherwise. A value that does not fit the
//! requested width is rejected, never truncated.

/// Error type for parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid number: {0}")]
    InvalidNumber(String),

    #[error("number out of range: {0}")]
    OutOfRange(String),
}

pub type Result<T> = std::result::Result<T, ParseError>;

/// Parse a u8 from string.
pub fn get_u8(s: &str) -> Result<u8> {
    parse_int(s)
}

/// Parse a u16 from string.
pub fn get_u16(s: &str) -> Result<u16> {
    parse_int(s)
}

/// Parse a u32 from string.
pub fn get_u32(s: &str) -> Result<u32> {
    parse_int(s)
}

/// Parse an i32 from string, decimal only.
pub fn get_i32(s: &str) -> Result<i32> {
    s.parse()
        .map_err(|e| ParseError::InvalidNumber(format!("{s}: {e}")))
}

/// Whether `arg` abbreviates `keyword`, i.e. is a non-empty prefix of it.
///
/// Callers test keywords in a fixed order, so an ambiguous abbreviation
/// picks the first keyword it matches.
pub fn matches(arg: &str, keyword: &str) -> bool {
    !arg.is_empty() && keyword.starts_with(arg)
}

fn parse_int<T: TryFrom<u64>>(s: &str) -> Result<T> {
    let (digits, radix) = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        (hex, 16)
    } else if s.len() > 1 && s.starts_with('0') {
        (&s[1..], 8)
    } else {
        (s, 10)
    };

    // from_str_radix accepts a leading '+', which is not a number here.
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(ParseError::InvalidNumber(s.to_string()));
    }
    let value = u64::from_str_radix(digits, radix)
        .map_err(|_| ParseError::OutOfRange(s.to_string()))?;
    T::try_from(value).map_err(|_| ParseError::OutOfRange(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_u32() {
        assert_eq!(get_u32("123").unwrap(), 123);
        assert_eq!(get_u32("0x1a").unwrap(), 26);
        assert_eq!(get_u32("0777").unwrap(), 511);
        assert_eq!(get_u32("0").unwrap(), 0);
    }

    #[test]
    fn test_width_checked() {
        assert_eq!(get_u8("255").unwrap(), 255);
        assert!(matches!(get_u8("256"), Err(ParseError::OutOfRange(_))));
        assert_eq!(get_u16("0xffff").unwrap(), 0xffff);
        assert!(matches!(get_u16("65536"), Err(ParseError::OutOfRange(_))));
        assert!(get_u32("4294967296").is_err());
    }

    #[test]
    fn test_rejects_garbage() {
        for input in ["", "abc", "-1", "+5", "0x", "089", "1.5", " 7"] {
            assert!(get_u32(input).is_err(), "{input:?} should be rejected");
        }
    }

    #[test]
    fn test_matches() {
        assert!(matches("hair", "hairpin"));
        assert!(matches("hairpin", "hairpin"));
        assert!(matches("-", "-6"));
        assert!(!matches("", "hairpin"));
        assert!(!matches("hairpins", "hairpin"));
        assert!(!matches("Hair", "hairpin"));
    }

    #[test]
    fn test_get_i32() {
        assert_eq!(get_i32("-1").unwrap(), -1);
        assert!(get_i32("fd").is_err());
    }
}
