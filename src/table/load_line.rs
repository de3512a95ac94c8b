//! Parsing of `key, value` lines from load files.

use crate::common::{Error, Result};

/// Split a load line into its integer key and string value.
///
/// The key is a leading (optionally signed) integer; non-digit text after it
/// is ignored up to the comma, and a key with no digits parses as 0. The
/// value may be wrapped in `'` or `"`, in which case it ends at the matching
/// quote; otherwise it runs to the end of the line.
///
/// # Errors
/// Returns `Error::InvalidLoadLine` if the line has no comma.
pub fn parse_load_line(line: &str) -> Result<(i32, String)> {
    let line = line.trim_end_matches(['\r', '\n']);
    let rest = line.trim_start_matches([' ', '\t']);
    let key = leading_int(rest);

    let (_, after_comma) = rest
        .split_once(',')
        .ok_or_else(|| Error::InvalidLoadLine(line.to_string()))?;
    let value = after_comma.trim_start_matches([' ', '\t']);

    let value = match value.chars().next() {
        Some(quote @ ('\'' | '"')) => {
            let inner = &value[1..];
            match inner.find(quote) {
                Some(end) => &inner[..end],
                None => inner,
            }
        }
        _ => value,
    };
    Ok((key, value.to_string()))
}

/// Lenient integer prefix: optional sign then digits, saturating at the
/// `i32` range.
fn leading_int(s: &str) -> i32 {
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let magnitude = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |acc, d| (acc * 10 + i64::from(d - b'0')).min(i64::from(i32::MAX) + 1));
    let signed = if negative { -magnitude } else { magnitude };
    signed.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_values() {
        assert_eq!(parse_load_line("272,'Baby Take a Bow'").unwrap(), (272, "Baby Take a Bow".into()));
        assert_eq!(parse_load_line("  3 , \"Up\" trailing").unwrap(), (3, "Up".into()));
        assert_eq!(parse_load_line("4,'it''s'").unwrap(), (4, "it".into()));
    }

    #[test]
    fn test_unquoted_value_runs_to_end() {
        assert_eq!(parse_load_line("\t9,  plain text \r\n").unwrap(), (9, "plain text ".into()));
    }

    #[test]
    fn test_empty_value() {
        assert_eq!(parse_load_line("12,").unwrap(), (12, String::new()));
        assert_eq!(parse_load_line("12,   ").unwrap(), (12, String::new()));
        assert_eq!(parse_load_line("12,'unterminated").unwrap(), (12, "unterminated".into()));
    }

    #[test]
    fn test_key_parsing() {
        assert_eq!(parse_load_line("-17,x").unwrap().0, -17);
        assert_eq!(parse_load_line("abc,x").unwrap().0, 0);
        assert_eq!(parse_load_line("99999999999,x").unwrap().0, i32::MAX);
        assert_eq!(parse_load_line("-99999999999,x").unwrap().0, i32::MIN);
    }

    #[test]
    fn test_missing_comma() {
        assert!(matches!(parse_load_line("42 no comma"), Err(Error::InvalidLoadLine(_))));
    }
}
