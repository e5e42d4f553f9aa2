use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::{
    errors::errors::{Error, ErrorImpl},
    Position,
};

lazy_static! {
    static ref DECIMAL: Regex = Regex::new(r"^[0-9]+$").unwrap();
    static ref HEXADECIMAL: Regex = Regex::new(r"^0[xX]([0-9a-fA-F]+)$").unwrap();
    static ref CHARACTER: Regex =
        Regex::new(r#"^'(?:([^\\'])|\\([abtnvfr\\'"]))'$"#).unwrap();
    static ref STRING: Regex = Regex::new(r#"^"((?:[^"\\]|\\[abtnvfr\\'"])*)"$"#).unwrap();
    static ref ESCAPE: Regex = Regex::new(r#"\\([abtnvfr\\'"])"#).unwrap();
}

fn invalid(text: &str, position: Position) -> Error {
    Error::new(
        ErrorImpl::InvalidLiteral {
            literal: text.to_string(),
        },
        position,
    )
}

fn unescape(escape: char) -> char {
    match escape {
        'a' => '\x07',
        'b' => '\x08',
        't' => '\t',
        'n' => '\n',
        'v' => '\x0b',
        'f' => '\x0c',
        'r' => '\r',
        other => other,
    }
}

/// Parses decimal, `0x` hexadecimal or quoted character literal text into
/// its 32-bit value.
pub fn parse_int_literal(text: &str, position: Position) -> Result<u32, Error> {
    if DECIMAL.is_match(text) {
        return text.parse::<u32>().map_err(|_| invalid(text, position));
    }

    if let Some(captures) = HEXADECIMAL.captures(text) {
        return u32::from_str_radix(&captures[1], 16).map_err(|_| invalid(text, position));
    }

    if let Some(captures) = CHARACTER.captures(text) {
        let character = match (captures.get(1), captures.get(2)) {
            (Some(plain), _) => plain.as_str().chars().next(),
            (None, Some(escape)) => escape.as_str().chars().next().map(unescape),
            (None, None) => None,
        };

        return character
            .map(|character| character as u32)
            .ok_or_else(|| invalid(text, position));
    }

    Err(invalid(text, position))
}

/// Strips the quotes off lexed string literal text and decodes its escapes.
pub fn decode_string_literal(text: &str, position: Position) -> Result<String, Error> {
    let captures = STRING
        .captures(text)
        .ok_or_else(|| invalid(text, position))?;

    let decoded = ESCAPE.replace_all(&captures[1], |escape: &Captures| {
        let character = escape[1].chars().next().map(unescape).unwrap_or_default();
        character.to_string()
    });

    Ok(decoded.into_owned())
}
