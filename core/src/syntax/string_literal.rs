//! String literal escaping and unescaping.
//!
//! Converts between runtime strings (`hello` followed by a real newline) and
//! their double-quoted source form (`"hello\n"`).

use core::fmt;

use crate::String;

/// Errors that can occur when unescaping string literals. Positions are
/// byte offsets into the literal's content.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnescapeError {
    #[error("invalid escape sequence '\\{ch}'")]
    InvalidEscape { pos: usize, ch: char },

    #[error("invalid hex digit '{ch}' in unicode escape")]
    InvalidHexDigit { pos: usize, ch: char },

    #[error("incomplete unicode escape: expected 4 hex digits, got {got}")]
    IncompleteUnicodeEscape { pos: usize, got: usize },

    /// `\uD800`..`\uDFFF` on their own; surrogate pairs are not combined.
    #[error("invalid unicode scalar value U+{value:04X}")]
    InvalidUnicodeScalar { pos: usize, value: u32 },

    #[error("dangling backslash at end of string")]
    DanglingBackslash { pos: usize },
}

impl UnescapeError {
    pub fn pos(&self) -> usize {
        match self {
            UnescapeError::InvalidEscape { pos, .. }
            | UnescapeError::InvalidHexDigit { pos, .. }
            | UnescapeError::IncompleteUnicodeEscape { pos, .. }
            | UnescapeError::InvalidUnicodeScalar { pos, .. }
            | UnescapeError::DanglingBackslash { pos } => *pos,
        }
    }
}

/// Write `s` as a double-quoted literal.
///
/// Escapes `"`, `\`, newline, carriage return, tab and NUL by name and every
/// other control character as `\uNNNN`.
pub fn escape_string(f: &mut impl fmt::Write, s: &str) -> fmt::Result {
    f.write_char('"')?;
    for ch in s.chars() {
        match ch {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            '\0' => f.write_str("\\0")?,
            c if c.is_control() => write!(f, "\\u{:04x}", c as u32)?,
            c => f.write_char(c)?,
        }
    }
    f.write_char('"')
}

/// Unescape the content of a string literal (without the quotes).
///
/// Supports `\n \r \t \b \f \0 \\ \" \'` and `\uNNNN`.
pub fn unescape_string(input: &str) -> Result<String, UnescapeError> {
    // Fast path: nothing to unescape
    if !input.contains('\\') {
        return Ok(input.into());
    }

    let mut output = String::with_capacity(input.len());
    let mut chars = input.char_indices();

    while let Some((pos, ch)) = chars.next() {
        if ch != '\\' {
            output.push(ch);
            continue;
        }

        let unescaped = match chars.next() {
            Some((_, 'n')) => '\n',
            Some((_, 'r')) => '\r',
            Some((_, 't')) => '\t',
            Some((_, 'b')) => '\u{8}',
            Some((_, 'f')) => '\u{c}',
            Some((_, '0')) => '\0',
            Some((_, '\\')) => '\\',
            Some((_, '"')) => '"',
            Some((_, '\'')) => '\'',
            Some((_, 'u')) => {
                let mut value = 0u32;
                for got in 0..4 {
                    match chars.next() {
                        Some((hex_pos, ch)) => match ch.to_digit(16) {
                            Some(digit) => value = (value << 4) | digit,
                            None => {
                                return Err(UnescapeError::InvalidHexDigit { pos: hex_pos, ch });
                            }
                        },
                        None => return Err(UnescapeError::IncompleteUnicodeEscape { pos, got }),
                    }
                }
                char::from_u32(value)
                    .ok_or(UnescapeError::InvalidUnicodeScalar { pos, value })?
            }
            Some((_, ch)) => return Err(UnescapeError::InvalidEscape { pos, ch }),
            None => return Err(UnescapeError::DanglingBackslash { pos }),
        };
        output.push(unescaped);
    }

    Ok(output)
}
