//! On-demand lexer over a source string.
//!
//! The parser asks for one lexeme at a time and says what it expects: an
//! operand, or an operator from a given table. The same characters can
//! therefore lex as a prefix or an infix operator depending on position.
//!
//! Offsets are byte offsets into the source. Outside string literals only
//! ASCII is accepted.

use crate::{
    Error, Result, ToString,
    operand::Constant,
    operators::OperatorTable,
    format,
    syntax::string_literal::unescape_string,
};

pub struct Lexer<'s> {
    source: &'s str,
    pos: usize,
}

impl<'s> Lexer<'s> {
    pub fn new(source: &'s str) -> Self {
        Self { source, pos: 0 }
    }

    pub fn source(&self) -> &'s str {
        self.source
    }

    pub fn offset(&self) -> usize {
        self.pos
    }

    /// Move back to an offset previously returned by [`Lexer::offset`].
    pub fn reset(&mut self, offset: usize) {
        debug_assert!(offset <= self.source.len());
        self.pos = offset;
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn peek_byte(&self, ahead: usize) -> Option<u8> {
        self.source.as_bytes().get(self.pos + ahead).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    /// Consume `ch` if it is next.
    pub fn eat(&mut self, ch: char) -> bool {
        if self.peek() == Some(ch) {
            self.pos += ch.len_utf8();
            true
        } else {
            false
        }
    }

    pub fn skip_whitespace(&mut self) {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.peek_byte(0) {
            self.pos += 1;
        }
    }

    /// Error for the character at the current position.
    pub fn unexpected(&self, expected: &str) -> Error {
        match self.peek() {
            None => Error::syntax(self.pos, format!("expected {}, found end of input", expected)),
            Some(ch) if !ch.is_ascii() => Error::syntax(
                self.pos,
                format!("non-ASCII character '{}' outside a string literal", ch),
            ),
            Some(ch) => Error::syntax(self.pos, format!("expected {}, found '{}'", expected, ch)),
        }
    }

    // ========================================================================
    // Operators
    // ========================================================================

    /// Lex the longest operator from `table` starting here.
    ///
    /// Returns `None` without consuming anything if no operator in the table
    /// starts with the next character.
    pub fn operator<T: Copy>(&mut self, table: &OperatorTable<T>) -> Result<Option<T>> {
        let start = self.pos;
        let Some(first) = self.peek() else {
            return Ok(None);
        };
        if !table.starts_operator(first) {
            return Ok(None);
        }

        let mut matcher = table.start(first)?;
        self.bump();
        while let Some(next) = self.peek() {
            if !matcher.has_next(next) {
                break;
            }
            matcher.consume(next);
            self.bump();
        }

        match matcher.complete() {
            Some(op) => Ok(Some(op)),
            None => Err(Error::syntax(
                start,
                format!("incomplete operator '{}'", &self.source[start..self.pos]),
            )),
        }
    }

    // ========================================================================
    // Operands
    // ========================================================================

    pub fn starts_identifier(&self) -> bool {
        matches!(self.peek_byte(0), Some(b'a'..=b'z' | b'A'..=b'Z' | b'_' | b'$'))
    }

    pub fn identifier(&mut self) -> Option<&'s str> {
        if !self.starts_identifier() {
            return None;
        }
        let start = self.pos;
        while let Some(b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_' | b'$') = self.peek_byte(0) {
            self.pos += 1;
        }
        Some(&self.source[start..self.pos])
    }

    pub fn starts_number(&self) -> bool {
        match self.peek_byte(0) {
            Some(b'0'..=b'9') => true,
            Some(b'.') => matches!(self.peek_byte(1), Some(b'0'..=b'9')),
            _ => false,
        }
    }

    /// Lex a numeric literal. `negative` folds a directly preceding `-` into
    /// the literal, so the minimum int and long values can be written.
    ///
    /// Suffixes: `L` long, `F` float, `D` double. Without a suffix a literal
    /// with a fraction or exponent is a double, anything else an int.
    pub fn number(&mut self, negative: bool) -> Result<Constant> {
        let start = self.pos;

        if self.peek_byte(0) == Some(b'0') && matches!(self.peek_byte(1), Some(b'x' | b'X')) {
            return self.hex_number(start, negative);
        }

        let mut is_float = false;
        self.skip_digits();
        if self.peek_byte(0) == Some(b'.') && matches!(self.peek_byte(1), Some(b'0'..=b'9')) {
            is_float = true;
            self.pos += 1;
            self.skip_digits();
        }
        if let Some(b'e' | b'E') = self.peek_byte(0) {
            is_float = true;
            self.pos += 1;
            if let Some(b'+' | b'-') = self.peek_byte(0) {
                self.pos += 1;
            }
            if !matches!(self.peek_byte(0), Some(b'0'..=b'9')) {
                return Err(Error::syntax(self.pos, "exponent has no digits"));
            }
            self.skip_digits();
        }
        let text = &self.source[start..self.pos];

        let suffix = self.peek_byte(0);
        let value = match suffix {
            Some(b'L' | b'l') if !is_float => {
                self.pos += 1;
                Constant::Long(integral(text, negative, start)?)
            }
            Some(b'F' | b'f') => {
                self.pos += 1;
                let value: f32 = text.parse().map_err(|_| out_of_range(start))?;
                finite(if negative { -value } else { value }, value.is_finite(), start)?
            }
            Some(b'D' | b'd') => {
                self.pos += 1;
                let value: f64 = text.parse().map_err(|_| out_of_range(start))?;
                finite(if negative { -value } else { value }, value.is_finite(), start)?
            }
            _ if is_float => {
                let value: f64 = text.parse().map_err(|_| out_of_range(start))?;
                finite(if negative { -value } else { value }, value.is_finite(), start)?
            }
            _ => Constant::Int(integral(text, negative, start)?),
        };

        self.reject_trailing_identifier()?;
        Ok(value)
    }

    fn hex_number(&mut self, start: usize, negative: bool) -> Result<Constant> {
        self.pos += 2;
        let digits_start = self.pos;
        while let Some(b) = self.peek_byte(0) {
            if !b.is_ascii_hexdigit() {
                break;
            }
            self.pos += 1;
        }
        let digits = &self.source[digits_start..self.pos];
        if digits.is_empty() {
            return Err(Error::syntax(start, "hex literal has no digits"));
        }

        // Hex literals may use the full bit width: 0xFFFFFFFF is -1
        let value = if self.eat('L') || self.eat('l') {
            let bits = u64::from_str_radix(digits, 16).map_err(|_| out_of_range(start))?;
            let value = bits as i64;
            Constant::Long(if negative { value.wrapping_neg() } else { value })
        } else {
            let bits = u32::from_str_radix(digits, 16).map_err(|_| out_of_range(start))?;
            let value = bits as i32;
            Constant::Int(if negative { value.wrapping_neg() } else { value })
        };

        self.reject_trailing_identifier()?;
        Ok(value)
    }

    fn skip_digits(&mut self) {
        while let Some(b'0'..=b'9') = self.peek_byte(0) {
            self.pos += 1;
        }
    }

    fn reject_trailing_identifier(&self) -> Result<()> {
        if self.starts_identifier() || matches!(self.peek_byte(0), Some(b'0'..=b'9')) {
            return Err(Error::syntax(self.pos, "invalid character in numeric literal"));
        }
        Ok(())
    }

    /// Lex a double-quoted string literal.
    pub fn string(&mut self) -> Result<Constant> {
        let start = self.pos;
        if !self.eat('"') {
            return Err(self.unexpected("a string literal"));
        }
        let content_start = self.pos;

        loop {
            match self.bump() {
                None | Some('\n') => {
                    return Err(Error::syntax(start, "unterminated string literal"));
                }
                Some('\\') => {
                    // The escaped character cannot close the string
                    self.bump();
                }
                Some('"') => break,
                Some(_) => {}
            }
        }

        let content = &self.source[content_start..self.pos - 1];
        let value = unescape_string(content)
            .map_err(|e| Error::syntax(content_start + e.pos(), e.to_string()))?;
        Ok(Constant::Str(value))
    }
}

fn out_of_range(offset: usize) -> Error {
    Error::syntax(offset, "numeric literal out of range")
}

fn integral<T: TryFrom<i128>>(text: &str, negative: bool, offset: usize) -> Result<T> {
    let magnitude = u64::from_str_radix(text, 10).map_err(|_| out_of_range(offset))? as i128;
    let value = if negative { -magnitude } else { magnitude };
    T::try_from(value).map_err(|_| out_of_range(offset))
}

fn finite(value: impl Into<Constant>, is_finite: bool, offset: usize) -> Result<Constant> {
    if is_finite {
        Ok(value.into())
    } else {
        Err(out_of_range(offset))
    }
}
