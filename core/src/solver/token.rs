//! Tokens and the token stream shared by the solver and the compiler.

use core::fmt;

use crate::{
    Vec,
    operand::{Constant, Operand},
    operators::{BinaryOp, UnaryOp},
    syntax::escape_string,
};

/// The unit stored in a [`TokenStream`].
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Operand(Operand),
    Binary(BinaryOp),
    Unary(UnaryOp),
}

impl Token {
    /// Number of sub-expressions this token consumes.
    pub fn arity(&self) -> usize {
        match self {
            Token::Operand(_) => 0,
            Token::Unary(_) => 1,
            Token::Binary(_) => 2,
        }
    }
}

impl From<Operand> for Token {
    fn from(operand: Operand) -> Self {
        Token::Operand(operand)
    }
}

impl From<Constant> for Token {
    fn from(constant: Constant) -> Self {
        Token::Operand(Operand::Constant(constant))
    }
}

impl From<BinaryOp> for Token {
    fn from(op: BinaryOp) -> Self {
        Token::Binary(op)
    }
}

impl From<UnaryOp> for Token {
    fn from(op: UnaryOp) -> Self {
        Token::Unary(op)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Operand(Operand::Constant(Constant::Str(s))) => escape_string(f, s),
            Token::Operand(operand) => fmt::Display::fmt(operand, f),
            Token::Binary(op) => fmt::Display::fmt(op, f),
            Token::Unary(op) => write!(f, "{}u", op),
        }
    }
}

/// A stack of tokens.
///
/// Popping yields the expression in prefix order: an operator, then its
/// left sub-expression, then its right one. Producers therefore push the
/// prefix sequence back to front; [`TokenStream::from_prefix`] does that
/// for a sequence given front to back.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a stream from tokens listed in prefix order, e.g.
    /// `[+, 1, 2]` for `1 + 2`.
    pub fn from_prefix<I, T>(tokens: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Token>,
    {
        let mut tokens: Vec<Token> = tokens.into_iter().map(Into::into).collect();
        tokens.reverse();
        Self { tokens }
    }

    pub fn push(&mut self, token: impl Into<Token>) {
        self.tokens.push(token.into());
    }

    pub fn pop(&mut self) -> Option<Token> {
        self.tokens.pop()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Tokens in the order they will be popped.
    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter().rev()
    }
}

impl fmt::Display for TokenStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            fmt::Display::fmt(token, f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_from_prefix_pops_front_first() {
        let mut stream = TokenStream::from_prefix([
            Token::from(BinaryOp::Add),
            Token::from(Constant::Int(1)),
            Token::from(Constant::Int(2)),
        ]);
        assert_eq!(stream.len(), 3);
        assert_eq!(stream.pop(), Some(Token::Binary(BinaryOp::Add)));
        assert_eq!(stream.pop(), Some(Token::from(Constant::Int(1))));
        assert_eq!(stream.pop(), Some(Token::from(Constant::Int(2))));
        assert_eq!(stream.pop(), None);
    }

    #[test]
    fn test_display_prefix_form() {
        let stream = TokenStream::from_prefix([
            Token::from(BinaryOp::Mul),
            Token::from(UnaryOp::Neg),
            Token::from(Operand::reference("x")),
            Token::from(Constant::str("a b")),
        ]);
        assert_eq!(stream.to_string(), "* -u x \"a b\"");
    }
}
