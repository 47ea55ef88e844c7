//! Error taxonomy shared by the matcher, solver, compiler and front-end.
//!
//! Every error is terminal for the call that produced it: nothing is retried
//! internally and no partial result is returned alongside an error.
//!
//! # Error Categories
//!
//! - **Syntax**: malformed character stream or an operator prefix that no
//!   operator completes.
//! - **UnsupportedOperation**: an operator applied to incompatible operand
//!   kinds while evaluating.
//! - **TypeMismatch**: the same condition detected on static types while compiling.
//! - **UnknownReference**: a name missing from the resolver or the local map.
//! - **MalformedExpression**: a structurally invalid token stream.

use crate::{String, format};
use core::fmt::Display;

pub type Result<T, E = Error> = core::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Malformed character stream (bad literal, unterminated string, ...).
    #[error("syntax error at offset {offset}: {message}")]
    Syntax { offset: usize, message: String },

    /// No operator in the table starts with this character.
    #[error("no operator starts with '{ch}'")]
    NoMatcherFound { ch: char },

    /// Operator applied to operand kinds it does not support.
    #[error("operator '{op}' cannot be applied to {operands}")]
    UnsupportedOperation { op: &'static str, operands: String },

    /// Operator applied to static types with no promotion rule.
    #[error("type mismatch: operator '{op}' cannot be applied to {operands}")]
    TypeMismatch { op: &'static str, operands: String },

    /// Name missing from the variable resolver or the local map.
    #[error("unknown reference '{name}'")]
    UnknownReference { name: String },

    /// Stack underflow, trailing tokens or nesting past the depth limit.
    #[error("malformed expression: {reason}")]
    MalformedExpression { reason: String },

    /// Integral division or remainder by zero.
    #[error("division by zero")]
    DivisionByZero,

    /// Local slot index does not fit the instruction operand.
    #[error("too many local variables (limit: 65535 slots)")]
    TooManyLocals,

    /// Constant pool index does not fit the instruction operand.
    #[error("too many constants (limit: 65535)")]
    TooManyConstants,
}

impl Error {
    pub fn syntax(offset: usize, message: impl Into<String>) -> Self {
        Error::Syntax {
            offset,
            message: message.into(),
        }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        Error::MalformedExpression {
            reason: reason.into(),
        }
    }

    pub fn unknown_reference(name: impl Into<String>) -> Self {
        Error::UnknownReference { name: name.into() }
    }

    pub(crate) fn unsupported_binary(op: &'static str, left: impl Display, right: impl Display) -> Self {
        Error::UnsupportedOperation {
            op,
            operands: format!("{} and {}", left, right),
        }
    }

    pub(crate) fn unsupported_unary(op: &'static str, operand: impl Display) -> Self {
        Error::UnsupportedOperation {
            op,
            operands: format!("{}", operand),
        }
    }

    pub(crate) fn mismatch_binary(op: &'static str, left: impl Display, right: impl Display) -> Self {
        Error::TypeMismatch {
            op,
            operands: format!("{} and {}", left, right),
        }
    }

    pub(crate) fn mismatch_unary(op: &'static str, operand: impl Display) -> Self {
        Error::TypeMismatch {
            op,
            operands: format!("{}", operand),
        }
    }

    /// Byte offset into the source, for errors raised by the front-end.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Error::Syntax { offset, .. } => Some(*offset),
            _ => None,
        }
    }
}
