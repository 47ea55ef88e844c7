//! Evaluation rules: how constants combine under each operator.

use super::{
    Constant,
    number::{self, Number},
};
use crate::{
    Error, Result,
    format,
    operators::{BinaryOp, UnaryOp},
};

impl Constant {
    /// Apply a binary operator with `self` as the left operand.
    ///
    /// Member selection is not handled here: its right operand is a name,
    /// not a value (see [`Constant::select`]).
    pub fn apply(&self, other: &Constant, op: BinaryOp) -> Result<Constant> {
        let unsupported = || Error::unsupported_binary(op.symbol(), self.kind(), other.kind());

        match op {
            BinaryOp::Add if self.is_string() || other.is_string() => {
                Ok(Constant::Str(format!("{}{}", self, other)))
            }
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => {
                let (l, r) = self.numbers(other).ok_or_else(unsupported)?;
                number::arithmetic(op, l, r).map(Constant::from)
            }
            BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor => {
                if let (Constant::Boolean(l), Constant::Boolean(r)) = (self, other) {
                    return Ok(Constant::Boolean(match op {
                        BinaryOp::BitAnd => l & r,
                        BinaryOp::BitOr => l | r,
                        _ => l ^ r,
                    }));
                }
                let (l, r) = self.numbers(other).ok_or_else(unsupported)?;
                number::bitwise(op, l, r)
                    .map(Constant::from)
                    .ok_or_else(unsupported)
            }
            BinaryOp::Shl | BinaryOp::Shr | BinaryOp::UShr => {
                let (l, r) = self.numbers(other).ok_or_else(unsupported)?;
                number::shift(op, l, r)
                    .map(Constant::from)
                    .ok_or_else(unsupported)
            }
            BinaryOp::And | BinaryOp::Or => match (self, other) {
                (Constant::Boolean(l), Constant::Boolean(r)) => Ok(Constant::Boolean(
                    if op == BinaryOp::And { *l && *r } else { *l || *r },
                )),
                _ => Err(unsupported()),
            },
            BinaryOp::Eq | BinaryOp::Ne => {
                let equal = self.equals(other).ok_or_else(unsupported)?;
                Ok(Constant::Boolean(equal == (op == BinaryOp::Eq)))
            }
            BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge => {
                let (l, r) = self.numbers(other).ok_or_else(unsupported)?;
                Ok(Constant::Boolean(number::compare(op, l, r)))
            }
            BinaryOp::Member => Err(unsupported()),
        }
    }

    /// Apply a prefix operator.
    pub fn apply_unary(&self, op: UnaryOp) -> Result<Constant> {
        let unsupported = || Error::unsupported_unary(op.symbol(), self.kind());

        match (op, self) {
            (UnaryOp::Neg, Constant::Int(v)) => Ok(Constant::Int(v.wrapping_neg())),
            (UnaryOp::Neg, Constant::Long(v)) => Ok(Constant::Long(v.wrapping_neg())),
            (UnaryOp::Neg, Constant::Float(v)) => Ok(Constant::Float(-v)),
            (UnaryOp::Neg, Constant::Double(v)) => Ok(Constant::Double(-v)),
            (UnaryOp::Plus, c) if c.is_number() => Ok(c.clone()),
            (UnaryOp::Not, Constant::Boolean(b)) => Ok(Constant::Boolean(!b)),
            (UnaryOp::BitNot, Constant::Int(v)) => Ok(Constant::Int(!v)),
            (UnaryOp::BitNot, Constant::Long(v)) => Ok(Constant::Long(!v)),
            _ => Err(unsupported()),
        }
    }

    /// Whether the left operand alone decides the result of `op`.
    pub fn is_predictable(&self, op: BinaryOp) -> bool {
        match (op, self) {
            (BinaryOp::Or, Constant::Boolean(true)) => true,
            (BinaryOp::And, Constant::Boolean(false)) => true,
            _ => false,
        }
    }

    /// The result of `op` decided by the left operand alone. Only meaningful
    /// when [`Constant::is_predictable`] holds.
    pub fn predicted_result(&self, op: BinaryOp) -> Constant {
        debug_assert!(self.is_predictable(op), "{} is not predictable for {:?}", op, self);
        self.clone()
    }

    /// Member selection: `self.name`.
    pub fn select(&self, name: &str) -> Result<Constant> {
        match self {
            Constant::Object(object) => object
                .member(name)
                .ok_or_else(|| Error::unknown_reference(format!("{}.{}", object.class_name(), name))),
            _ => Err(Error::unsupported_binary(
                BinaryOp::Member.symbol(),
                self.kind(),
                name,
            )),
        }
    }

    fn numbers(&self, other: &Constant) -> Option<(Number, Number)> {
        Some((self.to_number()?, other.to_number()?))
    }

    /// Value equality for `==`/`!=`. `None` when the kinds are not comparable.
    fn equals(&self, other: &Constant) -> Option<bool> {
        if let Some((l, r)) = self.numbers(other) {
            return Some(number::compare(BinaryOp::Eq, l, r));
        }
        match (self, other) {
            (Constant::Boolean(l), Constant::Boolean(r)) => Some(l == r),
            (Constant::Str(l), Constant::Str(r)) => Some(l == r),
            (Constant::Object(l), Constant::Object(r)) => Some(l == r),
            (Constant::Null, Constant::Null) => Some(true),
            (
                Constant::Null | Constant::Str(_) | Constant::Object(_),
                Constant::Null | Constant::Str(_) | Constant::Object(_),
            ) => Some(false),
            _ => None,
        }
    }
}
