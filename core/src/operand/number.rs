//! Numeric values and binary numeric promotion.
//!
//! Integer arithmetic wraps on overflow; integral division or remainder by
//! zero is an error. Floating point follows IEEE 754 (produces inf/nan).

use core::cmp::Ordering;
use core::fmt;

use crate::{
    Error, Result,
    operand::Kind,
    operators::BinaryOp,
};

/// Numeric kinds ordered by promotion rank: `Int < Long < Float < Double`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NumericKind {
    Int,
    Long,
    Float,
    Double,
}

impl NumericKind {
    /// The common kind of a binary arithmetic operation.
    pub fn promote(self, other: NumericKind) -> NumericKind {
        self.max(other)
    }

    pub fn is_integral(self) -> bool {
        matches!(self, NumericKind::Int | NumericKind::Long)
    }

    pub fn kind(self) -> Kind {
        match self {
            NumericKind::Int => Kind::Int,
            NumericKind::Long => Kind::Long,
            NumericKind::Float => Kind::Float,
            NumericKind::Double => Kind::Double,
        }
    }

    pub fn from_kind(kind: Kind) -> Option<NumericKind> {
        match kind {
            Kind::Int => Some(NumericKind::Int),
            Kind::Long => Some(NumericKind::Long),
            Kind::Float => Some(NumericKind::Float),
            Kind::Double => Some(NumericKind::Double),
            _ => None,
        }
    }
}

impl fmt::Display for NumericKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.kind(), f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
}

impl Number {
    pub fn kind(self) -> NumericKind {
        match self {
            Number::Int(_) => NumericKind::Int,
            Number::Long(_) => NumericKind::Long,
            Number::Float(_) => NumericKind::Float,
            Number::Double(_) => NumericKind::Double,
        }
    }

    /// Widening conversion. Converting to a narrower kind is never requested
    /// by promotion; it returns the value unchanged.
    pub fn widen(self, to: NumericKind) -> Number {
        match (self, to) {
            (Number::Int(v), NumericKind::Long) => Number::Long(v as i64),
            (Number::Int(v), NumericKind::Float) => Number::Float(v as f32),
            (Number::Int(v), NumericKind::Double) => Number::Double(v as f64),
            (Number::Long(v), NumericKind::Float) => Number::Float(v as f32),
            (Number::Long(v), NumericKind::Double) => Number::Double(v as f64),
            (Number::Float(v), NumericKind::Double) => Number::Double(v as f64),
            (n, _) => n,
        }
    }

    fn shift_distance(self) -> Option<u32> {
        match self {
            Number::Int(v) => Some(v as u32),
            Number::Long(v) => Some(v as u32),
            Number::Float(_) | Number::Double(_) => None,
        }
    }
}

macro_rules! int_arith {
    ($op:expr, $l:expr, $r:expr) => {
        match $op {
            BinaryOp::Add => $l.wrapping_add($r),
            BinaryOp::Sub => $l.wrapping_sub($r),
            BinaryOp::Mul => $l.wrapping_mul($r),
            BinaryOp::Div if $r == 0 => return Err(Error::DivisionByZero),
            // Wrapping handles MIN / -1
            BinaryOp::Div => $l.wrapping_div($r),
            BinaryOp::Rem if $r == 0 => return Err(Error::DivisionByZero),
            BinaryOp::Rem => $l.wrapping_rem($r),
            op => unreachable!("{} is not arithmetic", op),
        }
    };
}

macro_rules! float_arith {
    ($op:expr, $l:expr, $r:expr) => {
        match $op {
            BinaryOp::Add => $l + $r,
            BinaryOp::Sub => $l - $r,
            BinaryOp::Mul => $l * $r,
            BinaryOp::Div => $l / $r,
            BinaryOp::Rem => $l % $r,
            op => unreachable!("{} is not arithmetic", op),
        }
    };
}

/// `+ - * / %` on two numbers after promotion.
pub(crate) fn arithmetic(op: BinaryOp, left: Number, right: Number) -> Result<Number> {
    let kind = left.kind().promote(right.kind());
    Ok(match (left.widen(kind), right.widen(kind)) {
        (Number::Int(l), Number::Int(r)) => Number::Int(int_arith!(op, l, r)),
        (Number::Long(l), Number::Long(r)) => Number::Long(int_arith!(op, l, r)),
        (Number::Float(l), Number::Float(r)) => Number::Float(float_arith!(op, l, r)),
        (Number::Double(l), Number::Double(r)) => Number::Double(float_arith!(op, l, r)),
        _ => unreachable!("operands promoted to {}", kind),
    })
}

/// `& | ^` on two integral numbers after promotion.
pub(crate) fn bitwise(op: BinaryOp, left: Number, right: Number) -> Option<Number> {
    let kind = left.kind().promote(right.kind());
    match (left.widen(kind), right.widen(kind)) {
        (Number::Int(l), Number::Int(r)) => Some(Number::Int(bit_op(op, l, r))),
        (Number::Long(l), Number::Long(r)) => Some(Number::Long(bit_op(op, l, r))),
        _ => None,
    }
}

fn bit_op<T>(op: BinaryOp, l: T, r: T) -> T
where
    T: core::ops::BitAnd<Output = T> + core::ops::BitOr<Output = T> + core::ops::BitXor<Output = T>,
{
    match op {
        BinaryOp::BitAnd => l & r,
        BinaryOp::BitOr => l | r,
        BinaryOp::BitXor => l ^ r,
        op => unreachable!("{} is not bitwise", op),
    }
}

/// `<< >> >>>`. The result has the left operand's kind; the distance is
/// masked to the width of that kind.
pub(crate) fn shift(op: BinaryOp, left: Number, right: Number) -> Option<Number> {
    let distance = right.shift_distance()?;
    match left {
        Number::Int(v) => Some(Number::Int(match op {
            BinaryOp::Shl => v.wrapping_shl(distance),
            BinaryOp::Shr => v.wrapping_shr(distance),
            BinaryOp::UShr => (v as u32).wrapping_shr(distance) as i32,
            op => unreachable!("{} is not a shift", op),
        })),
        Number::Long(v) => Some(Number::Long(match op {
            BinaryOp::Shl => v.wrapping_shl(distance),
            BinaryOp::Shr => v.wrapping_shr(distance),
            BinaryOp::UShr => (v as u64).wrapping_shr(distance) as i64,
            op => unreachable!("{} is not a shift", op),
        })),
        Number::Float(_) | Number::Double(_) => None,
    }
}

/// `== != < > <= >=` on two numbers after promotion. NaN compares unequal
/// to everything.
pub(crate) fn compare(op: BinaryOp, left: Number, right: Number) -> bool {
    let kind = left.kind().promote(right.kind());
    let ordering = match (left.widen(kind), right.widen(kind)) {
        (Number::Int(l), Number::Int(r)) => Some(l.cmp(&r)),
        (Number::Long(l), Number::Long(r)) => Some(l.cmp(&r)),
        (Number::Float(l), Number::Float(r)) => l.partial_cmp(&r),
        (Number::Double(l), Number::Double(r)) => l.partial_cmp(&r),
        _ => unreachable!("operands promoted to {}", kind),
    };
    match (op, ordering) {
        (BinaryOp::Ne, None) => true,
        (_, None) => false,
        (BinaryOp::Eq, Some(o)) => o == Ordering::Equal,
        (BinaryOp::Ne, Some(o)) => o != Ordering::Equal,
        (BinaryOp::Lt, Some(o)) => o == Ordering::Less,
        (BinaryOp::Gt, Some(o)) => o == Ordering::Greater,
        (BinaryOp::Le, Some(o)) => o != Ordering::Greater,
        (BinaryOp::Ge, Some(o)) => o != Ordering::Less,
        (op, _) => unreachable!("{} is not a comparison", op),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_promotion_rank() {
        assert_eq!(NumericKind::Int.promote(NumericKind::Long), NumericKind::Long);
        assert_eq!(NumericKind::Long.promote(NumericKind::Float), NumericKind::Float);
        assert_eq!(NumericKind::Double.promote(NumericKind::Int), NumericKind::Double);
    }

    #[test]
    fn test_int_wrapping_overflow() {
        let result = arithmetic(BinaryOp::Add, Number::Int(i32::MAX), Number::Int(1)).unwrap();
        assert_eq!(result, Number::Int(i32::MIN));

        let result = arithmetic(BinaryOp::Div, Number::Int(i32::MIN), Number::Int(-1)).unwrap();
        assert_eq!(result, Number::Int(i32::MIN));
    }

    #[test]
    fn test_integral_division_by_zero() {
        assert_eq!(
            arithmetic(BinaryOp::Div, Number::Long(1), Number::Int(0)),
            Err(Error::DivisionByZero)
        );
        assert_eq!(
            arithmetic(BinaryOp::Rem, Number::Int(1), Number::Int(0)),
            Err(Error::DivisionByZero)
        );
    }

    #[test]
    fn test_float_division_by_zero() {
        // IEEE 754: no error, positive infinity
        let result = arithmetic(BinaryOp::Div, Number::Double(10.0), Number::Int(0)).unwrap();
        assert_eq!(result, Number::Double(f64::INFINITY));
    }

    #[test]
    fn test_shift_masks_distance() {
        assert_eq!(
            shift(BinaryOp::Shl, Number::Int(1), Number::Int(33)),
            Some(Number::Int(2))
        );
        assert_eq!(
            shift(BinaryOp::UShr, Number::Int(-1), Number::Int(28)),
            Some(Number::Int(0xF))
        );
        assert_eq!(
            shift(BinaryOp::Shr, Number::Long(-16), Number::Int(2)),
            Some(Number::Long(-4))
        );
        assert_eq!(shift(BinaryOp::Shl, Number::Float(1.0), Number::Int(1)), None);
    }

    #[test]
    fn test_nan_comparisons() {
        let nan = Number::Double(f64::NAN);
        assert!(!compare(BinaryOp::Eq, nan, nan));
        assert!(compare(BinaryOp::Ne, nan, nan));
        assert!(!compare(BinaryOp::Lt, nan, Number::Int(1)));
    }

    #[test]
    fn test_mixed_comparison_promotes() {
        assert!(compare(BinaryOp::Eq, Number::Int(1), Number::Long(1)));
        assert!(compare(BinaryOp::Lt, Number::Int(1), Number::Float(1.5)));
        assert!(compare(BinaryOp::Ge, Number::Long(2), Number::Double(2.0)));
    }
}
