//! Stack machine instructions.
//!
//! # Instruction Format
//!
//! Every instruction is exactly 4 bytes: a one byte tag followed by at most
//! a 16-bit operand.
//!
//! ```text
//! ┌────────────┬────────────┬─────────────────────────┐
//! │    Tag     │  (padding) │        Operand          │
//! │  (8 bits)  │  (8 bits)  │  (8 or 16 bits)         │
//! └────────────┴────────────┴─────────────────────────┘
//! ```
//!
//! # Design Principles
//!
//! - **Stack-based**: operations pop their operands and push one result.
//! - **Type-explicit**: one instruction family per numeric kind; the
//!   compiler inserts every conversion, the machine never promotes.
//! - **Parameterized ops**: binary operations encode the operator in the
//!   operand byte (see [`Instruction::IntBinOp`]).
//!
//! # Stack Discipline
//!
//! Stack effect notation: `[..., operand1, operand2] -> [..., result]`

use core::fmt;

use crate::operators::BinaryOp;

/// Primitive kinds that have a boxed wrapper.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Int,
    Long,
    Float,
    Double,
    Boolean,
}

impl Primitive {
    /// Name of the wrapper class.
    pub fn wrapper_name(self) -> &'static str {
        match self {
            Primitive::Int => "Integer",
            Primitive::Long => "Long",
            Primitive::Float => "Float",
            Primitive::Double => "Double",
            Primitive::Boolean => "Boolean",
        }
    }
}

/// Comparison encoded in the operand of the `*CmpOp` instructions.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOp {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

impl ComparisonOp {
    pub fn from_binary(op: BinaryOp) -> Option<ComparisonOp> {
        Some(match op {
            BinaryOp::Eq => ComparisonOp::Eq,
            BinaryOp::Ne => ComparisonOp::Ne,
            BinaryOp::Lt => ComparisonOp::Lt,
            BinaryOp::Gt => ComparisonOp::Gt,
            BinaryOp::Le => ComparisonOp::Le,
            BinaryOp::Ge => ComparisonOp::Ge,
            _ => return None,
        })
    }
}

/// Operand byte of the `*BinOp` instructions for `op`.
///
/// Shifts use `<` (`<<`), `>` (`>>`) and `u` (`>>>`); every other operator
/// uses its own single character.
pub fn binop_code(op: BinaryOp) -> Option<u8> {
    Some(match op {
        BinaryOp::Add => b'+',
        BinaryOp::Sub => b'-',
        BinaryOp::Mul => b'*',
        BinaryOp::Div => b'/',
        BinaryOp::Rem => b'%',
        BinaryOp::BitAnd => b'&',
        BinaryOp::BitOr => b'|',
        BinaryOp::BitXor => b'^',
        BinaryOp::Shl => b'<',
        BinaryOp::Shr => b'>',
        BinaryOp::UShr => b'u',
        _ => return None,
    })
}

fn binop_symbol(code: u8) -> &'static str {
    match code {
        b'+' => "+",
        b'-' => "-",
        b'*' => "*",
        b'/' => "/",
        b'%' => "%",
        b'&' => "&",
        b'|' => "|",
        b'^' => "^",
        b'<' => "<<",
        b'>' => ">>",
        b'u' => ">>>",
        _ => "?",
    }
}

/// A single instruction (exactly 4 bytes).
#[repr(C, u8)]
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    // ========================================================================
    // Constants & Locals (0x01 - 0x0F)
    // ========================================================================
    /// Push constant from pool
    /// Operand: u16 index | Stack: [...] -> [..., value]
    ConstLoad(u16) = 0x01,

    /// Push small signed integer (-128 to 127)
    /// Operand: i8 value | Stack: [...] -> [..., int]
    ConstInt(i8) = 0x02,

    /// Stack: [...] -> [..., true]
    ConstTrue = 0x03,

    /// Stack: [...] -> [..., false]
    ConstFalse = 0x04,

    /// Stack: [...] -> [..., null]
    ConstNull = 0x05,

    /// Load local variable
    /// Operand: u16 slot | Stack: [...] -> [..., value]
    LoadLocal(u16) = 0x0A,

    // ========================================================================
    // Conversions (0x10 - 0x1F)
    // ========================================================================
    /// Unwrap a boxed value (fails on null)
    /// Stack: [..., wrapper] -> [..., primitive]
    Unbox(Primitive) = 0x10,

    /// Wrap a primitive
    /// Stack: [..., primitive] -> [..., wrapper]
    Box(Primitive) = 0x11,

    /// Widening conversions: [..., a] -> [..., converted]
    I2L = 0x12,
    I2F = 0x13,
    I2D = 0x14,
    L2F = 0x15,
    L2D = 0x16,
    F2D = 0x17,

    /// Narrow a long shift distance to int
    /// Stack: [..., a: Long] -> [..., a: Int]
    L2I = 0x18,

    // ========================================================================
    // Arithmetic (0x20 - 0x2F)
    // ========================================================================
    /// Integer binary operation
    ///
    /// Operand encodes the operation (see [`binop_code`]):
    /// - `+ - * / %`: arithmetic, `/` and `%` fail on zero
    /// - `& | ^`: bitwise
    /// - `< > u`: shifts; the distance is always an Int
    ///
    /// Stack: [..., a: Int, b: Int] -> [..., result: Int]
    IntBinOp(u8) = 0x20,

    /// Same encoding as IntBinOp.
    /// Stack: [..., a: Long, b: Long] -> [..., result: Long]
    /// Shifts: [..., a: Long, b: Int] -> [..., result: Long]
    LongBinOp(u8) = 0x21,

    /// Arithmetic only (`+ - * / %`), IEEE 754
    /// Stack: [..., a: Float, b: Float] -> [..., result: Float]
    FloatBinOp(u8) = 0x22,

    /// Arithmetic only (`+ - * / %`), IEEE 754
    /// Stack: [..., a: Double, b: Double] -> [..., result: Double]
    DoubleBinOp(u8) = 0x23,

    /// Negation: [..., a] -> [..., -a]
    NegInt = 0x24,
    NegLong = 0x25,
    NegFloat = 0x26,
    NegDouble = 0x27,

    /// Bitwise complement: [..., a] -> [..., ~a]
    BitNotInt = 0x28,
    BitNotLong = 0x29,

    // ========================================================================
    // Comparisons (0x30 - 0x3F)
    // ========================================================================
    /// Stack: [..., a: Int, b: Int] -> [..., result: Boolean]
    IntCmpOp(ComparisonOp) = 0x30,

    /// Stack: [..., a: Long, b: Long] -> [..., result: Boolean]
    LongCmpOp(ComparisonOp) = 0x31,

    /// NaN compares unequal to everything.
    /// Stack: [..., a: Float, b: Float] -> [..., result: Boolean]
    FloatCmpOp(ComparisonOp) = 0x32,

    /// Stack: [..., a: Double, b: Double] -> [..., result: Boolean]
    DoubleCmpOp(ComparisonOp) = 0x33,

    /// Equality only.
    /// Stack: [..., a: Boolean, b: Boolean] -> [..., result: Boolean]
    BoolCmpOp(ComparisonOp) = 0x34,

    /// Equality only. Strings compare by value, everything else by identity.
    /// Stack: [..., a: ref, b: ref] -> [..., result: Boolean]
    RefCmpOp(ComparisonOp) = 0x35,

    // ========================================================================
    // Logical Operations (0x40 - 0x4F)
    // ========================================================================
    /// Logical AND, both operands already evaluated
    /// Stack: [..., a: Boolean, b: Boolean] -> [..., a&&b: Boolean]
    And = 0x40,

    /// Logical OR, both operands already evaluated
    /// Stack: [..., a: Boolean, b: Boolean] -> [..., a||b: Boolean]
    Or = 0x41,

    /// Stack: [..., a: Boolean] -> [..., !a: Boolean]
    Not = 0x42,

    /// Non-short-circuit `& | ^` on booleans, same encoding as IntBinOp
    /// Stack: [..., a: Boolean, b: Boolean] -> [..., result: Boolean]
    BoolBinOp(u8) = 0x43,

    // ========================================================================
    // Strings & Objects (0x50 - 0x5F)
    // ========================================================================
    /// String conversion of any value (`null` becomes "null")
    /// Stack: [..., a] -> [..., text: String]
    Stringify = 0x50,

    /// Stack: [..., a: String, b: String] -> [..., a+b: String]
    Concat = 0x51,

    /// Select a member of an object
    /// Operand: u16 index into the names pool | Stack: [..., obj] -> [..., value]
    GetMember(u16) = 0x52,

    // ========================================================================
    // Control Flow (0x60 - 0x6F)
    // ========================================================================
    /// Stack: [..., retval] -> [retval]
    Return = 0x60,
}

impl Instruction {
    /// Size of an instruction in bytes
    pub const SIZE: usize = 4;

    /// Check if this instruction can fail at run time
    pub const fn can_error(&self) -> bool {
        matches!(
            self,
            Self::IntBinOp(b'/')
                | Self::IntBinOp(b'%')
                | Self::LongBinOp(b'/')
                | Self::LongBinOp(b'%')
                | Self::Unbox(_)
                | Self::GetMember(_)
        )
    }
}

impl fmt::Debug for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Binary operations - show operator symbol
            Self::IntBinOp(op) => write!(f, "IntBinOp({})", binop_symbol(*op)),
            Self::LongBinOp(op) => write!(f, "LongBinOp({})", binop_symbol(*op)),
            Self::FloatBinOp(op) => write!(f, "FloatBinOp({})", binop_symbol(*op)),
            Self::DoubleBinOp(op) => write!(f, "DoubleBinOp({})", binop_symbol(*op)),
            Self::BoolBinOp(op) => write!(f, "BoolBinOp({})", binop_symbol(*op)),

            Self::IntCmpOp(op) => write!(f, "IntCmpOp({:?})", op),
            Self::LongCmpOp(op) => write!(f, "LongCmpOp({:?})", op),
            Self::FloatCmpOp(op) => write!(f, "FloatCmpOp({:?})", op),
            Self::DoubleCmpOp(op) => write!(f, "DoubleCmpOp({:?})", op),
            Self::BoolCmpOp(op) => write!(f, "BoolCmpOp({:?})", op),
            Self::RefCmpOp(op) => write!(f, "RefCmpOp({:?})", op),

            Self::Unbox(p) => write!(f, "Unbox({})", p.wrapper_name()),
            Self::Box(p) => write!(f, "Box({})", p.wrapper_name()),

            Self::ConstLoad(idx) => write!(f, "ConstLoad({})", idx),
            Self::ConstInt(val) => write!(f, "ConstInt({})", val),
            Self::ConstTrue => write!(f, "ConstTrue"),
            Self::ConstFalse => write!(f, "ConstFalse"),
            Self::ConstNull => write!(f, "ConstNull"),
            Self::LoadLocal(slot) => write!(f, "LoadLocal({})", slot),
            Self::I2L => write!(f, "I2L"),
            Self::I2F => write!(f, "I2F"),
            Self::I2D => write!(f, "I2D"),
            Self::L2F => write!(f, "L2F"),
            Self::L2D => write!(f, "L2D"),
            Self::F2D => write!(f, "F2D"),
            Self::L2I => write!(f, "L2I"),
            Self::NegInt => write!(f, "NegInt"),
            Self::NegLong => write!(f, "NegLong"),
            Self::NegFloat => write!(f, "NegFloat"),
            Self::NegDouble => write!(f, "NegDouble"),
            Self::BitNotInt => write!(f, "BitNotInt"),
            Self::BitNotLong => write!(f, "BitNotLong"),
            Self::And => write!(f, "And"),
            Self::Or => write!(f, "Or"),
            Self::Not => write!(f, "Not"),
            Self::Stringify => write!(f, "Stringify"),
            Self::Concat => write!(f, "Concat"),
            Self::GetMember(idx) => write!(f, "GetMember({})", idx),
            Self::Return => write!(f, "Return"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format;

    #[test]
    fn test_instruction_size() {
        assert_eq!(core::mem::size_of::<Instruction>(), Instruction::SIZE);
    }

    #[test]
    fn test_parameterized_ops() {
        let add = Instruction::IntBinOp(b'+');
        let sub = Instruction::IntBinOp(b'-');
        assert_ne!(add, sub);

        let lt = Instruction::IntCmpOp(ComparisonOp::Lt);
        let gt = Instruction::IntCmpOp(ComparisonOp::Gt);
        assert_ne!(lt, gt);
    }

    #[test]
    fn test_every_value_operator_has_a_code() {
        for op in BinaryOp::ALL {
            let coded = binop_code(op).is_some() || ComparisonOp::from_binary(op).is_some();
            let special = op.is_lazy() || op == BinaryOp::Member;
            assert!(coded != special, "{op}");
        }
    }

    #[test]
    fn test_can_error() {
        assert!(Instruction::IntBinOp(b'/').can_error());
        assert!(Instruction::LongBinOp(b'%').can_error());
        assert!(!Instruction::DoubleBinOp(b'/').can_error());
        assert!(!Instruction::IntBinOp(b'+').can_error());
        assert!(Instruction::Unbox(Primitive::Int).can_error());
    }

    #[test]
    fn test_debug_formatting() {
        assert_eq!(format!("{:?}", Instruction::IntBinOp(b'+')), "IntBinOp(+)");
        assert_eq!(format!("{:?}", Instruction::LongBinOp(b'u')), "LongBinOp(>>>)");
        assert_eq!(format!("{:?}", Instruction::IntCmpOp(ComparisonOp::Lt)), "IntCmpOp(Lt)");
        assert_eq!(format!("{:?}", Instruction::Box(Primitive::Int)), "Box(Integer)");
    }
}
