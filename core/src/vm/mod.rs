//! Target instruction set and the compiled code container.

mod code;
mod instruction_set;

pub use code::Code;
pub use instruction_set::{ComparisonOp, Instruction, Primitive, binop_code};
