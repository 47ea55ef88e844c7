//! Typed compiler.
//!
//! Compiles the same token stream the solver evaluates into instructions
//! for a stack machine, given the static types of the locals it may read.
//!
//! ## Design
//!
//! - Two passes: the stream is first popped into a [`TypedOperand`] tree
//!   allocated in a `bumpalo` arena, then the tree is lowered in post-order.
//!   Every type and reference error surfaces in the first pass, so a failed
//!   compilation never emits an instruction.
//! - Wrapper types are unboxed before use and results are boxed back only
//!   when both operands were wrappers.
//! - No constant folding and no short-circuit jumps: `&&` and `||` evaluate
//!   both sides.

mod bytecode;
mod locals;
mod members;
mod typed_operand;
mod types;

#[cfg(test)]
mod bytecode_test;

pub use bytecode::BytecodeCompiler;
pub use locals::{Local, LocalMap};
pub use members::{MemberTable, MemberTypes, NoMembers};
pub use typed_operand::{Equality, TreeBuilder, TypedOperand, binary_result, equality, unary_result};
pub use types::{StaticType, TypeKind, UnknownTypeName};

use bumpalo::Bump;

use crate::{Result, solver::DEFAULT_MAX_DEPTH, solver::TokenStream, vm::Code};

/// Compile a token stream with the default depth limit.
pub fn compile(stream: TokenStream, locals: &LocalMap, members: &dyn MemberTypes) -> Result<Code> {
    compile_with_limits(stream, locals, members, DEFAULT_MAX_DEPTH)
}

/// Compile a token stream with a custom depth limit.
pub fn compile_with_limits(
    mut stream: TokenStream,
    locals: &LocalMap,
    members: &dyn MemberTypes,
    max_depth: usize,
) -> Result<Code> {
    tracing::debug!(tokens = stream.len(), locals = locals.len(), "compiling token stream");

    let arena = Bump::new();
    let mut builder = TreeBuilder::new(&arena, locals, members, max_depth);
    let tree = builder.build(&mut stream)?;
    let literals = builder.into_literals();

    let code = BytecodeCompiler::compile(tree, &literals)?;
    tracing::debug!(
        instructions = code.instructions.len(),
        result_type = %code.result_type,
        "compiled"
    );
    Ok(code)
}
