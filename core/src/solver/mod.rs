//! Token-stream expression solver.
//!
//! The solver reduces a [`TokenStream`] to a single [`Constant`] purely by
//! popping: an operator token is followed by its operands' sub-streams, so
//! no separate parse step is needed.
//!
//! ## Evaluation order
//!
//! - The left operand of a binary operator is solved, and its references
//!   resolved, before anything on the right is touched.
//! - For lazy operators (`&&`, `||`) a left value that decides the result
//!   causes the whole right sub-stream to be discarded without visiting a
//!   single operand in it, so the resolver is never called for it.
//! - The right operand of `.` is a member name and is never resolved.
//!
//! ## Example
//!
//! ```
//! use infix_core::operand::{Constant, Operand};
//! use infix_core::operators::BinaryOp;
//! use infix_core::solver::{self, Token, TokenStream, Variables};
//!
//! // x * 2
//! let stream = TokenStream::from_prefix([
//!     Token::Binary(BinaryOp::Mul),
//!     Token::Operand(Operand::reference("x")),
//!     Token::Operand(Operand::from(2)),
//! ]);
//! let mut vars = Variables::new().with("x", 21);
//! assert_eq!(solver::solve(stream, &mut vars).unwrap(), Constant::Int(42));
//! ```

mod resolver;
mod token;


pub use resolver::{NoVariables, Resolver, Variables};
pub use token::{Token, TokenStream};

use crate::{
    Error, Result, Vec, format,
    operand::{Constant, Operand},
    operators::{BinaryOp, UnaryOp},
};

/// Default nesting limit shared with the compiler.
pub const DEFAULT_MAX_DEPTH: usize = 1000;

/// Solve a token stream with the default depth limit.
pub fn solve(stream: TokenStream, resolver: &mut dyn Resolver) -> Result<Constant> {
    solve_with_limits(stream, resolver, DEFAULT_MAX_DEPTH)
}

/// Solve a token stream with a custom depth limit.
///
/// The limit bounds both expression nesting and the length of reference
/// chains (a resolver answering a reference with another reference).
pub fn solve_with_limits(
    mut stream: TokenStream,
    resolver: &mut dyn Resolver,
    max_depth: usize,
) -> Result<Constant> {
    Solver::new(resolver, max_depth).solve(&mut stream)
}

/// Reducer over one token stream.
///
/// Operators waiting for operands are kept on an explicit frame stack, so
/// nesting is bounded by `max_depth` alone and never by the thread's stack.
pub struct Solver<'r> {
    resolver: &'r mut dyn Resolver,
    max_depth: usize,
}

/// An operator still waiting for operands.
enum Frame {
    Unary(UnaryOp),
    /// Nothing solved yet.
    Left(BinaryOp),
    /// Left operand solved, right one pending.
    Right(BinaryOp, Constant),
}

impl<'r> Solver<'r> {
    pub fn new(resolver: &'r mut dyn Resolver, max_depth: usize) -> Self {
        Self {
            resolver,
            max_depth,
        }
    }

    /// Reduce the stream to a single value. The stream must hold exactly one
    /// complete expression.
    pub fn solve(&mut self, stream: &mut TokenStream) -> Result<Constant> {
        tracing::debug!(tokens = stream.len(), "solving token stream");

        if stream.is_empty() {
            return Err(Error::malformed("empty token stream"));
        }
        let value = self.solve_expr(stream)?;

        if !stream.is_empty() {
            return Err(Error::malformed(format!(
                "{} token(s) left over after a complete expression",
                stream.len()
            )));
        }
        Ok(value)
    }

    /// Pop and reduce one sub-expression.
    fn solve_expr(&mut self, stream: &mut TokenStream) -> Result<Constant> {
        let mut frames: Vec<Frame> = Vec::new();

        loop {
            self.check_depth(frames.len())?;
            let token = stream
                .pop()
                .ok_or_else(|| Error::malformed("operator is missing an operand"))?;

            let mut value = match token {
                Token::Operand(operand) => self.resolve(operand)?,
                Token::Unary(op) => {
                    frames.push(Frame::Unary(op));
                    continue;
                }
                Token::Binary(op) => {
                    frames.push(Frame::Left(op));
                    continue;
                }
            };

            // Hand the value up until an operator still needs its right operand
            loop {
                match frames.pop() {
                    None => return Ok(value),
                    Some(Frame::Unary(op)) => value = value.apply_unary(op)?,
                    Some(Frame::Left(BinaryOp::Member)) => {
                        self.check_depth(frames.len() + 1)?;
                        value = select(&value, stream)?;
                    }
                    Some(Frame::Left(op)) => {
                        if op.is_lazy() && value.is_predictable(op) {
                            let skipped = discard_expr(stream)?;
                            tracing::trace!(%op, skipped, "left operand decides result");
                            value = value.predicted_result(op);
                        } else {
                            frames.push(Frame::Right(op, value));
                            break;
                        }
                    }
                    Some(Frame::Right(op, left)) => value = left.apply(&value, op)?,
                }
            }
        }
    }

    fn check_depth(&self, depth: usize) -> Result<()> {
        if depth >= self.max_depth {
            return Err(Error::malformed(format!(
                "nesting exceeds maximum depth of {}",
                self.max_depth
            )));
        }
        Ok(())
    }

    /// Resolve references until a constant comes back, one level per step.
    fn resolve(&mut self, operand: Operand) -> Result<Constant> {
        let mut current = operand;
        let mut hops = 0;
        loop {
            match current {
                Operand::Constant(value) => return Ok(value),
                Operand::Reference(reference) => {
                    if hops >= self.max_depth {
                        return Err(Error::malformed(format!(
                            "reference chain through '{}' exceeds maximum depth of {}",
                            reference.name(),
                            self.max_depth
                        )));
                    }
                    hops += 1;
                    tracing::trace!(name = reference.name(), "resolving reference");
                    current = reference.solve(&mut *self.resolver)?;
                }
            }
        }
    }
}

/// `owner.name`: the name token is taken as it is and never resolved.
fn select(owner: &Constant, stream: &mut TokenStream) -> Result<Constant> {
    match stream.pop() {
        Some(Token::Operand(Operand::Reference(member))) => owner.select(member.name()),
        Some(Token::Operand(Operand::Constant(c))) => Err(Error::unsupported_binary(
            BinaryOp::Member.symbol(),
            owner.kind(),
            c.kind(),
        )),
        Some(_) => Err(Error::malformed("member selection needs a member name")),
        None => Err(Error::malformed("operator is missing an operand")),
    }
}

/// Pop one complete sub-expression without evaluating anything in it.
/// Returns the number of tokens discarded.
fn discard_expr(stream: &mut TokenStream) -> Result<usize> {
    let mut pending = 1;
    let mut discarded = 0;
    while pending > 0 {
        let token = stream
            .pop()
            .ok_or_else(|| Error::malformed("operator is missing an operand"))?;
        pending = pending - 1 + token.arity();
        discarded += 1;
    }
    Ok(discarded)
}
