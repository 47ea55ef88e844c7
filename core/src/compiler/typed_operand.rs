//! Typed expression tree and the static type rules.
//!
//! The tree is built from a token stream by popping exactly like the solver
//! does, except that operands carry static types instead of values. Every
//! node's result type is computed once, when the node is built.

use bumpalo::Bump;

use crate::{
    Error, Result, Vec,
    compiler::{LocalMap, MemberTypes, StaticType, TypeKind},
    format,
    operand::{Constant, Operand},
    operators::{BinaryOp, UnaryOp},
    solver::{Token, TokenStream},
};

#[derive(Debug, Clone, Copy)]
pub enum TypedOperand<'a> {
    /// A literal, stored at `index` in the builder's literal table.
    Constant { index: usize, ty: StaticType },
    Reference { slot: u16, ty: StaticType },
    Unary {
        operand: &'a TypedOperand<'a>,
        op: UnaryOp,
        result: StaticType,
    },
    Binary {
        left: &'a TypedOperand<'a>,
        right: &'a TypedOperand<'a>,
        op: BinaryOp,
        result: StaticType,
    },
    Member {
        owner: &'a TypedOperand<'a>,
        name: &'a str,
        result: StaticType,
    },
}

impl TypedOperand<'_> {
    pub fn result_type(&self) -> StaticType {
        match self {
            TypedOperand::Constant { ty, .. } | TypedOperand::Reference { ty, .. } => *ty,
            TypedOperand::Unary { result, .. }
            | TypedOperand::Binary { result, .. }
            | TypedOperand::Member { result, .. } => *result,
        }
    }
}

// ============================================================================
// Type rules
// ============================================================================

/// Static result type of `left op right`. Member selection is resolved by
/// [`MemberTypes`] and rejected here.
pub fn binary_result(op: BinaryOp, left: StaticType, right: StaticType) -> Result<StaticType> {
    let mismatch = || Error::mismatch_binary(op.symbol(), left, right);
    // Wrapper + wrapper stays boxed; any primitive side unboxes the result
    let boxed_if_both = |kind: TypeKind| {
        if left.is_wrapper() && right.is_wrapper() {
            StaticType::boxed(kind)
        } else {
            StaticType::primitive(kind)
        }
    };

    match op {
        BinaryOp::Add if left.is_string() || right.is_string() => Ok(StaticType::STRING),
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => {
            let (l, r) = left
                .numeric_kind()
                .zip(right.numeric_kind())
                .ok_or_else(mismatch)?;
            Ok(boxed_if_both(l.promote(r).into()))
        }
        BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor => {
            if left.is_boolean() && right.is_boolean() {
                return Ok(boxed_if_both(TypeKind::Boolean));
            }
            match (left.numeric_kind(), right.numeric_kind()) {
                (Some(l), Some(r)) if l.is_integral() && r.is_integral() => {
                    Ok(boxed_if_both(l.promote(r).into()))
                }
                _ => Err(mismatch()),
            }
        }
        BinaryOp::Shl | BinaryOp::Shr | BinaryOp::UShr => {
            match (left.numeric_kind(), right.numeric_kind()) {
                (Some(l), Some(r)) if l.is_integral() && r.is_integral() => {
                    Ok(StaticType::primitive(l.into()))
                }
                _ => Err(mismatch()),
            }
        }
        BinaryOp::And | BinaryOp::Or => {
            if left.is_boolean() && right.is_boolean() {
                Ok(StaticType::BOOLEAN)
            } else {
                Err(mismatch())
            }
        }
        BinaryOp::Eq | BinaryOp::Ne => match equality(left, right) {
            Some(_) => Ok(StaticType::BOOLEAN),
            None => Err(mismatch()),
        },
        BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge => {
            if left.numeric_kind().is_some() && right.numeric_kind().is_some() {
                Ok(StaticType::BOOLEAN)
            } else {
                Err(mismatch())
            }
        }
        BinaryOp::Member => Err(mismatch()),
    }
}

/// How `==`/`!=` compares two operands of these types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Equality {
    Numeric,
    Boolean,
    Reference,
}

pub fn equality(left: StaticType, right: StaticType) -> Option<Equality> {
    if left.numeric_kind().is_some() && right.numeric_kind().is_some() {
        return Some(Equality::Numeric);
    }
    if left.is_boolean() && right.is_boolean() {
        return Some(Equality::Boolean);
    }
    let plain_reference = |t: StaticType| matches!(t.kind, TypeKind::Str | TypeKind::Object(_));
    match (left.kind, right.kind) {
        (TypeKind::Null, _) if right.is_reference() => Some(Equality::Reference),
        (_, TypeKind::Null) if left.is_reference() => Some(Equality::Reference),
        _ if plain_reference(left) && plain_reference(right) => Some(Equality::Reference),
        _ => None,
    }
}

/// Static result type of `op operand`.
pub fn unary_result(op: UnaryOp, operand: StaticType) -> Result<StaticType> {
    let mismatch = || Error::mismatch_unary(op.symbol(), operand);
    match op {
        UnaryOp::Neg | UnaryOp::Plus => operand
            .numeric_kind()
            .map(|k| StaticType::primitive(k.into()))
            .ok_or_else(mismatch),
        UnaryOp::Not if operand.is_boolean() => Ok(StaticType::BOOLEAN),
        UnaryOp::BitNot => match operand.numeric_kind() {
            Some(k) if k.is_integral() => Ok(StaticType::primitive(k.into())),
            _ => Err(mismatch()),
        },
        UnaryOp::Not => Err(mismatch()),
    }
}

// ============================================================================
// Tree construction
// ============================================================================

/// Builds a [`TypedOperand`] tree from a token stream.
///
/// Pops exactly like the solver, with operators waiting for operands kept
/// on an explicit stack rather than the call stack.
pub struct TreeBuilder<'a, 'c> {
    arena: &'a Bump,
    locals: &'c LocalMap,
    members: &'c dyn MemberTypes,
    /// Literals popped so far, referenced by index from the tree.
    literals: Vec<Constant>,
    max_depth: usize,
}

/// An operator still waiting for typed operands.
enum Pending<'a> {
    Unary(UnaryOp),
    Left(BinaryOp),
    Right(BinaryOp, &'a TypedOperand<'a>),
}

impl<'a, 'c> TreeBuilder<'a, 'c> {
    pub fn new(
        arena: &'a Bump,
        locals: &'c LocalMap,
        members: &'c dyn MemberTypes,
        max_depth: usize,
    ) -> Self {
        Self {
            arena,
            locals,
            members,
            literals: Vec::new(),
            max_depth,
        }
    }

    /// Pop one complete expression. The stream must hold nothing else.
    pub fn build(&mut self, stream: &mut TokenStream) -> Result<&'a TypedOperand<'a>> {
        if stream.is_empty() {
            return Err(Error::malformed("empty token stream"));
        }
        let root = self.build_expr(stream)?;
        if !stream.is_empty() {
            return Err(Error::malformed(format!(
                "{} token(s) left over after a complete expression",
                stream.len()
            )));
        }
        Ok(root)
    }

    /// The literal table the tree's constant nodes index into.
    pub fn into_literals(self) -> Vec<Constant> {
        self.literals
    }

    fn build_expr(&mut self, stream: &mut TokenStream) -> Result<&'a TypedOperand<'a>> {
        let mut pending: Vec<Pending<'a>> = Vec::new();

        loop {
            self.check_depth(pending.len())?;
            let token = stream
                .pop()
                .ok_or_else(|| Error::malformed("operator is missing an operand"))?;

            let mut node = match token {
                Token::Operand(Operand::Constant(value)) => {
                    let ty = StaticType::of_constant(&value);
                    self.literals.push(value);
                    self.alloc(TypedOperand::Constant {
                        index: self.literals.len() - 1,
                        ty,
                    })
                }
                Token::Operand(Operand::Reference(reference)) => {
                    let local = self.locals.get(reference.name())?;
                    self.alloc(TypedOperand::Reference {
                        slot: local.slot,
                        ty: local.ty,
                    })
                }
                Token::Unary(op) => {
                    pending.push(Pending::Unary(op));
                    continue;
                }
                Token::Binary(op) => {
                    pending.push(Pending::Left(op));
                    continue;
                }
            };

            loop {
                node = match pending.pop() {
                    None => return Ok(node),
                    Some(Pending::Unary(op)) => {
                        let result = unary_result(op, node.result_type())?;
                        self.alloc(TypedOperand::Unary {
                            operand: node,
                            op,
                            result,
                        })
                    }
                    Some(Pending::Left(BinaryOp::Member)) => {
                        self.check_depth(pending.len() + 1)?;
                        self.member(node, stream)?
                    }
                    Some(Pending::Left(op)) => {
                        pending.push(Pending::Right(op, node));
                        break;
                    }
                    Some(Pending::Right(op, left)) => {
                        let result = binary_result(op, left.result_type(), node.result_type())?;
                        self.alloc(TypedOperand::Binary {
                            left,
                            right: node,
                            op,
                            result,
                        })
                    }
                };
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

    fn alloc(&self, node: TypedOperand<'a>) -> &'a TypedOperand<'a> {
        tracing::trace!(ty = %node.result_type(), "typed operand");
        self.arena.alloc(node)
    }

    /// `owner.name`, typed through [`MemberTypes`].
    fn member(
        &mut self,
        owner: &'a TypedOperand<'a>,
        stream: &mut TokenStream,
    ) -> Result<&'a TypedOperand<'a>> {
        let name = self.member_name(stream, owner.result_type())?;
        let result = match owner.result_type().kind {
            TypeKind::Object(class) => self.members.member_type(class, name)?,
            _ => {
                return Err(Error::mismatch_binary(
                    BinaryOp::Member.symbol(),
                    owner.result_type(),
                    name,
                ));
            }
        };
        Ok(self.alloc(TypedOperand::Member {
            owner,
            name,
            result,
        }))
    }

    /// The right operand of `.`: a bare name, never looked up as a local.
    fn member_name(&mut self, stream: &mut TokenStream, owner: StaticType) -> Result<&'a str> {
        match stream.pop() {
            Some(Token::Operand(Operand::Reference(reference))) => {
                Ok(self.arena.alloc_str(reference.name()))
            }
            Some(Token::Operand(Operand::Constant(value))) => Err(Error::mismatch_binary(
                BinaryOp::Member.symbol(),
                owner,
                StaticType::of_constant(&value),
            )),
            Some(_) => Err(Error::malformed("member selection needs a member name")),
            None => Err(Error::malformed("operator is missing an operand")),
        }
    }
}
