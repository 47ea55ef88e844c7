//! Lowering of a typed tree to stack machine instructions.

use hashbrown::HashMap;

use crate::{
    Error, Result, String, Vec, vec,
    compiler::{
        StaticType, TypeKind,
        typed_operand::{Equality, TypedOperand, equality},
    },
    operand::{Constant, NumericKind},
    operators::{BinaryOp, UnaryOp},
    vm::{Code, ComparisonOp, Instruction, binop_code},
};

/// Hashable identity of a pooled constant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum PoolKey {
    Int(i32),
    Long(i64),
    Float(u32),
    Double(u64),
    Str(String),
    Object(usize),
}

impl PoolKey {
    fn of(constant: &Constant) -> Option<PoolKey> {
        Some(match constant {
            Constant::Int(v) => PoolKey::Int(*v),
            Constant::Long(v) => PoolKey::Long(*v),
            // Bit patterns, so NaN pools and -0.0 stays distinct from 0.0
            Constant::Float(v) => PoolKey::Float(v.to_bits()),
            Constant::Double(v) => PoolKey::Double(v.to_bits()),
            Constant::Str(s) => PoolKey::Str(s.clone()),
            Constant::Object(o) => PoolKey::Object(o.addr()),
            Constant::Boolean(_) | Constant::Null => return None,
        })
    }
}

/// Emits instructions for a typed tree in post-order.
///
/// Tracks the operand stack precisely to report the exact max_stack_size.
pub struct BytecodeCompiler<'l> {
    literals: &'l [Constant],

    /// Constant pool and its deduplication map: key -> index
    constants: Vec<Constant>,
    constant_map: HashMap<PoolKey, u16>,

    /// Member names and their deduplication map
    names: Vec<String>,
    name_map: HashMap<String, u16>,

    instructions: Vec<Instruction>,

    /// Current stack depth during compilation
    current_stack_depth: usize,

    /// Maximum stack depth observed
    max_stack_size: usize,
}

impl<'l> BytecodeCompiler<'l> {
    pub fn new(literals: &'l [Constant]) -> Self {
        Self {
            literals,
            constants: Vec::new(),
            constant_map: HashMap::new(),
            names: Vec::new(),
            name_map: HashMap::new(),
            instructions: Vec::new(),
            current_stack_depth: 0,
            max_stack_size: 0,
        }
    }

    /// Lower `tree` and finish with `Return`.
    pub fn compile(tree: &TypedOperand<'_>, literals: &'l [Constant]) -> Result<Code> {
        let mut compiler = Self::new(literals);
        compiler.lower(tree)?;
        compiler.emit(Instruction::Return);
        Ok(compiler.finalize(tree.result_type()))
    }

    fn finalize(self, result_type: StaticType) -> Code {
        Code {
            constants: self.constants,
            names: self.names,
            instructions: self.instructions,
            result_type,
            max_stack_size: self.max_stack_size,
        }
    }

    // === Stack Management ===

    fn push_stack(&mut self) {
        self.current_stack_depth += 1;
        if self.current_stack_depth > self.max_stack_size {
            self.max_stack_size = self.current_stack_depth;
        }
    }

    fn pop_stack(&mut self) {
        debug_assert!(self.current_stack_depth > 0, "Stack underflow");
        self.current_stack_depth -= 1;
    }

    fn pop_stack_n(&mut self, n: usize) {
        debug_assert!(
            self.current_stack_depth >= n,
            "Stack underflow: trying to pop {} but depth is {}",
            n,
            self.current_stack_depth
        );
        self.current_stack_depth -= n;
    }

    // === Instruction Emission ===

    fn emit(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    /// Emit an instruction that replaces the top two values with one.
    fn emit_binary(&mut self, instruction: Instruction) {
        self.pop_stack_n(2);
        self.emit(instruction);
        self.push_stack();
    }

    // === Pools ===

    /// Add a constant to the pool (or reuse an existing entry).
    fn add_constant(&mut self, value: &Constant) -> Result<u16> {
        let key = PoolKey::of(value).ok_or_else(|| {
            Error::malformed("booleans and null have immediate encodings")
        })?;
        if let Some(&index) = self.constant_map.get(&key) {
            return Ok(index);
        }
        let index = u16::try_from(self.constants.len()).map_err(|_| Error::TooManyConstants)?;
        self.constants.push(value.clone());
        self.constant_map.insert(key, index);
        Ok(index)
    }

    fn add_name(&mut self, name: &str) -> Result<u16> {
        if let Some(&index) = self.name_map.get(name) {
            return Ok(index);
        }
        let index = u16::try_from(self.names.len()).map_err(|_| Error::TooManyConstants)?;
        self.names.push(name.into());
        self.name_map.insert(name.into(), index);
        Ok(index)
    }

    // === Conversions ===

    /// Unwrap a boxed primitive on top of the stack.
    fn unbox(&mut self, ty: StaticType) {
        if ty.is_wrapper() {
            if let Some(primitive) = ty.primitive_kind() {
                self.emit(Instruction::Unbox(primitive));
            }
        }
    }

    /// Convert the numeric value on top of the stack to `to`.
    fn coerce(&mut self, from: StaticType, to: NumericKind) {
        self.unbox(from);
        let Some(from) = from.numeric_kind() else {
            return;
        };
        let conversion = match (from, to) {
            (NumericKind::Int, NumericKind::Long) => Instruction::I2L,
            (NumericKind::Int, NumericKind::Float) => Instruction::I2F,
            (NumericKind::Int, NumericKind::Double) => Instruction::I2D,
            (NumericKind::Long, NumericKind::Float) => Instruction::L2F,
            (NumericKind::Long, NumericKind::Double) => Instruction::L2D,
            (NumericKind::Float, NumericKind::Double) => Instruction::F2D,
            _ => return,
        };
        self.emit(conversion);
    }

    /// Wrap the primitive on top of the stack if `result` is a wrapper.
    fn box_result(&mut self, result: StaticType) {
        if result.is_wrapper() {
            if let Some(primitive) = result.primitive_kind() {
                self.emit(Instruction::Box(primitive));
            }
        }
    }

    /// Turn the value on top of the stack into a non-null string.
    fn stringify(&mut self, ty: StaticType) {
        if ty.kind != TypeKind::Str || ty.nullable {
            self.emit(Instruction::Stringify);
        }
    }

    // === Lowering ===

    /// Lower a tree in post-order, with pending work kept on a step stack.
    fn lower<'t>(&mut self, root: &'t TypedOperand<'t>) -> Result<()> {
        let mut steps = vec![Step::Lower(root)];
        while let Some(step) = steps.pop() {
            match step {
                Step::Lower(node) => self.expand(node, &mut steps)?,
                Step::Unbox(ty) => self.unbox(ty),
                Step::Coerce(from, to) => self.coerce(from, to),
                Step::Stringify(ty) => self.stringify(ty),
                Step::Emit(instruction) => self.emit(instruction),
                Step::Unary(instruction) => {
                    self.pop_stack();
                    self.emit(instruction);
                    self.push_stack();
                }
                Step::Binary(instruction) => self.emit_binary(instruction),
                Step::Member(name) => {
                    let index = self.add_name(name)?;
                    self.pop_stack();
                    self.emit(Instruction::GetMember(index));
                    self.push_stack();
                }
                Step::BoxResult(ty) => self.box_result(ty),
            }
        }
        Ok(())
    }

    /// Emit a leaf, or schedule a node's operands and the work that follows them.
    fn expand<'t>(&mut self, node: &'t TypedOperand<'t>, steps: &mut Vec<Step<'t>>) -> Result<()> {
        match *node {
            TypedOperand::Constant { index, .. } => {
                let literals = self.literals;
                let literal = literals
                    .get(index)
                    .ok_or_else(|| Error::malformed("literal index out of range"))?;
                self.lower_constant(literal)?;
            }

            TypedOperand::Reference { slot, .. } => {
                self.emit(Instruction::LoadLocal(slot));
                self.push_stack();
            }

            TypedOperand::Unary {
                operand,
                op,
                result,
            } => {
                let instruction = match (op, result.kind) {
                    (UnaryOp::Plus, _) => None,
                    (UnaryOp::Neg, TypeKind::Int) => Some(Instruction::NegInt),
                    (UnaryOp::Neg, TypeKind::Long) => Some(Instruction::NegLong),
                    (UnaryOp::Neg, TypeKind::Float) => Some(Instruction::NegFloat),
                    (UnaryOp::Neg, TypeKind::Double) => Some(Instruction::NegDouble),
                    (UnaryOp::Not, _) => Some(Instruction::Not),
                    (UnaryOp::BitNot, TypeKind::Int) => Some(Instruction::BitNotInt),
                    (UnaryOp::BitNot, TypeKind::Long) => Some(Instruction::BitNotLong),
                    _ => return Err(Error::mismatch_unary(op.symbol(), result)),
                };
                if let Some(instruction) = instruction {
                    steps.push(Step::Unary(instruction));
                }
                schedule(steps, &[Step::Lower(operand), Step::Unbox(operand.result_type())]);
            }

            TypedOperand::Member { owner, name, .. } => {
                schedule(steps, &[Step::Lower(owner), Step::Member(name)]);
            }

            TypedOperand::Binary {
                left,
                right,
                op,
                result,
            } => self.expand_binary(left, right, op, result, steps)?,
        }
        Ok(())
    }

    fn lower_constant(&mut self, value: &Constant) -> Result<()> {
        let instruction = match value {
            // Use immediate encoding for small integers
            Constant::Int(i) if i8::try_from(*i).is_ok() => Instruction::ConstInt(*i as i8),
            Constant::Boolean(true) => Instruction::ConstTrue,
            Constant::Boolean(false) => Instruction::ConstFalse,
            Constant::Null => Instruction::ConstNull,
            other => Instruction::ConstLoad(self.add_constant(other)?),
        };
        self.emit(instruction);
        self.push_stack();
        Ok(())
    }

    fn expand_binary<'t>(
        &mut self,
        left: &'t TypedOperand<'t>,
        right: &'t TypedOperand<'t>,
        op: BinaryOp,
        result: StaticType,
        steps: &mut Vec<Step<'t>>,
    ) -> Result<()> {
        let (lt, rt) = (left.result_type(), right.result_type());
        let mismatch = || Error::mismatch_binary(op.symbol(), lt, rt);
        let (l, r) = (Step::Lower(left), Step::Lower(right));

        // String concatenation
        if op == BinaryOp::Add && result.is_string() {
            let concat = Step::Binary(Instruction::Concat);
            schedule(steps, &[l, Step::Stringify(lt), r, Step::Stringify(rt), concat]);
            return Ok(());
        }

        if let Some(cmp) = ComparisonOp::from_binary(op) {
            let kind = if op.is_equality() {
                equality(lt, rt).ok_or_else(mismatch)?
            } else {
                Equality::Numeric
            };
            match kind {
                Equality::Numeric => {
                    let common = promoted(lt, rt).ok_or_else(mismatch)?;
                    let compare = Step::Binary(match common {
                        NumericKind::Int => Instruction::IntCmpOp(cmp),
                        NumericKind::Long => Instruction::LongCmpOp(cmp),
                        NumericKind::Float => Instruction::FloatCmpOp(cmp),
                        NumericKind::Double => Instruction::DoubleCmpOp(cmp),
                    });
                    let (lc, rc) = (Step::Coerce(lt, common), Step::Coerce(rt, common));
                    schedule(steps, &[l, lc, r, rc, compare]);
                }
                Equality::Boolean => {
                    let compare = Step::Binary(Instruction::BoolCmpOp(cmp));
                    schedule(steps, &[l, Step::Unbox(lt), r, Step::Unbox(rt), compare]);
                }
                Equality::Reference => {
                    schedule(steps, &[l, r, Step::Binary(Instruction::RefCmpOp(cmp))]);
                }
            }
            return Ok(());
        }

        if op.is_lazy() {
            // Both sides are evaluated; no short-circuit jumps
            let logical = Step::Binary(if op == BinaryOp::And {
                Instruction::And
            } else {
                Instruction::Or
            });
            schedule(steps, &[l, Step::Unbox(lt), r, Step::Unbox(rt), logical]);
            return Ok(());
        }

        let code = binop_code(op).ok_or_else(mismatch)?;

        if op.is_bitwise() && result.is_boolean() {
            let apply = Step::Binary(Instruction::BoolBinOp(code));
            schedule(
                steps,
                &[l, Step::Unbox(lt), r, Step::Unbox(rt), apply, Step::BoxResult(result)],
            );
            return Ok(());
        }

        if op.is_shift() {
            let kind = lt.numeric_kind().ok_or_else(mismatch)?;
            let apply = Step::Binary(numeric_binop(kind, code));
            if rt.kind == TypeKind::Long {
                let narrow = Step::Emit(Instruction::L2I);
                schedule(steps, &[l, Step::Unbox(lt), r, Step::Unbox(rt), narrow, apply]);
            } else {
                schedule(steps, &[l, Step::Unbox(lt), r, Step::Unbox(rt), apply]);
            }
            return Ok(());
        }

        // Arithmetic and integral bitwise
        let kind = result.numeric_kind().ok_or_else(mismatch)?;
        let apply = Step::Binary(numeric_binop(kind, code));
        schedule(
            steps,
            &[
                l,
                Step::Coerce(lt, kind),
                r,
                Step::Coerce(rt, kind),
                apply,
                Step::BoxResult(result),
            ],
        );
        Ok(())
    }
}

/// Pending lowering work.
#[derive(Clone, Copy)]
enum Step<'t> {
    Lower(&'t TypedOperand<'t>),
    Unbox(StaticType),
    Coerce(StaticType, NumericKind),
    Stringify(StaticType),
    /// An instruction that leaves the stack depth unchanged.
    Emit(Instruction),
    /// Replaces the top value.
    Unary(Instruction),
    /// Replaces the top two values with one.
    Binary(Instruction),
    Member(&'t str),
    BoxResult(StaticType),
}

/// Queue `plan` so that its first step runs next.
fn schedule<'t>(steps: &mut Vec<Step<'t>>, plan: &[Step<'t>]) {
    steps.extend(plan.iter().rev().copied());
}

fn promoted(left: StaticType, right: StaticType) -> Option<NumericKind> {
    Some(left.numeric_kind()?.promote(right.numeric_kind()?))
}

fn numeric_binop(kind: NumericKind, code: u8) -> Instruction {
    match kind {
        NumericKind::Int => Instruction::IntBinOp(code),
        NumericKind::Long => Instruction::LongBinOp(code),
        NumericKind::Float => Instruction::FloatBinOp(code),
        NumericKind::Double => Instruction::DoubleBinOp(code),
    }
}
