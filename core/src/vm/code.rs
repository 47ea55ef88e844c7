use crate::{String, Vec, compiler::StaticType, operand::Constant, vm::Instruction};

/// A compiled expression, ready for a stack machine.
pub struct Code {
    /// Pool for literals that have no immediate encoding, deduplicated.
    pub constants: Vec<Constant>,
    /// Member names referenced by `GetMember`, deduplicated.
    pub names: Vec<String>,
    pub instructions: Vec<Instruction>,
    /// Static type of the value left by `Return`.
    pub result_type: StaticType,
    pub max_stack_size: usize,
}

impl core::fmt::Debug for Code {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "Code {{")?;
        writeln!(f, "  result_type: {}", self.result_type)?;
        writeln!(f, "  max_stack_size: {}", self.max_stack_size)?;

        if !self.constants.is_empty() {
            writeln!(f, "  constants: [")?;
            for (i, constant) in self.constants.iter().enumerate() {
                writeln!(f, "    [{}] = {:?}", i, constant)?;
            }
            writeln!(f, "  ]")?;
        } else {
            writeln!(f, "  constants: []")?;
        }

        if !self.names.is_empty() {
            writeln!(f, "  names: [")?;
            for (i, name) in self.names.iter().enumerate() {
                writeln!(f, "    [{}] = {}", i, name)?;
            }
            writeln!(f, "  ]")?;
        } else {
            writeln!(f, "  names: []")?;
        }

        writeln!(f, "  instructions:")?;
        for (addr, instr) in self.instructions.iter().enumerate() {
            match instr {
                Instruction::ConstLoad(idx) => match self.constants.get(*idx as usize) {
                    Some(value) => writeln!(f, "    {:4}  {:?}  ; {:?}", addr, instr, value)?,
                    None => writeln!(f, "    {:4}  {:?}", addr, instr)?,
                },
                Instruction::GetMember(idx) => match self.names.get(*idx as usize) {
                    Some(name) => writeln!(f, "    {:4}  {:?}  ; .{}", addr, instr, name)?,
                    None => writeln!(f, "    {:4}  {:?}", addr, instr)?,
                },
                _ => writeln!(f, "    {:4}  {:?}", addr, instr)?,
            }
        }

        write!(f, "}}")
    }
}
