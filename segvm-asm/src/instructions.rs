use std::collections::HashMap;

use segvm::cpu::{Instruction, Opcode, Register};

use crate::{immediate::parse_imm_u32, AssemblerError};

/// Operands written after each mnemonic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandShape {
    /// `op ra rb rc`
    ThreeRegister,
    /// `op`
    NoArgs,
    /// `op rb rc`
    RegisterBC,
    /// `op rc`
    RegisterC,
    /// `op ra value`
    Immediate,
}

impl OperandShape {
    pub fn for_opcode(op: Opcode) -> Self {
        match op {
            Opcode::Halt => Self::NoArgs,
            Opcode::MapSegment | Opcode::LoadProgram => Self::RegisterBC,
            Opcode::UnmapSegment | Opcode::Output | Opcode::Input => Self::RegisterC,
            Opcode::LoadImmediate => Self::Immediate,
            _ => Self::ThreeRegister,
        }
    }

    pub fn num_args(&self) -> usize {
        match self {
            Self::ThreeRegister => 3,
            Self::NoArgs => 0,
            Self::RegisterBC | Self::Immediate => 2,
            Self::RegisterC => 1,
        }
    }
}

fn parse_register(arg: &str) -> Result<Register, AssemblerError> {
    Ok(Register::try_from(arg)?)
}

/// Resolves a value operand as a label name or a numeric literal
pub fn resolve_value(arg: &str, labels: &HashMap<String, u32>) -> Result<u32, AssemblerError> {
    if let Some(addr) = labels.get(arg) {
        Ok(*addr)
    } else if crate::is_valid_label(arg) {
        Err(AssemblerError::UnknownLabel(arg.to_string()))
    } else {
        Ok(parse_imm_u32(arg)?)
    }
}

/// Encodes a mnemonic and its operands into an instruction word
pub fn encode(
    op: Opcode,
    args: &[String],
    labels: &HashMap<String, u32>,
) -> Result<Instruction, AssemblerError> {
    let shape = OperandShape::for_opcode(op);
    if args.len() != shape.num_args() {
        return Err(AssemblerError::ArgumentCountMismatch(
            args.len(),
            shape.num_args(),
        ));
    }

    let r0 = Register::default();

    let inst = match shape {
        OperandShape::ThreeRegister => Instruction::three_register(
            op,
            parse_register(&args[0])?,
            parse_register(&args[1])?,
            parse_register(&args[2])?,
        )?,
        OperandShape::NoArgs => Instruction::three_register(op, r0, r0, r0)?,
        OperandShape::RegisterBC => Instruction::three_register(
            op,
            r0,
            parse_register(&args[0])?,
            parse_register(&args[1])?,
        )?,
        OperandShape::RegisterC => {
            Instruction::three_register(op, r0, r0, parse_register(&args[0])?)?
        }
        OperandShape::Immediate => Instruction::load_immediate(
            parse_register(&args[0])?,
            resolve_value(&args[1], labels)?,
        )?,
    };

    Ok(inst)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(a: &[&str]) -> Vec<String> {
        a.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_encode_shapes() {
        let labels = HashMap::new();

        let cases = [
            (Opcode::Add, args(&["r1", "r2", "r3"]), 0x3000_0053),
            (Opcode::Halt, args(&[]), 0x7000_0000),
            (Opcode::MapSegment, args(&["r2", "r3"]), 0x8000_0013),
            (Opcode::Output, args(&["r1"]), 0xA000_0001),
            (Opcode::LoadImmediate, args(&["r1", "'A'"]), 0xD200_0041),
        ];

        for (op, a, word) in cases {
            assert_eq!(encode(op, &a, &labels).unwrap().get_word(), word);
        }
    }

    #[test]
    fn test_encode_labels() {
        let mut labels = HashMap::new();
        labels.insert("loop".to_string(), 12);

        let inst = encode(Opcode::LoadImmediate, &args(&["r7", "loop"]), &labels).unwrap();
        assert_eq!(inst.immediate(), 12);

        assert!(matches!(
            encode(Opcode::LoadImmediate, &args(&["r7", "missing"]), &labels),
            Err(AssemblerError::UnknownLabel(_))
        ));
    }

    #[test]
    fn test_encode_errors() {
        let labels = HashMap::new();

        assert!(matches!(
            encode(Opcode::Add, &args(&["r1", "r2"]), &labels),
            Err(AssemblerError::ArgumentCountMismatch(2, 3))
        ));
        assert!(matches!(
            encode(Opcode::Output, &args(&["r9"]), &labels),
            Err(AssemblerError::Register(_))
        ));
        assert!(matches!(
            encode(Opcode::LoadImmediate, &args(&["r1", "0x2000000"]), &labels),
            Err(AssemblerError::Instruction(_))
        ));
    }
}
