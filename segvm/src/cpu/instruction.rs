use core::fmt;

use thiserror::Error;

use super::{register::Register, Opcode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InstructionError {
    #[error("Immediate {0} does not fit in {bits} bits", bits = Instruction::NUM_IMM_BITS)]
    ImmediateRange(u32),
    #[error("{0} does not take three register arguments")]
    NotThreeRegister(Opcode),
}

// Bit Formatting:
// | 31 30 29 28 | 27 26 25 | 24 ... 9 | 8  7  6 | 5  4  3 | 2  1  0 |
// | Opcode      | Unused              | Reg A   | Reg B   | Reg C   |
// | Opcode (13) | Reg     | Immediate Value                          |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    word: u32,
}

impl Instruction {
    const OPCODE_SHIFT: u32 = 28;
    const OPCODE_MASK: u32 = 0xF;

    const REG_A_SHIFT: u32 = 6;
    const REG_B_SHIFT: u32 = 3;
    const REG_C_SHIFT: u32 = 0;
    const REG_IMM_SHIFT: u32 = 25;

    pub const NUM_IMM_BITS: u32 = 25;
    pub const IMM_MAX: u32 = (1 << Self::NUM_IMM_BITS) - 1;

    pub fn new(word: u32) -> Self {
        Self { word }
    }

    /// Encodes an instruction using the register-triplet layout
    pub fn three_register(
        op: Opcode,
        a: Register,
        b: Register,
        c: Register,
    ) -> Result<Self, InstructionError> {
        if op == Opcode::LoadImmediate {
            return Err(InstructionError::NotThreeRegister(op));
        }

        Ok(Self::new(
            (op.to_bits() << Self::OPCODE_SHIFT)
                | ((a.get_index() as u32) << Self::REG_A_SHIFT)
                | ((b.get_index() as u32) << Self::REG_B_SHIFT)
                | ((c.get_index() as u32) << Self::REG_C_SHIFT),
        ))
    }

    /// Encodes a load-immediate instruction
    pub fn load_immediate(reg: Register, value: u32) -> Result<Self, InstructionError> {
        if value > Self::IMM_MAX {
            return Err(InstructionError::ImmediateRange(value));
        }

        Ok(Self::new(
            (Opcode::LoadImmediate.to_bits() << Self::OPCODE_SHIFT)
                | ((reg.get_index() as u32) << Self::REG_IMM_SHIFT)
                | value,
        ))
    }

    /// Provides the raw opcode field, which may lie outside the defined opcodes
    pub fn opcode_bits(&self) -> u32 {
        (self.word >> Self::OPCODE_SHIFT) & Self::OPCODE_MASK
    }

    pub fn opcode(&self) -> Option<Opcode> {
        Opcode::try_from(self.opcode_bits()).ok()
    }

    pub fn reg_a(&self) -> Register {
        Register::from_field(self.word >> Self::REG_A_SHIFT)
    }

    pub fn reg_b(&self) -> Register {
        Register::from_field(self.word >> Self::REG_B_SHIFT)
    }

    pub fn reg_c(&self) -> Register {
        Register::from_field(self.word >> Self::REG_C_SHIFT)
    }

    /// Destination register for the load-immediate layout
    pub fn load_register(&self) -> Register {
        Register::from_field(self.word >> Self::REG_IMM_SHIFT)
    }

    pub fn immediate(&self) -> u32 {
        self.word & Self::IMM_MAX
    }

    pub fn get_word(&self) -> u32 {
        self.word
    }
}

impl From<u32> for Instruction {
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

impl From<Instruction> for u32 {
    fn from(value: Instruction) -> Self {
        value.word
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.opcode() {
            Some(op) => op,
            None => return write!(f, ".word 0x{:08x}", self.word),
        };

        let (a, b, c) = (self.reg_a(), self.reg_b(), self.reg_c());

        match op {
            Opcode::Halt => write!(f, "{op}"),
            Opcode::LoadImmediate => {
                write!(f, "{op} {} {}", self.load_register(), self.immediate())
            }
            Opcode::MapSegment | Opcode::LoadProgram => write!(f, "{op} {b} {c}"),
            Opcode::UnmapSegment | Opcode::Output | Opcode::Input => write!(f, "{op} {c}"),
            _ => write!(f, "{op} {a} {b} {c}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reg(i: usize) -> Register {
        Register::try_from(i).unwrap()
    }

    #[test]
    fn test_three_register_fields() {
        let inst = Instruction::three_register(Opcode::Add, reg(1), reg(2), reg(3)).unwrap();

        assert_eq!(inst.get_word(), 0x3000_0053);
        assert_eq!(inst.opcode(), Some(Opcode::Add));
        assert_eq!(inst.reg_a(), reg(1));
        assert_eq!(inst.reg_b(), reg(2));
        assert_eq!(inst.reg_c(), reg(3));
    }

    #[test]
    fn test_load_immediate_fields() {
        let inst = Instruction::load_immediate(reg(1), 65).unwrap();

        assert_eq!(inst.get_word(), 0xD200_0041);
        assert_eq!(inst.opcode(), Some(Opcode::LoadImmediate));
        assert_eq!(inst.load_register(), reg(1));
        assert_eq!(inst.immediate(), 65);

        let max = Instruction::load_immediate(reg(7), Instruction::IMM_MAX).unwrap();
        assert_eq!(max.get_word(), 0xDFFF_FFFF);
        assert_eq!(max.immediate(), Instruction::IMM_MAX);
    }

    #[test]
    fn test_encoding_errors() {
        assert_eq!(
            Instruction::load_immediate(reg(0), 1 << 25),
            Err(InstructionError::ImmediateRange(1 << 25))
        );
        assert_eq!(
            Instruction::three_register(Opcode::LoadImmediate, reg(0), reg(0), reg(0)),
            Err(InstructionError::NotThreeRegister(Opcode::LoadImmediate))
        );
    }

    #[test]
    fn test_unused_bits_ignored() {
        // Bits 27 through 9 set, registers a=7 b=0 c=5
        let inst = Instruction::new(0x6FFF_FFC5);
        assert_eq!(inst.opcode(), Some(Opcode::Nand));
        assert_eq!(inst.reg_a(), reg(7));
        assert_eq!(inst.reg_b(), reg(0));
        assert_eq!(inst.reg_c(), reg(5));
    }

    #[test]
    fn test_invalid_opcode_bits() {
        let inst = Instruction::new(0xE000_0000);
        assert_eq!(inst.opcode_bits(), 14);
        assert_eq!(inst.opcode(), None);
        assert_eq!(inst.to_string(), ".word 0xe0000000");
    }

    #[test]
    fn test_display() {
        let cases = [
            (
                Instruction::three_register(Opcode::ConditionalMove, reg(1), reg(2), reg(3)),
                "cmov r1 r2 r3",
            ),
            (
                Instruction::three_register(Opcode::Halt, reg(0), reg(0), reg(0)),
                "halt",
            ),
            (
                Instruction::three_register(Opcode::MapSegment, reg(0), reg(2), reg(3)),
                "map r2 r3",
            ),
            (
                Instruction::three_register(Opcode::Output, reg(0), reg(0), reg(1)),
                "out r1",
            ),
            (Instruction::load_immediate(reg(4), 58), "lv r4 58"),
        ];

        for (inst, text) in cases {
            assert_eq!(inst.unwrap().to_string(), text);
        }
    }
}
