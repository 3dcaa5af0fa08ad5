use core::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    ConditionalMove,
    SegmentLoad,
    SegmentStore,
    Add,
    Multiply,
    Divide,
    Nand,
    Halt,
    MapSegment,
    UnmapSegment,
    Output,
    Input,
    LoadProgram,
    LoadImmediate,
}

impl Opcode {
    pub const ALL: &[Self] = &[
        Self::ConditionalMove,
        Self::SegmentLoad,
        Self::SegmentStore,
        Self::Add,
        Self::Multiply,
        Self::Divide,
        Self::Nand,
        Self::Halt,
        Self::MapSegment,
        Self::UnmapSegment,
        Self::Output,
        Self::Input,
        Self::LoadProgram,
        Self::LoadImmediate,
    ];

    pub const fn to_bits(&self) -> u32 {
        match self {
            Self::ConditionalMove => 0,
            Self::SegmentLoad => 1,
            Self::SegmentStore => 2,
            Self::Add => 3,
            Self::Multiply => 4,
            Self::Divide => 5,
            Self::Nand => 6,
            Self::Halt => 7,
            Self::MapSegment => 8,
            Self::UnmapSegment => 9,
            Self::Output => 10,
            Self::Input => 11,
            Self::LoadProgram => 12,
            Self::LoadImmediate => 13,
        }
    }

    pub const fn mnemonic(&self) -> &'static str {
        match self {
            Self::ConditionalMove => "cmov",
            Self::SegmentLoad => "sload",
            Self::SegmentStore => "sstore",
            Self::Add => "add",
            Self::Multiply => "mul",
            Self::Divide => "div",
            Self::Nand => "nand",
            Self::Halt => "halt",
            Self::MapSegment => "map",
            Self::UnmapSegment => "unmap",
            Self::Output => "out",
            Self::Input => "in",
            Self::LoadProgram => "loadp",
            Self::LoadImmediate => "lv",
        }
    }

    pub fn from_mnemonic(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|op| op.mnemonic() == s)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mnemonic())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Invalid Opcode {0}")]
pub struct InvalidOpcode(pub u32);

impl TryFrom<u32> for Opcode {
    type Error = InvalidOpcode;

    fn try_from(val: u32) -> Result<Self, Self::Error> {
        Self::ALL
            .get(val as usize)
            .copied()
            .ok_or(InvalidOpcode(val))
    }
}
