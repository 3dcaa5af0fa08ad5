mod instruction;
mod opcode;
mod operations;
mod processor;
mod register;

use core::fmt;

use thiserror::Error;

use crate::device::DeviceError;
use crate::memory::MemoryError;

pub use instruction::{Instruction, InstructionError};
pub use opcode::{InvalidOpcode, Opcode};
pub use operations::{OperationError, UnsignedOperations, WordOperations};
pub use processor::Processor;
pub use register::{Register, RegisterError, RegisterManager};

/// Fatal conditions that stop the processor
#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("Invalid Opcode {opcode} in word 0x{word:08x}")]
    InvalidOpcode { opcode: u32, word: u32 },
    #[error("Memory Fault - {0}")]
    Memory(#[from] MemoryError),
    #[error("Division By Zero")]
    DivisionByZero,
    #[error("Invalid Output Value {0} exceeds 255")]
    InvalidOutputValue(u32),
    #[error("Cannot unmap the program segment")]
    UnmapProgramSegment,
    #[error("Device Failure - {0}")]
    Device(#[from] DeviceError),
}

impl ProcessorError {
    pub fn kind(&self) -> FaultKind {
        match self {
            Self::InvalidOpcode { .. } => FaultKind::InvalidOpcode,
            Self::Memory(_) | Self::UnmapProgramSegment => FaultKind::MemoryFault,
            Self::DivisionByZero => FaultKind::DivisionByZero,
            Self::InvalidOutputValue(_) => FaultKind::InvalidOutputValue,
            Self::Device(_) => FaultKind::DeviceFailure,
        }
    }
}

impl From<OperationError> for ProcessorError {
    fn from(value: OperationError) -> Self {
        match value {
            OperationError::DivideByZero => Self::DivisionByZero,
        }
    }
}

/// Flat classification of a [`ProcessorError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    InvalidOpcode,
    MemoryFault,
    DivisionByZero,
    InvalidOutputValue,
    DeviceFailure,
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::InvalidOpcode => "invalid opcode",
            Self::MemoryFault => "memory fault",
            Self::DivisionByZero => "division by zero",
            Self::InvalidOutputValue => "invalid output value",
            Self::DeviceFailure => "device failure",
        };

        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorState {
    Running,
    Halted,
}

/// Outcome of a single fetch-decode-execute cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepResult {
    Continue,
    Halt,
}
