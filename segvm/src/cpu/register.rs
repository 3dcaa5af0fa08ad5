use core::fmt;

use thiserror::Error;

/// One of the eight general-purpose registers
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Register(u8);

impl Register {
    pub const NUM_REGISTERS: usize = 8;

    const FIELD_MASK: u32 = Self::NUM_REGISTERS as u32 - 1;

    pub const fn get_index(&self) -> usize {
        self.0 as usize
    }

    /// Builds a register from the low three bits of a decoded field
    pub(crate) const fn from_field(field: u32) -> Self {
        Self((field & Self::FIELD_MASK) as u8)
    }

    pub fn all() -> impl Iterator<Item = Self> {
        (0..Self::NUM_REGISTERS as u8).map(Self)
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

impl TryFrom<usize> for Register {
    type Error = RegisterError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        if value < Self::NUM_REGISTERS {
            Ok(Self(value as u8))
        } else {
            Err(RegisterError::UnknownRegister(value))
        }
    }
}

impl TryFrom<u32> for Register {
    type Error = RegisterError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::try_from(value as usize)
    }
}

impl TryFrom<&str> for Register {
    type Error = RegisterError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let idx = value
            .strip_prefix('r')
            .or_else(|| value.strip_prefix('R'))
            .and_then(|v| v.parse::<usize>().ok())
            .ok_or_else(|| RegisterError::BadRegisterName(value.to_string()))?;
        Self::try_from(idx)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegisterError {
    #[error("Unknown Register {0}")]
    UnknownRegister(usize),
    #[error("Bad Register Name '{0}'")]
    BadRegisterName(String),
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub struct RegisterManager {
    registers: [u32; Self::REGISTER_COUNT],
}

impl RegisterManager {
    pub const REGISTER_COUNT: usize = Register::NUM_REGISTERS;

    pub fn get(&self, reg: Register) -> u32 {
        self.registers[reg.get_index()]
    }

    pub fn set(&mut self, reg: Register, val: u32) {
        self.registers[reg.get_index()] = val;
    }

    pub fn get_state(&self) -> [u32; Self::REGISTER_COUNT] {
        self.registers
    }
}

impl fmt::Display for RegisterManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, reg) in Register::all().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{reg}=0x{:08x}", self.get(reg))?;
        }
        Ok(())
    }
}
