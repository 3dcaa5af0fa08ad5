use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OperationError {
    #[error("Divide By Zero")]
    DivideByZero,
}

/// Word arithmetic, wrapping modulo 2^32
pub trait WordOperations {
    fn add(&self, a: u32, b: u32) -> u32;
    fn mul(&self, a: u32, b: u32) -> u32;
    fn div(&self, a: u32, b: u32) -> Result<u32, OperationError>;
    fn nand(&self, a: u32, b: u32) -> u32;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct UnsignedOperations;

impl WordOperations for UnsignedOperations {
    fn add(&self, a: u32, b: u32) -> u32 {
        a.wrapping_add(b)
    }

    fn mul(&self, a: u32, b: u32) -> u32 {
        a.wrapping_mul(b)
    }

    fn div(&self, a: u32, b: u32) -> Result<u32, OperationError> {
        a.checked_div(b).ok_or(OperationError::DivideByZero)
    }

    fn nand(&self, a: u32, b: u32) -> u32 {
        !(a & b)
    }
}
