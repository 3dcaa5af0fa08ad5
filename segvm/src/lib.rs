//! Segmented-memory bytecode machine.
//!
//! A program is loaded into segment 0 of a [`memory::SegmentMemory`] and executed by a
//! [`cpu::Processor`] against an eight-register file until it halts or faults. Byte
//! input and output go through a [`device::SerialDevice`].

pub mod cpu;
pub mod device;
pub mod memory;
