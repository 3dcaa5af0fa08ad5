use log::{debug, trace};

use crate::device::SerialDevice;
use crate::memory::SegmentMemory;

use super::{
    Instruction, Opcode, ProcessorError, ProcessorState, RegisterManager, StepResult,
    UnsignedOperations, WordOperations,
};

/// Executes the program held in segment 0 against an eight-register file
pub struct Processor<D: SerialDevice> {
    memory: SegmentMemory,
    registers: RegisterManager,
    program_counter: u32,
    state: ProcessorState,
    steps: u64,
    ops: UnsignedOperations,
    device: D,
}

impl<D: SerialDevice> Processor<D> {
    /// Value placed in the input register when the input stream is exhausted
    pub const END_OF_INPUT: u32 = u32::MAX;

    /// Largest register value accepted by the output operation
    pub const MAX_OUTPUT: u32 = u8::MAX as u32;

    pub fn new(memory: SegmentMemory, device: D) -> Self {
        Self {
            memory,
            registers: RegisterManager::default(),
            program_counter: 0,
            state: ProcessorState::Running,
            steps: 0,
            ops: UnsignedOperations,
            device,
        }
    }

    /// Steps until the program halts or faults, returning the number of executed
    /// instructions. Device output is flushed in either case.
    pub fn run(&mut self) -> Result<u64, ProcessorError> {
        let result = loop {
            match self.step() {
                Ok(StepResult::Continue) => (),
                Ok(StepResult::Halt) => break Ok(self.steps),
                Err(e) => break Err(e),
            }
        };

        let flushed = self.device.flush();
        let steps = result?;
        flushed?;

        debug!("halted after {steps} instructions");
        Ok(steps)
    }

    /// Runs a single fetch-decode-execute cycle. Any fault halts the processor.
    pub fn step(&mut self) -> Result<StepResult, ProcessorError> {
        if self.state == ProcessorState::Halted {
            return Ok(StepResult::Halt);
        }

        match self.execute() {
            Ok(res) => {
                self.steps += 1;
                if res == StepResult::Halt {
                    self.state = ProcessorState::Halted;
                }
                Ok(res)
            }
            Err(e) => {
                self.state = ProcessorState::Halted;
                debug!(
                    "fault at program counter {} after {} instructions - {e}",
                    self.program_counter, self.steps
                );
                debug!("registers at fault: {}", self.registers);
                Err(e)
            }
        }
    }

    fn execute(&mut self) -> Result<StepResult, ProcessorError> {
        let pc = self.program_counter;
        let inst = Instruction::new(self.memory.read(SegmentMemory::PROGRAM_SEGMENT, pc)?);
        self.program_counter = pc.wrapping_add(1);

        trace!("[{pc:08x}] {inst}");

        let op = match inst.opcode() {
            Some(op) => op,
            None => {
                return Err(ProcessorError::InvalidOpcode {
                    opcode: inst.opcode_bits(),
                    word: inst.get_word(),
                });
            }
        };

        // Operands are read before the operation writes any register
        let (a, b, c) = (inst.reg_a(), inst.reg_b(), inst.reg_c());
        let rb = self.registers.get(b);
        let rc = self.registers.get(c);

        match op {
            Opcode::ConditionalMove => {
                if rc != 0 {
                    self.registers.set(a, rb);
                }
            }
            Opcode::SegmentLoad => {
                let val = self.memory.read(rb, rc)?;
                self.registers.set(a, val);
            }
            Opcode::SegmentStore => {
                let ra = self.registers.get(a);
                self.memory.write(ra, rb, rc)?;
            }
            Opcode::Add => self.registers.set(a, self.ops.add(rb, rc)),
            Opcode::Multiply => self.registers.set(a, self.ops.mul(rb, rc)),
            Opcode::Divide => {
                let val = self.ops.div(rb, rc)?;
                self.registers.set(a, val);
            }
            Opcode::Nand => self.registers.set(a, self.ops.nand(rb, rc)),
            Opcode::Halt => return Ok(StepResult::Halt),
            Opcode::MapSegment => {
                let id = self.memory.allocate(rc)?;
                self.registers.set(b, id);
            }
            Opcode::UnmapSegment => {
                if rc == SegmentMemory::PROGRAM_SEGMENT {
                    return Err(ProcessorError::UnmapProgramSegment);
                }
                self.memory.free(rc)?;
            }
            Opcode::Output => {
                if rc > Self::MAX_OUTPUT {
                    return Err(ProcessorError::InvalidOutputValue(rc));
                }
                self.device.write_byte(rc as u8)?;
            }
            Opcode::Input => {
                let val = match self.device.read_byte()? {
                    Some(v) => v as u32,
                    None => Self::END_OF_INPUT,
                };
                self.registers.set(c, val);
            }
            Opcode::LoadProgram => {
                if rb != SegmentMemory::PROGRAM_SEGMENT {
                    self.memory.replace_segment_zero(rb)?;
                }
                self.program_counter = rc;
            }
            Opcode::LoadImmediate => self.registers.set(inst.load_register(), inst.immediate()),
        }

        Ok(StepResult::Continue)
    }

    pub fn registers(&self) -> &RegisterManager {
        &self.registers
    }

    pub fn memory(&self) -> &SegmentMemory {
        &self.memory
    }

    pub fn program_counter(&self) -> u32 {
        self.program_counter
    }

    pub fn state(&self) -> ProcessorState {
        self.state
    }

    /// Number of instructions completed so far
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn into_device(self) -> D {
        self.device
    }
}
