use std::collections::VecDeque;
use std::io::{self, Read, Write};

use super::{DeviceError, SerialDevice};

/// Serial device over host byte streams, such as standard input and output
pub struct StreamDevice<R: Read, W: Write> {
    input: R,
    output: W,
}

impl<R: Read, W: Write> StreamDevice<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }
}

impl<R: Read, W: Write> SerialDevice for StreamDevice<R, W> {
    /// Pending output is flushed before blocking on input
    fn read_byte(&mut self) -> Result<Option<u8>, DeviceError> {
        self.output.flush().map_err(DeviceError::Write)?;

        let mut buf = [0u8; 1];
        loop {
            match self.input.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(buf[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => (),
                Err(e) => return Err(DeviceError::Read(e)),
            }
        }
    }

    fn write_byte(&mut self, val: u8) -> Result<(), DeviceError> {
        self.output.write_all(&[val]).map_err(DeviceError::Write)
    }

    fn flush(&mut self) -> Result<(), DeviceError> {
        self.output.flush().map_err(DeviceError::Write)
    }
}

/// In-memory serial device with a queued input and a collected output
#[derive(Debug, Default, Clone)]
pub struct BufferedDevice {
    input_queue: VecDeque<u8>,
    output_queue: Vec<u8>,
}

impl BufferedDevice {
    /// Constructs a new device with the provided pending input
    pub fn new(input: &[u8]) -> Self {
        Self {
            input_queue: input.iter().copied().collect(),
            output_queue: Vec::new(),
        }
    }

    /// Pushes the input value into the input queue
    pub fn push_input(&mut self, val: u8) {
        self.input_queue.push_back(val);
    }

    /// Determines if there is input in the queue
    pub fn has_input(&self) -> bool {
        !self.input_queue.is_empty()
    }

    /// Determines if any output has been written
    pub fn has_output(&self) -> bool {
        !self.output_queue.is_empty()
    }

    pub fn output(&self) -> &[u8] {
        &self.output_queue
    }

    /// Removes and returns all output written so far
    pub fn take_output(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.output_queue)
    }
}

impl SerialDevice for BufferedDevice {
    fn read_byte(&mut self) -> Result<Option<u8>, DeviceError> {
        Ok(self.input_queue.pop_front())
    }

    fn write_byte(&mut self, val: u8) -> Result<(), DeviceError> {
        self.output_queue.push(val);
        Ok(())
    }
}
