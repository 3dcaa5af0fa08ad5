mod serial_io;

use std::io;

use thiserror::Error;

pub use serial_io::{BufferedDevice, StreamDevice};

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("Unable to read input byte - {0}")]
    Read(io::Error),
    #[error("Unable to write output byte - {0}")]
    Write(io::Error),
}

/// Byte-oriented input and output attached to the processor
pub trait SerialDevice {
    /// Reads the next input byte, returning `None` at the end of the input stream
    fn read_byte(&mut self) -> Result<Option<u8>, DeviceError>;

    /// Writes a single output byte
    fn write_byte(&mut self, val: u8) -> Result<(), DeviceError>;

    /// Pushes any buffered output to the underlying sink
    fn flush(&mut self) -> Result<(), DeviceError> {
        Ok(())
    }
}

impl<T: SerialDevice + ?Sized> SerialDevice for &mut T {
    fn read_byte(&mut self) -> Result<Option<u8>, DeviceError> {
        (**self).read_byte()
    }

    fn write_byte(&mut self, val: u8) -> Result<(), DeviceError> {
        (**self).write_byte(val)
    }

    fn flush(&mut self) -> Result<(), DeviceError> {
        (**self).flush()
    }
}
