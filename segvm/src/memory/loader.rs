use std::io::{self, Read};

use thiserror::Error;

/// Number of bytes packed into each program word
pub const BYTES_PER_WORD: usize = 4;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Unable to read program - {0}")]
    Io(#[from] io::Error),
    #[error("Program length {length} is not a multiple of {BYTES_PER_WORD} bytes")]
    TruncatedWord { length: usize },
}

/// Packs a big-endian byte stream into program words, most-significant byte first.
/// A trailing partial word is rejected rather than padded.
pub fn load_program(bytes: &[u8]) -> Result<Vec<u32>, LoadError> {
    if bytes.len() % BYTES_PER_WORD != 0 {
        return Err(LoadError::TruncatedWord {
            length: bytes.len(),
        });
    }

    Ok(bytes
        .chunks_exact(BYTES_PER_WORD)
        .map(|c| u32::from_be_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

/// Reads the reader to its end and packs the bytes with [`load_program`]
pub fn read_program<R: Read>(mut reader: R) -> Result<Vec<u32>, LoadError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    load_program(&bytes)
}
