mod free_pool;
mod loader;
mod segment;
mod segment_memory;

use thiserror::Error;

pub use free_pool::FreeIdPool;
pub use loader::{load_program, read_program, LoadError};
pub use segment::Segment;
pub use segment_memory::SegmentMemory;

/// Identifier of a mapped segment
pub type SegmentId = u32;

/// Provides error conditions for segment accesses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MemoryError {
    #[error("Unmapped Segment {0}")]
    UnmappedSegment(SegmentId),
    #[error("Offset {offset} out of bounds for segment {segment} of length {length}")]
    OffsetBounds {
        segment: SegmentId,
        offset: u32,
        length: u32,
    },
    #[error("Unable to allocate a segment of {words} words")]
    AllocationFailed { words: usize },
    #[error("Segment identifiers exhausted")]
    SegmentIdsExhausted,
}

impl MemoryError {
    /// Attaches the segment id to an offset error raised by a bare [`Segment`]
    pub(crate) fn in_segment(self, id: SegmentId) -> Self {
        match self {
            Self::OffsetBounds { offset, length, .. } => Self::OffsetBounds {
                segment: id,
                offset,
                length,
            },
            other => other,
        }
    }
}
