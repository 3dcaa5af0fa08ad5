use log::debug;

use super::{load_program, FreeIdPool, LoadError, MemoryError, Segment, SegmentId};

/// Segment table indexed by id, with id 0 holding the running program
#[derive(Debug, Clone)]
pub struct SegmentMemory {
    segments: Vec<Option<Segment>>,
    free_ids: FreeIdPool,
}

impl SegmentMemory {
    pub const PROGRAM_SEGMENT: SegmentId = 0;

    /// Creates the table with the provided program words in segment 0
    pub fn new(program: Vec<u32>) -> Self {
        Self {
            segments: vec![Some(Segment::from_words(program))],
            free_ids: FreeIdPool::default(),
        }
    }

    /// Creates the table from a big-endian program image
    pub fn from_program_bytes(bytes: &[u8]) -> Result<Self, LoadError> {
        Ok(Self::new(load_program(bytes)?))
    }

    /// Maps a new zero-filled segment, reusing the most recently freed id when one is
    /// available and otherwise minting the next sequential id
    pub fn allocate(&mut self, size: u32) -> Result<SegmentId, MemoryError> {
        let seg = Segment::zeroed(size)?;

        let id = if let Some(id) = self.free_ids.pop() {
            self.segments[id as usize] = Some(seg);
            id
        } else {
            let id = SegmentId::try_from(self.segments.len())
                .map_err(|_| MemoryError::SegmentIdsExhausted)?;
            self.segments.push(Some(seg));
            id
        };

        debug!("mapped segment {id} with {size} words");
        Ok(id)
    }

    /// Unmaps the segment and returns its id to the free pool
    pub fn free(&mut self, id: SegmentId) -> Result<(), MemoryError> {
        let slot = self
            .segments
            .get_mut(id as usize)
            .filter(|s| s.is_some())
            .ok_or(MemoryError::UnmappedSegment(id))?;

        *slot = None;
        self.free_ids.push(id);
        debug!("unmapped segment {id}");
        Ok(())
    }

    /// Provides the word at the requested segment offset
    pub fn read(&self, id: SegmentId, offset: u32) -> Result<u32, MemoryError> {
        self.get_segment(id)?
            .get(offset)
            .map_err(|e| e.in_segment(id))
    }

    /// Sets the word at the requested segment offset, returning the previous value
    pub fn write(&mut self, id: SegmentId, offset: u32, val: u32) -> Result<u32, MemoryError> {
        self.get_segment_mut(id)?
            .set(offset, val)
            .map_err(|e| e.in_segment(id))
    }

    /// Provides the number of words in the segment
    pub fn length(&self, id: SegmentId) -> Result<u32, MemoryError> {
        Ok(self.get_segment(id)?.len())
    }

    /// Replaces the program segment with a copy of the given segment
    pub fn replace_segment_zero(&mut self, id: SegmentId) -> Result<(), MemoryError> {
        if id == Self::PROGRAM_SEGMENT {
            return Ok(());
        }

        let program = self.get_segment(id)?.clone();
        debug!("loading program from segment {id} with {} words", program.len());
        self.segments[Self::PROGRAM_SEGMENT as usize] = Some(program);
        Ok(())
    }

    pub fn segment(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.get(id as usize).and_then(Option::as_ref)
    }

    pub fn is_mapped(&self, id: SegmentId) -> bool {
        self.segment(id).is_some()
    }

    /// Provides the number of live segments, including the program segment
    pub fn mapped_count(&self) -> usize {
        self.segments.iter().filter(|s| s.is_some()).count()
    }

    /// Provides the number of released ids waiting for reuse
    pub fn free_ids(&self) -> usize {
        self.free_ids.len()
    }

    fn get_segment(&self, id: SegmentId) -> Result<&Segment, MemoryError> {
        self.segment(id).ok_or(MemoryError::UnmappedSegment(id))
    }

    fn get_segment_mut(&mut self, id: SegmentId) -> Result<&mut Segment, MemoryError> {
        self.segments
            .get_mut(id as usize)
            .and_then(Option::as_mut)
            .ok_or(MemoryError::UnmappedSegment(id))
    }
}

impl Default for SegmentMemory {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_ids_start_above_program() {
        let mut mem = SegmentMemory::new(vec![1, 2, 3]);

        assert_eq!(mem.allocate(10), Ok(1));
        assert_eq!(mem.allocate(0), Ok(2));
        assert_eq!(mem.allocate(5), Ok(3));
        assert_eq!(mem.mapped_count(), 4);
        assert_eq!(mem.length(2), Ok(0));
    }

    #[test]
    fn test_freed_ids_reused_last_first() {
        let mut mem = SegmentMemory::default();

        let i1 = mem.allocate(1).unwrap();
        let i2 = mem.allocate(2).unwrap();
        let i3 = mem.allocate(3).unwrap();

        mem.free(i2).unwrap();
        mem.free(i1).unwrap();
        assert_eq!(mem.free_ids(), 2);

        assert_eq!(mem.allocate(4), Ok(i1));
        assert_eq!(mem.allocate(4), Ok(i2));
        assert_eq!(mem.allocate(4), Ok(i3 + 1));
        assert_eq!(mem.free_ids(), 0);
    }

    #[test]
    fn test_reused_segment_is_zeroed() {
        let mut mem = SegmentMemory::default();
        let id = mem.allocate(4).unwrap();
        mem.write(id, 3, 0xDEAD_BEEF).unwrap();
        mem.free(id).unwrap();

        let id = mem.allocate(8).unwrap();
        assert_eq!(mem.length(id), Ok(8));
        for i in 0..8 {
            assert_eq!(mem.read(id, i), Ok(0));
        }
    }

    #[test]
    fn test_read_write() {
        let mut mem = SegmentMemory::default();
        let id = mem.allocate(3).unwrap();

        assert_eq!(mem.write(id, 2, 99), Ok(0));
        assert_eq!(mem.write(id, 2, 100), Ok(99));
        assert_eq!(mem.read(id, 2), Ok(100));
        assert_eq!(mem.read(id, 0), Ok(0));
    }

    #[test]
    fn test_bounds_faults() {
        let mut mem = SegmentMemory::new(vec![5; 2]);
        let id = mem.allocate(3).unwrap();

        let expected = MemoryError::OffsetBounds {
            segment: id,
            offset: 3,
            length: 3,
        };
        assert_eq!(mem.read(id, 3), Err(expected));
        assert_eq!(mem.write(id, 3, 1), Err(expected));
        assert!(matches!(
            mem.read(0, 2),
            Err(MemoryError::OffsetBounds { segment: 0, .. })
        ));
    }

    #[test]
    fn test_unmapped_faults() {
        let mut mem = SegmentMemory::default();
        let id = mem.allocate(3).unwrap();
        mem.free(id).unwrap();

        assert_eq!(mem.read(id, 0), Err(MemoryError::UnmappedSegment(id)));
        assert_eq!(mem.write(id, 0, 1), Err(MemoryError::UnmappedSegment(id)));
        assert_eq!(mem.length(id), Err(MemoryError::UnmappedSegment(id)));
        assert_eq!(mem.free(id), Err(MemoryError::UnmappedSegment(id)));

        assert_eq!(mem.read(17, 0), Err(MemoryError::UnmappedSegment(17)));
        assert_eq!(mem.free(17), Err(MemoryError::UnmappedSegment(17)));
        assert_eq!(mem.free_ids(), 1);
    }

    #[test]
    fn test_replace_segment_zero() {
        let mut mem = SegmentMemory::new(vec![1, 2, 3, 4]);
        let id = mem.allocate(2).unwrap();
        mem.write(id, 0, 70).unwrap();
        mem.write(id, 1, 71).unwrap();

        mem.replace_segment_zero(id).unwrap();
        assert_eq!(mem.segment(0).unwrap().words(), &[70, 71]);

        // The source remains an independent copy
        mem.write(id, 0, 5).unwrap();
        assert_eq!(mem.read(0, 0), Ok(70));
        assert!(mem.is_mapped(id));
    }

    #[test]
    fn test_replace_segment_zero_with_itself() {
        let mut mem = SegmentMemory::new(vec![9, 8]);
        mem.replace_segment_zero(0).unwrap();
        assert_eq!(mem.segment(0).unwrap().words(), &[9, 8]);
    }

    #[test]
    fn test_replace_segment_zero_unmapped() {
        let mut mem = SegmentMemory::new(vec![9, 8]);
        assert_eq!(
            mem.replace_segment_zero(4),
            Err(MemoryError::UnmappedSegment(4))
        );
        assert_eq!(mem.length(0), Ok(2));
    }

    #[test]
    fn test_from_program_bytes() {
        let mem = SegmentMemory::from_program_bytes(&[0, 0, 0, 7, 0, 0, 1, 0]).unwrap();
        assert_eq!(mem.segment(0).unwrap().words(), &[7, 256]);
        assert!(SegmentMemory::from_program_bytes(&[0, 0, 1]).is_err());
    }
}
