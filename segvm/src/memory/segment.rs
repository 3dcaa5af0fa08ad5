use super::MemoryError;

/// A fixed-length array of words owned by the segment table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segment {
    data: Vec<u32>,
}

impl Segment {
    /// Defines a new segment with zero in each word
    pub fn zeroed(len: u32) -> Result<Self, MemoryError> {
        Self::zeroed_words(len as usize)
    }

    fn zeroed_words(len: usize) -> Result<Self, MemoryError> {
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| MemoryError::AllocationFailed { words: len })?;
        data.resize(len, 0);
        Ok(Self { data })
    }

    pub fn from_words(data: Vec<u32>) -> Self {
        Self { data }
    }

    /// Provides the word at the requested offset
    pub fn get(&self, offset: u32) -> Result<u32, MemoryError> {
        match self.data.get(offset as usize) {
            Some(v) => Ok(*v),
            None => Err(self.bounds_error(offset)),
        }
    }

    /// Sets the word at the requested offset, returning the previous value
    pub fn set(&mut self, offset: u32, val: u32) -> Result<u32, MemoryError> {
        let length = self.len();
        self.data
            .get_mut(offset as usize)
            .map(|v| std::mem::replace(v, val))
            .ok_or(MemoryError::OffsetBounds {
                segment: 0,
                offset,
                length,
            })
    }

    /// Provides the number of words in the segment
    pub fn len(&self) -> u32 {
        self.data.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn words(&self) -> &[u32] {
        &self.data
    }

    fn bounds_error(&self, offset: u32) -> MemoryError {
        MemoryError::OffsetBounds {
            segment: 0,
            offset,
            length: self.len(),
        }
    }
}
