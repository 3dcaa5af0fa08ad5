use super::SegmentId;

/// Stack of released segment ids. The most recently released id is handed out first.
#[derive(Debug, Clone, Default)]
pub struct FreeIdPool {
    ids: Vec<SegmentId>,
}

impl FreeIdPool {
    pub fn push(&mut self, id: SegmentId) {
        self.ids.push(id);
    }

    pub fn pop(&mut self) -> Option<SegmentId> {
        self.ids.pop()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
