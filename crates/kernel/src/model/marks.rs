use slotmap::SparseSecondaryMap;

use crate::topology::brep::FaceId;

/// Faces picked for rendering during the current frame. Kept beside the brush
/// rather than on the faces so that marking never needs mutable access to them.
#[derive(Debug, Clone, Default)]
pub struct RenderMarks {
    marked: SparseSecondaryMap<FaceId, ()>,
}

impl RenderMarks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark(&mut self, face: FaceId) {
        self.marked.insert(face, ());
    }

    pub fn unmark(&mut self, face: FaceId) {
        self.marked.remove(face);
    }

    pub fn is_marked(&self, face: FaceId) -> bool {
        self.marked.contains_key(face)
    }

    pub fn len(&self) -> usize {
        self.marked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marked.is_empty()
    }

    pub fn clear(&mut self) {
        self.marked.clear();
    }
}
