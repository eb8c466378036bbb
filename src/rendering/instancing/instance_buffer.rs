use glam::Mat4;

use crate::rendering::instancing::instance_data::InstanceData;

/// CPU-side transform slots for one instanced drawable.
///
/// The slot count is fixed at construction. Slots past `len()` have never been
/// written and are not drawn.
#[derive(Debug, Clone)]
pub struct InstanceBuffer {
    slots: Box<[InstanceData]>,
    len: usize,
    dirty: bool,
}

impl InstanceBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: vec![<InstanceData as bytemuck::Zeroable>::zeroed(); capacity].into_boxed_slice(),
            len: 0,
            dirty: false,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Writes `matrix` into `slot` and flags the buffer for upload. Returns false
    /// if the slot is out of range.
    pub fn write(&mut self, slot: usize, matrix: Mat4) -> bool {
        let Some(target) = self.slots.get_mut(slot) else {
            return false;
        };

        *target = InstanceData::new(matrix);
        self.len = self.len.max(slot + 1);
        self.dirty = true;
        true
    }

    pub fn get(&self, slot: usize) -> Option<Mat4> {
        self.live().get(slot).map(|instance| instance.model_matrix)
    }

    /// The written prefix of the buffer, in slot order.
    pub fn live(&self) -> &[InstanceData] {
        &self.slots[..self.len]
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn writes_mark_dirty_and_extend_live_range() {
        let mut buffer = InstanceBuffer::with_capacity(4);
        assert!(buffer.is_empty());
        assert!(!buffer.is_dirty());

        let matrix = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        assert!(buffer.write(0, matrix));
        assert!(buffer.is_dirty());
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.get(0), Some(matrix));
        assert_eq!(buffer.get(1), None);

        buffer.mark_clean();
        assert!(!buffer.is_dirty());
    }

    #[test]
    fn out_of_range_writes_are_rejected() {
        let mut buffer = InstanceBuffer::with_capacity(1);
        assert!(!buffer.write(1, Mat4::IDENTITY));
        assert_eq!(buffer.len(), 0);
        assert!(!buffer.is_dirty());
        assert_eq!(buffer.capacity(), 1);
    }
}
