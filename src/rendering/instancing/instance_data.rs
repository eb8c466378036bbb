use glam::Mat4;

/// Per-instance vertex data. This should match the instance attributes declared
/// by the prop shaders.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceData {
    pub model_matrix: Mat4,
}

impl InstanceData {
    pub const SIZE: u64 = std::mem::size_of::<InstanceData>() as u64;

    pub fn new(model_matrix: Mat4) -> Self {
        Self { model_matrix }
    }
}
