use std::collections::BTreeMap;

use wgpu::BufferUsages;

use crate::rendering::draw_list::{DrawList, DrawableId, InstancedDrawable};
use crate::rendering::instancing::InstanceData;

struct GpuInstanceBuffer {
    buffer: wgpu::Buffer,
    capacity: u64,
}

/// GPU copies of every drawable's instance transforms.
///
/// CPU writes only flag buffers dirty; `sync` uploads each dirty buffer once, so
/// a load that adds thousands of instances costs one upload per drawable.
#[derive(Default)]
pub struct GpuInstanceBuffers {
    buffers: BTreeMap<DrawableId, GpuInstanceBuffer>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub created: usize,
    pub released: usize,
    pub uploaded: usize,
}

impl GpuInstanceBuffers {
    pub fn new() -> Self {
        Self::default()
    }

    fn create_buffer(device: &wgpu::Device, drawable: &InstancedDrawable) -> GpuInstanceBuffer {
        let capacity = drawable.instances.capacity().max(1) as u64;

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("Instance buffer ({})", drawable.label)),
            size: InstanceData::SIZE * capacity,
            usage: BufferUsages::VERTEX | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        GpuInstanceBuffer { buffer, capacity }
    }

    /// Mirrors `draw_list` onto the GPU: buffers for new drawables are created,
    /// buffers for removed drawables are released, and dirty instance data is
    /// uploaded and marked clean.
    pub fn sync(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        draw_list: &mut DrawList,
    ) -> SyncReport {
        let mut report = SyncReport::default();

        let before = self.buffers.len();
        self.buffers.retain(|&id, _| draw_list.contains(id));
        report.released = before - self.buffers.len();

        for (id, drawable) in draw_list.iter_mut() {
            let gpu_buffer = self.buffers.entry(id).or_insert_with(|| {
                report.created += 1;
                Self::create_buffer(device, drawable)
            });

            if !drawable.instances.is_dirty() {
                continue;
            }

            let live = drawable.instances.live();
            debug_assert!(live.len() as u64 <= gpu_buffer.capacity);
            if !live.is_empty() {
                queue.write_buffer(&gpu_buffer.buffer, 0, bytemuck::cast_slice(live));
                report.uploaded += 1;
            }
            drawable.instances.mark_clean();
        }

        if report != SyncReport::default() {
            log::debug!(
                "Instance sync: {} created, {} released, {} uploaded",
                report.created,
                report.released,
                report.uploaded
            );
        }

        report
    }

    pub fn buffer(&self, id: DrawableId) -> Option<&wgpu::Buffer> {
        self.buffers.get(&id).map(|gpu_buffer| &gpu_buffer.buffer)
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }
}
