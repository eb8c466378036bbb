use std::collections::BTreeMap;

use glam::Mat4;

use crate::rendering::instancing::InstanceBuffer;
use crate::scene_graph::surface::{GeometryId, MaterialId, Surface};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DrawableId(u32);

/// One instanced draw: a geometry/material pair plus the transforms it is drawn
/// with. Single props are just drawables with one slot.
#[derive(Debug, Clone)]
pub struct InstancedDrawable {
    pub label: String,
    pub geometry: GeometryId,
    pub material: MaterialId,
    pub instances: InstanceBuffer,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
    pub frustum_culled: bool,
}

impl InstancedDrawable {
    pub fn new(label: impl Into<String>, surface: Surface, capacity: usize) -> Self {
        Self {
            label: label.into(),
            geometry: surface.geometry,
            material: surface.material,
            instances: InstanceBuffer::with_capacity(capacity),
            cast_shadow: true,
            receive_shadow: true,
            frustum_culled: true,
        }
    }

    /// A drawable holding exactly one instance at `world_matrix`.
    pub fn single(label: impl Into<String>, surface: Surface, world_matrix: Mat4) -> Self {
        let mut drawable = Self::new(label, surface, 1);
        drawable.instances.write(0, world_matrix);
        drawable
    }
}

/// The collection the renderer walks every frame. Ordered by id, so drawables are
/// visited in registration order.
#[derive(Debug, Default)]
pub struct DrawList {
    drawables: BTreeMap<DrawableId, InstancedDrawable>,
    next_id: u32,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, drawable: InstancedDrawable) -> DrawableId {
        let id = DrawableId(self.next_id);
        self.next_id += 1;
        self.drawables.insert(id, drawable);
        id
    }

    pub fn remove(&mut self, id: DrawableId) -> Option<InstancedDrawable> {
        self.drawables.remove(&id)
    }

    pub fn get(&self, id: DrawableId) -> Option<&InstancedDrawable> {
        self.drawables.get(&id)
    }

    pub fn get_mut(&mut self, id: DrawableId) -> Option<&mut InstancedDrawable> {
        self.drawables.get_mut(&id)
    }

    pub fn contains(&self, id: DrawableId) -> bool {
        self.drawables.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (DrawableId, &InstancedDrawable)> {
        self.drawables.iter().map(|(&id, drawable)| (id, drawable))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (DrawableId, &mut InstancedDrawable)> {
        self.drawables
            .iter_mut()
            .map(|(&id, drawable)| (id, drawable))
    }

    pub fn len(&self) -> usize {
        self.drawables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drawables.is_empty()
    }

    /// Sum of live instances over every drawable.
    pub fn instance_count(&self) -> usize {
        self.drawables
            .values()
            .map(|drawable| drawable.instances.len())
            .sum()
    }

    pub fn dirty_count(&self) -> usize {
        self.drawables
            .values()
            .filter(|drawable| drawable.instances.is_dirty())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene_graph::scene::Scene;
    use crate::scene_graph::surface::{Geometry, Material};
    use glam::{Vec3, Vec4};

    fn surface() -> Surface {
        let mut scene = Scene::new();
        Surface {
            geometry: scene.add_geometry(Geometry {
                name: "slab".into(),
            }),
            material: scene.add_material(Material {
                name: "concrete".into(),
                base_color: Vec4::splat(0.6),
                roughness: 0.9,
            }),
        }
    }

    #[test]
    fn ids_are_never_reused() {
        let mut list = DrawList::new();
        let first = list.insert(InstancedDrawable::new("a", surface(), 2));
        assert!(list.remove(first).is_some());
        let second = list.insert(InstancedDrawable::new("b", surface(), 2));

        assert_ne!(first, second);
        assert!(!list.contains(first));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn single_drawables_count_as_one_dirty_instance() {
        let mut list = DrawList::new();
        let matrix = Mat4::from_translation(Vec3::Z);
        let id = list.insert(InstancedDrawable::single("prop", surface(), matrix));

        assert_eq!(list.instance_count(), 1);
        assert_eq!(list.dirty_count(), 1);
        assert_eq!(list.get(id).unwrap().instances.get(0), Some(matrix));

        for (_, drawable) in list.iter_mut() {
            drawable.instances.mark_clean();
        }
        assert_eq!(list.dirty_count(), 0);
        assert_eq!(list.iter().count(), 1);
    }
}
