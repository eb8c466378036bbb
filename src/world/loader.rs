use std::collections::BTreeMap;

use crate::rendering::draw_list::{DrawList, InstancedDrawable};
use crate::rendering::instancing::BatchRegistry;
use crate::scene_graph::scene::Scene;
use crate::world::entity::PlacedEntity;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    /// Entities drawn through a batch.
    pub batched: usize,
    /// Entities registered one surface at a time.
    pub individual: usize,
}

/// Drives the load phase: declares every capacity up front, batches what it
/// can and registers everything else as individual drawables.
pub struct WorldLoader<'a> {
    registry: &'a mut BatchRegistry,
}

impl<'a> WorldLoader<'a> {
    pub fn new(registry: &'a mut BatchRegistry) -> Self {
        Self { registry }
    }

    pub fn load(&mut self, scene: &Scene, entities: &[PlacedEntity]) -> LoadReport {
        let mut counts: BTreeMap<&str, u32> = BTreeMap::new();
        for entity in entities {
            *counts.entry(entity.type_tag.as_str()).or_default() += 1;
        }

        // All capacities go in before the first add, since growing a populated
        // batch discards its instances.
        self.registry.init_batches(counts.iter().map(|(&tag, &n)| (tag, n)));

        let mut report = LoadReport::default();
        for entity in entities {
            if self.registry.add(scene, entity) {
                report.batched += 1;
            } else {
                let mut draw_list = self.registry.draw_list().borrow_mut();
                register_individually(scene, &mut draw_list, entity);
                report.individual += 1;
            }
        }

        log::info!(
            "Loaded {} entities: {} batched, {} drawn individually",
            entities.len(),
            report.batched,
            report.individual
        );

        report
    }
}

/// Registers each surface of `entity` as its own single-instance drawable.
fn register_individually(scene: &Scene, draw_list: &mut DrawList, entity: &PlacedEntity) {
    if scene.refresh_object_hierarchy(entity.root).is_none() {
        log::warn!(
            "Skipping {} entity with a missing scene object",
            entity.type_tag
        );
        return;
    }

    scene.traverse(entity.root, &mut |_, object| {
        if let Some(surface) = object.as_surface() {
            draw_list.insert(InstancedDrawable::single(
                format!("{} ({})", entity.type_tag, object.name),
                *surface,
                object.transform.world_matrix(),
            ));
        }
    });
}
