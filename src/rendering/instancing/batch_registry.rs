use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::rendering::config::BatchConfig;
use crate::rendering::draw_list::DrawList;
use crate::rendering::instancing::batch::Batch;
use crate::scene_graph::object3d::ObjectId;
use crate::scene_graph::scene::Scene;

/// Anything the registry can batch: a type tag and the root of its visual
/// hierarchy in the scene.
pub trait BatchSource {
    fn type_tag(&self) -> &str;
    fn root(&self) -> ObjectId;
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchStats {
    pub batches: usize,
    pub instances: u64,
    pub capacity: u64,
    pub rejected: u64,
}

/// Routes capacity declarations and prop insertions to per-type batches.
///
/// Batch drawables are registered into the shared draw list the renderer
/// already walks, so batched and individually drawn props share one path.
pub struct BatchRegistry {
    draw_list: Rc<RefCell<DrawList>>,
    config: BatchConfig,
    batches: BTreeMap<String, Batch>,
}

impl BatchRegistry {
    pub fn new(draw_list: Rc<RefCell<DrawList>>, config: BatchConfig) -> Self {
        Self {
            draw_list,
            config,
            batches: BTreeMap::new(),
        }
    }

    /// The draw list batch drawables are registered into.
    pub fn draw_list(&self) -> &Rc<RefCell<DrawList>> {
        &self.draw_list
    }

    pub fn is_supported(&self, type_tag: &str) -> bool {
        self.config.is_supported(type_tag)
    }

    /// Declares expected instance counts. Types outside the allowlist are ignored
    /// and must be rendered individually by the caller.
    ///
    /// Call this with every count before the first `add`: growing a batch that
    /// already holds instances drops them.
    pub fn init_batches<'a>(&mut self, counts: impl IntoIterator<Item = (&'a str, u32)>) {
        let mut draw_list = self.draw_list.borrow_mut();

        for (type_tag, count) in counts {
            if !self.config.is_supported(type_tag) {
                log::debug!("Not batching unsupported type {}", type_tag);
                continue;
            }

            let config = &self.config;
            let batch = self
                .batches
                .entry(type_tag.to_string())
                .or_insert_with(|| Batch::new(type_tag, config));

            if batch.count() > 0 {
                log::warn!(
                    "Resizing populated batch {}; {} instances will be dropped",
                    type_tag,
                    batch.count()
                );
            }

            batch.resize(count, &mut draw_list);
        }
    }

    /// Adds one prop to its type's batch. The first prop of a type becomes the
    /// template for all of them.
    ///
    /// Returns false when the type was never declared or the batch is full; the
    /// caller then has to draw the prop itself.
    pub fn add(&mut self, scene: &Scene, entity: &impl BatchSource) -> bool {
        let Some(batch) = self.batches.get_mut(entity.type_tag()) else {
            return false;
        };

        let root = entity.root();
        let Some(world) = scene.refresh_object_hierarchy(root) else {
            log::warn!(
                "{} entity references a missing scene object",
                entity.type_tag()
            );
            return false;
        };

        let mut draw_list = self.draw_list.borrow_mut();

        if !batch.has_template() {
            batch.set_template(scene, root, world, &mut draw_list);
        }

        batch.add_instance(world, &mut draw_list)
    }

    /// Batched props are static once inserted, so there is nothing to animate.
    pub fn update(&mut self, _dt: f32) {}

    /// Disposes every batch and forgets all types. Props added afterwards are
    /// rejected until `init_batches` declares their types again.
    pub fn clear(&mut self) {
        let mut draw_list = self.draw_list.borrow_mut();
        for batch in self.batches.values_mut() {
            batch.dispose(&mut draw_list);
        }
        self.batches.clear();
    }

    pub fn batch(&self, type_tag: &str) -> Option<&Batch> {
        self.batches.get(type_tag)
    }

    pub fn batches(&self) -> impl Iterator<Item = &Batch> {
        self.batches.values()
    }

    pub fn stats(&self) -> BatchStats {
        self.batches
            .values()
            .fold(BatchStats::default(), |mut stats, batch| {
                stats.batches += 1;
                stats.instances += u64::from(batch.count());
                stats.capacity += u64::from(batch.capacity());
                stats.rejected += u64::from(batch.rejected());
                stats
            })
    }
}
