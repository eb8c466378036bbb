use glam::Mat4;

use crate::rendering::config::BatchConfig;
use crate::rendering::draw_list::{DrawList, DrawableId, InstancedDrawable};
use crate::scene_graph::object3d::ObjectId;
use crate::scene_graph::scene::Scene;
use crate::scene_graph::surface::Surface;

/// One drawable part of a batched prop, positioned relative to the prop's root.
#[derive(Debug, Clone)]
pub struct PartDescriptor {
    pub surface: Surface,
    pub local_offset: Mat4,
    pub source_name: String,
}

/// Instanced transform storage for every prop of one type.
///
/// Capacity and template arrive independently, in either order. Once both are
/// known the batch registers one drawable per part ("built"), and every added
/// instance writes one composed matrix into each of them.
#[derive(Debug)]
pub struct Batch {
    type_tag: String,
    parts: Vec<PartDescriptor>,
    capacity: u32,
    count: u32,
    template_captured: bool,
    drawables: Vec<DrawableId>,
    built: bool,
    rejected: u32,
    cast_shadow: bool,
    receive_shadow: bool,
    frustum_culled: bool,
}

impl Batch {
    pub fn new(type_tag: impl Into<String>, config: &BatchConfig) -> Self {
        Self {
            type_tag: type_tag.into(),
            parts: Vec::new(),
            capacity: 0,
            count: 0,
            template_captured: false,
            drawables: Vec::new(),
            built: false,
            rejected: 0,
            cast_shadow: config.cast_shadows,
            receive_shadow: config.receive_shadows,
            frustum_culled: config.frustum_culled,
        }
    }

    pub fn type_tag(&self) -> &str {
        &self.type_tag
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn has_template(&self) -> bool {
        self.template_captured
    }

    pub fn is_built(&self) -> bool {
        self.built
    }

    pub fn parts(&self) -> &[PartDescriptor] {
        &self.parts
    }

    /// Drawables registered for this batch, in part order. Empty unless built.
    pub fn drawable_ids(&self) -> &[DrawableId] {
        &self.drawables
    }

    /// Instances turned away because the batch was full.
    pub fn rejected(&self) -> u32 {
        self.rejected
    }

    /// Grows capacity to at least `new_capacity`; it never shrinks.
    ///
    /// With a template present this rebuilds the buffers, which drops every
    /// instance written so far and resets `count` to zero.
    pub fn resize(&mut self, new_capacity: u32, draw_list: &mut DrawList) {
        self.capacity = self.capacity.max(new_capacity);

        if self.template_captured && self.capacity > 0 {
            self.build(draw_list);
        }
    }

    /// Captures the part layout from the prop rooted at `root`.
    ///
    /// `root_world` must be the root's settled world matrix, and every
    /// descendant's world matrix must be current. Only the first call has any
    /// effect.
    pub fn set_template(
        &mut self,
        scene: &Scene,
        root: ObjectId,
        root_world: Mat4,
        draw_list: &mut DrawList,
    ) {
        if self.template_captured {
            return;
        }

        let root_inverse = root_world.inverse();
        let mut parts = Vec::new();

        scene.traverse(root, &mut |_, object| {
            if let Some(surface) = object.as_surface() {
                parts.push(PartDescriptor {
                    surface: *surface,
                    local_offset: root_inverse * object.transform.world_matrix(),
                    source_name: object.name.clone(),
                });
            }
        });

        if parts.is_empty() {
            log::warn!(
                "Template for {} has no drawable surfaces; its instances will be invisible",
                self.type_tag
            );
        }

        log::debug!(
            "Captured {} template with {} parts",
            self.type_tag,
            parts.len()
        );

        self.parts = parts;
        self.template_captured = true;

        if self.capacity > 0 {
            self.build(draw_list);
        }
    }

    /// Writes `world * offset` for every part into the next free slot.
    pub fn add_instance(&mut self, world: Mat4, draw_list: &mut DrawList) -> bool {
        if !self.template_captured {
            log::warn!("Batch {} has no template yet", self.type_tag);
            return false;
        }

        if self.count >= self.capacity {
            log::warn!(
                "Batch {} is full ({} instances), dropping instance",
                self.type_tag,
                self.capacity
            );
            self.rejected += 1;
            return false;
        }

        if !self.built {
            log::warn!("Batch {} has been disposed and not rebuilt", self.type_tag);
            return false;
        }

        if let Some(&missing) = self.drawables.iter().find(|&&id| !draw_list.contains(id)) {
            log::warn!(
                "Batch {} lost drawable {:?}; disposing until the next resize",
                self.type_tag,
                missing
            );
            self.dispose(draw_list);
            return false;
        }

        let slot = self.count as usize;
        for (part, &drawable_id) in self.parts.iter().zip(&self.drawables) {
            if let Some(drawable) = draw_list.get_mut(drawable_id) {
                drawable.instances.write(slot, world * part.local_offset);
            }
        }

        self.count += 1;
        true
    }

    /// Unregisters every part drawable and forgets written instances. The
    /// template and capacity survive, so `resize` can rebuild.
    pub fn dispose(&mut self, draw_list: &mut DrawList) {
        for drawable_id in self.drawables.drain(..) {
            draw_list.remove(drawable_id);
        }
        self.built = false;
        self.count = 0;
    }

    fn build(&mut self, draw_list: &mut DrawList) {
        self.dispose(draw_list);

        for (index, part) in self.parts.iter().enumerate() {
            let mut drawable = InstancedDrawable::new(
                format!("{} part {} ({})", self.type_tag, index, part.source_name),
                part.surface,
                self.capacity as usize,
            );
            drawable.cast_shadow = self.cast_shadow;
            drawable.receive_shadow = self.receive_shadow;
            drawable.frustum_culled = self.frustum_culled;

            self.drawables.push(draw_list.insert(drawable));
        }
        self.built = true;

        log::debug!(
            "Built {} batch: {} parts x {} slots",
            self.type_tag,
            self.parts.len(),
            self.capacity
        );
    }
}
