use glam::{Quat, Vec3, Vec4};

use crate::scene_graph::object3d::{Object3D, ObjectId};
use crate::scene_graph::scene::Scene;
use crate::scene_graph::surface::{Geometry, Material, MaterialId, Surface};
use crate::scene_graph::transform::Transform;

const PINE_TRUNK_HEIGHT: f32 = 2.0;
const PINE_TIERS: usize = 3;

const BARRIER_HEIGHT: f32 = 0.9;
const BARRIER_WIDTH: f32 = 1.7;

/// Type tags this library knows how to build.
pub const PROP_TYPES: &[&str] = &["pineTree", "sidewalk", "constructionBarrier", "fireHydrant"];

/// Shared geometry and material handles for the procedural props. Every prop of
/// a type points at the same handles, which is what makes them batchable.
pub struct PropLibrary {
    pine_trunk: Surface,
    pine_tiers: [Surface; PINE_TIERS],
    sidewalk_slab: Surface,
    barrier_panel: Surface,
    barrier_post: Surface,
    barrier_foot: Surface,
    hydrant_body: Surface,
    hydrant_cap: Surface,
}

fn material(scene: &mut Scene, name: &str, rgb: [f32; 3], roughness: f32) -> MaterialId {
    scene.add_material(Material {
        name: name.to_string(),
        base_color: Vec4::new(rgb[0], rgb[1], rgb[2], 1.0),
        roughness,
    })
}

fn surface(scene: &mut Scene, geometry_name: &str, material: MaterialId) -> Surface {
    Surface {
        geometry: scene.add_geometry(Geometry {
            name: geometry_name.to_string(),
        }),
        material,
    }
}

impl PropLibrary {
    pub fn new(scene: &mut Scene) -> Self {
        let bark = material(scene, "bark", [0.29, 0.235, 0.192], 0.9);
        let needles = material(scene, "needles", [0.102, 0.29, 0.102], 0.8);
        let concrete = material(scene, "concrete", [0.6, 0.6, 0.58], 0.95);
        let stripes = material(scene, "barrier stripes", [0.95, 0.66, 0.0], 0.55);
        let frame = material(scene, "barrier frame", [0.87, 0.87, 0.87], 0.35);
        let rubber = material(scene, "rubber", [0.133, 0.133, 0.133], 0.9);
        let hydrant_red = material(scene, "hydrant paint", [0.8, 0.1, 0.08], 0.5);

        Self {
            pine_trunk: surface(scene, "pine trunk cylinder", bark),
            pine_tiers: [
                surface(scene, "pine cone tier 0", needles),
                surface(scene, "pine cone tier 1", needles),
                surface(scene, "pine cone tier 2", needles),
            ],
            sidewalk_slab: surface(scene, "sidewalk slab", concrete),
            barrier_panel: surface(scene, "barrier panel", stripes),
            barrier_post: surface(scene, "barrier post", frame),
            barrier_foot: surface(scene, "barrier foot", rubber),
            hydrant_body: surface(scene, "hydrant body", hydrant_red),
            hydrant_cap: surface(scene, "hydrant cap", hydrant_red),
        }
    }

    /// Builds a prop of `type_tag` at `position`, rotated by `yaw` around Y and
    /// uniformly scaled. Returns `None` for unknown type tags.
    pub fn spawn(
        &self,
        scene: &mut Scene,
        type_tag: &str,
        position: Vec3,
        yaw: f32,
        scale: f32,
    ) -> Option<ObjectId> {
        let build: fn(&Self, &mut Scene, ObjectId) = match type_tag {
            "pineTree" => Self::build_pine_tree,
            "sidewalk" => Self::build_sidewalk,
            "constructionBarrier" => Self::build_construction_barrier,
            "fireHydrant" => Self::build_fire_hydrant,
            _ => {
                log::warn!("No builder for prop type {}", type_tag);
                return None;
            }
        };

        let root = scene.add_object(Object3D::group(type_tag, Transform::default()));
        build(self, scene, root);

        scene.set_object_transform(root, position, Quat::from_rotation_y(yaw), scale);
        Some(root)
    }

    fn add_part(scene: &mut Scene, parent: ObjectId, name: &str, at: Vec3, surface: Surface) {
        scene.add_child(
            parent,
            Object3D::surface(name, Transform::from_translation(at), surface),
        );
    }

    /// Trunk plus stacked cones that overlap, narrow and shorten as they rise.
    fn build_pine_tree(&self, scene: &mut Scene, root: ObjectId) {
        Self::add_part(
            scene,
            root,
            "trunk",
            Vec3::Y * (PINE_TRUNK_HEIGHT / 2.0),
            self.pine_trunk,
        );

        let foliage = scene.add_child(root, Object3D::group("foliage", Transform::default()));

        let mut y = PINE_TRUNK_HEIGHT * 0.6;
        let mut height = 2.0;
        for (tier, surface) in self.pine_tiers.iter().enumerate() {
            Self::add_part(
                scene,
                foliage,
                &format!("cone {}", tier),
                Vec3::Y * (y + height / 2.0),
                *surface,
            );
            y += height * 0.6;
            height *= 0.8;
        }
    }

    fn build_sidewalk(&self, scene: &mut Scene, root: ObjectId) {
        Self::add_part(scene, root, "slab", Vec3::Y * 0.05, self.sidewalk_slab);
    }

    fn build_construction_barrier(&self, scene: &mut Scene, root: ObjectId) {
        Self::add_part(
            scene,
            root,
            "panel",
            Vec3::Y * (BARRIER_HEIGHT * 0.65),
            self.barrier_panel,
        );

        for (side, x) in [("left", -0.5), ("right", 0.5)] {
            let x = x * BARRIER_WIDTH * 0.9;
            Self::add_part(
                scene,
                root,
                &format!("post {}", side),
                Vec3::new(x, BARRIER_HEIGHT / 2.0, 0.0),
                self.barrier_post,
            );
            Self::add_part(
                scene,
                root,
                &format!("foot {}", side),
                Vec3::new(x, 0.03, 0.0),
                self.barrier_foot,
            );
        }
    }

    fn build_fire_hydrant(&self, scene: &mut Scene, root: ObjectId) {
        Self::add_part(scene, root, "body", Vec3::Y * 0.35, self.hydrant_body);
        Self::add_part(scene, root, "cap", Vec3::Y * 0.75, self.hydrant_cap);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene_graph::object3d::NodeKind;

    fn surface_count(scene: &Scene, root: ObjectId) -> usize {
        let mut count = 0;
        scene.traverse(root, &mut |_, object| {
            if let NodeKind::Surface(_) = object.kind {
                count += 1;
            }
        });
        count
    }

    #[test]
    fn every_listed_type_can_be_spawned() {
        let mut scene = Scene::new();
        let library = PropLibrary::new(&mut scene);

        let expected_parts = [4, 1, 5, 2];
        for (type_tag, parts) in PROP_TYPES.iter().zip(expected_parts) {
            let root = library
                .spawn(&mut scene, type_tag, Vec3::ZERO, 0.0, 1.0)
                .unwrap();
            assert_eq!(surface_count(&scene, root), parts, "{}", type_tag);
        }
    }

    #[test]
    fn unknown_types_spawn_nothing() {
        let mut scene = Scene::new();
        let library = PropLibrary::new(&mut scene);
        assert!(library
            .spawn(&mut scene, "spaceship", Vec3::ZERO, 0.0, 1.0)
            .is_none());
    }

    #[test]
    fn props_of_one_type_share_handles() {
        let mut scene = Scene::new();
        let library = PropLibrary::new(&mut scene);
        let a = library
            .spawn(&mut scene, "pineTree", Vec3::ZERO, 0.0, 1.0)
            .unwrap();
        let b = library
            .spawn(&mut scene, "pineTree", Vec3::X * 4.0, 1.0, 1.2)
            .unwrap();

        let collect = |root: ObjectId| {
            let mut surfaces = Vec::new();
            scene.traverse(root, &mut |_, object| {
                if let Some(surface) = object.as_surface() {
                    surfaces.push(*surface);
                }
            });
            surfaces
        };

        assert_eq!(collect(a), collect(b));
    }

    #[test]
    fn spawned_root_carries_placement() {
        let mut scene = Scene::new();
        let library = PropLibrary::new(&mut scene);
        let root = library
            .spawn(&mut scene, "sidewalk", Vec3::new(3.0, 0.0, -1.0), 0.0, 2.0)
            .unwrap();

        let world = scene.refresh_object_hierarchy(root).unwrap();
        let (scale, _, translation) = world.to_scale_rotation_translation();
        assert!(scale.abs_diff_eq(Vec3::splat(2.0), 1e-5));
        assert!(translation.abs_diff_eq(Vec3::new(3.0, 0.0, -1.0), 1e-5));
    }
}
