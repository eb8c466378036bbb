use glam::{Mat4, Quat, Vec3};
use id_arena::Arena;

use crate::scene_graph::object3d::{Object3D, ObjectId};
use crate::scene_graph::surface::{Geometry, GeometryId, Material, MaterialId};
use crate::scene_graph::transform::Transform;

pub struct Scene {
    pub objects: Arena<Object3D>,
    pub geometries: Arena<Geometry>,
    pub materials: Arena<Material>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            objects: Arena::new(),
            geometries: Arena::new(),
            materials: Arena::new(),
        }
    }

    pub fn add_object(&mut self, object: Object3D) -> ObjectId {
        self.objects.alloc(object)
    }

    /// Allocates `object` and attaches it under `parent`.
    pub fn add_child(&mut self, parent: ObjectId, object: Object3D) -> ObjectId {
        let id = self.add_object(object);
        self.set_object_parent(id, Some(parent));
        id
    }

    pub fn add_geometry(&mut self, geometry: Geometry) -> GeometryId {
        self.geometries.alloc(geometry)
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.alloc(material)
    }

    pub fn get_object(&self, id: ObjectId) -> Option<&Object3D> {
        self.objects.get(id)
    }

    pub fn get_object_by_name(&self, name: &str) -> Option<ObjectId> {
        self.objects
            .iter()
            .find(|(_, object)| object.name == name)
            .map(|(id, _)| id)
    }

    /// Updates all object transforms in hierarchical order
    fn update_transforms(&self) {
        let root_objects = self
            .objects
            .iter()
            .filter(|(_, object)| object.parent_id.is_none())
            .map(|(id, _)| id);

        for root_id in root_objects {
            self.update_object_transform_recursive(root_id, Mat4::IDENTITY, false);
        }
    }

    /// Recomputes dirty world matrices below `object_id`. A recomputed parent
    /// forces all of its descendants to recompute too.
    fn update_object_transform_recursive(
        &self,
        object_id: ObjectId,
        parent_world_matrix: Mat4,
        parent_changed: bool,
    ) {
        let Some(object) = self.objects.get(object_id) else {
            return;
        };

        let changed = parent_changed || object.transform.is_world_dirty();
        if changed {
            let world_matrix = parent_world_matrix * object.transform.local_matrix();
            object.transform.set_world_matrix(world_matrix);
        }

        let world_matrix = object.transform.world_matrix();
        for &child_id in &object.child_ids {
            self.update_object_transform_recursive(child_id, world_matrix, changed);
        }
    }

    /// Settles the world matrix of a single object by walking up its ancestors.
    fn resolve_world_matrix(&self, object_id: ObjectId) -> Option<Mat4> {
        let object = self.objects.get(object_id)?;

        let parent_world_matrix = match object.parent_id {
            Some(parent_id) => self.resolve_world_matrix(parent_id)?,
            None => Mat4::IDENTITY,
        };

        // An ancestor may have been recomputed without this node being flagged,
        // so always recompose instead of trusting the cached value.
        let world_matrix = parent_world_matrix * object.transform.local_matrix();
        object.transform.set_world_matrix(world_matrix);
        Some(world_matrix)
    }

    /// Brings `object_id`, its ancestors and all of its descendants up to date and
    /// returns the object's world matrix. Returns `None` for unknown ids.
    pub fn refresh_object_hierarchy(&self, object_id: ObjectId) -> Option<Mat4> {
        let object = self.objects.get(object_id)?;

        let parent_world_matrix = match object.parent_id {
            Some(parent_id) => self.resolve_world_matrix(parent_id)?,
            None => Mat4::IDENTITY,
        };

        self.update_object_transform_recursive(object_id, parent_world_matrix, true);
        Some(object.transform.world_matrix())
    }

    /// Depth-first, pre-order walk starting at (and including) `root`. Children
    /// are visited in attachment order, so the visit order is stable.
    pub fn traverse(&self, root: ObjectId, visitor: &mut impl FnMut(ObjectId, &Object3D)) {
        let Some(object) = self.objects.get(root) else {
            return;
        };

        visitor(root, object);

        for &child_id in &object.child_ids {
            self.traverse(child_id, visitor);
        }
    }

    /// Invalidates world transforms for an object and all its descendants
    pub fn invalidate_object_hierarchy(&self, object_id: ObjectId) {
        if let Some(object) = self.objects.get(object_id) {
            object.transform.invalidate_world();

            for &child_id in &object.child_ids {
                self.invalidate_object_hierarchy(child_id);
            }
        }
    }

    /// Sets the parent of an object and updates child relationships
    pub fn set_object_parent(&mut self, child_id: ObjectId, new_parent_id: Option<ObjectId>) {
        if let Some(old_parent_id) = self.objects.get(child_id).and_then(|c| c.parent_id) {
            if let Some(old_parent) = self.objects.get_mut(old_parent_id) {
                old_parent.child_ids.retain(|&id| id != child_id);
            }
        }

        if let Some(child) = self.objects.get_mut(child_id) {
            child.parent_id = new_parent_id;

            if let Some(new_parent_id) = new_parent_id {
                if let Some(new_parent) = self.objects.get_mut(new_parent_id) {
                    new_parent.child_ids.push(child_id);
                }
            }
        }

        self.invalidate_object_hierarchy(child_id);
    }

    pub fn set_object_translation(&mut self, object_id: ObjectId, translation: Vec3) {
        if let Some(object) = self.objects.get_mut(object_id) {
            object.transform.set_translation(translation);
        }
        self.invalidate_object_hierarchy(object_id);
    }

    pub fn set_object_rotation(&mut self, object_id: ObjectId, rotation: Quat) {
        if let Some(object) = self.objects.get_mut(object_id) {
            object.transform.set_rotation(rotation);
        }
        self.invalidate_object_hierarchy(object_id);
    }

    pub fn set_object_scale(&mut self, object_id: ObjectId, scale: f32) {
        if let Some(object) = self.objects.get_mut(object_id) {
            object.transform.set_scale(scale);
        }
        self.invalidate_object_hierarchy(object_id);
    }

    pub fn set_object_transform(
        &mut self,
        object_id: ObjectId,
        translation: Vec3,
        rotation: Quat,
        scale: f32,
    ) {
        if let Some(object) = self.objects.get_mut(object_id) {
            object.transform.set_transform(translation, rotation, scale);
        }
        self.invalidate_object_hierarchy(object_id);
    }

    pub fn get_object_transform(&self, object_id: ObjectId) -> Option<&Transform> {
        self.objects.get(object_id).map(|object| &object.transform)
    }

    pub fn late_update(&mut self) {
        self.update_transforms();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene_graph::object3d::NodeKind;
    use crate::scene_graph::surface::Surface;

    fn surface(scene: &mut Scene) -> Surface {
        let geometry = scene.add_geometry(Geometry {
            name: "box".into(),
        });
        let material = scene.add_material(Material {
            name: "grey".into(),
            base_color: glam::Vec4::ONE,
            roughness: 0.5,
        });
        Surface { geometry, material }
    }

    #[test]
    fn parenting_updates_both_sides() {
        let mut scene = Scene::new();
        let root = scene.add_object(Object3D::group("root", Transform::default()));
        let child = scene.add_child(root, Object3D::group("child", Transform::default()));

        let child_object = scene.get_object(child).unwrap();
        assert_eq!(child_object.parent(&scene).unwrap().name, "root");

        let root_object = scene.get_object(root).unwrap();
        let names: Vec<_> = root_object.children(&scene).map(|c| c.name.clone()).collect();
        assert_eq!(names, vec!["child".to_string()]);

        scene.set_object_parent(child, None);
        assert!(scene.get_object(root).unwrap().child_ids.is_empty());
        assert_eq!(scene.get_object(child).unwrap().parent_id, None);
    }

    #[test]
    fn late_update_composes_world_matrices() {
        let mut scene = Scene::new();
        let root = scene.add_object(Object3D::group(
            "root",
            Transform::from_translation(Vec3::new(10.0, 0.0, 0.0)),
        ));
        let child = scene.add_child(
            root,
            Object3D::group("child", Transform::from_translation(Vec3::Y)),
        );

        scene.late_update();

        let world = scene.get_object_transform(child).unwrap().world_matrix();
        assert!(world
            .w_axis
            .truncate()
            .abs_diff_eq(Vec3::new(10.0, 1.0, 0.0), 1e-6));
    }

    #[test]
    fn refresh_propagates_parent_moves_to_descendants() {
        let mut scene = Scene::new();
        let root = scene.add_object(Object3D::group("root", Transform::default()));
        let child = scene.add_child(
            root,
            Object3D::group("child", Transform::from_translation(Vec3::Y)),
        );
        scene.late_update();

        scene.set_object_translation(root, Vec3::new(0.0, 0.0, 5.0));
        let root_world = scene.refresh_object_hierarchy(root).unwrap();
        assert_eq!(root_world, Mat4::from_translation(Vec3::new(0.0, 0.0, 5.0)));

        let child_world = scene.get_object_transform(child).unwrap().world_matrix();
        assert!(child_world
            .w_axis
            .truncate()
            .abs_diff_eq(Vec3::new(0.0, 1.0, 5.0), 1e-6));
    }

    #[test]
    fn rotation_and_scale_setters_reach_descendants() {
        let mut scene = Scene::new();
        let root = scene.add_object(Object3D::group("root", Transform::default()));
        let child = scene.add_child(
            root,
            Object3D::group("child", Transform::from_translation(Vec3::X)),
        );
        scene.late_update();

        scene.set_object_rotation(root, Quat::from_rotation_y(std::f32::consts::FRAC_PI_2));
        assert!(scene.get_object_transform(child).unwrap().is_world_dirty());
        scene.refresh_object_hierarchy(root);
        let child_world = scene.get_object_transform(child).unwrap().world_matrix();
        assert!(child_world
            .w_axis
            .truncate()
            .abs_diff_eq(Vec3::new(0.0, 0.0, -1.0), 1e-6));

        scene.set_object_scale(root, 3.0);
        assert!(scene.get_object_transform(child).unwrap().is_world_dirty());
        scene.refresh_object_hierarchy(root);
        let child_world = scene.get_object_transform(child).unwrap().world_matrix();
        assert!(child_world
            .w_axis
            .truncate()
            .abs_diff_eq(Vec3::new(0.0, 0.0, -3.0), 1e-5));
        assert_eq!(scene.get_object_transform(root).unwrap().scale(), 3.0);
    }

    #[test]
    fn refresh_settles_ancestors_of_a_nested_root() {
        let mut scene = Scene::new();
        let parent = scene.add_object(Object3D::group(
            "parent",
            Transform::from_translation(Vec3::X),
        ));
        let nested = scene.add_child(
            parent,
            Object3D::group("nested", Transform::from_translation(Vec3::X)),
        );

        let world = scene.refresh_object_hierarchy(nested).unwrap();
        assert!(world
            .w_axis
            .truncate()
            .abs_diff_eq(Vec3::new(2.0, 0.0, 0.0), 1e-6));
    }

    #[test]
    fn traverse_is_depth_first_pre_order() {
        let mut scene = Scene::new();
        let surface = surface(&mut scene);

        let root = scene.add_object(Object3D::group("root", Transform::default()));
        let a = scene.add_child(root, Object3D::group("a", Transform::default()));
        scene.add_child(a, Object3D::surface("a1", Transform::default(), surface));
        scene.add_child(root, Object3D::surface("b", Transform::default(), surface));

        let mut visited = Vec::new();
        scene.traverse(root, &mut |_, object| visited.push(object.name.clone()));
        assert_eq!(visited, vec!["root", "a", "a1", "b"]);

        let mut surfaces = 0;
        scene.traverse(root, &mut |_, object| {
            if matches!(object.kind, NodeKind::Surface(_)) {
                surfaces += 1;
            }
        });
        assert_eq!(surfaces, 2);
        assert!(scene.get_object_by_name("a1").is_some());
    }
}
