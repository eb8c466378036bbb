use id_arena::Id;

use crate::scene_graph::scene::Scene;
use crate::scene_graph::surface::Surface;
use crate::scene_graph::transform::Transform;

pub type ObjectId = Id<Object3D>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Pure container; only contributes its transform to descendants.
    Group,
    Surface(Surface),
}

pub struct Object3D {
    pub name: String,
    pub transform: Transform,
    pub kind: NodeKind,
    pub parent_id: Option<ObjectId>,
    pub child_ids: Vec<ObjectId>,
}

impl Object3D {
    pub fn group(name: impl Into<String>, transform: Transform) -> Self {
        Self {
            name: name.into(),
            transform,
            ..Default::default()
        }
    }

    pub fn surface(name: impl Into<String>, transform: Transform, surface: Surface) -> Self {
        Self {
            name: name.into(),
            transform,
            kind: NodeKind::Surface(surface),
            ..Default::default()
        }
    }

    pub fn as_surface(&self) -> Option<&Surface> {
        match &self.kind {
            NodeKind::Surface(surface) => Some(surface),
            NodeKind::Group => None,
        }
    }

    pub fn parent<'a>(&self, scene: &'a Scene) -> Option<&'a Object3D> {
        self.parent_id.and_then(|id| scene.get_object(id))
    }

    pub fn children<'a, 'b>(&'a self, scene: &'b Scene) -> impl Iterator<Item = &'b Object3D> + 'b
    where
        'a: 'b,
    {
        self.child_ids
            .iter()
            .filter_map(move |id| scene.get_object(*id))
    }
}

impl Default for Object3D {
    fn default() -> Self {
        Self {
            name: String::new(),
            transform: Transform::default(),
            kind: NodeKind::Group,
            parent_id: None,
            child_ids: Vec::new(),
        }
    }
}
