use crate::rendering::instancing::BatchSource;
use crate::scene_graph::object3d::ObjectId;

/// A prop placed in the world: its type tag and the root of its visuals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedEntity {
    pub type_tag: String,
    pub root: ObjectId,
}

impl PlacedEntity {
    pub fn new(type_tag: impl Into<String>, root: ObjectId) -> Self {
        Self {
            type_tag: type_tag.into(),
            root,
        }
    }
}

impl BatchSource for PlacedEntity {
    fn type_tag(&self) -> &str {
        &self.type_tag
    }

    fn root(&self) -> ObjectId {
        self.root
    }
}
