use glam::Vec4;
use id_arena::Id;

pub type GeometryId = Id<Geometry>;
pub type MaterialId = Id<Material>;

/// Shared vertex data handle. Vertex generation happens elsewhere; the scene only
/// needs a stable identity that many surfaces can point at.
#[derive(Debug, Clone)]
pub struct Geometry {
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct Material {
    pub name: String,
    pub base_color: Vec4,
    pub roughness: f32,
}

/// A renderable geometry + material pair. Both are references into the scene's
/// arenas, so copying a surface never copies vertex or material data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Surface {
    pub geometry: GeometryId,
    pub material: MaterialId,
}
