pub mod object3d;
pub mod scene;
pub mod surface;
pub mod transform;
