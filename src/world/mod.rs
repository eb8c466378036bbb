pub mod entity;
pub mod loader;
pub mod props;
