pub mod config;
pub mod draw_list;
pub mod gpu_instances;
pub mod instancing;
