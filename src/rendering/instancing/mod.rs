mod batch;
mod batch_registry;
mod instance_buffer;
mod instance_data;

pub use batch::{Batch, PartDescriptor};
pub use batch_registry::{BatchRegistry, BatchSource, BatchStats};
pub use instance_buffer::InstanceBuffer;
pub use instance_data::InstanceData;
