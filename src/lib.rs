pub mod rendering;
pub mod scene_graph;
pub mod world;

#[cfg(test)]
mod test_log;
