use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Context;
use glam::Vec3;
use rand::{rngs::StdRng, Rng, SeedableRng};

use worldbatch::rendering::config::BatchConfig;
use worldbatch::rendering::draw_list::DrawList;
use worldbatch::rendering::gpu_instances::GpuInstanceBuffers;
use worldbatch::rendering::instancing::BatchRegistry;
use worldbatch::scene_graph::scene::Scene;
use worldbatch::world::entity::PlacedEntity;
use worldbatch::world::loader::WorldLoader;
use worldbatch::world::props::PropLibrary;

const WORLD_HALF_EXTENT: f32 = 200.0;

const PROP_COUNTS: &[(&str, usize)] = &[
    ("pineTree", 400),
    ("sidewalk", 250),
    ("constructionBarrier", 24),
    ("fireHydrant", 12),
];

fn populate(scene: &mut Scene, rng: &mut StdRng) -> Vec<PlacedEntity> {
    let library = PropLibrary::new(scene);
    let mut entities = Vec::new();

    for &(type_tag, count) in PROP_COUNTS {
        for _ in 0..count {
            let position = Vec3::new(
                rng.gen_range(-WORLD_HALF_EXTENT..WORLD_HALF_EXTENT),
                0.0,
                rng.gen_range(-WORLD_HALF_EXTENT..WORLD_HALF_EXTENT),
            );
            let yaw = rng.gen_range(0.0..std::f32::consts::TAU);
            let scale = rng.gen_range(0.9..1.1);

            if let Some(root) = library.spawn(scene, type_tag, position, yaw, scale) {
                entities.push(PlacedEntity::new(type_tag, root));
            }
        }
    }

    entities
}

async fn create_device() -> anyhow::Result<(wgpu::Device, wgpu::Queue)> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());

    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        })
        .await
        .context("No GPU adapter available")?;

    let (device, queue) = adapter
        .request_device(&wgpu::DeviceDescriptor {
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            label: Some("worldbatch device"),
            memory_hints: Default::default(),
            trace: wgpu::Trace::Off,
        })
        .await
        .context("Failed to create device")?;

    Ok((device, queue))
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let mut rng = StdRng::seed_from_u64(7);
    let mut scene = Scene::new();
    let entities = populate(&mut scene, &mut rng);

    let draw_list = Rc::new(RefCell::new(DrawList::new()));
    let mut registry = BatchRegistry::new(draw_list.clone(), BatchConfig::default());

    let report = WorldLoader::new(&mut registry).load(&scene, &entities);

    for batch in registry.batches() {
        log::info!(
            "{}: {} / {} instances across {} parts",
            batch.type_tag(),
            batch.count(),
            batch.capacity(),
            batch.parts().len()
        );
    }

    let stats = registry.stats();
    println!(
        "{} entities -> {} draws ({} batched into {} batches, {} individual)",
        entities.len(),
        draw_list.borrow().len(),
        report.batched,
        stats.batches,
        report.individual
    );

    match pollster::block_on(create_device()) {
        Ok((device, queue)) => {
            let mut gpu_buffers = GpuInstanceBuffers::new();
            let sync = gpu_buffers.sync(&device, &queue, &mut draw_list.borrow_mut());
            queue.submit([]);

            let draw_list = draw_list.borrow();
            let resident_bytes: u64 = draw_list
                .iter()
                .filter_map(|(id, _)| gpu_buffers.buffer(id))
                .map(|buffer| buffer.size())
                .sum();

            println!(
                "Uploaded {} of {} instance buffers ({} KiB resident)",
                sync.uploaded,
                gpu_buffers.len(),
                resident_bytes / 1024
            );
        }
        Err(err) => log::warn!("Skipping GPU upload: {:#}", err),
    }

    registry.clear();

    Ok(())
}
