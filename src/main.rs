use std::cell::RefCell;
use std::error::Error;
use std::rc::Rc;
use std::time::Duration;

use glam::Vec4;
use tracing_subscriber::layer::SubscriberExt;

use api_types::device::headless::{DeviceCommand, HeadlessDevice};
use api_types::image::{SamplingMode, TextureCreationOptions, TextureFormat};
use api_types::object_list::{ObjectId, ObjectList};
use api_types::shader::EffectWrapper;
use framegraph::frame_graph::{FrameGraph, FrameGraphOptions};
use passes::blit::CopyToBackbufferColorTask;
use passes::clear::ClearTextureTask;
use passes::cull::CullObjectsTask;
use passes::object_renderer::ObjectRendererTask;
use passes::post_process::PostProcessTask;

const FRAME_COUNT: usize = 3;

/// Builds the demo graph: clear, cull, draw, post process, present.
fn record_scene(frame_graph: &mut FrameGraph, objects: ObjectList, effect: &EffectWrapper) -> Result<(), Box<dyn Error>> {
    let (scene, depth) = {
        let textures = frame_graph.get_texture_manager();
        let mut textures = textures.borrow_mut();
        let scene = textures.create_render_target_texture(
            "scene",
            TextureCreationOptions::percentage(100.0, 100.0).with_format(TextureFormat::Rgba16Float));
        let depth = textures.create_render_target_texture(
            "scene depth",
            TextureCreationOptions::percentage(100.0, 100.0).with_format(TextureFormat::Depth24Stencil8));
        (scene, depth)
    };

    let clear = ClearTextureTask::new("clear scene", frame_graph, scene)
        .with_color(Some(Vec4::new(0.1, 0.1, 0.1, 1.0)));
    let clear_depth = ClearTextureTask::new("clear depth", frame_graph, depth)
        .with_color(None)
        .with_depth_stencil(true, true);
    let cull = CullObjectsTask::new("cull", objects, |object| object.0 % 3 != 0);
    let renderer = ObjectRendererTask::new(
        "opaque",
        frame_graph,
        clear.get_output_texture(),
        cull.get_output_object_list())
        .with_depth(clear_depth.get_output_texture());
    let post_process = PostProcessTask::new(
        "tonemap",
        frame_graph,
        renderer.get_output_texture(),
        Rc::new(effect.clone()))
        .with_sampling_mode(SamplingMode::Nearest);
    let present = CopyToBackbufferColorTask::new("present", post_process.get_output_texture());

    frame_graph.add_task(clear)?;
    frame_graph.add_task(clear_depth)?;
    frame_graph.add_task(cull)?;
    frame_graph.add_task(renderer)?;
    frame_graph.add_task(post_process)?;
    frame_graph.add_task(present)?;
    Ok(())
}

fn run_frames(device: &Rc<RefCell<HeadlessDevice>>, frame_graph: &mut FrameGraph) -> Result<(), Box<dyn Error>> {
    for frame in 0..FRAME_COUNT {
        let _span = tracing::span!(tracing::Level::TRACE, "Frame", frame).entered();
        frame_graph.execute()?;
        let commands = device.borrow_mut().take_commands();
        let draws = commands.iter()
            .filter(|command| matches!(command, DeviceCommand::DrawObjects(_) | DeviceCommand::DrawFullScreen(_)))
            .count();
        log::info!(target: "demo", "Frame {}: {} device commands, {} draws", frame, commands.len(), draws);
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    simple_logger::init_with_level(log::Level::Info)?;
    tracing::subscriber::set_global_default(
        tracing_subscriber::registry().with(tracing_subscriber::fmt::layer())
    )?;

    let device = Rc::new(RefCell::new(HeadlessDevice::new(1280, 720)));
    let options = FrameGraphOptions::default()
        .with_ready_poll_interval(Duration::from_millis(5))
        .with_ready_timeout(Duration::from_secs(2));
    let mut frame_graph = FrameGraph::with_options(device.clone(), options);

    let objects = ObjectList::new();
    objects.set((0..12).map(ObjectId).collect());
    let effect = EffectWrapper::new("tonemap", false);
    record_scene(&mut frame_graph, objects, &effect)?;

    frame_graph.build()?;
    log::info!(target: "demo", "Built {} tasks, {} live textures",
        frame_graph.task_count(), device.borrow().get_live_texture_count());

    // stands in for an asynchronous shader compile
    let compile = async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        effect.set_ready(true);
    };
    let (ready, ()) = tokio::join!(frame_graph.when_ready(), compile);
    ready?;
    run_frames(&device, &mut frame_graph)?;

    device.borrow_mut().set_backbuffer_size(1920, 1080);
    frame_graph.build()?;
    log::info!(target: "demo", "Rebuilt after resize, {} live textures", device.borrow().get_live_texture_count());
    run_frames(&device, &mut frame_graph)?;

    frame_graph.dispose();
    Ok(())
}
