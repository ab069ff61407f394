pub mod blit;
pub mod clear;
pub mod cull;
pub mod execute;
pub mod object_renderer;
pub mod post_process;

#[cfg(test)]
mod tests
{
    use std::cell::RefCell;
    use std::rc::Rc;
    use glam::Vec4;
    use api_types::device::{PhysicalTexture, RenderDevice};
    use api_types::device::headless::{DeviceCommand, HeadlessDevice};
    use api_types::handle::TextureHandle;
    use api_types::image::{SamplingMode, TextureCreationOptions, TextureFormat};
    use api_types::object_list::{ObjectId, ObjectList};
    use api_types::shader::EffectWrapper;
    use context::render_context::RenderContext;
    use framegraph::frame_graph::FrameGraph;
    use crate::blit::{CopyToBackbufferColorTask, CopyToTextureTask};
    use crate::clear::ClearTextureTask;
    use crate::cull::CullObjectsTask;
    use crate::execute::ExecuteTask;
    use crate::object_renderer::ObjectRendererTask;
    use crate::post_process::PostProcessTask;

    fn create_graph() -> (Rc<RefCell<HeadlessDevice>>, FrameGraph) {
        let device = Rc::new(RefCell::new(HeadlessDevice::new(800, 600)));
        let frame_graph = FrameGraph::new(device.clone());
        (device, frame_graph)
    }

    fn create_texture(frame_graph: &FrameGraph, name: &str, options: TextureCreationOptions) -> TextureHandle {
        frame_graph.get_texture_manager().borrow_mut().create_render_target_texture(name, options)
    }

    fn physical(frame_graph: &FrameGraph, handle: TextureHandle) -> PhysicalTexture {
        frame_graph.get_texture_manager().borrow().get_texture_from_handle(handle).unwrap()
    }

    fn read_physical(frame_graph: &FrameGraph, handle: TextureHandle) -> PhysicalTexture {
        frame_graph.get_texture_manager().borrow().get_read_texture_from_handle(handle).unwrap()
    }

    fn object_list(ids: &[u64]) -> ObjectList {
        let objects = ObjectList::new();
        objects.set(ids.iter().map(|id| ObjectId(*id)).collect());
        objects
    }

    fn build_and_execute(device: &Rc<RefCell<HeadlessDevice>>, frame_graph: &mut FrameGraph) -> Vec<DeviceCommand> {
        frame_graph.build().unwrap();
        device.borrow_mut().take_commands();
        frame_graph.execute().unwrap();
        device.borrow_mut().take_commands()
    }

    #[test]
    fn clear_task_clears_its_color_target() {
        let (device, mut frame_graph) = create_graph();
        let color = create_texture(&frame_graph, "color", TextureCreationOptions::absolute(256, 256));
        let clear = ClearTextureTask::new("clear", &frame_graph, color)
            .with_color(Some(Vec4::ONE));
        let output = clear.get_output_texture();
        frame_graph.add_task(clear).unwrap();

        let commands = build_and_execute(&device, &mut frame_graph);
        let texture = physical(&frame_graph, color);

        assert_eq!(physical(&frame_graph, output), texture);
        assert!(commands.contains(&DeviceCommand::BindFramebuffer { colors: vec![texture], depth: None }));
        assert!(commands.contains(&DeviceCommand::Clear { color: Some(Vec4::ONE), depth: false, stencil: false }));
    }

    #[test]
    fn clear_task_binds_depth_target_as_depth_attachment() {
        let (device, mut frame_graph) = create_graph();
        let depth = create_texture(
            &frame_graph,
            "depth",
            TextureCreationOptions::percentage(100.0, 100.0).with_format(TextureFormat::Depth24Stencil8));
        let clear = ClearTextureTask::new("clear depth", &frame_graph, depth)
            .with_color(None)
            .with_depth_stencil(true, true);
        frame_graph.add_task(clear).unwrap();

        let commands = build_and_execute(&device, &mut frame_graph);
        let texture = physical(&frame_graph, depth);

        assert!(commands.contains(&DeviceCommand::BindFramebuffer { colors: vec![], depth: Some(texture) }));
        assert!(commands.contains(&DeviceCommand::Clear { color: None, depth: true, stencil: true }));
    }

    #[test]
    fn disabled_clear_task_does_not_clear() {
        let (device, mut frame_graph) = create_graph();
        let color = create_texture(&frame_graph, "color", TextureCreationOptions::absolute(64, 64));
        let clear = ClearTextureTask::new("clear", &frame_graph, color);
        frame_graph.add_task(clear).unwrap();
        frame_graph.get_task_by_name_mut("clear").unwrap().set_disabled(true);

        let commands = build_and_execute(&device, &mut frame_graph);

        assert!(!commands.iter().any(|command| matches!(command, DeviceCommand::Clear { .. })));
    }

    #[test]
    fn copy_to_backbuffer_binds_backbuffer_and_copies_source() {
        let (device, mut frame_graph) = create_graph();
        let source = create_texture(&frame_graph, "scene", TextureCreationOptions::percentage(100.0, 100.0));
        frame_graph.add_task(CopyToBackbufferColorTask::new("present", source)).unwrap();

        let commands = build_and_execute(&device, &mut frame_graph);
        let backbuffer = device.borrow().get_backbuffer_color();
        let backbuffer_depth = device.borrow().get_backbuffer_depth_stencil();

        // forcing the copy to the backbuffer replaces the pass target before
        // anything is bound, so only the full backbuffer gets bound
        let binds: Vec<&DeviceCommand> = commands.iter()
            .filter(|command| matches!(command, DeviceCommand::BindFramebuffer { .. }))
            .collect();
        assert_eq!(binds, vec![&DeviceCommand::BindFramebuffer {
            colors: vec![backbuffer],
            depth: Some(backbuffer_depth)
        }]);
        assert_eq!(commands.last(), Some(&DeviceCommand::PopDebugGroup));
        assert!(commands.contains(&DeviceCommand::CopyTexture(physical(&frame_graph, source))));
    }

    #[test]
    fn copying_a_history_texture_reads_the_previous_frame() {
        let (device, mut frame_graph) = create_graph();
        let history = create_texture(
            &frame_graph,
            "history",
            TextureCreationOptions::absolute(128, 128).with_history());
        frame_graph.add_task(CopyToBackbufferColorTask::new("present", history)).unwrap();

        for _ in 0..2 {
            let commands = build_and_execute(&device, &mut frame_graph);
            let read = read_physical(&frame_graph, history);

            assert_ne!(read, physical(&frame_graph, history));
            assert!(commands.contains(&DeviceCommand::CopyTexture(read)));
        }
    }

    #[test]
    fn copy_to_texture_output_is_the_target() {
        let (device, mut frame_graph) = create_graph();
        let source = create_texture(&frame_graph, "source", TextureCreationOptions::absolute(64, 64));
        let target = create_texture(&frame_graph, "target", TextureCreationOptions::absolute(64, 64));
        let copy = CopyToTextureTask::new("copy", &frame_graph, source, target);
        let output = copy.get_output_texture();
        frame_graph.add_task(copy).unwrap();

        let commands = build_and_execute(&device, &mut frame_graph);

        assert_eq!(physical(&frame_graph, output), physical(&frame_graph, target));
        assert!(commands.contains(&DeviceCommand::BindFramebuffer {
            colors: vec![physical(&frame_graph, target)],
            depth: None
        }));
        assert!(commands.contains(&DeviceCommand::CopyTexture(physical(&frame_graph, source))));
    }

    #[test]
    fn execute_task_runs_the_function_matching_its_state() {
        let (_device, mut frame_graph) = create_graph();
        let log = Rc::new(RefCell::new(Vec::new()));
        let (enabled_log, disabled_log) = (log.clone(), log.clone());
        let task = ExecuteTask::new("custom", move |_: &mut RenderContext| {
            enabled_log.borrow_mut().push("enabled");
            Ok(())
        }).with_disabled_func(move |_: &mut RenderContext| {
            disabled_log.borrow_mut().push("disabled");
            Ok(())
        });
        frame_graph.add_task(task).unwrap();

        frame_graph.build().unwrap();
        frame_graph.execute().unwrap();
        frame_graph.get_task_by_name_mut("custom").unwrap().set_disabled(true);
        frame_graph.execute().unwrap();

        assert_eq!(*log.borrow(), vec!["enabled", "disabled"]);
    }

    #[test]
    fn renderer_draws_culled_objects() {
        let (device, mut frame_graph) = create_graph();
        let color = create_texture(&frame_graph, "color", TextureCreationOptions::absolute(64, 64));
        let cull = CullObjectsTask::new("cull", object_list(&[1, 2, 3, 4]), |object| object.0 % 2 == 0);
        let visible = cull.get_output_object_list();
        let renderer = ObjectRendererTask::new("render", &frame_graph, color, visible)
            .with_depth_states(true, false);
        frame_graph.add_task(cull).unwrap();
        frame_graph.add_task(renderer).unwrap();

        let commands = build_and_execute(&device, &mut frame_graph);

        assert!(commands.contains(&DeviceCommand::SetDepthStates { test: true, write: false }));
        assert!(commands.contains(&DeviceCommand::DrawObjects(vec![ObjectId(2), ObjectId(4)])));

        frame_graph.get_task_by_name_mut("cull").unwrap().set_disabled(true);
        frame_graph.execute().unwrap();
        let commands = device.borrow_mut().take_commands();

        assert!(commands.contains(&DeviceCommand::DrawObjects(vec![
            ObjectId(1), ObjectId(2), ObjectId(3), ObjectId(4)
        ])));
    }

    #[test]
    fn renderer_binds_depth_attachment() {
        let (device, mut frame_graph) = create_graph();
        let color = create_texture(&frame_graph, "color", TextureCreationOptions::absolute(64, 64));
        let depth = create_texture(
            &frame_graph,
            "depth",
            TextureCreationOptions::absolute(64, 64).with_format(TextureFormat::Depth32Float));
        let renderer = ObjectRendererTask::new("render", &frame_graph, color, object_list(&[9]))
            .with_depth(depth);
        frame_graph.add_task(renderer).unwrap();

        let commands = build_and_execute(&device, &mut frame_graph);

        assert!(commands.contains(&DeviceCommand::BindFramebuffer {
            colors: vec![physical(&frame_graph, color)],
            depth: Some(physical(&frame_graph, depth))
        }));
        assert!(commands.contains(&DeviceCommand::DrawObjects(vec![ObjectId(9)])));
    }

    #[test]
    fn renderer_rejects_color_texture_as_depth() {
        let (_device, mut frame_graph) = create_graph();
        let color = create_texture(&frame_graph, "color", TextureCreationOptions::absolute(64, 64));
        let not_depth = create_texture(&frame_graph, "not depth", TextureCreationOptions::absolute(64, 64));
        let renderer = ObjectRendererTask::new("render", &frame_graph, color, ObjectList::new())
            .with_depth(not_depth);
        frame_graph.add_task(renderer).unwrap();

        assert!(frame_graph.build().is_err());
        assert_eq!(frame_graph.task_count(), 0);
    }

    #[test]
    fn post_process_skips_effect_until_ready() {
        let (device, mut frame_graph) = create_graph();
        let source = create_texture(&frame_graph, "scene", TextureCreationOptions::absolute(256, 128));
        let effect = EffectWrapper::new("blur", false);
        let post_process = PostProcessTask::new("blur", &frame_graph, source, Rc::new(effect.clone()));
        frame_graph.add_task(post_process).unwrap();

        assert_eq!(frame_graph.get_pending_readiness().unwrap(), vec!["blur".to_string()]);
        let commands = build_and_execute(&device, &mut frame_graph);
        assert!(!commands.iter().any(|command| matches!(command, DeviceCommand::DrawFullScreen(_))));

        effect.set_ready(true);
        assert!(frame_graph.get_pending_readiness().unwrap().is_empty());
        frame_graph.execute().unwrap();
        let commands = device.borrow_mut().take_commands();

        assert!(commands.contains(&DeviceCommand::BindTexture {
            effect: "blur".to_string(),
            uniform: "textureSampler".to_string(),
            texture: read_physical(&frame_graph, source)
        }));
        assert!(commands.contains(&DeviceCommand::DrawFullScreen("blur".to_string())));
    }

    #[test]
    fn post_process_creates_output_like_its_source() {
        let (device, mut frame_graph) = create_graph();
        let source = create_texture(
            &frame_graph,
            "scene",
            TextureCreationOptions::absolute(256, 128).with_format(TextureFormat::Rgba16Float));
        let post_process = PostProcessTask::new(
            "tonemap",
            &frame_graph,
            source,
            Rc::new(EffectWrapper::new("tonemap", true)))
            .with_sampling_mode(SamplingMode::Nearest);
        let output = post_process.get_output_texture();
        frame_graph.add_task(post_process).unwrap();

        frame_graph.build().unwrap();
        let commands = device.borrow_mut().take_commands();
        let output_texture = physical(&frame_graph, output);

        assert_ne!(output_texture, physical(&frame_graph, source));
        assert_eq!(frame_graph.get_texture_manager().borrow().get_texture_name(output).unwrap(), "tonemap");
        let device = device.borrow();
        let description = device.get_texture_description(output_texture).unwrap();
        assert_eq!((description.width, description.height), (256, 128));
        assert_eq!(description.options.format, TextureFormat::Rgba16Float);
        assert!(commands.contains(&DeviceCommand::SetSamplingMode(physical(&frame_graph, source), SamplingMode::Nearest)));
    }

    #[test]
    fn disabled_post_process_copies_its_source() {
        let (device, mut frame_graph) = create_graph();
        let source = create_texture(&frame_graph, "scene", TextureCreationOptions::absolute(64, 64));
        let target = create_texture(&frame_graph, "target", TextureCreationOptions::absolute(64, 64));
        let post_process = PostProcessTask::new("fxaa", &frame_graph, source, Rc::new(EffectWrapper::new("fxaa", true)))
            .with_target(target);
        let output = post_process.get_output_texture();
        frame_graph.add_task(post_process).unwrap();
        frame_graph.get_task_by_name_mut("fxaa").unwrap().set_disabled(true);

        let commands = build_and_execute(&device, &mut frame_graph);

        assert_eq!(physical(&frame_graph, output), physical(&frame_graph, target));
        assert!(commands.contains(&DeviceCommand::CopyTexture(physical(&frame_graph, source))));
        assert!(!commands.iter().any(|command| matches!(command, DeviceCommand::DrawFullScreen(_))));
    }

    #[test]
    fn full_chain_rebuilds_without_leaking_textures() {
        let (device, mut frame_graph) = create_graph();
        let scene = create_texture(&frame_graph, "scene", TextureCreationOptions::percentage(100.0, 100.0));
        let depth = create_texture(
            &frame_graph,
            "depth",
            TextureCreationOptions::percentage(100.0, 100.0).with_format(TextureFormat::Depth24Stencil8));

        let clear = ClearTextureTask::new("clear", &frame_graph, scene);
        let clear_depth = ClearTextureTask::new("clear depth", &frame_graph, depth)
            .with_color(None)
            .with_depth_stencil(true, true);
        let cull = CullObjectsTask::new("cull", object_list(&[1, 2, 3]), |_| true);
        let renderer = ObjectRendererTask::new(
            "render",
            &frame_graph,
            clear.get_output_texture(),
            cull.get_output_object_list())
            .with_depth(clear_depth.get_output_texture());
        let post_process = PostProcessTask::new(
            "post",
            &frame_graph,
            renderer.get_output_texture(),
            Rc::new(EffectWrapper::new("post", true)));
        let present = CopyToBackbufferColorTask::new("present", post_process.get_output_texture());

        frame_graph.add_task(clear).unwrap();
        frame_graph.add_task(clear_depth).unwrap();
        frame_graph.add_task(cull).unwrap();
        frame_graph.add_task(renderer).unwrap();
        frame_graph.add_task(post_process).unwrap();
        frame_graph.add_task(present).unwrap();

        build_and_execute(&device, &mut frame_graph);
        let live_textures = device.borrow().get_live_texture_count();
        let commands = build_and_execute(&device, &mut frame_graph);

        assert_eq!(device.borrow().get_live_texture_count(), live_textures);
        assert!(commands.contains(&DeviceCommand::DrawObjects(vec![ObjectId(1), ObjectId(2), ObjectId(3)])));
        assert!(commands.contains(&DeviceCommand::DrawFullScreen("post".to_string())));

        frame_graph.dispose();
        assert_eq!(device.borrow().get_live_texture_count(), 0);
    }
}
