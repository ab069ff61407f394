use api_types::handle::TextureHandle;
use api_types::object_list::ObjectList;
use context::enter_span;
use context::render_context::RenderContext;
use framegraph::error::FrameGraphError;
use framegraph::frame_graph::FrameGraph;
use framegraph::pass_node::PassNode;
use framegraph::task::Task;

/// Draws an object list into a color target, optionally with depth.
pub struct ObjectRendererTask {
    name: String,
    target: TextureHandle,
    depth: Option<TextureHandle>,
    objects: ObjectList,
    depth_test: bool,
    depth_write: bool,
    output: TextureHandle
}

impl ObjectRendererTask {
    pub fn new(name: &str, frame_graph: &FrameGraph, target: TextureHandle, objects: ObjectList) -> Self {
        ObjectRendererTask {
            name: name.to_string(),
            target,
            depth: None,
            objects,
            depth_test: true,
            depth_write: true,
            output: frame_graph.get_texture_manager().borrow_mut().create_dangling_handle()
        }
    }

    pub fn with_depth(mut self, depth: TextureHandle) -> Self {
        self.depth = Some(depth);
        self
    }

    pub fn with_depth_states(mut self, test: bool, write: bool) -> Self {
        self.depth_test = test;
        self.depth_write = write;
        self
    }

    pub fn get_output_texture(&self) -> TextureHandle {
        self.output
    }
}

impl Task for ObjectRendererTask {
    fn get_name(&self) -> &str {
        &self.name
    }

    fn get_class_name(&self) -> &str {
        "ObjectRendererTask"
    }

    fn record(&mut self, frame_graph: &mut FrameGraph) -> Result<(), FrameGraphError> {
        let textures = frame_graph.get_texture_manager();
        if let Some(depth) = self.depth {
            let format = textures.borrow().get_texture_description(depth)?.options.format;
            if !format.is_depth() {
                return Err(FrameGraphError::MissingTaskInput {
                    task: self.name.clone(),
                    input: "depth texture with a depth format".to_string()
                });
            }
        }
        textures.borrow_mut().resolve_dangling_handle(self.output, self.target, None, None)?;

        let (objects, depth_test, depth_write) = (self.objects.clone(), self.depth_test, self.depth_write);
        frame_graph.add_render_pass(&self.name, false)?
            .set_render_target(self.target)
            .set_render_target_depth(self.depth)
            .set_execute_func(move |render_context: &mut RenderContext| {
                enter_span!(tracing::Level::TRACE, "Render objects");
                render_context.set_depth_states(depth_test, depth_write);
                render_context.render_objects(&objects)?;
                Ok(())
            });

        frame_graph.add_render_pass(&format!("{} (disabled)", self.name), true)?
            .set_render_target(self.target)
            .set_render_target_depth(self.depth)
            .set_execute_func(|_: &mut RenderContext| Ok(()));

        Ok(())
    }
}
