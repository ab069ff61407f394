use api_types::handle::TextureHandle;
use context::enter_span;
use context::render_context::RenderContext;
use framegraph::error::FrameGraphError;
use framegraph::frame_graph::FrameGraph;
use framegraph::pass_node::PassNode;
use framegraph::task::Task;

/// Copies a texture into the backbuffer color texture.
pub struct CopyToBackbufferColorTask {
    name: String,
    source: TextureHandle
}

impl CopyToBackbufferColorTask {
    pub fn new(name: &str, source: TextureHandle) -> Self {
        CopyToBackbufferColorTask {
            name: name.to_string(),
            source
        }
    }
}

impl Task for CopyToBackbufferColorTask {
    fn get_name(&self) -> &str {
        &self.name
    }

    fn get_class_name(&self) -> &str {
        "CopyToBackbufferColorTask"
    }

    fn record(&mut self, frame_graph: &mut FrameGraph) -> Result<(), FrameGraphError> {
        let backbuffer = frame_graph.get_backbuffer_color();
        let source = self.source;

        frame_graph.add_render_pass(&self.name, false)?
            .set_render_target(backbuffer)
            .add_dependencies(&[source])
            .set_execute_func(move |render_context: &mut RenderContext| {
                enter_span!(tracing::Level::TRACE, "Copy to backbuffer");
                render_context.copy_texture(source, true)?;
                Ok(())
            });

        frame_graph.add_render_pass(&format!("{} (disabled)", self.name), true)?
            .set_render_target(backbuffer)
            .set_execute_func(|_: &mut RenderContext| Ok(()));

        Ok(())
    }
}

/// Copies `source` into `target`. The output is `target` whether the task is
/// enabled or not.
pub struct CopyToTextureTask {
    name: String,
    source: TextureHandle,
    target: TextureHandle,
    output: TextureHandle
}

impl CopyToTextureTask {
    pub fn new(name: &str, frame_graph: &FrameGraph, source: TextureHandle, target: TextureHandle) -> Self {
        CopyToTextureTask {
            name: name.to_string(),
            source,
            target,
            output: frame_graph.get_texture_manager().borrow_mut().create_dangling_handle()
        }
    }

    pub fn get_output_texture(&self) -> TextureHandle {
        self.output
    }
}

impl Task for CopyToTextureTask {
    fn get_name(&self) -> &str {
        &self.name
    }

    fn get_class_name(&self) -> &str {
        "CopyToTextureTask"
    }

    fn record(&mut self, frame_graph: &mut FrameGraph) -> Result<(), FrameGraphError> {
        frame_graph.get_texture_manager().borrow_mut()
            .resolve_dangling_handle(self.output, self.target, None, None)?;
        let source = self.source;

        frame_graph.add_render_pass(&self.name, false)?
            .set_render_target(self.target)
            .add_dependencies(&[source])
            .set_execute_func(move |render_context: &mut RenderContext| {
                enter_span!(tracing::Level::TRACE, "Copy to texture");
                render_context.copy_texture(source, false)?;
                Ok(())
            });

        frame_graph.add_render_pass(&format!("{} (disabled)", self.name), true)?
            .set_render_target(self.target)
            .set_execute_func(|_: &mut RenderContext| Ok(()));

        Ok(())
    }
}
