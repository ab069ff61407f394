use glam::Vec4;
use api_types::handle::TextureHandle;
use context::enter_span;
use context::render_context::RenderContext;
use framegraph::error::FrameGraphError;
use framegraph::frame_graph::FrameGraph;
use framegraph::pass_node::PassNode;
use framegraph::render_pass_node::RenderPassNode;
use framegraph::task::Task;

/// Binds `target` as color or depth attachment depending on its format.
pub(crate) fn set_target(pass: &mut RenderPassNode, target: TextureHandle, is_depth: bool) -> &mut RenderPassNode {
    if is_depth {
        pass.set_render_target_depth(Some(target))
    } else {
        pass.set_render_target(target)
    }
}

/// Clears a texture. Does nothing while disabled; the output is the target
/// either way.
pub struct ClearTextureTask {
    name: String,
    target: TextureHandle,
    output: TextureHandle,
    color: Option<Vec4>,
    clear_depth: bool,
    clear_stencil: bool
}

impl ClearTextureTask {
    pub fn new(name: &str, frame_graph: &FrameGraph, target: TextureHandle) -> Self {
        ClearTextureTask {
            name: name.to_string(),
            target,
            output: frame_graph.get_texture_manager().borrow_mut().create_dangling_handle(),
            color: Some(Vec4::new(0.2, 0.2, 0.3, 1.0)),
            clear_depth: false,
            clear_stencil: false
        }
    }

    pub fn with_color(mut self, color: Option<Vec4>) -> Self {
        self.color = color;
        self
    }

    pub fn with_depth_stencil(mut self, clear_depth: bool, clear_stencil: bool) -> Self {
        self.clear_depth = clear_depth;
        self.clear_stencil = clear_stencil;
        self
    }

    pub fn get_output_texture(&self) -> TextureHandle {
        self.output
    }
}

impl Task for ClearTextureTask {
    fn get_name(&self) -> &str {
        &self.name
    }

    fn get_class_name(&self) -> &str {
        "ClearTextureTask"
    }

    fn record(&mut self, frame_graph: &mut FrameGraph) -> Result<(), FrameGraphError> {
        let textures = frame_graph.get_texture_manager();
        textures.borrow_mut().resolve_dangling_handle(self.output, self.target, None, None)?;
        let is_depth = textures.borrow().get_texture_description(self.target)?.options.format.is_depth();

        let (color, clear_depth, clear_stencil) = (self.color, self.clear_depth, self.clear_stencil);
        let pass = frame_graph.add_render_pass(&self.name, false)?;
        set_target(pass, self.target, is_depth)
            .set_execute_func(move |render_context: &mut RenderContext| {
                enter_span!(tracing::Level::TRACE, "Clear");
                render_context.clear(color, clear_depth, clear_stencil)?;
                Ok(())
            });

        let pass_disabled = frame_graph.add_render_pass(&format!("{} (disabled)", self.name), true)?;
        set_target(pass_disabled, self.target, is_depth)
            .set_execute_func(|_: &mut RenderContext| Ok(()));

        Ok(())
    }
}
