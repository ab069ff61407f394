use std::fmt::{Debug, Formatter};
use api_types::handle::TextureHandle;
use context::render_context::{RenderContext, RenderTarget};
use crate::error::FrameGraphError;
use crate::pass_node::{PassBase, PassNode};

/// Pass drawing into one or more color targets and/or a depth target.
///
/// The targets are bound (lazily, through the render context) right before
/// the execute function runs, unless automatic binding was turned off.
pub struct RenderPassNode {
    base: PassBase,
    render_target: RenderTarget,
    auto_bind_render_target: bool
}

impl RenderPassNode {
    pub fn new(name: &str, task_name: &str) -> Self {
        RenderPassNode {
            base: PassBase::new(name, task_name),
            render_target: RenderTarget::default(),
            auto_bind_render_target: true
        }
    }

    pub fn set_render_target(&mut self, handle: TextureHandle) -> &mut Self {
        self.render_target.colors = vec![handle];
        self
    }

    /// Multiple render targets, in attachment order.
    pub fn set_render_targets(&mut self, handles: Vec<TextureHandle>) -> &mut Self {
        self.render_target.colors = handles;
        self
    }

    pub fn set_render_target_depth(&mut self, handle: Option<TextureHandle>) -> &mut Self {
        self.render_target.depth = handle;
        self
    }

    pub fn get_render_target(&self) -> &RenderTarget {
        &self.render_target
    }

    /// Leaves target binding to the execute function.
    pub fn disable_auto_render_target_binding(&mut self) -> &mut Self {
        self.auto_bind_render_target = false;
        self
    }
}

impl PassNode for RenderPassNode {
    fn get_base(&self) -> &PassBase {
        &self.base
    }

    fn get_base_mut(&mut self) -> &mut PassBase {
        &mut self.base
    }

    fn get_dependencies(&self) -> Vec<TextureHandle> {
        let mut dependencies = self.render_target.colors.clone();
        dependencies.extend(self.render_target.depth);
        dependencies.extend_from_slice(self.base.get_declared_dependencies());
        dependencies
    }

    fn is_valid(&self) -> Option<String> {
        if self.render_target.is_empty() {
            return Some("neither a render target nor a depth target was set".to_string());
        }
        if self.base.has_execute_func() {
            None
        } else {
            Some("no execute function was set".to_string())
        }
    }

    fn execute(&mut self, render_context: &mut RenderContext) -> Result<(), FrameGraphError> {
        if self.auto_bind_render_target {
            let label = format!("frame graph render pass - {}", self.get_name());
            render_context.bind_render_target(Some(&self.render_target), Some(&label));
        }

        render_context.push_debug_group(self.get_name());
        let result = self.base.run(render_context);
        render_context.pop_debug_group();
        result
    }
}

impl Debug for RenderPassNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderPassNode")
            .field("name", &self.get_name())
            .field("render_target", &self.render_target)
            .finish()
    }
}
