use std::fmt::{Debug, Formatter};
use api_types::handle::TextureHandle;
use context::render_context::RenderContext;
use crate::error::FrameGraphError;

pub type ExecuteFn = dyn FnMut(&mut RenderContext) -> Result<(), FrameGraphError>;

/// State shared by every kind of pass.
pub struct PassBase {
    name: String,
    task_name: String,
    disabled: bool,
    dependencies: Vec<TextureHandle>,
    execute_func: Option<Box<ExecuteFn>>
}

impl Debug for PassBase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PassBase")
            .field("name", &self.name)
            .field("task", &self.task_name)
            .field("disabled", &self.disabled)
            .finish()
    }
}

impl PassBase {
    pub fn new(name: &str, task_name: &str) -> Self {
        PassBase {
            name: name.to_string(),
            task_name: task_name.to_string(),
            disabled: false,
            dependencies: Vec::new(),
            execute_func: None
        }
    }

    pub fn has_execute_func(&self) -> bool {
        self.execute_func.is_some()
    }

    pub fn get_declared_dependencies(&self) -> &[TextureHandle] {
        &self.dependencies
    }

    pub(crate) fn run(&mut self, render_context: &mut RenderContext) -> Result<(), FrameGraphError> {
        match self.execute_func.as_mut() {
            Some(execute_func) => execute_func(render_context),
            None => Err(FrameGraphError::InvalidPass {
                task: self.task_name.clone(),
                pass: self.name.clone(),
                reason: "no execute function was set".to_string()
            })
        }
    }
}

pub trait PassNode {
    fn get_base(&self) -> &PassBase;

    fn get_base_mut(&mut self) -> &mut PassBase;

    fn get_name(&self) -> &str {
        &self.get_base().name
    }

    fn get_task_name(&self) -> &str {
        &self.get_base().task_name
    }

    fn is_disabled(&self) -> bool {
        self.get_base().disabled
    }

    fn set_disabled(&mut self, disabled: bool) {
        self.get_base_mut().disabled = disabled;
    }

    fn set_execute_func<F>(&mut self, execute_func: F) -> &mut Self
    where
        F: FnMut(&mut RenderContext) -> Result<(), FrameGraphError> + 'static,
        Self: Sized
    {
        self.get_base_mut().execute_func = Some(Box::new(execute_func));
        self
    }

    /// Declares textures the pass reads, so they are kept alive for it.
    fn add_dependencies(&mut self, handles: &[TextureHandle]) -> &mut Self
    where
        Self: Sized
    {
        self.get_base_mut().dependencies.extend_from_slice(handles);
        self
    }

    /// Every texture the pass touches.
    fn get_dependencies(&self) -> Vec<TextureHandle> {
        self.get_base().dependencies.clone()
    }

    /// Why the pass can't run, if it can't.
    fn is_valid(&self) -> Option<String> {
        if self.get_base().has_execute_func() {
            None
        } else {
            Some("no execute function was set".to_string())
        }
    }

    fn execute(&mut self, render_context: &mut RenderContext) -> Result<(), FrameGraphError> {
        self.get_base_mut().run(render_context)
    }
}
