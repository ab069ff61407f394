use std::collections::HashSet;
use std::fmt::{Debug, Formatter};
use api_types::device::PhysicalTexture;
use api_types::handle::TextureHandle;
use api_types::object_list::ObjectList;
use context::enter_span;
use context::render_context::RenderContext;
use context::texture_manager::{TextureError, TextureManager};
use crate::error::FrameGraphError;
use crate::frame_graph::FrameGraph;
use crate::pass_node::PassNode;
use crate::pass_type::PassType;

/// A unit of rendering work that declares its passes when recorded.
///
/// `record` runs on every [`FrameGraph::build`] and is the only place a task
/// may add passes. Passes from a previous build are dropped before it runs.
pub trait Task {
    fn get_name(&self) -> &str;

    fn get_class_name(&self) -> &str {
        "Task"
    }

    fn record(&mut self, frame_graph: &mut FrameGraph) -> Result<(), FrameGraphError>;

    /// Whether resources the task owns (shaders, mostly) are usable yet.
    /// Errors are logged by the readiness poll and retried on its next tick.
    fn is_ready(&self) -> Result<bool, FrameGraphError> {
        Ok(true)
    }

    /// Called once per build, after every texture got its physical backing.
    fn on_textures_allocated(&mut self, _render_context: &mut RenderContext) -> Result<(), FrameGraphError> {
        Ok(())
    }

    fn dispose(&mut self) {}
}

pub type TexturesAllocatedFn = dyn FnMut(&mut RenderContext) -> Result<(), FrameGraphError>;

/// The two pass lists of a task.
#[derive(Debug, Default)]
pub struct PassLists {
    enabled: Vec<PassType>,
    disabled: Vec<PassType>
}

impl PassLists {
    /// The list that runs: the disabled one when the task is disabled and
    /// has one, the enabled one otherwise.
    pub fn get_passes(&self, task_disabled: bool) -> &[PassType] {
        if task_disabled && !self.disabled.is_empty() {
            &self.disabled
        } else {
            &self.enabled
        }
    }

    fn get_passes_mut(&mut self, task_disabled: bool) -> &mut [PassType] {
        if task_disabled && !self.disabled.is_empty() {
            &mut self.disabled
        } else {
            &mut self.enabled
        }
    }

    pub fn get_list(&self, when_disabled: bool) -> &[PassType] {
        if when_disabled {
            &self.disabled
        } else {
            &self.enabled
        }
    }

    pub fn get_list_mut(&mut self, when_disabled: bool) -> &mut [PassType] {
        if when_disabled {
            &mut self.disabled
        } else {
            &mut self.enabled
        }
    }

    pub(crate) fn push(&mut self, pass: PassType, when_disabled: bool) -> &mut PassType {
        let list = if when_disabled {
            &mut self.disabled
        } else {
            &mut self.enabled
        };
        list.push(pass);
        let index = list.len() - 1;
        &mut list[index]
    }

    pub fn iter(&self) -> impl Iterator<Item = &PassType> {
        self.enabled.iter().chain(self.disabled.iter())
    }

    pub fn clear(&mut self) {
        self.enabled.clear();
        self.disabled.clear();
    }
}

/// A task as the frame graph holds it: the task itself, its pass lists,
/// its disabled flag and the allocation observers.
pub struct TaskNode {
    name: String,
    class_name: String,
    // taken out while the task records
    task: Option<Box<dyn Task>>,
    disabled: bool,
    passes: PassLists,
    observers: Vec<Box<TexturesAllocatedFn>>
}

impl Debug for TaskNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskNode")
            .field("name", &self.name)
            .field("class", &self.class_name)
            .field("disabled", &self.disabled)
            .field("passes", &self.passes)
            .finish()
    }
}

impl TaskNode {
    pub fn new(task: Box<dyn Task>) -> Self {
        TaskNode {
            name: task.get_name().to_string(),
            class_name: task.get_class_name().to_string(),
            task: Some(task),
            disabled: false,
            passes: PassLists::default(),
            observers: Vec::new()
        }
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_class_name(&self) -> &str {
        &self.class_name
    }

    pub fn get_task(&self) -> Option<&dyn Task> {
        self.task.as_deref()
    }

    pub fn get_task_mut(&mut self) -> Option<&mut (dyn Task + 'static)> {
        self.task.as_deref_mut()
    }

    pub(crate) fn take_task(&mut self) -> Option<Box<dyn Task>> {
        self.task.take()
    }

    pub(crate) fn restore_task(&mut self, task: Box<dyn Task>) {
        self.task = Some(task);
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Switches the active pass list. Takes effect on the next execute, no
    /// rebuild needed.
    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    pub fn get_pass_lists(&self) -> &PassLists {
        &self.passes
    }

    pub fn get_pass_lists_mut(&mut self) -> &mut PassLists {
        &mut self.passes
    }

    pub fn get_passes(&self) -> &[PassType] {
        self.passes.get_passes(self.disabled)
    }

    /// Textures touched by any pass of either list.
    pub fn get_dependencies(&self) -> HashSet<TextureHandle> {
        self.passes.iter()
            .flat_map(|pass| pass.get_dependencies())
            .collect()
    }

    pub fn add_textures_allocated_observer<F>(&mut self, observer: F)
    where
        F: FnMut(&mut RenderContext) -> Result<(), FrameGraphError> + 'static
    {
        self.observers.push(Box::new(observer));
    }

    pub fn is_ready(&self) -> Result<bool, FrameGraphError> {
        match &self.task {
            Some(task) => task.is_ready(),
            None => Ok(false)
        }
    }

    pub(crate) fn reset(&mut self) {
        self.passes.clear();
    }

    pub(crate) fn notify_textures_allocated(&mut self, render_context: &mut RenderContext) -> Result<(), FrameGraphError> {
        if let Some(task) = self.task.as_mut() {
            task.on_textures_allocated(render_context)?;
        }
        for observer in self.observers.iter_mut() {
            observer(render_context)?;
        }
        Ok(())
    }

    pub(crate) fn execute(&mut self, render_context: &mut RenderContext) -> Result<(), FrameGraphError> {
        enter_span!(tracing::Level::TRACE, "Execute task", task = self.name.as_str());
        for pass in self.passes.get_passes_mut(self.disabled) {
            if pass.is_disabled() {
                continue;
            }
            log::trace!(target: "framegraph", "Executing pass {} of task {}", pass.get_name(), self.name);
            pass.execute(render_context)?;
        }
        Ok(())
    }

    pub fn dispose(&mut self) {
        self.passes.clear();
        self.observers.clear();
        if let Some(task) = self.task.as_mut() {
            task.dispose();
        }
    }
}

struct TaskOutputs {
    textures: Vec<PhysicalTexture>,
    // owning handle of each slot that is a history texture
    history: Vec<Option<TextureHandle>>,
    depth: Option<PhysicalTexture>,
    object_list: Option<ObjectList>
}

fn get_outputs(passes: &[PassType], textures: &TextureManager) -> Result<TaskOutputs, TextureError> {
    let mut outputs = TaskOutputs {
        textures: Vec::new(),
        history: Vec::new(),
        depth: None,
        object_list: None
    };

    if let Some(render_pass) = passes.iter().rev().find_map(PassType::as_render) {
        let target = render_pass.get_render_target();
        for handle in &target.colors {
            outputs.textures.push(textures.get_texture_from_handle(*handle)?);
            let history = if textures.is_history_texture(*handle) {
                Some(textures.get_source_handle(*handle)?)
            } else {
                None
            };
            outputs.history.push(history);
        }
        outputs.depth = match target.depth {
            Some(handle) => Some(textures.get_texture_from_handle(handle)?),
            None => None
        };
    }

    outputs.object_list = passes.iter().rev()
        .find_map(PassType::as_cull)
        .and_then(|cull_pass| cull_pass.get_object_list().cloned());

    Ok(outputs)
}

/// Checks every pass is valid and that both pass lists of the task, when
/// both exist, produce the same outputs.
///
/// A color output may differ between the lists only when both sides are
/// halves of the same history texture.
pub fn check_task(node: &TaskNode, textures: &TextureManager) -> Result<(), FrameGraphError> {
    for pass in node.passes.iter() {
        if let Some(reason) = pass.is_valid() {
            return Err(FrameGraphError::InvalidPass {
                task: node.name.clone(),
                pass: pass.get_name().to_string(),
                reason
            });
        }
    }

    let enabled = node.passes.get_list(false);
    let disabled = node.passes.get_list(true);
    if enabled.is_empty() || disabled.is_empty() {
        return Ok(());
    }

    let unusable = |error: TextureError| FrameGraphError::UnusableTexture {
        task: node.name.clone(),
        error
    };
    let enabled_outputs = get_outputs(enabled, textures).map_err(unusable)?;
    let disabled_outputs = get_outputs(disabled, textures).map_err(unusable)?;

    if enabled_outputs.textures.len() != disabled_outputs.textures.len() {
        return Err(FrameGraphError::OutputTextureMismatch(node.name.clone()));
    }
    for slot in 0..enabled_outputs.textures.len() {
        let same_texture = enabled_outputs.textures[slot] == disabled_outputs.textures[slot];
        let same_history = enabled_outputs.history[slot].is_some()
            && enabled_outputs.history[slot] == disabled_outputs.history[slot];
        if !same_texture && !same_history {
            return Err(FrameGraphError::OutputTextureMismatch(node.name.clone()));
        }
    }

    if enabled_outputs.depth != disabled_outputs.depth {
        return Err(FrameGraphError::OutputDepthMismatch(node.name.clone()));
    }

    if enabled_outputs.object_list != disabled_outputs.object_list {
        return Err(FrameGraphError::OutputObjectListMismatch(node.name.clone()));
    }

    Ok(())
}
