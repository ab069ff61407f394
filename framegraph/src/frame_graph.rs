use std::cell::RefCell;
use std::fmt::{Debug, Formatter};
use std::rc::Rc;
use std::time::Duration;
use api_types::device::DeviceInterface;
use api_types::handle::TextureHandle;
use context::allocator::{DedicatedAllocator, TextureAllocator};
use context::render_context::RenderContext;
use context::texture_manager::TextureManager;
use crate::compiler;
use crate::cull_pass_node::CullPassNode;
use crate::error::{FrameGraphError, ReadyError};
use crate::normal_pass_node::NormalPassNode;
use crate::pass_type::PassType;
use crate::ready;
use crate::render_pass_node::RenderPassNode;
use crate::task::{check_task, Task, TaskNode};

/// Index of a task in execution order.
pub type TaskId = usize;

pub struct FrameGraphOptions {
    allocator: Box<dyn TextureAllocator>,
    ready_poll_interval: Duration,
    ready_timeout: Duration
}

impl Default for FrameGraphOptions {
    fn default() -> Self {
        FrameGraphOptions {
            allocator: Box::new(DedicatedAllocator),
            ready_poll_interval: Duration::from_millis(16),
            ready_timeout: Duration::from_secs(30)
        }
    }
}

impl Debug for FrameGraphOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameGraphOptions")
            .field("ready_poll_interval", &self.ready_poll_interval)
            .field("ready_timeout", &self.ready_timeout)
            .finish()
    }
}

impl FrameGraphOptions {
    pub fn with_allocator(mut self, allocator: Box<dyn TextureAllocator>) -> Self {
        self.allocator = allocator;
        self
    }

    pub fn with_ready_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.ready_poll_interval = poll_interval;
        self
    }

    pub fn with_ready_timeout(mut self, timeout: Duration) -> Self {
        self.ready_timeout = timeout;
        self
    }
}

/// Ordered list of tasks, built into passes once and executed every frame.
///
/// Tasks run in the order they were added. [`FrameGraph::build`] records
/// every task, then allocates every declared texture in one go, then checks
/// each task and tells it its textures exist. A failed build leaves the
/// graph empty.
pub struct FrameGraph {
    texture_manager: Rc<RefCell<TextureManager>>,
    render_context: RenderContext,
    tasks: Vec<TaskNode>,
    recording: Option<TaskId>,
    ready_poll_interval: Duration,
    ready_timeout: Duration,
    disposed: bool
}

impl Debug for FrameGraph {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameGraph")
            .field("tasks", &self.tasks)
            .field("recording", &self.recording)
            .field("disposed", &self.disposed)
            .finish()
    }
}

impl FrameGraph {
    pub fn new(device: DeviceInterface) -> Self {
        Self::with_options(device, FrameGraphOptions::default())
    }

    pub fn with_options(device: DeviceInterface, options: FrameGraphOptions) -> Self {
        let texture_manager = Rc::new(RefCell::new(
            TextureManager::with_allocator(device.clone(), options.allocator)));
        let render_context = RenderContext::new(device, texture_manager.clone());

        FrameGraph {
            texture_manager,
            render_context,
            tasks: Vec::new(),
            recording: None,
            ready_poll_interval: options.ready_poll_interval,
            ready_timeout: options.ready_timeout,
            disposed: false
        }
    }

    pub fn get_texture_manager(&self) -> Rc<RefCell<TextureManager>> {
        self.texture_manager.clone()
    }

    pub fn get_render_context(&self) -> &RenderContext {
        &self.render_context
    }

    pub fn get_render_context_mut(&mut self) -> &mut RenderContext {
        &mut self.render_context
    }

    pub fn get_backbuffer_color(&self) -> TextureHandle {
        self.texture_manager.borrow().get_backbuffer_color()
    }

    pub fn get_backbuffer_depth_stencil(&self) -> TextureHandle {
        self.texture_manager.borrow().get_backbuffer_depth_stencil()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn get_tasks(&self) -> &[TaskNode] {
        &self.tasks
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    pub fn get_task_by_name(&self, name: &str) -> Option<&TaskNode> {
        self.tasks.iter().find(|node| node.get_name() == name)
    }

    pub fn get_task_by_name_mut(&mut self, name: &str) -> Option<&mut TaskNode> {
        self.tasks.iter_mut().find(|node| node.get_name() == name)
    }

    pub fn get_tasks_by_class(&self, class_name: &str) -> Vec<&TaskNode> {
        self.tasks.iter()
            .filter(|node| node.get_class_name() == class_name)
            .collect()
    }

    pub fn get_recording_task(&self) -> Option<&TaskNode> {
        self.recording.and_then(|index| self.tasks.get(index))
    }

    pub fn get_recording_task_mut(&mut self) -> Option<&mut TaskNode> {
        self.recording.and_then(|index| self.tasks.get_mut(index))
    }

    pub fn add_task<T: Task + 'static>(&mut self, task: T) -> Result<TaskId, FrameGraphError> {
        self.add_boxed_task(Box::new(task))
    }

    pub fn add_boxed_task(&mut self, task: Box<dyn Task>) -> Result<TaskId, FrameGraphError> {
        if self.disposed {
            return Err(FrameGraphError::Disposed);
        }
        if let Some(recording) = self.get_recording_task() {
            return Err(FrameGraphError::TaskAddedWhileRecording {
                task: task.get_name().to_string(),
                recording: recording.get_name().to_string()
            });
        }

        log::trace!(target: "framegraph", "Adding task {}", task.get_name());
        self.tasks.push(TaskNode::new(task));
        Ok(self.tasks.len() - 1)
    }

    fn push_pass<F>(
        &mut self,
        name: &str,
        when_disabled: bool,
        create_pass: F) -> Result<&mut PassType, FrameGraphError>
    where
        F: FnOnce(&str, &str) -> PassType
    {
        let node = self.recording
            .and_then(|index| self.tasks.get_mut(index))
            .ok_or_else(|| FrameGraphError::PassAddedOutsideRecording(name.to_string()))?;

        let pass = create_pass(name, node.get_name());
        log::trace!(target: "framegraph", "Task {} added {:?} pass {}{}",
            node.get_name(), pass.get_kind(), name, if when_disabled { " (disabled path)" } else { "" });
        Ok(node.get_pass_lists_mut().push(pass, when_disabled))
    }

    /// Adds a pass to the recording task, to its disabled pass list when
    /// `when_disabled` is set.
    pub fn add_pass(&mut self, name: &str, when_disabled: bool) -> Result<&mut NormalPassNode, FrameGraphError> {
        let pass = self.push_pass(name, when_disabled, |name, task_name| {
            PassType::Normal(NormalPassNode::new(name, task_name))
        })?;
        match pass {
            PassType::Normal(normal_pass) => Ok(normal_pass),
            _ => unreachable!("a normal pass was just pushed")
        }
    }

    pub fn add_render_pass(&mut self, name: &str, when_disabled: bool) -> Result<&mut RenderPassNode, FrameGraphError> {
        let pass = self.push_pass(name, when_disabled, |name, task_name| {
            PassType::Render(RenderPassNode::new(name, task_name))
        })?;
        match pass {
            PassType::Render(render_pass) => Ok(render_pass),
            _ => unreachable!("a render pass was just pushed")
        }
    }

    pub fn add_cull_pass(&mut self, name: &str, when_disabled: bool) -> Result<&mut CullPassNode, FrameGraphError> {
        let pass = self.push_pass(name, when_disabled, |name, task_name| {
            PassType::Cull(CullPassNode::new(name, task_name))
        })?;
        match pass {
            PassType::Cull(cull_pass) => Ok(cull_pass),
            _ => unreachable!("a cull pass was just pushed")
        }
    }

    fn check_usable(&self, operation: &'static str) -> Result<(), FrameGraphError> {
        if self.disposed {
            return Err(FrameGraphError::Disposed);
        }
        if let Some(recording) = self.get_recording_task() {
            return Err(FrameGraphError::CalledWhileRecording {
                operation,
                task: recording.get_name().to_string()
            });
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub fn build(&mut self) -> Result<(), FrameGraphError> {
        self.check_usable("build")?;
        log::debug!(target: "framegraph", "Building {} tasks", self.tasks.len());

        let result = self.build_tasks();
        if let Err(error) = &result {
            log::error!(target: "framegraph", "Frame graph build failed, clearing all tasks: {}", error);
            self.recording = None;
            self.texture_manager.borrow_mut().set_recording_task(false);
            self.clear();
        }
        result
    }

    fn build_tasks(&mut self) -> Result<(), FrameGraphError> {
        self.texture_manager.borrow_mut().release_textures(false);

        for index in 0..self.tasks.len() {
            self.record_task(index)?;
        }

        let lifespans = compiler::compute_lifespans(&self.tasks, &self.texture_manager.borrow());
        self.texture_manager.borrow_mut().allocate_textures(&lifespans)?;

        {
            let textures = self.texture_manager.borrow();
            for node in &self.tasks {
                check_task(node, &textures)?;
                for handle in node.get_dependencies() {
                    textures.get_source_handle(handle).map_err(|error| FrameGraphError::UnusableTexture {
                        task: node.get_name().to_string(),
                        error
                    })?;
                }
            }
        }

        for node in self.tasks.iter_mut() {
            node.notify_textures_allocated(&mut self.render_context)?;
        }
        Ok(())
    }

    fn record_task(&mut self, index: TaskId) -> Result<(), FrameGraphError> {
        let Some(node) = self.tasks.get_mut(index) else {
            return Ok(());
        };
        node.reset();
        let Some(mut task) = node.take_task() else {
            return Ok(());
        };

        log::trace!(target: "framegraph", "Recording task {}", task.get_name());
        self.recording = Some(index);
        self.texture_manager.borrow_mut().set_recording_task(true);
        let result = task.record(self);
        self.texture_manager.borrow_mut().set_recording_task(false);
        self.recording = None;

        if let Some(node) = self.tasks.get_mut(index) {
            node.restore_task(task);
        }
        result
    }

    /// Runs the active pass list of every task, in task order.
    #[tracing::instrument(skip(self))]
    pub fn execute(&mut self) -> Result<(), FrameGraphError> {
        self.check_usable("execute")?;

        self.render_context.invalidate_render_target();
        self.render_context.bind_render_target(None, Some("frame graph start"));
        self.texture_manager.borrow_mut().update_history_textures();

        for node in self.tasks.iter_mut() {
            node.execute(&mut self.render_context)?;
        }
        Ok(())
    }

    /// Names of whatever is not ready yet: the render context and/or tasks.
    pub fn get_pending_readiness(&self) -> Result<Vec<String>, ReadyError> {
        if self.disposed {
            return Err(ReadyError::Disposed);
        }

        let mut pending = Vec::new();
        if !self.render_context.is_ready() {
            pending.push("render context".to_string());
        }
        for node in &self.tasks {
            match node.is_ready() {
                Ok(true) => {},
                Ok(false) => pending.push(node.get_name().to_string()),
                Err(error) => {
                    log::error!(target: "framegraph", "Readiness check of task {} failed: {}", node.get_name(), error);
                    pending.push(node.get_name().to_string());
                }
            }
        }
        Ok(pending)
    }

    /// Waits until the render context and every task are ready, checking
    /// every `poll_interval`.
    pub async fn when_ready_async(&self, poll_interval: Duration, timeout: Duration) -> Result<(), ReadyError> {
        ready::poll_until_ready(|| self.get_pending_readiness(), poll_interval, timeout).await
    }

    /// [`FrameGraph::when_ready_async`] with the configured interval and timeout.
    pub async fn when_ready(&self) -> Result<(), ReadyError> {
        self.when_ready_async(self.ready_poll_interval, self.ready_timeout).await
    }

    /// Drops every task. The graph can be filled and built again.
    pub fn clear(&mut self) {
        if let Some(recording) = self.get_recording_task() {
            log::warn!(target: "framegraph", "Ignoring clear() while task {} is recording", recording.get_name());
            return;
        }
        for node in self.tasks.iter_mut() {
            node.dispose();
        }
        self.tasks.clear();
        self.texture_manager.borrow_mut().release_textures(false);
    }

    /// Tears the graph down for good. Calling it again does nothing.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.clear();
        self.texture_manager.borrow_mut().dispose();
        self.render_context.dispose();
        self.disposed = true;
        log::debug!(target: "framegraph", "Frame graph disposed");
    }
}
