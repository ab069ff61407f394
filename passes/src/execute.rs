use std::cell::RefCell;
use std::rc::Rc;
use context::render_context::RenderContext;
use framegraph::error::FrameGraphError;
use framegraph::frame_graph::FrameGraph;
use framegraph::pass_node::{ExecuteFn, PassNode};
use framegraph::task::Task;

type SharedExecuteFn = Rc<RefCell<Box<ExecuteFn>>>;

fn forward(execute_func: &SharedExecuteFn) -> impl FnMut(&mut RenderContext) -> Result<(), FrameGraphError> + 'static {
    let execute_func = execute_func.clone();
    move |render_context: &mut RenderContext| (&mut *execute_func.borrow_mut())(render_context)
}

/// Runs arbitrary code at its place in the task order, with an optional
/// replacement while disabled.
pub struct ExecuteTask {
    name: String,
    execute_func: SharedExecuteFn,
    execute_func_disabled: Option<SharedExecuteFn>
}

impl ExecuteTask {
    pub fn new<F>(name: &str, execute_func: F) -> Self
    where
        F: FnMut(&mut RenderContext) -> Result<(), FrameGraphError> + 'static
    {
        let execute_func: Box<ExecuteFn> = Box::new(execute_func);
        ExecuteTask {
            name: name.to_string(),
            execute_func: Rc::new(RefCell::new(execute_func)),
            execute_func_disabled: None
        }
    }

    pub fn with_disabled_func<F>(mut self, execute_func: F) -> Self
    where
        F: FnMut(&mut RenderContext) -> Result<(), FrameGraphError> + 'static
    {
        let execute_func: Box<ExecuteFn> = Box::new(execute_func);
        self.execute_func_disabled = Some(Rc::new(RefCell::new(execute_func)));
        self
    }
}

impl Task for ExecuteTask {
    fn get_name(&self) -> &str {
        &self.name
    }

    fn get_class_name(&self) -> &str {
        "ExecuteTask"
    }

    fn record(&mut self, frame_graph: &mut FrameGraph) -> Result<(), FrameGraphError> {
        frame_graph.add_pass(&self.name, false)?
            .set_execute_func(forward(&self.execute_func));

        if let Some(execute_func_disabled) = &self.execute_func_disabled {
            frame_graph.add_pass(&format!("{} (disabled)", self.name), true)?
                .set_execute_func(forward(execute_func_disabled));
        }
        Ok(())
    }
}
