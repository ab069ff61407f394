use std::rc::Rc;
use api_types::object_list::{ObjectId, ObjectList};
use context::enter_span;
use context::render_context::RenderContext;
use framegraph::error::FrameGraphError;
use framegraph::frame_graph::FrameGraph;
use framegraph::pass_node::PassNode;
use framegraph::task::Task;

pub type CullFilter = dyn Fn(ObjectId) -> bool;

/// Selects the objects of `objects` that pass `filter`. While disabled every
/// object is selected.
pub struct CullObjectsTask {
    name: String,
    objects: ObjectList,
    filter: Rc<CullFilter>,
    output: ObjectList
}

impl CullObjectsTask {
    pub fn new<F>(name: &str, objects: ObjectList, filter: F) -> Self
    where
        F: Fn(ObjectId) -> bool + 'static
    {
        CullObjectsTask {
            name: name.to_string(),
            objects,
            filter: Rc::new(filter),
            output: ObjectList::new()
        }
    }

    pub fn get_output_object_list(&self) -> ObjectList {
        self.output.clone()
    }
}

impl Task for CullObjectsTask {
    fn get_name(&self) -> &str {
        &self.name
    }

    fn get_class_name(&self) -> &str {
        "CullObjectsTask"
    }

    fn record(&mut self, frame_graph: &mut FrameGraph) -> Result<(), FrameGraphError> {
        let (objects, is_visible, output) = (self.objects.clone(), self.filter.clone(), self.output.clone());
        frame_graph.add_cull_pass(&self.name, false)?
            .set_object_list(self.output.clone())
            .set_execute_func(move |_: &mut RenderContext| {
                enter_span!(tracing::Level::TRACE, "Cull objects");
                let visible = objects.get_objects().iter()
                    .copied()
                    .filter(|object| is_visible(*object))
                    .collect();
                output.set(visible);
                Ok(())
            });

        let (objects, output) = (self.objects.clone(), self.output.clone());
        frame_graph.add_cull_pass(&format!("{} (disabled)", self.name), true)?
            .set_object_list(self.output.clone())
            .set_execute_func(move |_: &mut RenderContext| {
                output.set(objects.get_objects().clone());
                Ok(())
            });

        Ok(())
    }
}
