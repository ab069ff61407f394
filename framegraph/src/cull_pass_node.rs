use std::fmt::{Debug, Formatter};
use api_types::object_list::ObjectList;
use crate::pass_node::{PassBase, PassNode};

/// Pass whose output is a list of objects to render, not a texture.
pub struct CullPassNode {
    base: PassBase,
    object_list: Option<ObjectList>
}

impl CullPassNode {
    pub fn new(name: &str, task_name: &str) -> Self {
        CullPassNode {
            base: PassBase::new(name, task_name),
            object_list: None
        }
    }

    pub fn set_object_list(&mut self, object_list: ObjectList) -> &mut Self {
        self.object_list = Some(object_list);
        self
    }

    pub fn get_object_list(&self) -> Option<&ObjectList> {
        self.object_list.as_ref()
    }
}

impl PassNode for CullPassNode {
    fn get_base(&self) -> &PassBase {
        &self.base
    }

    fn get_base_mut(&mut self) -> &mut PassBase {
        &mut self.base
    }

    fn is_valid(&self) -> Option<String> {
        if self.object_list.is_none() {
            return Some("no object list was set".to_string());
        }
        if self.base.has_execute_func() {
            None
        } else {
            Some("no execute function was set".to_string())
        }
    }
}

impl Debug for CullPassNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CullPassNode")
            .field("name", &self.get_name())
            .field("object_list", &self.object_list)
            .finish()
    }
}
