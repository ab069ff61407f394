use std::fmt::{Debug, Formatter};
use crate::pass_node::{PassBase, PassNode};

/// Host-side work with no render target, e.g. firing a callback.
pub struct NormalPassNode {
    base: PassBase
}

impl NormalPassNode {
    pub fn new(name: &str, task_name: &str) -> Self {
        NormalPassNode {
            base: PassBase::new(name, task_name)
        }
    }
}

impl PassNode for NormalPassNode {
    fn get_base(&self) -> &PassBase {
        &self.base
    }

    fn get_base_mut(&mut self) -> &mut PassBase {
        &mut self.base
    }
}

impl Debug for NormalPassNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NormalPassNode")
            .field("name", &self.get_name())
            .finish()
    }
}
