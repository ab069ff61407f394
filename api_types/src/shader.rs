use std::cell::Cell;
use std::fmt::{Debug, Formatter};
use std::rc::Rc;

/// A compiled (or compiling) full-screen effect the device knows by name.
pub trait ShaderEffect {
    fn get_name(&self) -> &str;

    fn is_ready(&self) -> bool;
}

/// Effect whose readiness is flipped from outside, typically once an
/// asynchronous shader compile finishes.
#[derive(Clone)]
pub struct EffectWrapper {
    name: String,
    ready: Rc<Cell<bool>>
}

impl Debug for EffectWrapper {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectWrapper")
            .field("name", &self.name)
            .field("ready", &self.ready.get())
            .finish()
    }
}

impl EffectWrapper {
    pub fn new(name: &str, ready: bool) -> Self {
        EffectWrapper {
            name: name.to_string(),
            ready: Rc::new(Cell::new(ready))
        }
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.set(ready);
    }
}

impl ShaderEffect for EffectWrapper {
    fn get_name(&self) -> &str {
        &self.name
    }

    fn is_ready(&self) -> bool {
        self.ready.get()
    }
}
