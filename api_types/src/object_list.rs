use std::cell::{Ref, RefCell};
use std::fmt::{Debug, Formatter};
use std::rc::Rc;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u64);

/// Shared list of objects selected for rendering.
///
/// Clones share the same storage. Two lists compare equal only when they are
/// the same list, which is what cull pass output validation relies on.
#[derive(Clone, Default)]
pub struct ObjectList {
    objects: Rc<RefCell<Vec<ObjectId>>>
}

impl Debug for ObjectList {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectList")
            .field("len", &self.len())
            .finish()
    }
}

impl PartialEq for ObjectList {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.objects, &other.objects)
    }
}
impl Eq for ObjectList {}

impl ObjectList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, objects: Vec<ObjectId>) {
        *self.objects.borrow_mut() = objects;
    }

    pub fn push(&self, object: ObjectId) {
        self.objects.borrow_mut().push(object);
    }

    pub fn clear(&self) {
        self.objects.borrow_mut().clear();
    }

    pub fn len(&self) -> usize {
        self.objects.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.borrow().is_empty()
    }

    pub fn get_objects(&self) -> Ref<'_, Vec<ObjectId>> {
        self.objects.borrow()
    }
}
