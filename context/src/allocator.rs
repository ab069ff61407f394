use api_types::device::{PhysicalTexture, RenderDevice};
use api_types::handle::TextureHandle;
use api_types::image::TextureDescription;

/// Range of tasks (by execution index, inclusive) that touch a texture.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TextureLifespan {
    pub first_task: usize,
    pub last_task: usize
}

impl TextureLifespan {
    pub fn new(task: usize) -> Self {
        TextureLifespan {
            first_task: task,
            last_task: task
        }
    }

    pub fn extend(&mut self, task: usize) {
        self.first_task = self.first_task.min(task);
        self.last_task = self.last_task.max(task);
    }

    pub fn overlaps(&self, other: &TextureLifespan) -> bool {
        self.first_task <= other.last_task && other.first_task <= self.last_task
    }
}

/// One physical texture the texture manager needs backing for.
#[derive(Clone, Debug)]
pub struct TextureRequest {
    pub handle: TextureHandle,
    pub name: String,
    pub description: TextureDescription,
    /// `None` means the texture must stay alive for the whole frame and across
    /// frames (history textures, textures no task references).
    pub lifespan: Option<TextureLifespan>,
    pub history_side: Option<usize>
}

/// Decides which physical texture backs each request.
///
/// Implementations may hand the same physical texture to several requests as
/// long as their lifespans never overlap and their descriptions match. The
/// returned vector must have one entry per request, in request order.
pub trait TextureAllocator {
    fn allocate(
        &mut self,
        device: &mut dyn RenderDevice,
        requests: &[TextureRequest]) -> Vec<PhysicalTexture>;
}

/// Gives every request a texture of its own.
#[derive(Debug, Default)]
pub struct DedicatedAllocator;

impl TextureAllocator for DedicatedAllocator {
    fn allocate(
        &mut self,
        device: &mut dyn RenderDevice,
        requests: &[TextureRequest]) -> Vec<PhysicalTexture> {

        requests.iter()
            .map(|request| device.create_texture(&request.name, &request.description))
            .collect()
    }
}
