use std::cell::RefCell;
use std::rc::Rc;
use glam::Vec4;
use crate::image::{SamplingMode, TextureDescription};
use crate::object_list::ObjectId;

pub mod headless;

/// Identifier of a texture object living on the device.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PhysicalTexture(u64);

impl PhysicalTexture {
    pub fn new(id: u64) -> Self {
        PhysicalTexture(id)
    }

    pub fn get_id(&self) -> u64 {
        self.0
    }
}

/// The GPU engine abstraction the frame graph drives.
///
/// Commands are immediate from the graph's point of view; a backend is free to
/// record them into command buffers.
pub trait RenderDevice {
    fn get_backbuffer_size(&self) -> (u32, u32);

    fn get_backbuffer_color(&self) -> PhysicalTexture;

    fn get_backbuffer_depth_stencil(&self) -> PhysicalTexture;

    /// Whether device-side helpers (copy/blit programs) are ready for use.
    fn is_ready(&self) -> bool;

    fn create_texture(&mut self, name: &str, description: &TextureDescription) -> PhysicalTexture;

    fn destroy_texture(&mut self, texture: PhysicalTexture);

    fn bind_framebuffer(&mut self, colors: &[PhysicalTexture], depth: Option<PhysicalTexture>);

    fn clear(&mut self, color: Option<Vec4>, depth: bool, stencil: bool);

    /// Copies `source` into the currently bound framebuffer.
    fn copy_texture(&mut self, source: PhysicalTexture);

    fn set_sampling_mode(&mut self, texture: PhysicalTexture, mode: SamplingMode);

    fn bind_texture(&mut self, effect: &str, uniform: &str, texture: PhysicalTexture);

    fn set_depth_states(&mut self, test: bool, write: bool);

    fn draw_full_screen(&mut self, effect: &str);

    fn draw_objects(&mut self, objects: &[ObjectId]);

    fn generate_mip_maps(&mut self, texture: PhysicalTexture);

    fn push_debug_group(&mut self, label: &str);

    fn pop_debug_group(&mut self);
}

pub type DeviceInterface = Rc<RefCell<dyn RenderDevice>>;
