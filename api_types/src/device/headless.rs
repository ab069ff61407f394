use std::collections::HashMap;
use glam::Vec4;
use crate::device::{PhysicalTexture, RenderDevice};
use crate::image::{SamplingMode, TextureDescription};
use crate::object_list::ObjectId;

/// A device command as seen by [`HeadlessDevice`].
#[derive(Clone, Debug, PartialEq)]
pub enum DeviceCommand {
    CreateTexture {
        texture: PhysicalTexture,
        name: String,
        width: u32,
        height: u32
    },
    DestroyTexture(PhysicalTexture),
    BindFramebuffer {
        colors: Vec<PhysicalTexture>,
        depth: Option<PhysicalTexture>
    },
    Clear {
        color: Option<Vec4>,
        depth: bool,
        stencil: bool
    },
    CopyTexture(PhysicalTexture),
    SetSamplingMode(PhysicalTexture, SamplingMode),
    BindTexture {
        effect: String,
        uniform: String,
        texture: PhysicalTexture
    },
    SetDepthStates {
        test: bool,
        write: bool
    },
    DrawFullScreen(String),
    DrawObjects(Vec<ObjectId>),
    GenerateMipMaps(PhysicalTexture),
    PushDebugGroup(String),
    PopDebugGroup
}

/// Device without a GPU: every command is logged in order.
///
/// Used by tests and the headless demo to observe what a frame graph asked the
/// device to do.
pub struct HeadlessDevice {
    backbuffer_size: (u32, u32),
    ready: bool,
    next_texture_id: u64,
    live_textures: HashMap<PhysicalTexture, TextureDescription>,
    commands: Vec<DeviceCommand>
}

const BACKBUFFER_COLOR: PhysicalTexture = PhysicalTexture(0);
const BACKBUFFER_DEPTH_STENCIL: PhysicalTexture = PhysicalTexture(1);

impl HeadlessDevice {
    pub fn new(width: u32, height: u32) -> Self {
        HeadlessDevice {
            backbuffer_size: (width, height),
            ready: true,
            next_texture_id: 2,
            live_textures: HashMap::new(),
            commands: Vec::new()
        }
    }

    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    pub fn set_backbuffer_size(&mut self, width: u32, height: u32) {
        self.backbuffer_size = (width, height);
    }

    pub fn get_commands(&self) -> &[DeviceCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<DeviceCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn get_live_texture_count(&self) -> usize {
        self.live_textures.len()
    }

    pub fn get_texture_description(&self, texture: PhysicalTexture) -> Option<&TextureDescription> {
        self.live_textures.get(&texture)
    }
}

impl RenderDevice for HeadlessDevice {
    fn get_backbuffer_size(&self) -> (u32, u32) {
        self.backbuffer_size
    }

    fn get_backbuffer_color(&self) -> PhysicalTexture {
        BACKBUFFER_COLOR
    }

    fn get_backbuffer_depth_stencil(&self) -> PhysicalTexture {
        BACKBUFFER_DEPTH_STENCIL
    }

    fn is_ready(&self) -> bool {
        self.ready
    }

    fn create_texture(&mut self, name: &str, description: &TextureDescription) -> PhysicalTexture {
        let texture = PhysicalTexture::new(self.next_texture_id);
        self.next_texture_id += 1;
        log::trace!(target: "headless", "Creating texture {} ({}x{}) as {:?}",
            name, description.width, description.height, texture);
        self.live_textures.insert(texture, description.clone());
        self.commands.push(DeviceCommand::CreateTexture {
            texture,
            name: name.to_string(),
            width: description.width,
            height: description.height
        });
        texture
    }

    fn destroy_texture(&mut self, texture: PhysicalTexture) {
        log::trace!(target: "headless", "Destroying texture {:?}", texture);
        self.live_textures.remove(&texture);
        self.commands.push(DeviceCommand::DestroyTexture(texture));
    }

    fn bind_framebuffer(&mut self, colors: &[PhysicalTexture], depth: Option<PhysicalTexture>) {
        self.commands.push(DeviceCommand::BindFramebuffer {
            colors: colors.to_vec(),
            depth
        });
    }

    fn clear(&mut self, color: Option<Vec4>, depth: bool, stencil: bool) {
        self.commands.push(DeviceCommand::Clear { color, depth, stencil });
    }

    fn copy_texture(&mut self, source: PhysicalTexture) {
        self.commands.push(DeviceCommand::CopyTexture(source));
    }

    fn set_sampling_mode(&mut self, texture: PhysicalTexture, mode: SamplingMode) {
        self.commands.push(DeviceCommand::SetSamplingMode(texture, mode));
    }

    fn bind_texture(&mut self, effect: &str, uniform: &str, texture: PhysicalTexture) {
        self.commands.push(DeviceCommand::BindTexture {
            effect: effect.to_string(),
            uniform: uniform.to_string(),
            texture
        });
    }

    fn set_depth_states(&mut self, test: bool, write: bool) {
        self.commands.push(DeviceCommand::SetDepthStates { test, write });
    }

    fn draw_full_screen(&mut self, effect: &str) {
        self.commands.push(DeviceCommand::DrawFullScreen(effect.to_string()));
    }

    fn draw_objects(&mut self, objects: &[ObjectId]) {
        self.commands.push(DeviceCommand::DrawObjects(objects.to_vec()));
    }

    fn generate_mip_maps(&mut self, texture: PhysicalTexture) {
        self.commands.push(DeviceCommand::GenerateMipMaps(texture));
    }

    fn push_debug_group(&mut self, label: &str) {
        self.commands.push(DeviceCommand::PushDebugGroup(label.to_string()));
    }

    fn pop_debug_group(&mut self) {
        self.commands.push(DeviceCommand::PopDebugGroup);
    }
}
