use std::cell::RefCell;
use std::fmt::{Debug, Formatter};
use std::rc::Rc;
use glam::Vec4;
use api_types::device::{DeviceInterface, PhysicalTexture};
use api_types::handle::TextureHandle;
use api_types::image::SamplingMode;
use api_types::object_list::ObjectList;
use api_types::shader::ShaderEffect;
use crate::enter_span;
use crate::texture_manager::{TextureError, TextureManager};

/// Color attachments (several for MRT) plus an optional depth attachment.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderTarget {
    pub colors: Vec<TextureHandle>,
    pub depth: Option<TextureHandle>
}

impl RenderTarget {
    pub fn new(colors: Vec<TextureHandle>, depth: Option<TextureHandle>) -> Self {
        RenderTarget {
            colors,
            depth
        }
    }

    pub fn color(handle: TextureHandle) -> Self {
        RenderTarget::new(vec![handle], None)
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty() && self.depth.is_none()
    }
}

/// The execution-time surface handed to every pass callback.
///
/// Render target binds are lazy: [`RenderContext::bind_render_target`] only
/// records the request, and the device framebuffer changes on the next
/// operation that draws, clears or copies.
pub struct RenderContext {
    device: DeviceInterface,
    textures: Rc<RefCell<TextureManager>>,
    // None is the backbuffer
    requested: Option<RenderTarget>,
    needs_apply: bool,
    pending_label: Option<String>,
    disposed: bool
}

impl Debug for RenderContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderContext")
            .field("requested", &self.requested)
            .field("needs_apply", &self.needs_apply)
            .field("disposed", &self.disposed)
            .finish()
    }
}

impl RenderContext {
    pub fn new(device: DeviceInterface, textures: Rc<RefCell<TextureManager>>) -> Self {
        RenderContext {
            device,
            textures,
            requested: None,
            needs_apply: true,
            pending_label: None,
            disposed: false
        }
    }

    pub fn get_device(&self) -> DeviceInterface {
        self.device.clone()
    }

    pub fn get_texture_manager(&self) -> Rc<RefCell<TextureManager>> {
        self.textures.clone()
    }

    /// Whether device-side helpers are ready. Always false once disposed.
    pub fn is_ready(&self) -> bool {
        !self.disposed && self.device.borrow().is_ready()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn is_backbuffer(&self, handle: TextureHandle) -> bool {
        self.textures.borrow().is_backbuffer(handle)
    }

    /// Requests `target` (the backbuffer for `None`) for the following
    /// operations. Requesting the target already requested does nothing.
    pub fn bind_render_target(&mut self, target: Option<&RenderTarget>, label: Option<&str>) {
        if !self.needs_apply && self.requested.as_ref() == target {
            return;
        }
        self.requested = target.cloned();
        self.needs_apply = true;
        self.pending_label = label.map(str::to_string);
    }

    /// Forgets what is bound on the device, so the next request binds again
    /// even if it names the same target.
    pub fn invalidate_render_target(&mut self) {
        self.needs_apply = true;
    }

    pub fn get_requested_render_target(&self) -> Option<&RenderTarget> {
        self.requested.as_ref()
    }

    fn apply_render_target(&mut self) -> Result<(), TextureError> {
        if !self.needs_apply {
            return Ok(());
        }
        enter_span!(tracing::Level::TRACE, "Apply render target");

        let (colors, depth) = {
            let textures = self.textures.borrow();
            match &self.requested {
                Some(target) => {
                    let colors = target.colors.iter()
                        .map(|handle| textures.get_texture_from_handle(*handle))
                        .collect::<Result<Vec<PhysicalTexture>, TextureError>>()?;
                    let depth = match target.depth {
                        Some(handle) => Some(textures.get_texture_from_handle(handle)?),
                        None => None
                    };
                    (colors, depth)
                },
                None => {
                    let device = self.device.borrow();
                    (vec![device.get_backbuffer_color()], Some(device.get_backbuffer_depth_stencil()))
                }
            }
        };

        let mut device = self.device.borrow_mut();
        device.bind_framebuffer(&colors, depth);
        if let Some(label) = self.pending_label.take() {
            device.push_debug_group(&label);
            device.pop_debug_group();
        }
        log::trace!(target: "render_context", "Bound framebuffer {:?} / {:?}", colors, depth);
        self.needs_apply = false;
        Ok(())
    }

    pub fn clear(&mut self, color: Option<Vec4>, depth: bool, stencil: bool) -> Result<(), TextureError> {
        self.apply_render_target()?;
        self.device.borrow_mut().clear(color, depth, stencil);
        Ok(())
    }

    /// Copies `source` into the current target, or into the backbuffer when
    /// `force_to_backbuffer` is set.
    pub fn copy_texture(&mut self, source: TextureHandle, force_to_backbuffer: bool) -> Result<(), TextureError> {
        if force_to_backbuffer {
            self.bind_render_target(None, None);
        }
        let texture = self.get_read_texture_from_handle(source)?;
        self.apply_render_target()?;
        self.device.borrow_mut().copy_texture(texture);
        Ok(())
    }

    /// Draws `effect` over the current target.
    ///
    /// Returns `Ok(false)` without touching the device when the effect is not
    /// ready yet. `bind` runs after the target is bound and before the draw.
    pub fn apply_full_screen_effect<F>(
        &mut self,
        effect: &dyn ShaderEffect,
        bind: F) -> Result<bool, TextureError>
    where
        F: FnOnce(&mut RenderContext) -> Result<(), TextureError>
    {
        if !effect.is_ready() {
            return Ok(false);
        }
        self.apply_render_target()?;
        bind(self)?;
        self.device.borrow_mut().draw_full_screen(effect.get_name());
        Ok(true)
    }

    pub fn bind_texture_handle(
        &mut self,
        effect: &dyn ShaderEffect,
        uniform: &str,
        handle: TextureHandle) -> Result<(), TextureError> {

        let texture = self.get_read_texture_from_handle(handle)?;
        self.device.borrow_mut().bind_texture(effect.get_name(), uniform, texture);
        Ok(())
    }

    /// Sets the sampling mode on every texture backing `handle`, both halves
    /// of a history texture included.
    pub fn set_texture_sampling_mode(&mut self, handle: TextureHandle, mode: SamplingMode) -> Result<(), TextureError> {
        let textures = self.textures.borrow().get_backing_textures(handle)?;
        let mut device = self.device.borrow_mut();
        for texture in textures {
            device.set_sampling_mode(texture, mode);
        }
        Ok(())
    }

    pub fn set_depth_states(&mut self, test: bool, write: bool) {
        self.device.borrow_mut().set_depth_states(test, write);
    }

    pub fn render_objects(&mut self, objects: &ObjectList) -> Result<(), TextureError> {
        self.apply_render_target()?;
        self.device.borrow_mut().draw_objects(&objects.get_objects());
        Ok(())
    }

    /// Generates mip maps for the texture last written through `handle`.
    pub fn generate_mip_maps(&mut self, handle: TextureHandle) -> Result<(), TextureError> {
        let texture = self.textures.borrow().get_texture_from_handle(handle)?;
        self.device.borrow_mut().generate_mip_maps(texture);
        Ok(())
    }

    pub fn push_debug_group(&mut self, label: &str) {
        self.device.borrow_mut().push_debug_group(label);
    }

    pub fn pop_debug_group(&mut self) {
        self.device.borrow_mut().pop_debug_group();
    }

    /// The physical texture reads of `handle` go to (the read half for a
    /// history texture).
    pub fn get_read_texture_from_handle(&self, handle: TextureHandle) -> Result<PhysicalTexture, TextureError> {
        self.textures.borrow().get_read_texture_from_handle(handle)
    }

    pub fn dispose(&mut self) {
        self.requested = None;
        self.needs_apply = true;
        self.pending_label = None;
        self.disposed = true;
    }
}
