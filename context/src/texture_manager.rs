use std::collections::{HashMap, HashSet};
use slotmap::SlotMap;
use thiserror::Error;
use api_types::device::{DeviceInterface, PhysicalTexture};
use api_types::handle::TextureHandle;
use api_types::image::{TextureCreationOptions, TextureDescription, TextureFormat, TextureOptions, TextureSize};
use crate::allocator::{DedicatedAllocator, TextureAllocator, TextureLifespan, TextureRequest};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TextureError {
    #[error("texture handle {0:?} is stale or was never created")]
    StaleHandle(TextureHandle),
    #[error("texture \"{0}\" is a dangling handle that has not been resolved")]
    Unresolved(String),
    #[error("dangling handle \"{0}\" has already been resolved")]
    AlreadyResolved(String),
    #[error("dangling handle \"{0}\" cannot be resolved to itself")]
    SelfReference(String),
    #[error("textures have already been allocated")]
    AlreadyAllocated,
    #[error("texture \"{0}\" has no physical backing")]
    NotAllocated(String),
    #[error("texture allocator returned {returned} textures for {requested} requests")]
    AllocationMismatch {
        requested: usize,
        returned: usize
    }
}

/// Who a texture belongs to, which decides what a release does to it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TextureNamespace {
    /// Created while a task was recording; deleted before the next build.
    Task,
    /// Created outside of recording; backing released per build, handle kept.
    Graph,
    /// Imported or system textures; never released by the graph.
    External
}

#[derive(Clone, Debug)]
enum TextureSource {
    Dangling,
    Alias(TextureHandle),
    Owned(TextureCreationOptions),
    Imported(TextureDescription),
    Backbuffer(TextureFormat)
}

#[derive(Debug)]
struct HistoryTextures {
    textures: [Option<PhysicalTexture>; 2],
    // write side; the read side is the other one
    index: usize
}

impl HistoryTextures {
    fn new() -> Self {
        HistoryTextures {
            textures: [None, None],
            index: 0
        }
    }
}

#[derive(Debug)]
struct TextureEntry {
    name: String,
    namespace: TextureNamespace,
    source: TextureSource,
    was_dangling: bool,
    texture: Option<PhysicalTexture>,
    history: Option<HistoryTextures>
}

impl TextureEntry {
    fn new(name: &str, namespace: TextureNamespace, source: TextureSource) -> Self {
        TextureEntry {
            name: name.to_string(),
            namespace,
            was_dangling: matches!(source, TextureSource::Dangling),
            source,
            texture: None,
            history: None
        }
    }
}

/// The handle space shared by every task of a frame graph.
///
/// Handles are declared (possibly dangling) while tasks record and only get
/// physical backing in [`TextureManager::allocate_textures`], once every task
/// has recorded.
pub struct TextureManager {
    device: DeviceInterface,
    allocator: Box<dyn TextureAllocator>,
    textures: SlotMap<TextureHandle, TextureEntry>,
    backbuffer_color: TextureHandle,
    backbuffer_depth_stencil: TextureHandle,
    recording_task: bool,
    allocated: bool
}

impl TextureManager {
    pub fn new(device: DeviceInterface) -> Self {
        Self::with_allocator(device, Box::new(DedicatedAllocator))
    }

    pub fn with_allocator(device: DeviceInterface, allocator: Box<dyn TextureAllocator>) -> Self {
        let mut textures = SlotMap::with_key();
        let (color, depth_stencil) = {
            let device_ref = device.borrow();
            (device_ref.get_backbuffer_color(), device_ref.get_backbuffer_depth_stencil())
        };

        let mut color_entry = TextureEntry::new(
            "backbuffer color",
            TextureNamespace::External,
            TextureSource::Backbuffer(TextureFormat::Rgba8Unorm));
        color_entry.texture = Some(color);
        let backbuffer_color = textures.insert(color_entry);

        let mut depth_entry = TextureEntry::new(
            "backbuffer depth/stencil",
            TextureNamespace::External,
            TextureSource::Backbuffer(TextureFormat::Depth24Stencil8));
        depth_entry.texture = Some(depth_stencil);
        let backbuffer_depth_stencil = textures.insert(depth_entry);

        TextureManager {
            device,
            allocator,
            textures,
            backbuffer_color,
            backbuffer_depth_stencil,
            recording_task: false,
            allocated: false
        }
    }

    pub fn set_allocator(&mut self, allocator: Box<dyn TextureAllocator>) {
        self.allocator = allocator;
    }

    pub fn get_device(&self) -> DeviceInterface {
        self.device.clone()
    }

    pub fn get_backbuffer_color(&self) -> TextureHandle {
        self.backbuffer_color
    }

    pub fn get_backbuffer_depth_stencil(&self) -> TextureHandle {
        self.backbuffer_depth_stencil
    }

    pub fn is_backbuffer(&self, handle: TextureHandle) -> bool {
        self.is_backbuffer_color(handle) || self.is_backbuffer_depth_stencil(handle)
    }

    pub fn is_backbuffer_color(&self, handle: TextureHandle) -> bool {
        self.follow_aliases(handle).map_or(false, |source| source == self.backbuffer_color)
    }

    pub fn is_backbuffer_depth_stencil(&self, handle: TextureHandle) -> bool {
        self.follow_aliases(handle).map_or(false, |source| source == self.backbuffer_depth_stencil)
    }

    /// Marks whether a task is currently recording; textures declared while
    /// this is set are task-scoped.
    #[doc(hidden)]
    pub fn set_recording_task(&mut self, recording: bool) {
        self.recording_task = recording;
    }

    fn declaring_namespace(&self) -> TextureNamespace {
        if self.recording_task {
            TextureNamespace::Task
        } else {
            TextureNamespace::Graph
        }
    }

    pub fn create_render_target_texture(
        &mut self,
        name: &str,
        creation_options: TextureCreationOptions) -> TextureHandle {

        let namespace = self.declaring_namespace();
        let is_history = creation_options.is_history;
        let mut entry = TextureEntry::new(name, namespace, TextureSource::Owned(creation_options));
        if is_history {
            entry.history = Some(HistoryTextures::new());
        }
        let handle = self.textures.insert(entry);
        log::trace!(target: "texture", "Declared texture {} as {:?} ({:?})", name, handle, namespace);
        handle
    }

    pub fn create_dangling_handle(&mut self) -> TextureHandle {
        let namespace = self.declaring_namespace();
        let handle = self.textures.insert(TextureEntry::new("dangling", namespace, TextureSource::Dangling));
        log::trace!(target: "texture", "Declared dangling handle {:?} ({:?})", handle, namespace);
        handle
    }

    /// Resolves a dangling handle.
    ///
    /// Without `creation_options` the dangling handle becomes an alias of
    /// `target`. With them it becomes a new texture of its own, named
    /// `name` (or after `target`).
    pub fn resolve_dangling_handle(
        &mut self,
        dangling: TextureHandle,
        target: TextureHandle,
        name: Option<&str>,
        creation_options: Option<TextureCreationOptions>) -> Result<(), TextureError> {

        let dangling_entry = self.get_entry(dangling)?;
        if !matches!(dangling_entry.source, TextureSource::Dangling) {
            return Err(TextureError::AlreadyResolved(dangling_entry.name.clone()));
        }
        let target_name = self.get_entry(target)?.name.clone();
        if self.follow_aliases(target)? == dangling {
            return Err(TextureError::SelfReference(target_name));
        }

        let entry = self.textures.get_mut(dangling).ok_or(TextureError::StaleHandle(dangling))?;
        match creation_options {
            Some(creation_options) => {
                entry.name = name.unwrap_or(&target_name).to_string();
                entry.history = if creation_options.is_history {
                    Some(HistoryTextures::new())
                } else {
                    None
                };
                entry.source = TextureSource::Owned(creation_options);
            },
            None => {
                entry.name = name.unwrap_or(&target_name).to_string();
                entry.source = TextureSource::Alias(target);
            }
        }
        log::trace!(target: "texture", "Resolved dangling handle {:?} to {:?} ({})", dangling, target, entry.name);
        Ok(())
    }

    /// Registers a texture the graph does not own.
    pub fn import_texture(
        &mut self,
        name: &str,
        texture: PhysicalTexture,
        description: TextureDescription) -> TextureHandle {

        let mut entry = TextureEntry::new(name, TextureNamespace::External, TextureSource::Imported(description));
        entry.texture = Some(texture);
        self.textures.insert(entry)
    }

    fn get_entry(&self, handle: TextureHandle) -> Result<&TextureEntry, TextureError> {
        self.textures.get(handle).ok_or(TextureError::StaleHandle(handle))
    }

    fn follow_aliases(&self, handle: TextureHandle) -> Result<TextureHandle, TextureError> {
        let mut current = handle;
        // an alias chain can't be longer than the number of entries
        for _ in 0..=self.textures.len() {
            match self.get_entry(current)?.source {
                TextureSource::Alias(next) => current = next,
                _ => return Ok(current)
            }
        }
        Err(TextureError::SelfReference(self.get_entry(handle)?.name.clone()))
    }

    /// The handle that actually owns the texture `handle` refers to.
    pub fn get_source_handle(&self, handle: TextureHandle) -> Result<TextureHandle, TextureError> {
        let source = self.follow_aliases(handle)?;
        let entry = self.get_entry(source)?;
        match entry.source {
            TextureSource::Dangling => Err(TextureError::Unresolved(entry.name.clone())),
            _ => Ok(source)
        }
    }

    pub fn is_resolved(&self, handle: TextureHandle) -> bool {
        self.get_source_handle(handle).is_ok()
    }

    pub fn get_texture_name(&self, handle: TextureHandle) -> Result<&str, TextureError> {
        Ok(&self.get_entry(handle)?.name)
    }

    pub fn get_namespace(&self, handle: TextureHandle) -> Result<TextureNamespace, TextureError> {
        Ok(self.get_entry(handle)?.namespace)
    }

    pub fn get_texture_creation_options(&self, handle: TextureHandle) -> Result<TextureCreationOptions, TextureError> {
        let entry = self.get_entry(self.get_source_handle(handle)?)?;
        let creation_options = match &entry.source {
            TextureSource::Owned(creation_options) => creation_options.clone(),
            TextureSource::Imported(description) => TextureCreationOptions {
                size: TextureSize::Absolute {
                    width: description.width,
                    height: description.height
                },
                options: description.options.clone(),
                is_history: false
            },
            TextureSource::Backbuffer(format) => TextureCreationOptions::new(TextureSize::default())
                .with_format(*format),
            TextureSource::Dangling | TextureSource::Alias(_) => {
                return Err(TextureError::Unresolved(entry.name.clone()));
            }
        };
        Ok(creation_options)
    }

    pub fn get_texture_description(&self, handle: TextureHandle) -> Result<TextureDescription, TextureError> {
        let entry = self.get_entry(self.get_source_handle(handle)?)?;
        let reference = self.device.borrow().get_backbuffer_size();
        let description = match &entry.source {
            TextureSource::Owned(creation_options) => {
                TextureDescription::from_creation_options(creation_options, reference)
            },
            TextureSource::Imported(description) => description.clone(),
            TextureSource::Backbuffer(format) => TextureDescription::new(
                reference.0,
                reference.1,
                TextureOptions {
                    format: *format,
                    ..Default::default()
                }),
            TextureSource::Dangling | TextureSource::Alias(_) => {
                return Err(TextureError::Unresolved(entry.name.clone()));
            }
        };
        Ok(description)
    }

    pub fn get_absolute_dimensions(&self, size: TextureSize) -> (u32, u32) {
        size.get_absolute(self.device.borrow().get_backbuffer_size())
    }

    pub fn is_history_texture(&self, handle: TextureHandle) -> bool {
        self.follow_aliases(handle)
            .ok()
            .and_then(|source| self.textures.get(source))
            .map_or(false, |entry| entry.history.is_some())
    }

    /// Physical texture written when `handle` is bound as a render target.
    ///
    /// For history textures this is the write half of the pair.
    pub fn get_texture_from_handle(&self, handle: TextureHandle) -> Result<PhysicalTexture, TextureError> {
        let entry = self.get_entry(self.get_source_handle(handle)?)?;
        let texture = match &entry.history {
            Some(history) => history.textures[history.index],
            None => entry.texture
        };
        texture.ok_or_else(|| TextureError::NotAllocated(entry.name.clone()))
    }

    /// Physical texture read when `handle` is sampled or copied from.
    ///
    /// For history textures this is the half written during the previous
    /// frame, so reads never alias the texture being written this frame.
    pub fn get_read_texture_from_handle(&self, handle: TextureHandle) -> Result<PhysicalTexture, TextureError> {
        let entry = self.get_entry(self.get_source_handle(handle)?)?;
        let texture = match &entry.history {
            Some(history) => history.textures[history.index ^ 1],
            None => entry.texture
        };
        texture.ok_or_else(|| TextureError::NotAllocated(entry.name.clone()))
    }

    /// Every physical texture backing `handle` (two for history textures).
    pub fn get_backing_textures(&self, handle: TextureHandle) -> Result<Vec<PhysicalTexture>, TextureError> {
        let entry = self.get_entry(self.get_source_handle(handle)?)?;
        let textures: Vec<PhysicalTexture> = match &entry.history {
            Some(history) => history.textures.iter().flatten().copied().collect(),
            None => entry.texture.into_iter().collect()
        };
        if textures.is_empty() {
            return Err(TextureError::NotAllocated(entry.name.clone()));
        }
        Ok(textures)
    }

    pub fn is_allocated(&self) -> bool {
        self.allocated
    }

    pub fn get_texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Gives physical backing to every declared texture, exactly once per
    /// build.
    #[tracing::instrument(skip_all)]
    pub fn allocate_textures(
        &mut self,
        lifespans: &HashMap<TextureHandle, TextureLifespan>) -> Result<(), TextureError> {

        if self.allocated {
            return Err(TextureError::AlreadyAllocated);
        }

        let reference = self.device.borrow().get_backbuffer_size();
        let mut requests = Vec::new();
        for (handle, entry) in &self.textures {
            let TextureSource::Owned(creation_options) = &entry.source else {
                continue;
            };
            let description = TextureDescription::from_creation_options(creation_options, reference);
            if entry.history.is_some() {
                for side in 0..2 {
                    requests.push(TextureRequest {
                        handle,
                        name: format!("{} (history {})", entry.name, side),
                        description: description.clone(),
                        lifespan: None,
                        history_side: Some(side)
                    });
                }
            } else {
                requests.push(TextureRequest {
                    handle,
                    name: entry.name.clone(),
                    description,
                    lifespan: lifespans.get(&handle).copied(),
                    history_side: None
                });
            }
        }

        let textures = {
            let mut device = self.device.borrow_mut();
            self.allocator.allocate(&mut *device, &requests)
        };
        if textures.len() != requests.len() {
            let returned = textures.len();
            self.destroy_unassigned(textures);
            return Err(TextureError::AllocationMismatch {
                requested: requests.len(),
                returned
            });
        }
        if let Some(request) = requests.iter().find(|request| !self.textures.contains_key(request.handle)) {
            let handle = request.handle;
            self.destroy_unassigned(textures);
            return Err(TextureError::StaleHandle(handle));
        }

        for (request, texture) in requests.iter().zip(textures) {
            let Some(entry) = self.textures.get_mut(request.handle) else {
                continue;
            };
            match (request.history_side, entry.history.as_mut()) {
                (Some(side), Some(history)) => history.textures[side] = Some(texture),
                _ => entry.texture = Some(texture)
            }
        }

        self.allocated = true;
        log::debug!(target: "texture", "Allocated {} textures", requests.len());
        Ok(())
    }

    // textures handed out by the allocator that no entry took ownership of
    fn destroy_unassigned(&self, textures: Vec<PhysicalTexture>) {
        let mut destroyed = HashSet::new();
        let mut device = self.device.borrow_mut();
        for texture in textures {
            if destroyed.insert(texture) {
                device.destroy_texture(texture);
            }
        }
        log::warn!(target: "texture", "Allocation failed, destroyed {} unassigned textures", destroyed.len());
    }

    /// Drops physical backing of graph-owned textures.
    ///
    /// Task-scoped handles are deleted. Graph-scoped handles survive; those
    /// that started out dangling become dangling again so the next build can
    /// resolve them anew. With `release_all` every non-system handle is
    /// deleted, imported ones included.
    #[tracing::instrument(skip(self))]
    pub fn release_textures(&mut self, release_all: bool) {
        let mut to_destroy: Vec<PhysicalTexture> = Vec::new();
        let mut to_remove = Vec::new();

        for (handle, entry) in self.textures.iter_mut() {
            if matches!(entry.source, TextureSource::Backbuffer(_)) {
                continue;
            }
            if entry.namespace == TextureNamespace::External {
                if release_all {
                    to_remove.push(handle);
                }
                continue;
            }

            if let TextureSource::Owned(_) = entry.source {
                to_destroy.extend(entry.texture.take());
                if let Some(history) = entry.history.as_mut() {
                    to_destroy.extend(history.textures.iter_mut().filter_map(Option::take));
                    history.index = 0;
                }
            }

            if release_all || entry.namespace == TextureNamespace::Task {
                to_remove.push(handle);
            } else if entry.was_dangling {
                entry.source = TextureSource::Dangling;
                entry.name = "dangling".to_string();
                entry.history = None;
            }
        }

        for handle in &to_remove {
            self.textures.remove(*handle);
        }

        // an aliasing allocator may have handed the same texture out twice
        let mut destroyed = HashSet::new();
        let mut device = self.device.borrow_mut();
        for texture in to_destroy {
            if destroyed.insert(texture) {
                device.destroy_texture(texture);
            }
        }

        self.allocated = false;
        log::debug!(target: "texture", "Released {} textures, removed {} handles", destroyed.len(), to_remove.len());
    }

    /// Swaps the read and write halves of every history texture.
    pub fn update_history_textures(&mut self) {
        for entry in self.textures.values_mut() {
            if let Some(history) = entry.history.as_mut() {
                history.index ^= 1;
            }
        }
    }

    pub fn dispose(&mut self) {
        self.release_textures(true);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use api_types::device::headless::{DeviceCommand, HeadlessDevice};
    use api_types::device::RenderDevice;
    use super::*;

    fn create_manager() -> (Rc<RefCell<HeadlessDevice>>, TextureManager) {
        let device = Rc::new(RefCell::new(HeadlessDevice::new(1280, 720)));
        let manager = TextureManager::new(device.clone());
        (device, manager)
    }

    fn created_textures(device: &Rc<RefCell<HeadlessDevice>>) -> usize {
        device.borrow().get_commands().iter()
            .filter(|command| matches!(command, DeviceCommand::CreateTexture { .. }))
            .count()
    }

    #[test]
    fn declared_textures_are_not_backed_until_allocation() {
        let (device, mut manager) = create_manager();
        let handle = manager.create_render_target_texture("color", TextureCreationOptions::percentage(50.0, 50.0));

        assert_eq!(created_textures(&device), 0);
        assert_eq!(manager.get_texture_from_handle(handle), Err(TextureError::NotAllocated("color".to_string())));

        manager.allocate_textures(&HashMap::new()).unwrap();
        assert_eq!(created_textures(&device), 1);
        let texture = manager.get_texture_from_handle(handle).unwrap();
        let description = device.borrow().get_texture_description(texture).cloned().unwrap();
        assert_eq!((description.width, description.height), (640, 360));
    }

    #[test]
    fn allocating_twice_without_release_fails() {
        let (_device, mut manager) = create_manager();
        manager.create_render_target_texture("color", TextureCreationOptions::default());
        manager.allocate_textures(&HashMap::new()).unwrap();

        assert_eq!(manager.allocate_textures(&HashMap::new()), Err(TextureError::AlreadyAllocated));
    }

    #[test]
    fn dangling_handle_aliases_its_target() {
        let (_device, mut manager) = create_manager();
        let target = manager.create_render_target_texture("target", TextureCreationOptions::default());
        let dangling = manager.create_dangling_handle();
        assert_eq!(manager.get_source_handle(dangling), Err(TextureError::Unresolved("dangling".to_string())));

        manager.resolve_dangling_handle(dangling, target, None, None).unwrap();
        manager.allocate_textures(&HashMap::new()).unwrap();

        assert_eq!(manager.get_source_handle(dangling), Ok(target));
        assert_eq!(manager.get_texture_from_handle(dangling), manager.get_texture_from_handle(target));
        assert_eq!(manager.get_texture_name(dangling), Ok("target"));
    }

    #[test]
    fn dangling_handle_resolved_twice_is_an_error() {
        let (_device, mut manager) = create_manager();
        let target = manager.create_render_target_texture("target", TextureCreationOptions::default());
        let dangling = manager.create_dangling_handle();
        manager.resolve_dangling_handle(dangling, target, Some("output"), None).unwrap();

        assert_eq!(
            manager.resolve_dangling_handle(dangling, target, None, None),
            Err(TextureError::AlreadyResolved("output".to_string())));
    }

    #[test]
    fn dangling_handle_cannot_point_back_at_itself() {
        let (_device, mut manager) = create_manager();
        let first = manager.create_dangling_handle();
        let second = manager.create_dangling_handle();
        manager.resolve_dangling_handle(second, first, None, None).unwrap();

        assert!(matches!(
            manager.resolve_dangling_handle(first, second, None, None),
            Err(TextureError::SelfReference(_))));
    }

    #[test]
    fn dangling_handle_resolved_with_options_gets_its_own_texture() {
        let (_device, mut manager) = create_manager();
        let target = manager.create_render_target_texture("target", TextureCreationOptions::default());
        let dangling = manager.create_dangling_handle();
        manager.resolve_dangling_handle(
            dangling,
            target,
            Some("copy"),
            Some(TextureCreationOptions::absolute(32, 32))).unwrap();
        manager.allocate_textures(&HashMap::new()).unwrap();

        assert_eq!(manager.get_source_handle(dangling), Ok(dangling));
        assert_ne!(manager.get_texture_from_handle(dangling), manager.get_texture_from_handle(target));
        assert_eq!(manager.get_texture_description(dangling).unwrap().width, 32);
    }

    #[test]
    fn release_drops_task_handles_and_resets_graph_dangling_handles() {
        let (device, mut manager) = create_manager();
        let graph_texture = manager.create_render_target_texture("graph", TextureCreationOptions::default());
        let graph_dangling = manager.create_dangling_handle();

        manager.set_recording_task(true);
        let task_texture = manager.create_render_target_texture("task", TextureCreationOptions::default());
        manager.resolve_dangling_handle(graph_dangling, task_texture, None, None).unwrap();
        manager.set_recording_task(false);

        manager.allocate_textures(&HashMap::new()).unwrap();
        assert_eq!(device.borrow().get_live_texture_count(), 2);

        manager.release_textures(false);
        assert_eq!(device.borrow().get_live_texture_count(), 0);
        assert_eq!(manager.get_texture_name(task_texture), Err(TextureError::StaleHandle(task_texture)));
        assert_eq!(manager.get_namespace(graph_texture), Ok(TextureNamespace::Graph));
        assert!(!manager.is_resolved(graph_dangling));

        // the graph dangling handle can be resolved again on the next build
        manager.resolve_dangling_handle(graph_dangling, graph_texture, None, None).unwrap();
        assert!(manager.is_resolved(graph_dangling));
    }

    #[test]
    fn history_texture_reads_the_other_half() {
        let (device, mut manager) = create_manager();
        let history = manager.create_render_target_texture(
            "accumulation",
            TextureCreationOptions::default().with_history());
        manager.allocate_textures(&HashMap::new()).unwrap();
        assert_eq!(created_textures(&device), 2);
        assert!(manager.is_history_texture(history));

        let write = manager.get_texture_from_handle(history).unwrap();
        let read = manager.get_read_texture_from_handle(history).unwrap();
        assert_ne!(write, read);

        manager.update_history_textures();
        assert_eq!(manager.get_texture_from_handle(history), Ok(read));
        assert_eq!(manager.get_read_texture_from_handle(history), Ok(write));
        assert_eq!(manager.get_backing_textures(history).unwrap().len(), 2);
    }

    #[test]
    fn backbuffer_handles_resolve_to_device_backbuffer() {
        let (device, manager) = create_manager();
        let color = manager.get_backbuffer_color();
        let depth = manager.get_backbuffer_depth_stencil();

        assert!(manager.is_backbuffer(color));
        assert!(manager.is_backbuffer_color(color));
        assert!(manager.is_backbuffer_depth_stencil(depth));
        assert_eq!(manager.get_texture_from_handle(color), Ok(device.borrow().get_backbuffer_color()));
        assert_eq!(manager.get_texture_description(depth).unwrap().options.format, TextureFormat::Depth24Stencil8);
    }

    #[test]
    fn imported_textures_survive_release_but_not_release_all() {
        let (_device, mut manager) = create_manager();
        let imported = manager.import_texture(
            "lut",
            PhysicalTexture::new(42),
            TextureDescription::new(16, 16, TextureOptions::default()));

        manager.release_textures(false);
        assert_eq!(manager.get_texture_from_handle(imported), Ok(PhysicalTexture::new(42)));
        assert!(manager.get_texture_creation_options(imported).unwrap().size == TextureSize::Absolute { width: 16, height: 16 });

        manager.release_textures(true);
        assert_eq!(manager.get_texture_from_handle(imported), Err(TextureError::StaleHandle(imported)));
        assert!(manager.is_backbuffer_color(manager.get_backbuffer_color()));
    }

    /// Hands out one texture more than asked for.
    struct OverAllocator;

    impl TextureAllocator for OverAllocator {
        fn allocate(
            &mut self,
            device: &mut dyn RenderDevice,
            requests: &[TextureRequest]) -> Vec<PhysicalTexture> {

            let mut textures = DedicatedAllocator.allocate(device, requests);
            textures.push(device.create_texture("extra", &TextureDescription::new(1, 1, TextureOptions::default())));
            textures
        }
    }

    #[test]
    fn failed_allocation_destroys_returned_textures() {
        let device = Rc::new(RefCell::new(HeadlessDevice::new(1280, 720)));
        let mut manager = TextureManager::with_allocator(device.clone(), Box::new(OverAllocator));
        let handle = manager.create_render_target_texture("color", TextureCreationOptions::default());

        assert_eq!(
            manager.allocate_textures(&HashMap::new()),
            Err(TextureError::AllocationMismatch { requested: 1, returned: 2 }));
        assert_eq!(device.borrow().get_live_texture_count(), 0);
        assert!(!manager.is_allocated());
        assert_eq!(manager.get_texture_from_handle(handle), Err(TextureError::NotAllocated("color".to_string())));

        manager.dispose();
        assert_eq!(device.borrow().get_live_texture_count(), 0);
    }
}
