use std::collections::HashMap;
use multimap::MultiMap;
use log::trace as log_trace;
use api_types::handle::TextureHandle;
use context::allocator::TextureLifespan;
use context::texture_manager::TextureManager;
use crate::task::TaskNode;

/// Finds, for every texture some task touches, the first and last task (in
/// execution order) touching it.
///
/// Aliases are followed to the handle that owns the texture. Handles that
/// don't resolve are skipped here; the task check reports them.
#[tracing::instrument(skip_all)]
pub fn compute_lifespans(
    tasks: &[TaskNode],
    textures: &TextureManager) -> HashMap<TextureHandle, TextureLifespan> {

    // texture -> indices of the tasks using it
    let mut usage_map = MultiMap::new();
    for (task_index, task) in tasks.iter().enumerate() {
        for handle in task.get_dependencies() {
            if let Ok(source) = textures.get_source_handle(handle) {
                usage_map.insert(source, task_index);
            }
        }
    }

    let mut lifespans = HashMap::new();
    for (handle, task_indices) in usage_map.iter_all() {
        let Some((first, rest)) = task_indices.split_first() else {
            continue;
        };
        let mut lifespan = TextureLifespan::new(*first);
        for task_index in rest {
            lifespan.extend(*task_index);
        }
        log_trace!(target: "framegraph", "Texture {:?} lives from task {} to task {}",
            handle, lifespan.first_task, lifespan.last_task);
        lifespans.insert(*handle, lifespan);
    }

    lifespans
}
