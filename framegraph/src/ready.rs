use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use crate::error::ReadyError;
use crate::frame_graph::FrameGraph;

pub(crate) async fn poll_until_ready<F>(
    mut get_pending: F,
    poll_interval: Duration,
    timeout: Duration) -> Result<(), ReadyError>
where
    F: FnMut() -> Result<Vec<String>, ReadyError>
{
    let start = Instant::now();
    loop {
        let pending = get_pending()?;
        if pending.is_empty() {
            return Ok(());
        }
        if start.elapsed() >= timeout {
            log::warn!(target: "framegraph", "Frame graph still not ready after {:?}, waiting on {:?}", timeout, pending);
            return Err(ReadyError::Timeout { pending });
        }
        log::trace!(target: "framegraph", "Waiting on {:?}", pending);
        sleep(poll_interval).await;
    }
}

/// Waits for a frame graph other code keeps using in the meantime.
///
/// The graph is only borrowed while it is checked, so it can be built,
/// executed or disposed between ticks. Disposal rejects the wait with
/// [`ReadyError::Disposed`] on the next tick.
pub async fn when_ready_shared(
    frame_graph: &Rc<RefCell<FrameGraph>>,
    poll_interval: Duration,
    timeout: Duration) -> Result<(), ReadyError> {

    poll_until_ready(
        || match frame_graph.try_borrow() {
            Ok(frame_graph) => frame_graph.get_pending_readiness(),
            Err(_) => Ok(vec!["frame graph".to_string()])
        },
        poll_interval,
        timeout).await
}
