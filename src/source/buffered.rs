use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use super::slot::{Frame, FrameSize, FrameSlot};
use super::FrameSource;
use crate::error::{PipelineError, Result};

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Frame source backed by a [`FrameSlot`] that an external capture thread
/// publishes into.
///
/// The capture side marks the source available once it holds the camera
/// permission; `open` then waits for the first frame.
pub struct BufferedSource {
    slot: Arc<FrameSlot>,
    available: AtomicBool,
    opened: AtomicBool,
    poll_interval: Duration,
}

impl BufferedSource {
    pub fn new(slot: Arc<FrameSlot>) -> Self {
        Self {
            slot,
            available: AtomicBool::new(false),
            opened: AtomicBool::new(false),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Override how often `open` checks for the first frame.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Record whether capture is permitted on this device.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::Release);
    }

    /// The slot the capture side publishes into.
    pub fn slot(&self) -> &Arc<FrameSlot> {
        &self.slot
    }

    pub fn is_open(&self) -> bool {
        self.opened.load(Ordering::Acquire)
    }
}

#[async_trait]
impl FrameSource for BufferedSource {
    async fn open(&self, ready_timeout: Duration) -> Result<FrameSize> {
        if !self.available.load(Ordering::Acquire) {
            return Err(PipelineError::CameraUnavailable(
                "capture permission not granted".to_string(),
            ));
        }

        let deadline = Instant::now() + ready_timeout;
        loop {
            if let Some(frame) = self.slot.latest() {
                self.opened.store(true, Ordering::Release);
                debug!("frame source ready at {}x{}", frame.width, frame.height);
                return Ok(frame.size());
            }
            if Instant::now() >= deadline {
                warn!(
                    "no frames received within {}ms",
                    ready_timeout.as_millis()
                );
                return Err(PipelineError::CameraUnavailable(format!(
                    "camera produced no frames ({}ms timeout)",
                    ready_timeout.as_millis()
                )));
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    fn current_frame(&self) -> Option<Arc<Frame>> {
        if !self.is_open() {
            return None;
        }
        self.slot.latest()
    }

    fn close(&self) {
        self.opened.store(false, Ordering::Release);
        self.slot.clear();
    }
}
