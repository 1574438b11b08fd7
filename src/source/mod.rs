// Frame source: camera frames consumed by the pipeline.

pub mod buffered;
pub mod slot;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;

pub use buffered::BufferedSource;
pub use slot::{Frame, FrameSize, FrameSlot};

/// Supplier of the current camera image.
///
/// Acquisition and permission handling live behind this trait; the pipeline
/// only needs the stream to come up once and then hand out the latest frame.
#[async_trait]
pub trait FrameSource: Send + Sync {
    /// Check the capture capability and wait for the stream to deliver.
    ///
    /// Fails with `PipelineError::CameraUnavailable` when capture is not
    /// possible or no frame arrives within `ready_timeout`.
    async fn open(&self, ready_timeout: Duration) -> Result<FrameSize>;

    /// Latest frame, if the stream has produced one.
    fn current_frame(&self) -> Option<Arc<Frame>>;

    /// Release the stream.
    fn close(&self);
}
