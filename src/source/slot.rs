use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A single camera frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Raw pixel data (RGB).
    pub data: Vec<u8>,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Capture timestamp in microseconds.
    pub timestamp_us: u64,
}

impl Frame {
    /// Frame with a uniform grey level, mostly for tests.
    pub fn filled(width: u32, height: u32, value: u8, timestamp_us: u64) -> Self {
        Self {
            data: vec![value; (width * height * 3) as usize],
            width,
            height,
            timestamp_us,
        }
    }

    pub fn size(&self) -> FrameSize {
        FrameSize {
            width: self.width,
            height: self.height,
        }
    }

    /// Whether `data` holds exactly `width * height` RGB pixels.
    pub fn is_consistent(&self) -> bool {
        self.data.len() == (self.width as usize) * (self.height as usize) * 3
    }
}

/// Pixel dimensions of the camera stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

/// Latest-frame slot shared between a capture thread and the pipeline.
///
/// The capture side publishes at camera rate and the pipeline samples at its
/// own tick rate, so only the newest frame is kept. Older frames are dropped
/// as soon as they are replaced; readers get an `Arc` and never copy pixels.
#[derive(Default)]
pub struct FrameSlot {
    latest: Mutex<Option<Arc<Frame>>>,
    /// Frames published since creation, including ones nobody read.
    published: AtomicU64,
}

impl FrameSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current frame. Returns the frame's publish sequence,
    /// starting at 1.
    pub fn publish(&self, frame: Frame) -> u64 {
        *self.latest.lock() = Some(Arc::new(frame));
        self.published.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }

    pub fn latest(&self) -> Option<Arc<Frame>> {
        self.latest.lock().clone()
    }

    /// Empty the slot, e.g. when the stream is released.
    pub fn clear(&self) {
        self.latest.lock().take();
    }
}
