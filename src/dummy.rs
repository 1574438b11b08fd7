//! Simulated collaborators for running the pipeline without a camera or models.
//!
//! Enable in the binary via `DUMMY_CAMERA=1`.

use async_trait::async_trait;
use serde_json::json;
use std::f32::consts::PI;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::classifier::{Classifier, ClassifierConfig, ClassifierLoader, Prediction};
use crate::detector::{DetectorConfig, DetectorFactory, EstimationConfig, LandmarkDetector};
use crate::error::{PipelineError, Result};
use crate::features::EncodedFeatures;
use crate::hand::{Finger, Hand, Handedness, HAND_KEYPOINT_COUNT};
use crate::source::{Frame, FrameSize, FrameSource};

pub const DUMMY_WIDTH: u32 = 640;
pub const DUMMY_HEIGHT: u32 = 480;

/// Fixed scores returned by [`DummyClassifier`].
const DUMMY_SCORES: &[(&str, f32)] = &[("A", 0.82), ("B", 0.11), ("C", 0.07)];

/// Whether the simulated collaborators are enabled via environment variable.
pub fn is_enabled() -> bool {
    std::env::var("DUMMY_CAMERA").is_ok_and(|v| v == "1" || v == "true")
}

/// Diagonal RGB gradient that scrolls with `sequence`.
pub fn test_pattern(width: u32, height: u32, sequence: u64, timestamp_us: u64) -> Frame {
    let shift = (sequence % 256) as u32;
    let mut data = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height {
        for x in 0..width {
            data.push((((x + shift) % width) * 255 / width) as u8);
            data.push((y * 255 / height) as u8);
            data.push(((x + y + shift) % 256) as u8);
        }
    }
    Frame {
        data,
        width,
        height,
        timestamp_us,
    }
}

/// Frame source that renders a test pattern on demand.
pub struct DummySource {
    size: FrameSize,
    opened: AtomicBool,
    sequence: AtomicU64,
    started: Instant,
}

impl DummySource {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: FrameSize { width, height },
            opened: AtomicBool::new(false),
            sequence: AtomicU64::new(0),
            started: Instant::now(),
        }
    }
}

impl Default for DummySource {
    fn default() -> Self {
        Self::new(DUMMY_WIDTH, DUMMY_HEIGHT)
    }
}

#[async_trait]
impl FrameSource for DummySource {
    async fn open(&self, _ready_timeout: Duration) -> Result<FrameSize> {
        if self.size.width == 0 || self.size.height == 0 {
            return Err(PipelineError::CameraUnavailable(
                "dummy camera has no resolution".to_string(),
            ));
        }
        self.opened.store(true, Ordering::Release);
        Ok(self.size)
    }

    fn current_frame(&self) -> Option<Arc<Frame>> {
        if !self.opened.load(Ordering::Acquire) {
            return None;
        }
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        let timestamp_us = self.started.elapsed().as_micros() as u64;
        Some(Arc::new(test_pattern(
            self.size.width,
            self.size.height,
            sequence,
            timestamp_us,
        )))
    }

    fn close(&self) {
        self.opened.store(false, Ordering::Release);
    }
}

/// Joint distances from the wrist along each finger ray.
const JOINT_DISTANCES: [f32; 4] = [0.18, 0.30, 0.40, 0.48];

/// Detector that reports one open right palm centred in the frame, swaying
/// slowly over time.
#[derive(Debug, Default)]
pub struct DummyDetector;

impl DummyDetector {
    pub fn open_palm(frame_width: u32, frame_height: u32, timestamp_us: u64) -> Hand {
        let span = frame_width.min(frame_height) as f32;
        let sway = (timestamp_us as f32 / 1_000_000.0).sin() * 0.1;
        let wrist = (frame_width as f32 / 2.0, frame_height as f32 * 0.8);

        let mut positions = [wrist; HAND_KEYPOINT_COUNT];
        for (f, finger) in Finger::ALL.iter().enumerate() {
            // thumb splays wider than the other fingers
            let spread = if f == 0 { -0.9 } else { (f as f32 - 2.5) * 0.25 };
            let angle = -PI / 2.0 + spread + sway;
            for (joint, &index) in finger.indices()[1..].iter().enumerate() {
                let reach = JOINT_DISTANCES[joint] * span;
                positions[index] = (wrist.0 + angle.cos() * reach, wrist.1 + angle.sin() * reach);
            }
        }

        let mut hand = Hand::from_positions(Handedness::Right, &positions);
        hand.score = Some(0.98);
        hand
    }
}

#[async_trait]
impl LandmarkDetector for DummyDetector {
    async fn estimate(&self, frame: &Frame, _config: EstimationConfig) -> Result<Vec<Hand>> {
        Ok(vec![Self::open_palm(
            frame.width,
            frame.height,
            frame.timestamp_us,
        )])
    }
}

#[derive(Debug, Default)]
pub struct DummyFactory;

#[async_trait]
impl DetectorFactory for DummyFactory {
    async fn create(&self, config: &DetectorConfig) -> Result<Arc<dyn LandmarkDetector>> {
        if config.max_hands == 0 {
            return Err(PipelineError::DetectorLoad("maxHands is zero".to_string()));
        }
        Ok(Arc::new(DummyDetector))
    }
}

/// Classifier that always answers with the same distribution.
#[derive(Debug, Default)]
pub struct DummyClassifier;

#[async_trait]
impl Classifier for DummyClassifier {
    async fn execute(&self, features: &EncodedFeatures) -> Result<Prediction> {
        if features.is_empty() {
            return Err(PipelineError::Classification("no features".to_string()));
        }
        let scores: Vec<_> = DUMMY_SCORES
            .iter()
            .map(|(label, score)| json!({ "label": label, "score": score }))
            .collect();
        Ok(Prediction::new(json!(scores)))
    }
}

#[derive(Debug, Default)]
pub struct DummyLoader;

#[async_trait]
impl ClassifierLoader for DummyLoader {
    async fn load(&self, _config: &ClassifierConfig) -> Result<Arc<dyn Classifier>> {
        Ok(Arc::new(DummyClassifier))
    }
}
