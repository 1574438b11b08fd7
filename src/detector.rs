//! Landmark detector contract.
//!
//! The detector is an external model service. The pipeline creates it once
//! through a `DetectorFactory` and then calls `estimate` every tick.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::Result;
use crate::hand::Hand;
use crate::source::Frame;

/// Upper bound on tracked hands.
pub const MAX_HANDS: u8 = 2;

/// Default location of the hand model assets.
pub const DEFAULT_SOLUTION_PATH: &str = "https://cdn.jsdelivr.net/npm/@mediapipe/hands@0.4.1646424915";

/// Execution runtime of the hand model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Runtime {
    Mediapipe,
    Tfjs,
}

/// Hand model variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelType {
    Lite,
    Full,
}

/// Construction parameters for a landmark detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DetectorConfig {
    pub runtime: Runtime,
    pub model_type: ModelType,
    pub max_hands: u8,
    pub solution_path: String,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            runtime: Runtime::Mediapipe,
            model_type: ModelType::Lite,
            max_hands: MAX_HANDS,
            solution_path: DEFAULT_SOLUTION_PATH.to_string(),
        }
    }
}

/// Per-call estimation options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EstimationConfig {
    /// Mirror the image before estimation. The pipeline always passes
    /// `false`; mirroring is a presentation concern.
    pub flip_horizontal: bool,
}

/// Hand landmark detector.
#[async_trait]
pub trait LandmarkDetector: Send + Sync {
    /// Detect hands in `frame`. An empty result is not an error.
    async fn estimate(&self, frame: &Frame, config: EstimationConfig) -> Result<Vec<Hand>>;
}

/// Creates detector instances. Creation may download and compile model
/// assets, so the pipeline calls it once.
#[async_trait]
pub trait DetectorFactory: Send + Sync {
    async fn create(&self, config: &DetectorConfig) -> Result<Arc<dyn LandmarkDetector>>;
}
