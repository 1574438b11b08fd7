use thiserror::Error;

use crate::pipeline::state::PipelineState;

/// Pipeline errors.
///
/// `CameraUnavailable`, `DetectorLoad` and `ClassifierLoad` are fatal and only
/// raised while starting. The remaining variants are raised inside a tick and
/// handled according to the configured `TickErrorPolicy`.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("camera unavailable: {0}")]
    CameraUnavailable(String),

    #[error("landmark detector failed to load: {0}")]
    DetectorLoad(String),

    #[error("classifier failed to load: {0}")]
    ClassifierLoad(String),

    #[error("hand estimation failed: {0}")]
    Estimation(String),

    #[error("classification failed: {0}")]
    Classification(String),

    #[error("malformed hand: expected {expected} keypoints, got {actual}")]
    MalformedHand { expected: usize, actual: usize },

    #[error("duplicate keypoint name: {0}")]
    DuplicateKeypoint(String),

    #[error("invalid state transition: {from} -> {to}")]
    InvalidState { from: PipelineState, to: PipelineState },

    #[error("pipeline task failed: {0}")]
    Task(String),

    #[error("snapshot failed: {0}")]
    Snapshot(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl PipelineError {
    /// Whether the error can only happen during start-up and aborts it.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::CameraUnavailable(_) | Self::DetectorLoad(_) | Self::ClassifierLoad(_)
        )
    }
}

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse failed: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, PipelineError>;
