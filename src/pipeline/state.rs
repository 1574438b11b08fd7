use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::info;

use crate::error::{PipelineError, Result};

/// Lifecycle of a pipeline. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineState {
    Uninitialized,
    Initializing,
    Running,
    Stopped,
}

impl PipelineState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Initializing => "initializing",
            Self::Running => "running",
            Self::Stopped => "stopped",
        }
    }

    /// Whether `self -> next` is a legal transition.
    pub fn can_transition_to(self, next: PipelineState) -> bool {
        use PipelineState::*;
        matches!(
            (self, next),
            (Uninitialized, Initializing)
                | (Initializing, Running)
                | (Initializing, Stopped)
                | (Running, Stopped)
        )
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shared, transition-checked pipeline state.
#[derive(Debug, Clone)]
pub struct StateCell(Arc<Mutex<PipelineState>>);

impl StateCell {
    pub fn new() -> Self {
        Self(Arc::new(Mutex::new(PipelineState::Uninitialized)))
    }

    pub fn get(&self) -> PipelineState {
        *self.0.lock()
    }

    /// Move to `next`, rejecting illegal transitions.
    pub fn transition(&self, next: PipelineState) -> Result<()> {
        let mut state = self.0.lock();
        if !state.can_transition_to(next) {
            return Err(PipelineError::InvalidState {
                from: *state,
                to: next,
            });
        }
        info!("pipeline {} -> {}", *state, next);
        *state = next;
        Ok(())
    }

    /// Move to `Stopped` from any live state. No-op when already stopped
    /// or never started.
    pub fn stop(&self) {
        let mut state = self.0.lock();
        if state.can_transition_to(PipelineState::Stopped) {
            info!("pipeline {} -> stopped", *state);
            *state = PipelineState::Stopped;
        }
    }
}

impl Default for StateCell {
    fn default() -> Self {
        Self::new()
    }
}
