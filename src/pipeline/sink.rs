use tokio::sync::mpsc;
use tracing::info;

use crate::classifier::Prediction;
use crate::error::PipelineError;
use crate::hand::{Hand, Handedness};

/// Receives the pipeline's per-tick results.
pub trait PredictionSink: Send + Sync {
    /// Called once per tick that classified a hand.
    fn on_prediction(&self, tick: u64, hand: &Hand, prediction: &Prediction);

    /// Called for every failed tick. The loop has already logged it.
    fn on_tick_error(&self, _tick: u64, _error: &PipelineError) {}
}

/// Writes predictions to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl PredictionSink for LogSink {
    fn on_prediction(&self, tick: u64, hand: &Hand, prediction: &Prediction) {
        info!(tick, hand = %hand.handedness, "prediction {}", prediction.as_value());
    }
}

/// Event forwarded by [`ChannelSink`].
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    Prediction {
        tick: u64,
        handedness: Handedness,
        prediction: Prediction,
    },
    TickError {
        tick: u64,
        message: String,
    },
}

/// Forwards results over an unbounded channel. Sends after the receiver is
/// dropped are discarded.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<PipelineEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<PipelineEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl PredictionSink for ChannelSink {
    fn on_prediction(&self, tick: u64, hand: &Hand, prediction: &Prediction) {
        let _ = self.tx.send(PipelineEvent::Prediction {
            tick,
            handedness: hand.handedness,
            prediction: prediction.clone(),
        });
    }

    fn on_tick_error(&self, tick: u64, error: &PipelineError) {
        let _ = self.tx.send(PipelineEvent::TickError {
            tick,
            message: error.to_string(),
        });
    }
}
