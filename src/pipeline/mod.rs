// Pipeline: frame clock, lifecycle and per-tick detect/draw/classify.

pub mod cancel;
pub mod runner;
pub mod sink;
pub mod state;
pub mod stats;

pub use cancel::CancelToken;
pub use runner::{Pipeline, PipelineHandle, TickOutcome};
pub use sink::{ChannelSink, LogSink, PipelineEvent, PredictionSink};
pub use state::PipelineState;
pub use stats::{PipelineStats, StatsSnapshot};
