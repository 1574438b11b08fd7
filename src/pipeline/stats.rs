use serde::Serialize;
use std::time::{Duration, Instant};

/// Collects per-tick statistics for a running pipeline.
pub struct PipelineStats {
    tick_count: u64,
    drop_count: u64,
    empty_count: u64,
    hands_seen: u64,
    classified_count: u64,
    error_count: u64,
    start_time: Instant,
    last_tick_us: u64,
}

/// Snapshot of pipeline stats for logging or serialisation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub tick_rate: f64,
    pub tick_count: u64,
    pub drop_count: u64,
    pub drop_rate: f64,
    pub empty_count: u64,
    pub hands_seen: u64,
    pub classified_count: u64,
    pub error_count: u64,
    pub last_tick_ms: f64,
}

impl PipelineStats {
    /// Create new stats with zeroed counters.
    pub fn new() -> Self {
        Self {
            tick_count: 0,
            drop_count: 0,
            empty_count: 0,
            hands_seen: 0,
            classified_count: 0,
            error_count: 0,
            start_time: Instant::now(),
            last_tick_us: 0,
        }
    }

    /// Record a tick that had no frame to work on.
    pub fn record_drop(&mut self) {
        self.tick_count += 1;
        self.drop_count += 1;
    }

    /// Record a tick that found no hands.
    pub fn record_empty(&mut self, elapsed: Duration) {
        self.tick_count += 1;
        self.empty_count += 1;
        self.last_tick_us = elapsed.as_micros() as u64;
    }

    /// Record a tick that classified a hand.
    pub fn record_classified(&mut self, hands: usize, elapsed: Duration) {
        self.tick_count += 1;
        self.hands_seen += hands as u64;
        self.classified_count += 1;
        self.last_tick_us = elapsed.as_micros() as u64;
    }

    /// Record a failed tick.
    pub fn record_error(&mut self) {
        self.tick_count += 1;
        self.error_count += 1;
    }

    /// Ticks per second since the stats were created.
    pub fn tick_rate(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed < 0.001 {
            return 0.0;
        }
        self.tick_count as f64 / elapsed
    }

    /// Dropped ticks as a percentage (0.0 - 100.0).
    pub fn drop_rate(&self) -> f64 {
        if self.tick_count == 0 {
            return 0.0;
        }
        (self.drop_count as f64 / self.tick_count as f64) * 100.0
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            tick_rate: self.tick_rate(),
            tick_count: self.tick_count,
            drop_count: self.drop_count,
            drop_rate: self.drop_rate(),
            empty_count: self.empty_count,
            hands_seen: self.hands_seen,
            classified_count: self.classified_count,
            error_count: self.error_count,
            last_tick_ms: self.last_tick_us as f64 / 1000.0,
        }
    }
}

impl Default for PipelineStats {
    fn default() -> Self {
        Self::new()
    }
}
