use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::OnceCell;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use super::cancel::CancelToken;
use super::sink::{LogSink, PredictionSink};
use super::state::{PipelineState, StateCell};
use super::stats::{PipelineStats, StatsSnapshot};
use crate::classifier::{Classifier, ClassifierLoader, Prediction};
use crate::config::{PipelineConfig, TickErrorPolicy};
use crate::detector::{DetectorFactory, EstimationConfig, LandmarkDetector};
use crate::error::{PipelineError, Result};
use crate::features::encode;
use crate::hand::Hand;
use crate::render::{present_frame, render_hands, Surface};
use crate::source::FrameSource;

/// Result of a single tick.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// The source had no frame; nothing was drawn.
    NoFrame,
    /// The frame was presented and no hands were found.
    Empty,
    /// Hands were drawn and the first one classified.
    Classified {
        hands: Vec<Hand>,
        prediction: Prediction,
    },
}

/// The per-frame capture, detect, draw and classify loop.
///
/// A pipeline starts once. `start` opens the frame source, sizes the surface,
/// loads both models and spawns the loop; the returned [`PipelineHandle`]
/// stops it. Once stopped, it cannot be started again.
pub struct Pipeline<S: Surface + Send + 'static> {
    state: StateCell,
    stats: Arc<Mutex<PipelineStats>>,
    surface: Arc<Mutex<S>>,
    engine: Option<Engine<S>>,
}

impl<S: Surface + Send + 'static> Pipeline<S> {
    pub fn new(
        config: PipelineConfig,
        source: Arc<dyn FrameSource>,
        detector_factory: Arc<dyn DetectorFactory>,
        classifier_loader: Arc<dyn ClassifierLoader>,
        surface: S,
    ) -> Self {
        let surface = Arc::new(Mutex::new(surface));
        let stats = Arc::new(Mutex::new(PipelineStats::new()));
        let engine = Engine {
            config,
            source,
            detector_factory,
            classifier_loader,
            sink: Arc::new(LogSink),
            surface: Arc::clone(&surface),
            stats: Arc::clone(&stats),
            detector: OnceCell::new(),
            classifier: OnceCell::new(),
            ticks: 0,
        };
        Self {
            state: StateCell::new(),
            stats,
            surface,
            engine: Some(engine),
        }
    }

    /// Replace the default logging sink.
    pub fn with_sink(mut self, sink: Arc<dyn PredictionSink>) -> Self {
        if let Some(engine) = self.engine.as_mut() {
            engine.sink = sink;
        }
        self
    }

    pub fn state(&self) -> PipelineState {
        self.state.get()
    }

    /// The drawing surface, shared with the running loop.
    pub fn surface(&self) -> Arc<Mutex<S>> {
        Arc::clone(&self.surface)
    }

    pub fn diagnostics(&self) -> StatsSnapshot {
        self.stats.lock().snapshot()
    }

    /// Initialise and spawn the loop.
    ///
    /// Start-up failures are fatal: the pipeline moves to `Stopped` and the
    /// error is returned. Calling `start` a second time fails with
    /// `InvalidState`.
    pub async fn start(&mut self) -> Result<PipelineHandle> {
        self.state.transition(PipelineState::Initializing)?;
        let Some(mut engine) = self.engine.take() else {
            self.state.stop();
            return Err(PipelineError::Task("pipeline engine already consumed".to_string()));
        };

        if let Err(e) = engine.initialize().await {
            error!("pipeline failed to start: {e}");
            engine.teardown();
            self.state.stop();
            return Err(e);
        }

        self.state.transition(PipelineState::Running)?;
        let cancel = CancelToken::new();
        let done = CancelToken::new();
        let task = tokio::spawn(engine.run(cancel.clone(), done.clone(), self.state.clone()));

        Ok(PipelineHandle {
            task,
            cancel,
            done,
            state: self.state.clone(),
            stats: Arc::clone(&self.stats),
        })
    }
}

/// Control handle for a running pipeline. Dropping it cancels the loop.
pub struct PipelineHandle {
    task: JoinHandle<Result<()>>,
    cancel: CancelToken,
    /// Fired by the loop once it has torn down.
    done: CancelToken,
    state: StateCell,
    stats: Arc<Mutex<PipelineStats>>,
}

impl PipelineHandle {
    pub fn state(&self) -> PipelineState {
        self.state.get()
    }

    pub fn diagnostics(&self) -> StatsSnapshot {
        self.stats.lock().snapshot()
    }

    /// Whether the loop has ended on its own (abort policy) or been stopped.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Resolve once the loop has ended, without consuming the handle.
    pub async fn finished(&self) {
        self.done.cancelled().await;
    }

    /// Cancel the loop and wait for it to release its resources. A tick
    /// already in flight completes first.
    pub async fn stop(self) -> Result<()> {
        self.cancel.cancel();
        self.join().await
    }

    /// Wait for the loop to end without cancelling it.
    pub async fn join(mut self) -> Result<()> {
        match (&mut self.task).await {
            Ok(result) => result,
            Err(e) => {
                self.state.stop();
                Err(PipelineError::Task(e.to_string()))
            }
        }
    }
}

impl fmt::Debug for PipelineHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineHandle")
            .field("state", &self.state.get())
            .field("finished", &self.task.is_finished())
            .finish()
    }
}

impl Drop for PipelineHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Everything the loop task owns.
struct Engine<S> {
    config: PipelineConfig,
    source: Arc<dyn FrameSource>,
    detector_factory: Arc<dyn DetectorFactory>,
    classifier_loader: Arc<dyn ClassifierLoader>,
    sink: Arc<dyn PredictionSink>,
    surface: Arc<Mutex<S>>,
    stats: Arc<Mutex<PipelineStats>>,
    detector: OnceCell<Arc<dyn LandmarkDetector>>,
    classifier: OnceCell<Arc<dyn Classifier>>,
    ticks: u64,
}

impl<S: Surface + Send + 'static> Engine<S> {
    async fn initialize(&mut self) -> Result<()> {
        self.config.validate()?;

        let size = self.source.open(self.config.ready_timeout()).await?;
        self.surface.lock().resize(size.width, size.height);
        info!("frame source open at {}x{}", size.width, size.height);

        let factory = &self.detector_factory;
        let detector_config = &self.config.detector;
        self.detector
            .get_or_try_init(|| factory.create(detector_config))
            .await?;
        debug!(
            "landmark detector ready ({:?}, {:?})",
            detector_config.runtime, detector_config.model_type
        );

        let loader = &self.classifier_loader;
        let classifier_config = &self.config.classifier;
        self.classifier
            .get_or_try_init(|| loader.load(classifier_config))
            .await?;
        debug!("classifier ready from {}", classifier_config.model_url);

        Ok(())
    }

    fn models(&self) -> Result<(Arc<dyn LandmarkDetector>, Arc<dyn Classifier>)> {
        match (self.detector.get(), self.classifier.get()) {
            (Some(detector), Some(classifier)) => Ok((Arc::clone(detector), Arc::clone(classifier))),
            _ => Err(PipelineError::Task("models not loaded".to_string())),
        }
    }

    /// Run one frame through the pipeline.
    async fn tick(&mut self) -> Result<TickOutcome> {
        self.ticks += 1;
        let tick = self.ticks;
        let started = Instant::now();

        let Some(frame) = self.source.current_frame() else {
            debug!(tick, "no frame available, skipping");
            self.stats.lock().record_drop();
            return Ok(TickOutcome::NoFrame);
        };

        let (detector, classifier) = self.models()?;
        let hands = detector
            .estimate(&frame, EstimationConfig { flip_horizontal: false })
            .await?;

        present_frame(&mut *self.surface.lock(), &frame);

        let Some(first) = hands.first() else {
            self.stats.lock().record_empty(started.elapsed());
            return Ok(TickOutcome::Empty);
        };

        for hand in &hands {
            hand.validate()?;
        }
        render_hands(&hands, &mut *self.surface.lock(), &self.config.render);

        let features = encode(&first.keypoints)?;
        let prediction = classifier.execute(&features).await?;
        self.sink.on_prediction(tick, first, &prediction);

        self.stats
            .lock()
            .record_classified(hands.len(), started.elapsed());
        debug!(tick, hands = hands.len(), "tick classified");
        Ok(TickOutcome::Classified { hands, prediction })
    }

    async fn run(mut self, cancel: CancelToken, done: CancelToken, state: StateCell) -> Result<()> {
        let mut clock = tokio::time::interval(self.config.frame_interval());
        clock.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!("pipeline loop started at {} fps", self.config.target_fps);

        let result = loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break Ok(()),
                _ = clock.tick() => {}
            }
            if cancel.is_cancelled() {
                break Ok(());
            }

            if let Err(e) = self.tick().await {
                let tick = self.ticks;
                self.stats.lock().record_error();
                warn!(tick, "tick failed: {e}");
                self.sink.on_tick_error(tick, &e);
                if self.config.on_tick_error == TickErrorPolicy::Abort {
                    error!("aborting pipeline after failed tick {tick}");
                    break Err(e);
                }
            }
        };

        self.teardown();
        state.stop();
        done.cancel();
        info!("pipeline loop ended after {} ticks", self.ticks);
        result
    }

    /// Release both models and the frame source.
    fn teardown(&mut self) {
        self.detector.take();
        self.classifier.take();
        self.source.close();
    }
}
