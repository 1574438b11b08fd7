pub mod classifier;
pub mod config;
pub mod detector;
pub mod dummy;
pub mod error;
pub mod features;
pub mod hand;
pub mod pipeline;
pub mod render;
pub mod source;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

pub use classifier::{Classifier, ClassifierConfig, ClassifierLoader, Prediction};
pub use config::{PipelineConfig, TickErrorPolicy};
pub use detector::{DetectorConfig, DetectorFactory, EstimationConfig, LandmarkDetector};
pub use error::{ConfigError, PipelineError, Result};
pub use features::{encode, EncodedFeatures};
pub use hand::{Hand, Handedness, Keypoint};
pub use pipeline::{Pipeline, PipelineHandle, PipelineState};
pub use render::{RasterSurface, Surface};
pub use source::{Frame, FrameSource};

/// How often the binary logs pipeline diagnostics.
const STATS_INTERVAL: Duration = Duration::from_secs(5);

/// JPEG quality of the snapshot written on exit.
const SNAPSHOT_QUALITY: u8 = 85;

/// External services the pipeline is wired to.
struct Collaborators {
    source: Arc<dyn FrameSource>,
    detector_factory: Arc<dyn DetectorFactory>,
    classifier_loader: Arc<dyn ClassifierLoader>,
}

/// Pick the collaborators for this run.
///
/// Only the simulated ones ship with the binary; without them there is no
/// camera to open.
fn create_collaborators(use_dummy: bool) -> Result<Collaborators> {
    if use_dummy {
        return Ok(Collaborators {
            source: Arc::new(dummy::DummySource::default()),
            detector_factory: Arc::new(dummy::DummyFactory),
            classifier_loader: Arc::new(dummy::DummyLoader),
        });
    }
    Err(PipelineError::CameraUnavailable(
        "no camera backend on this platform (set DUMMY_CAMERA=1)".to_string(),
    ))
}

/// Encode the surface as JPEG and write it to `path`.
pub async fn write_snapshot(surface: &RasterSurface, path: &Path) -> Result<()> {
    let jpeg = surface
        .encode_jpeg(SNAPSHOT_QUALITY)
        .map_err(|e| PipelineError::Snapshot(e.to_string()))?;
    tokio::fs::write(path, &jpeg)
        .await
        .map_err(|e| PipelineError::Snapshot(format!("{}: {e}", path.display())))?;
    info!("snapshot written to {} ({} bytes)", path.display(), jpeg.len());
    Ok(())
}

/// Run the pipeline until Ctrl-C or until the loop ends on its own.
pub async fn run(config_path: Option<PathBuf>, snapshot: Option<PathBuf>) -> Result<()> {
    let config = match &config_path {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };
    let collaborators = create_collaborators(dummy::is_enabled())?;

    let mut pipeline = Pipeline::new(
        config,
        collaborators.source,
        collaborators.detector_factory,
        collaborators.classifier_loader,
        RasterSurface::new(1, 1),
    );
    let handle = pipeline.start().await?;

    let mut report = tokio::time::interval(STATS_INTERVAL);
    report.tick().await;
    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    warn!("failed to listen for ctrl-c: {e}");
                }
                info!("shutting down");
                break;
            }
            _ = handle.finished() => {
                warn!("pipeline loop ended on its own");
                break;
            }
            _ = report.tick() => {
                let stats = handle.diagnostics();
                info!(
                    ticks = stats.tick_count,
                    classified = stats.classified_count,
                    errors = stats.error_count,
                    "{:.1} ticks/s, {:.1}% dropped",
                    stats.tick_rate,
                    stats.drop_rate
                );
            }
        }
    }

    let result = handle.stop().await;

    if let Some(path) = snapshot {
        let surface = pipeline.surface();
        let surface = surface.lock().clone();
        write_snapshot(&surface, &path).await?;
    }

    result
}
