use anyhow::Context;
use bridge::FrameSlot;
use capture::{CaptureConfig, CapturePacing, FrameSink, Gallery, ImageDirSource, run_capture};
use common::TelemetryGuard;
use inference::{
    DetectionPipeline, DetectionService, InferenceConfig, logging::setup_logging,
    overlay::OverlaySink,
};
use signal_hook::consts::{SIGINT, SIGTERM, SIGUSR1};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

#[cfg(feature = "ort-backend")]
use inference::backend::ort::OrtBackend as Backend;

#[cfg(not(feature = "ort-backend"))]
compile_error!("The 'ort-backend' feature must be enabled to build the binary");

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = InferenceConfig::from_env()?;
    let capture_config = CaptureConfig::from_env()?;

    let telemetry = config
        .otel_endpoint
        .as_ref()
        .map(|endpoint| {
            TelemetryGuard::init("smartlens", endpoint, config.log_level, config.environment)
        })
        .transpose()?;

    if telemetry.is_none() {
        setup_logging(&config);
    }

    tracing::info!(config = ?config, capture = ?capture_config, "Loaded configuration");

    let shutdown = Arc::new(AtomicBool::new(false));
    for signal in [SIGINT, SIGTERM] {
        signal_hook::flag::register(signal, Arc::clone(&shutdown))
            .context("Failed to register shutdown handler")?;
    }

    // SIGUSR1 is the "Capture Photo" button
    let capture_requested = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(SIGUSR1, Arc::clone(&capture_requested))
        .context("Failed to register capture handler")?;

    let pipeline = DetectionPipeline::open::<Backend>(&config);

    let mut source = ImageDirSource::open(
        &capture_config.frame_source_dir,
        capture_config.loop_source,
    )
    .context("Failed to open frame source")?;

    let slot = Arc::new(FrameSlot::new());
    let sink = OverlaySink::new(capture_requested, Gallery::new(&capture_config.gallery_dir));
    let handle = DetectionService::new(pipeline, Arc::clone(&slot), sink)
        .spawn()
        .context("Failed to spawn detection worker")?;

    let pacing = CapturePacing::new(capture_config.capture_fps);
    let capture_result = tokio::task::spawn_blocking(move || {
        let mut frame_sink = FrameSink::new(slot);
        run_capture(&mut source, &mut frame_sink, &pacing, &shutdown)
    })
    .await
    .context("Capture task panicked")?;

    let stats = handle.stop()?;
    let published = capture_result?;

    tracing::info!(
        frames_published = published,
        frames_processed = stats.frames_processed,
        frames_skipped = stats.frames_skipped,
        total_detections = stats.total_detections,
        "Shutdown complete"
    );

    Ok(())
}
