use crate::pipeline::DetectionPipeline;
use bridge::FrameSlot;
use opentelemetry::{
    global,
    metrics::{Counter, Histogram},
};
use schema::{DetectionResult, RawFrame};
use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

/// Receives every analyzed frame together with its ranked results.
pub trait DetectionSink: Send {
    fn on_detections(&mut self, frame: &RawFrame, results: &[DetectionResult]);
}

impl<F> DetectionSink for F
where
    F: FnMut(&RawFrame, &[DetectionResult]) + Send,
{
    fn on_detections(&mut self, frame: &RawFrame, results: &[DetectionResult]) {
        self(frame, results)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DetectionStats {
    pub frames_processed: u64,
    pub frames_skipped: u64,
    pub total_detections: u64,
}

struct Metrics {
    duration: Histogram<f64>,
    frames: Counter<u64>,
    skipped: Counter<u64>,
    detections: Counter<u64>,
}

fn init_metrics(meter_name: &'static str) -> Metrics {
    let meter = global::meter(meter_name);
    let latency_buckets = [
        0.002, 0.005, 0.01, 0.015, 0.02, 0.03, 0.05, 0.075, 0.1, 0.15, 0.2, 0.3, 0.5, 1.0,
    ];
    Metrics {
        duration: meter
            .f64_histogram("detection_duration_seconds")
            .with_description("Time to analyze a single frame (preprocess + infer + decode)")
            .with_unit("s")
            .with_boundaries(latency_buckets.to_vec())
            .build(),
        frames: meter
            .u64_counter("detection_frames_total")
            .with_description("Total frames analyzed")
            .build(),
        skipped: meter
            .u64_counter("detection_frames_skipped_total")
            .with_description("Frames replaced by a newer one before analysis")
            .build(),
        detections: meter
            .u64_counter("detection_results_total")
            .with_description("Total results above the confidence threshold")
            .build(),
    }
}

/// Single worker that drains the frame slot through the pipeline.
///
/// Owns the pipeline for its whole life and closes it on exit.
pub struct DetectionService<S: DetectionSink> {
    pipeline: DetectionPipeline,
    slot: Arc<FrameSlot>,
    sink: S,
}

impl<S: DetectionSink> DetectionService<S> {
    pub fn new(pipeline: DetectionPipeline, slot: Arc<FrameSlot>, sink: S) -> Self {
        Self {
            pipeline,
            slot,
            sink,
        }
    }

    /// Run until the slot is closed.
    pub fn run(mut self) -> DetectionStats {
        tracing::info!(
            ready = self.pipeline.is_ready(),
            "Detection service starting"
        );

        let metrics = init_metrics("detection");
        let mut stats = DetectionStats::default();
        let mut last_skipped = self.slot.skipped();

        while let Some(frame) = self.slot.take_latest() {
            let skipped = self.slot.skipped();
            if skipped > last_skipped {
                let delta = skipped - last_skipped;
                stats.frames_skipped += delta;
                metrics.skipped.add(delta, &[]);
                tracing::trace!(skipped = delta, "Skipped frames to process latest");
                last_skipped = skipped;
            }

            let span = tracing::info_span!(
                "detect_frame",
                frame_number = frame.frame_number(),
                width = frame.width(),
                height = frame.height()
            );
            let _enter = span.enter();

            let start = Instant::now();
            let results = self.pipeline.detect(&frame);
            metrics.duration.record(start.elapsed().as_secs_f64(), &[]);
            metrics.frames.add(1, &[]);
            metrics.detections.add(results.len() as u64, &[]);

            stats.frames_processed += 1;
            stats.total_detections += results.len() as u64;

            self.sink.on_detections(&frame, &results);

            if stats.frames_processed.is_multiple_of(30) {
                tracing::debug!(
                    frames_processed = stats.frames_processed,
                    frames_skipped = stats.frames_skipped,
                    total_detections = stats.total_detections,
                    "Frame processed"
                );
            }
        }

        self.pipeline.close();
        tracing::info!(
            frames_processed = stats.frames_processed,
            frames_skipped = stats.frames_skipped,
            total_detections = stats.total_detections,
            "Detection service stopped"
        );
        stats
    }
}

impl<S: DetectionSink + 'static> DetectionService<S> {
    /// Move the service onto its own worker thread.
    pub fn spawn(self) -> io::Result<DetectionServiceHandle> {
        let slot = Arc::clone(&self.slot);
        let thread = thread::Builder::new()
            .name("detection-worker".to_string())
            .spawn(move || self.run())?;
        Ok(DetectionServiceHandle { slot, thread })
    }
}

pub struct DetectionServiceHandle {
    slot: Arc<FrameSlot>,
    thread: JoinHandle<DetectionStats>,
}

impl DetectionServiceHandle {
    /// Close the slot and wait for the worker to finish its current frame.
    pub fn stop(self) -> anyhow::Result<DetectionStats> {
        self.slot.close();
        self.join()
    }

    pub fn join(self) -> anyhow::Result<DetectionStats> {
        self.thread
            .join()
            .map_err(|_| anyhow::anyhow!("Detection worker panicked"))
    }
}
