use crate::service::DetectionSink;
use capture::Gallery;
use schema::{DetectionResult, RawFrame};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub const EMPTY_HINT: &str = "Point camera at objects";

/// Overlay text for one frame: `label NN%` per result, best first.
pub fn overlay_lines(results: &[DetectionResult]) -> Vec<String> {
    if results.is_empty() {
        return vec![EMPTY_HINT.to_string()];
    }

    results
        .iter()
        .map(|r| format!("{} {}%", r.label, r.percent()))
        .collect()
}

/// Headless stand-in for the camera screen.
///
/// Logs the overlay whenever it changes and saves the current frame to the
/// gallery when a capture has been requested.
pub struct OverlaySink {
    capture_requested: Arc<AtomicBool>,
    gallery: Gallery,
    last_lines: Vec<String>,
    photos_saved: u64,
}

impl OverlaySink {
    pub fn new(capture_requested: Arc<AtomicBool>, gallery: Gallery) -> Self {
        Self {
            capture_requested,
            gallery,
            last_lines: Vec::new(),
            photos_saved: 0,
        }
    }

    pub fn photos_saved(&self) -> u64 {
        self.photos_saved
    }

    fn capture(&mut self, frame: &RawFrame, results: &[DetectionResult]) {
        let top = results
            .first()
            .map(|r| r.label.as_str())
            .unwrap_or("unknown");

        match self.gallery.save(frame, results) {
            Ok(path) => {
                self.photos_saved += 1;
                tracing::info!(path = %path.display(), "Photo saved: {}", top);
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to save photo");
            }
        }
    }
}

impl DetectionSink for OverlaySink {
    fn on_detections(&mut self, frame: &RawFrame, results: &[DetectionResult]) {
        let lines = overlay_lines(results);
        if lines != self.last_lines {
            tracing::info!(frame_number = frame.frame_number(), "{}", lines.join(" | "));
            self.last_lines = lines;
        }

        if self.capture_requested.swap(false, Ordering::AcqRel) {
            self.capture(frame, results);
        }
    }
}
