use crate::error::SourceError;
use crate::pacing::CapturePacing;
use crate::sink::FrameSink;
use anyhow::Result;
use bridge::BridgeError;
use schema::RawFrame;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Headless stand-in for a camera: replays the images of a directory in
/// file-name order.
pub struct ImageDirSource {
    files: Vec<PathBuf>,
    next: usize,
    loop_source: bool,
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Decode an image file into a packed RGB frame.
pub fn decode_image(path: &Path) -> Result<RawFrame, SourceError> {
    let rgb = image::open(path)
        .map_err(|source| SourceError::Decode {
            path: path.to_path_buf(),
            source,
        })?
        .into_rgb8();

    let (width, height) = rgb.dimensions();
    Ok(RawFrame::new(width, height, rgb.into_raw())?)
}

impl ImageDirSource {
    pub fn open(dir: impl AsRef<Path>, loop_source: bool) -> Result<Self, SourceError> {
        let dir = dir.as_ref();
        let io_err = |source| SourceError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut files = Vec::new();
        for entry in fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.is_file() && is_image(&path) {
                files.push(path);
            }
        }
        files.sort();

        if files.is_empty() {
            return Err(SourceError::NoImages(dir.to_path_buf()));
        }

        tracing::info!(
            dir = %dir.display(),
            images = files.len(),
            loop_source,
            "Frame source opened"
        );

        Ok(Self {
            files,
            next: 0,
            loop_source,
        })
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Decode the next image. `None` once a non-looping source is exhausted.
    pub fn next_frame(&mut self) -> Option<Result<RawFrame, SourceError>> {
        if self.next >= self.files.len() {
            if !self.loop_source {
                return None;
            }
            self.next = 0;
        }

        let path = &self.files[self.next];
        self.next += 1;
        Some(decode_image(path))
    }
}

/// Feed frames into `sink` at the paced rate until `shutdown` is raised, the
/// slot is closed, or a non-looping source runs dry. Returns the number of
/// frames published.
pub fn run_capture(
    source: &mut ImageDirSource,
    sink: &mut FrameSink,
    pacing: &CapturePacing,
    shutdown: &AtomicBool,
) -> Result<u64> {
    tracing::info!(
        frame_duration = ?pacing.frame_duration(),
        "Starting frame capture"
    );

    let mut published = 0u64;
    let mut dropped_frames = 0u64;
    let mut replaced_frames = 0u64;
    let mut consecutive_failures = 0usize;

    while !shutdown.load(Ordering::Relaxed) {
        let start = Instant::now();

        let frame = match source.next_frame() {
            Some(Ok(frame)) => {
                consecutive_failures = 0;
                frame
            }
            Some(Err(e)) => {
                dropped_frames += 1;
                consecutive_failures += 1;
                tracing::warn!("Frame decode error: {}", e);
                if consecutive_failures >= source.len() {
                    anyhow::bail!("Every image in the frame source failed to decode");
                }
                continue;
            }
            None => {
                tracing::info!("Frame source exhausted");
                break;
            }
        };

        match sink.write(frame) {
            Ok(replaced) => {
                published += 1;
                if replaced {
                    replaced_frames += 1;
                }
            }
            Err(BridgeError::Closed) => {
                tracing::info!("Frame slot closed, stopping capture");
                break;
            }
        }

        if published > 0 && published.is_multiple_of(30) {
            tracing::debug!(
                "Status: [Frames: {}] [Dropped: {}] [Replaced before analysis: {}]",
                published,
                dropped_frames,
                replaced_frames
            );
        }

        pacing.wait(start);
    }

    Ok(published)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge::FrameSlot;
    use image::{Rgb, RgbImage};
    use std::sync::Arc;
    use tempfile::tempdir;

    fn write_png(dir: &Path, name: &str, width: u32, height: u32, rgb: [u8; 3]) {
        RgbImage::from_pixel(width, height, Rgb(rgb))
            .save(dir.join(name))
            .unwrap();
    }

    #[test]
    fn test_open_lists_images_in_order() {
        let dir = tempdir().unwrap();
        write_png(dir.path(), "b.png", 2, 2, [0, 255, 0]);
        write_png(dir.path(), "a.PNG", 3, 1, [255, 0, 0]);
        fs::write(dir.path().join("notes.txt"), "not an image").unwrap();

        let mut source = ImageDirSource::open(dir.path(), false).unwrap();
        assert_eq!(source.len(), 2);

        let first = source.next_frame().unwrap().unwrap();
        assert_eq!((first.width(), first.height()), (3, 1));
        assert_eq!(&first.pixels()[..3], &[255, 0, 0]);

        let second = source.next_frame().unwrap().unwrap();
        assert_eq!((second.width(), second.height()), (2, 2));

        assert!(source.next_frame().is_none());
    }

    #[test]
    fn test_looping_source_wraps_around() {
        let dir = tempdir().unwrap();
        write_png(dir.path(), "only.png", 1, 1, [1, 2, 3]);

        let mut source = ImageDirSource::open(dir.path(), true).unwrap();
        for _ in 0..3 {
            let frame = source.next_frame().unwrap().unwrap();
            assert_eq!(frame.pixels(), &[1, 2, 3]);
        }
    }

    #[test]
    fn test_empty_directory_is_error() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            ImageDirSource::open(dir.path(), true),
            Err(SourceError::NoImages(_))
        ));
    }

    #[test]
    fn test_corrupt_image_is_decode_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("broken.jpg"), b"definitely not a jpeg").unwrap();

        let mut source = ImageDirSource::open(dir.path(), false).unwrap();
        assert!(matches!(
            source.next_frame(),
            Some(Err(SourceError::Decode { .. }))
        ));
    }

    #[test]
    fn test_run_capture_publishes_until_exhausted() {
        let dir = tempdir().unwrap();
        write_png(dir.path(), "1.png", 2, 2, [10, 10, 10]);
        write_png(dir.path(), "2.png", 2, 2, [20, 20, 20]);

        let slot = Arc::new(FrameSlot::new());
        let mut sink = FrameSink::new(Arc::clone(&slot));
        let mut source = ImageDirSource::open(dir.path(), false).unwrap();
        let shutdown = AtomicBool::new(false);

        let published =
            run_capture(&mut source, &mut sink, &CapturePacing::new(1000.0), &shutdown).unwrap();

        assert_eq!(published, 2);
        // nobody consumed: the first frame was replaced by the second
        assert_eq!(slot.skipped(), 1);
        let latest = slot.try_take().unwrap();
        assert_eq!(latest.frame_number(), 2);
        assert_eq!(&latest.pixels()[..3], &[20, 20, 20]);
    }

    #[test]
    fn test_run_capture_stops_on_shutdown() {
        let dir = tempdir().unwrap();
        write_png(dir.path(), "1.png", 1, 1, [0, 0, 0]);

        let slot = Arc::new(FrameSlot::new());
        let mut sink = FrameSink::new(slot);
        let mut source = ImageDirSource::open(dir.path(), true).unwrap();
        let shutdown = AtomicBool::new(true);

        let published =
            run_capture(&mut source, &mut sink, &CapturePacing::new(1000.0), &shutdown).unwrap();
        assert_eq!(published, 0);
    }

    #[test]
    fn test_run_capture_stops_when_slot_closed() {
        let dir = tempdir().unwrap();
        write_png(dir.path(), "1.png", 1, 1, [0, 0, 0]);

        let slot = Arc::new(FrameSlot::new());
        slot.close();
        let mut sink = FrameSink::new(slot);
        let mut source = ImageDirSource::open(dir.path(), true).unwrap();

        let published = run_capture(
            &mut source,
            &mut sink,
            &CapturePacing::new(1000.0),
            &AtomicBool::new(false),
        )
        .unwrap();
        assert_eq!(published, 0);
    }

    #[test]
    fn test_run_capture_gives_up_when_nothing_decodes() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("broken.png"), b"garbage").unwrap();

        let slot = Arc::new(FrameSlot::new());
        let mut sink = FrameSink::new(slot);
        let mut source = ImageDirSource::open(dir.path(), true).unwrap();

        let result = run_capture(
            &mut source,
            &mut sink,
            &CapturePacing::new(1000.0),
            &AtomicBool::new(false),
        );
        assert!(result.is_err());
    }
}
