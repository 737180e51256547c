use crate::error::GalleryError;
use chrono::{DateTime, Local};
use image::ExtendedColorType;
use image::codecs::jpeg::JpegEncoder;
use schema::{DetectionResult, RawFrame};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;

const JPEG_QUALITY: u8 = 95;
const NAME_PREFIX: &str = "SmartLens";

/// `SmartLens_{topLabel}_{yyyyMMdd_HHmmss}`, with `unknown` when nothing was
/// detected. Path separators in the label are replaced.
pub fn photo_display_name(results: &[DetectionResult], now: DateTime<Local>) -> String {
    let label = results
        .first()
        .map(|r| r.label.replace(['/', '\\'], "_"))
        .unwrap_or_else(|| "unknown".to_string());

    format!("{NAME_PREFIX}_{label}_{}", now.format("%Y%m%d_%H%M%S"))
}

/// Save `frame` into `dir` as `{display_name}.jpg`.
pub fn save_photo(
    dir: impl Into<PathBuf>,
    frame: &RawFrame,
    results: &[DetectionResult],
) -> Result<PathBuf, GalleryError> {
    Gallery::new(dir).save(frame, results)
}

/// Directory of saved captures.
pub struct Gallery {
    dir: PathBuf,
}

impl Gallery {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Encode `frame` as JPEG and store it under a name derived from the top
    /// result. Never overwrites an existing photo and leaves nothing behind
    /// when the frame cannot be encoded or written.
    pub fn save(
        &self,
        frame: &RawFrame,
        results: &[DetectionResult],
    ) -> Result<PathBuf, GalleryError> {
        if frame.is_empty() {
            return Err(GalleryError::EmptyFrame);
        }

        fs::create_dir_all(&self.dir).map_err(|source| GalleryError::CreateDir {
            path: self.dir.clone(),
            source,
        })?;

        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY).encode(
            frame.pixels(),
            frame.width(),
            frame.height(),
            ExtendedColorType::Rgb8,
        )?;

        let stem = photo_display_name(results, Local::now());
        let (path, mut file) = self.create_unique(&stem)?;

        if let Err(source) = file.write_all(&jpeg).and_then(|()| file.sync_all()) {
            drop(file);
            let _ = fs::remove_file(&path);
            return Err(GalleryError::Write { path, source });
        }

        tracing::info!(path = %path.display(), "Photo saved");
        Ok(path)
    }

    fn create_unique(&self, stem: &str) -> Result<(PathBuf, File), GalleryError> {
        let mut suffix = 0u32;
        loop {
            let name = if suffix == 0 {
                format!("{stem}.jpg")
            } else {
                format!("{stem}_{suffix}.jpg")
            };
            let path = self.dir.join(name);

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => suffix += 1,
                Err(source) => return Err(GalleryError::Write { path, source }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap()
    }

    #[test]
    fn test_display_name_uses_top_label() {
        let results = vec![
            DetectionResult::new("cat", 1.0),
            DetectionResult::new("tree", 0.35),
        ];
        assert_eq!(
            photo_display_name(&results, fixed_time()),
            "SmartLens_cat_20240309_140507"
        );
    }

    #[test]
    fn test_display_name_without_results() {
        assert_eq!(
            photo_display_name(&[], fixed_time()),
            "SmartLens_unknown_20240309_140507"
        );
    }

    #[test]
    fn test_display_name_strips_separators() {
        let results = vec![DetectionResult::new("a/b\\c", 0.9)];
        assert_eq!(
            photo_display_name(&results, fixed_time()),
            "SmartLens_a_b_c_20240309_140507"
        );
    }

    #[test]
    fn test_save_writes_decodable_jpeg() {
        let dir = tempdir().unwrap();
        let gallery = Gallery::new(dir.path().join("Pictures/SmartLens"));
        let frame = RawFrame::solid(8, 6, [200, 30, 30]);

        let path = gallery
            .save(&frame, &[DetectionResult::new("cat", 1.0)])
            .unwrap();

        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("SmartLens_cat_"));
        assert!(name.ends_with(".jpg"));

        let decoded = image::open(&path).unwrap().into_rgb8();
        assert_eq!(decoded.dimensions(), (8, 6));
    }

    #[test]
    fn test_save_never_overwrites() {
        let dir = tempdir().unwrap();
        let gallery = Gallery::new(dir.path());
        let frame = RawFrame::solid(2, 2, [0, 0, 0]);

        let first = gallery.save(&frame, &[]).unwrap();
        let second = gallery.save(&frame, &[]).unwrap();
        assert_ne!(first, second);
        assert!(first.exists() && second.exists());
    }

    #[test]
    fn test_save_photo_creates_directory() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("nested/gallery");

        let path = save_photo(&target, &RawFrame::solid(4, 4, [9, 9, 9]), &[]).unwrap();
        assert!(path.starts_with(&target));
        assert!(
            path.file_name()
                .unwrap()
                .to_str()
                .unwrap()
                .starts_with("SmartLens_unknown_")
        );
    }

    #[test]
    fn test_encode_failure_leaves_no_file() {
        let dir = tempdir().unwrap();
        let gallery = Gallery::new(dir.path());
        // wider than a JPEG can describe
        let frame = RawFrame::solid(70_000, 1, [10, 20, 30]);

        assert!(matches!(
            gallery.save(&frame, &[DetectionResult::new("cat", 1.0)]),
            Err(GalleryError::Encode(_))
        ));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);

        // the gallery still works for the next capture
        let path = gallery.save(&RawFrame::solid(2, 2, [1, 1, 1]), &[]).unwrap();
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
        assert!(path.exists());
    }

    #[test]
    fn test_save_rejects_empty_frame() {
        let dir = tempdir().unwrap();
        let gallery = Gallery::new(dir.path());
        let frame = RawFrame::new(0, 0, Vec::new()).unwrap();

        assert!(matches!(
            gallery.save(&frame, &[]),
            Err(GalleryError::EmptyFrame)
        ));
    }
}
