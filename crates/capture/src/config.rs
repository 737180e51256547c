use std::env;
use std::path::PathBuf;

pub use common::Environment;

#[derive(Debug, Clone)]
pub struct CaptureConfig {
    pub environment: Environment,
    pub frame_source_dir: PathBuf,
    pub capture_fps: f64,
    /// Restart from the first image once the directory is exhausted.
    pub loop_source: bool,
    pub gallery_dir: PathBuf,
}

impl CaptureConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let environment = Environment::from_env();

        let frame_source_dir = env::var("FRAME_SOURCE_DIR")
            .unwrap_or_else(|_| "frames".to_string())
            .into();

        let capture_fps = env::var("CAPTURE_FPS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30.0);

        if !(capture_fps > 0.0 && f64::is_finite(capture_fps)) {
            anyhow::bail!("CAPTURE_FPS must be a positive number, got {}", capture_fps);
        }

        let loop_source = env::var("LOOP_SOURCE")
            .map(|s| !matches!(s.to_lowercase().as_str(), "0" | "false" | "no"))
            .unwrap_or(true);

        let gallery_dir = env::var("GALLERY_DIR")
            .unwrap_or_else(|_| "Pictures/SmartLens".to_string())
            .into();

        Ok(Self {
            environment,
            frame_source_dir,
            capture_fps,
            loop_source,
            gallery_dir,
        })
    }
}
