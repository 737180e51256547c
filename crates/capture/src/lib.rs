pub mod config;
pub mod error;
pub mod gallery;
pub mod pacing;
pub mod sink;
pub mod source;

pub use config::CaptureConfig;
pub use error::{GalleryError, SourceError};
pub use gallery::{Gallery, photo_display_name, save_photo};
pub use pacing::CapturePacing;
pub use sink::FrameSink;
pub use source::{ImageDirSource, run_capture};
