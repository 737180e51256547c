use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Failed to read frame source {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("No image files found in {0}")]
    NoImages(PathBuf),

    #[error("Failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Invalid frame: {0}")]
    Frame(#[from] schema::SchemaError),
}

#[derive(Error, Debug)]
pub enum GalleryError {
    #[error("Failed to prepare gallery directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write photo {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to encode photo: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Cannot save an empty frame")]
    EmptyFrame,
}
