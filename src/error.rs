use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("failed to open camera {index}: {reason}")]
    OpenFailed { index: u32, reason: String },

    #[error("failed to read frame: {0}")]
    FrameRead(String),

    #[error("no camera is open")]
    NoSource,

    #[error("crop region {width}x{height} is empty")]
    EmptyCrop { width: u32, height: u32 },

    #[error("unknown resolution '{0}', expected one of 320x240, 640x480, 800x600, 1280x720")]
    UnknownResolution(String),

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

pub type Result<T> = std::result::Result<T, CaptureError>;
