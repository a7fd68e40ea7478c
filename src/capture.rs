//! Resizing, cropping and writing captured frames.

use std::path::{Path, PathBuf};

use image::RgbImage;
use image::imageops::{self, FilterType};
use log::{debug, info};

use crate::camera::{CameraBackend, CaptureSource};
use crate::constants::defaults::{FILE_EXTENSION, FILE_PREFIX};
use crate::crop::{self, CropRect};
use crate::error::{CaptureError, Result};
use crate::presets::Resolution;

/// Shared settings read by the frame loop and by every capture.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureConfig {
    pub resolution: Resolution,
    pub output_dir: PathBuf,
    pub camera_index: u32,
    pub crop_enabled: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            resolution: Resolution::default(),
            output_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            camera_index: 0,
            crop_enabled: false,
        }
    }
}

impl CaptureConfig {
    /// The crop to apply to captures, if crop mode is on and a rectangle
    /// has been committed.
    pub fn active_crop(&self, committed: Option<CropRect>) -> Option<CropRect> {
        if self.crop_enabled { committed } else { None }
    }
}

/// Resizes a raw camera frame to the target resolution.
pub fn resize_to(frame: &RgbImage, resolution: Resolution) -> RgbImage {
    let (width, height) = resolution.dimensions();
    if frame.dimensions() == (width, height) {
        return frame.clone();
    }
    imageops::resize(frame, width, height, FilterType::Triangle)
}

pub fn capture_file_name(millis: i64) -> String {
    format!("{}{}.{}", FILE_PREFIX, millis, FILE_EXTENSION)
}

/// First `img_<millis>.png` in `dir` that does not exist yet, starting at
/// `millis` and counting up.
pub fn unused_capture_path(dir: &Path, millis: i64) -> PathBuf {
    let mut stamp = millis;
    loop {
        let path = dir.join(capture_file_name(stamp));
        if !path.exists() {
            return path;
        }
        stamp += 1;
    }
}

/// Resizes, crops and writes `frame` into `config.output_dir`.
pub fn save_frame(
    frame: &RgbImage,
    config: &CaptureConfig,
    committed: Option<CropRect>,
    millis: i64,
) -> Result<PathBuf> {
    let resized = resize_to(frame, config.resolution);
    let output = match config.active_crop(committed) {
        Some(rect) => crop::apply_crop(&resized, rect)?,
        None => resized,
    };

    let path = unused_capture_path(&config.output_dir, millis);
    output.save(&path).map_err(|source| CaptureError::Write {
        path: path.clone(),
        source,
    })?;

    info!(
        "Saved {}x{} capture to {}",
        output.width(),
        output.height(),
        path.display()
    );
    Ok(path)
}

pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Reads a fresh frame and saves it.
///
/// Returns `Ok(None)` when no frame could be read; that is not an error.
pub fn capture_image<B: CameraBackend>(
    source: &mut CaptureSource<B>,
    config: &CaptureConfig,
    committed: Option<CropRect>,
) -> Result<Option<PathBuf>> {
    let frame = match source.read_frame() {
        Ok(frame) => frame,
        Err(e) => {
            debug!("Capture skipped: {}", e);
            return Ok(None);
        }
    };

    save_frame(&frame, config, committed, now_millis()).map(Some)
}
