//! Application state shared by the frame loop, crop tool and capture actions.

use std::path::PathBuf;
use std::time::Duration;

use image::RgbImage;
use log::{debug, info, warn};

use crate::camera::{self, CameraBackend, CaptureSource};
use crate::capture::{self, CaptureConfig};
use crate::constants::defaults::MAX_PROBED_CAMERAS;
use crate::crop::CropTool;
use crate::error::Result;
use crate::frame_loop;
use crate::presets::Resolution;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoCapture {
    Idle,
    Running,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CaptureStatus {
    Idle,
    Saved(PathBuf),
    Error(String),
}

/// Result of one frame loop tick.
#[derive(Debug)]
pub struct TickOutcome {
    /// Frame to display, `None` when the read failed or no camera is open.
    pub preview: Option<RgbImage>,
    /// File written by auto-capture on this tick.
    pub saved: Option<PathBuf>,
    pub next_tick: Duration,
}

pub struct CaptureSession<B: CameraBackend> {
    pub config: CaptureConfig,
    crop: CropTool,
    source: CaptureSource<B>,
    auto: AutoCapture,
    available: Vec<u32>,
    status: CaptureStatus,
}

impl<B: CameraBackend> CaptureSession<B> {
    pub fn new(backend: B, config: CaptureConfig) -> Self {
        Self {
            config,
            crop: CropTool::new(),
            source: CaptureSource::new(backend),
            auto: AutoCapture::Idle,
            available: Vec::new(),
            status: CaptureStatus::Idle,
        }
    }

    /// Probes for cameras and opens the first one found.
    ///
    /// Returns `false` when no camera was detected; the session stays usable
    /// without a source.
    pub fn start(&mut self) -> bool {
        self.source.release();
        self.available = camera::probe_cameras(self.source.backend_mut(), MAX_PROBED_CAMERAS);

        let Some(&first) = self.available.first() else {
            warn!("No camera found");
            return false;
        };

        if let Err(e) = self.select_camera(first) {
            warn!("Could not open camera {}: {}", first, e);
        }
        true
    }

    pub fn available_cameras(&self) -> &[u32] {
        &self.available
    }

    pub fn active_camera(&self) -> Option<u32> {
        self.source.index()
    }

    /// Switches to camera `index`, releasing the current one first.
    pub fn select_camera(&mut self, index: u32) -> Result<()> {
        self.config.camera_index = index;
        self.source.open(index).inspect_err(|e| {
            self.status = CaptureStatus::Error(e.to_string());
        })
    }

    pub fn set_resolution(&mut self, resolution: Resolution) {
        if self.config.resolution != resolution {
            info!("Target resolution set to {}", resolution);
            self.config.resolution = resolution;
        }
    }

    pub fn set_crop_enabled(&mut self, enabled: bool) {
        self.config.crop_enabled = enabled;
    }

    pub fn set_output_dir(&mut self, dir: PathBuf) {
        info!("Saving captures to {}", dir.display());
        self.config.output_dir = dir;
    }

    pub fn crop_tool(&self) -> &CropTool {
        &self.crop
    }

    pub fn crop_press(&mut self, x: i32, y: i32) {
        self.crop.press(self.config.crop_enabled, x, y);
    }

    pub fn crop_motion(&mut self, x: i32, y: i32) {
        self.crop.motion(self.config.crop_enabled, x, y);
    }

    pub fn crop_release(&mut self, x: i32, y: i32) {
        self.crop.release(self.config.crop_enabled, x, y);
        if let Some(rect) = self.crop.committed() {
            debug!("Crop region committed: {:?}", rect.normalized());
        }
    }

    pub fn status(&self) -> &CaptureStatus {
        &self.status
    }

    /// Captures one image now. `Ok(None)` means no frame was available.
    pub fn capture_once(&mut self) -> Result<Option<PathBuf>> {
        let result = capture::capture_image(&mut self.source, &self.config, self.crop.committed());

        match &result {
            Ok(Some(path)) => self.status = CaptureStatus::Saved(path.clone()),
            Ok(None) => {}
            Err(e) => {
                warn!("Capture failed: {}", e);
                self.status = CaptureStatus::Error(e.to_string());
            }
        }
        result
    }

    pub fn start_auto_capture(&mut self) {
        if self.auto == AutoCapture::Idle {
            info!("Auto capture started");
            self.auto = AutoCapture::Running;
        }
    }

    pub fn stop_auto_capture(&mut self) {
        if self.auto == AutoCapture::Running {
            info!("Auto capture stopped");
            self.auto = AutoCapture::Idle;
        }
    }

    pub fn auto_capture(&self) -> AutoCapture {
        self.auto
    }

    pub fn next_tick_interval(&self) -> Duration {
        frame_loop::tick_interval(self.source.is_open(), self.auto == AutoCapture::Running)
    }

    /// One pass of the frame loop: preview read, then an auto-capture save
    /// when running.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.source.is_open() {
            return TickOutcome {
                preview: None,
                saved: None,
                next_tick: self.next_tick_interval(),
            };
        }

        let preview = match self.source.read_frame() {
            Ok(frame) => Some(frame_loop::render_preview(&frame, &self.config, &self.crop)),
            Err(e) => {
                debug!("Preview frame skipped: {}", e);
                None
            }
        };

        let saved = if self.auto == AutoCapture::Running {
            self.capture_once().ok().flatten()
        } else {
            None
        };

        TickOutcome {
            preview,
            saved,
            next_tick: self.next_tick_interval(),
        }
    }

    /// Stops auto-capture and releases the camera.
    pub fn shutdown(&mut self) {
        self.auto = AutoCapture::Idle;
        self.source.release();
    }
}
