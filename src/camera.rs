//! Camera devices and the single-handle capture source.

use image::RgbImage;
use log::{debug, info, warn};
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{CameraIndex, RequestedFormat, RequestedFormatType};

use crate::error::{CaptureError, Result};

/// An open camera device.
pub trait Camera {
    /// Reads one frame from the device.
    fn read_frame(&mut self) -> Result<RgbImage>;

    /// Releases the device. Must be safe to call more than once.
    fn release(&mut self);
}

/// Opens camera devices by index.
pub trait CameraBackend {
    type Device: Camera;

    fn open(&mut self, index: u32) -> Result<Self::Device>;
}

/// Returns the indices in `0..max_tested` that open and deliver a frame.
///
/// Every probed device is released before the next index is tried.
pub fn probe_cameras<B: CameraBackend>(backend: &mut B, max_tested: u32) -> Vec<u32> {
    let mut available = Vec::new();

    for index in 0..max_tested {
        let mut device = match backend.open(index) {
            Ok(device) => device,
            Err(e) => {
                debug!("Probe: camera {} unavailable: {}", index, e);
                continue;
            }
        };

        match device.read_frame() {
            Ok(_) => available.push(index),
            Err(e) => debug!("Probe: camera {} opened but gave no frame: {}", index, e),
        }
        device.release();
    }

    info!("Detected cameras: {:?}", available);
    available
}

/// Owns at most one open camera at a time.
pub struct CaptureSource<B: CameraBackend> {
    backend: B,
    active: Option<(u32, B::Device)>,
}

impl<B: CameraBackend> CaptureSource<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            active: None,
        }
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Opens `index`, releasing the current device first.
    ///
    /// On failure the source is left with no open device.
    pub fn open(&mut self, index: u32) -> Result<()> {
        self.release();

        let device = self.backend.open(index)?;
        info!("Opened camera {}", index);
        self.active = Some((index, device));
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.active.is_some()
    }

    pub fn index(&self) -> Option<u32> {
        self.active.as_ref().map(|(index, _)| *index)
    }

    pub fn read_frame(&mut self) -> Result<RgbImage> {
        match self.active.as_mut() {
            Some((_, device)) => device.read_frame(),
            None => Err(CaptureError::NoSource),
        }
    }

    pub fn release(&mut self) {
        if let Some((index, mut device)) = self.active.take() {
            device.release();
            info!("Released camera {}", index);
        }
    }
}

impl<B: CameraBackend> Drop for CaptureSource<B> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Native webcams through nokhwa.
#[derive(Debug, Default, Clone, Copy)]
pub struct NokhwaBackend;

pub struct NokhwaCamera {
    index: u32,
    camera: nokhwa::Camera,
    streaming: bool,
}

impl CameraBackend for NokhwaBackend {
    type Device = NokhwaCamera;

    fn open(&mut self, index: u32) -> Result<NokhwaCamera> {
        let requested =
            RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);

        let mut camera = nokhwa::Camera::new(CameraIndex::Index(index), requested).map_err(|e| {
            CaptureError::OpenFailed {
                index,
                reason: e.to_string(),
            }
        })?;

        camera
            .open_stream()
            .map_err(|e| CaptureError::OpenFailed {
                index,
                reason: e.to_string(),
            })?;

        Ok(NokhwaCamera {
            index,
            camera,
            streaming: true,
        })
    }
}

impl Camera for NokhwaCamera {
    fn read_frame(&mut self) -> Result<RgbImage> {
        if !self.streaming {
            return Err(CaptureError::NoSource);
        }

        let buffer = self
            .camera
            .frame()
            .map_err(|e| CaptureError::FrameRead(e.to_string()))?;
        let decoded = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| CaptureError::FrameRead(e.to_string()))?;

        // nokhwa may link a different `image` release, so rebuild from raw bytes
        let (width, height) = (decoded.width(), decoded.height());
        RgbImage::from_raw(width, height, decoded.into_raw())
            .ok_or_else(|| CaptureError::FrameRead("decoded buffer has wrong length".to_string()))
    }

    fn release(&mut self) {
        if !self.streaming {
            return;
        }
        self.streaming = false;

        if let Err(e) = self.camera.stop_stream() {
            warn!("Camera {}: failed to stop stream: {}", self.index, e);
        }
    }
}

impl Drop for NokhwaCamera {
    fn drop(&mut self) {
        self.release();
    }
}
