pub mod camera;
pub mod capture;
pub mod constants;
pub mod crop;
pub mod error;
pub mod frame_loop;
pub mod gui;
pub mod presets;
pub mod session;

pub use camera::{Camera, CameraBackend, CaptureSource, NokhwaBackend, probe_cameras};
pub use capture::{CaptureConfig, capture_file_name, capture_image, save_frame};
pub use crop::{CropRect, CropTool};
pub use error::CaptureError;
pub use presets::{Resolution, parse_resolution};
pub use session::{AutoCapture, CaptureSession, CaptureStatus, TickOutcome};
