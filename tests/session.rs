use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use dataset_capture::{
    AutoCapture, Camera, CameraBackend, CaptureConfig, CaptureError, CaptureSession,
    CaptureStatus, Resolution,
};
use image::{Rgb, RgbImage};
use tempfile::TempDir;

#[derive(Default)]
struct Devices {
    open: RefCell<Vec<u32>>,
    max_open: Cell<usize>,
    failing_reads: Cell<u32>,
}

struct FakeBackend {
    present: Vec<u32>,
    devices: Rc<Devices>,
}

struct FakeCamera {
    index: u32,
    released: bool,
    devices: Rc<Devices>,
}

impl CameraBackend for FakeBackend {
    type Device = FakeCamera;

    fn open(&mut self, index: u32) -> Result<FakeCamera, CaptureError> {
        if !self.present.contains(&index) {
            return Err(CaptureError::OpenFailed {
                index,
                reason: "no such device".to_string(),
            });
        }
        let mut open = self.devices.open.borrow_mut();
        open.push(index);
        self.devices.max_open.set(self.devices.max_open.get().max(open.len()));
        Ok(FakeCamera {
            index,
            released: false,
            devices: Rc::clone(&self.devices),
        })
    }
}

impl Camera for FakeCamera {
    fn read_frame(&mut self) -> Result<RgbImage, CaptureError> {
        let failing = self.devices.failing_reads.get();
        if failing > 0 {
            self.devices.failing_reads.set(failing - 1);
            return Err(CaptureError::FrameRead("timeout".to_string()));
        }
        Ok(RgbImage::from_fn(1024, 768, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, self.index as u8])
        }))
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.devices.open.borrow_mut().retain(|i| *i != self.index);
        }
    }
}

fn session_with(present: &[u32], dir: &Path) -> (CaptureSession<FakeBackend>, Rc<Devices>) {
    let devices = Rc::new(Devices::default());
    let backend = FakeBackend {
        present: present.to_vec(),
        devices: Rc::clone(&devices),
    };
    let config = CaptureConfig {
        output_dir: dir.to_path_buf(),
        ..CaptureConfig::default()
    };
    (CaptureSession::new(backend, config), devices)
}

fn saved_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    files.sort();
    files
}

fn dimensions(path: &Path) -> (u32, u32) {
    let img = image::open(path).unwrap();
    (img.width(), img.height())
}

#[test]
fn default_capture_is_vga_with_millisecond_name() {
    let dir = TempDir::new().unwrap();
    let (mut session, _) = session_with(&[0], dir.path());
    assert!(session.start());

    let path = session.capture_once().unwrap().unwrap();

    assert_eq!(path.parent().unwrap(), dir.path());
    let name = path.file_name().unwrap().to_str().unwrap();
    let stamp = name
        .strip_prefix("img_")
        .and_then(|rest| rest.strip_suffix(".png"))
        .unwrap();
    assert_eq!(stamp.len(), 13);
    assert!(stamp.chars().all(|c| c.is_ascii_digit()));
    assert_eq!(dimensions(&path), (640, 480));
    assert_eq!(session.status(), &CaptureStatus::Saved(path));
}

#[test]
fn resolution_change_applies_to_next_capture() {
    let dir = TempDir::new().unwrap();
    let (mut session, _) = session_with(&[0], dir.path());
    session.start();

    for resolution in Resolution::ALL {
        session.set_resolution(resolution);
        let path = session.capture_once().unwrap().unwrap();
        assert_eq!(dimensions(&path), resolution.dimensions());
    }
}

#[test]
fn crop_size_is_independent_of_drag_direction() {
    let dir = TempDir::new().unwrap();
    let (mut session, _) = session_with(&[0], dir.path());
    session.start();
    session.set_crop_enabled(true);

    let drags = [
        ((40, 30), (240, 130)),
        ((240, 130), (40, 30)),
        ((240, 30), (40, 130)),
        ((40, 130), (240, 30)),
    ];
    for ((x1, y1), (x2, y2)) in drags {
        session.crop_press(x1, y1);
        session.crop_motion((x1 + x2) / 2, (y1 + y2) / 2);
        session.crop_release(x2, y2);

        let path = session.capture_once().unwrap().unwrap();
        assert_eq!(dimensions(&path), (200, 100));
    }
}

#[test]
fn committed_crop_survives_toggling_crop_mode() {
    let dir = TempDir::new().unwrap();
    let (mut session, _) = session_with(&[0], dir.path());
    session.start();
    session.set_crop_enabled(true);
    session.crop_press(10, 10);
    session.crop_release(110, 60);

    session.set_crop_enabled(false);
    let full = session.capture_once().unwrap().unwrap();
    assert_eq!(dimensions(&full), (640, 480));

    // drags while disabled are ignored
    session.crop_press(0, 0);
    session.crop_release(300, 300);

    session.set_crop_enabled(true);
    let cropped = session.capture_once().unwrap().unwrap();
    assert_eq!(dimensions(&cropped), (100, 50));
}

#[test]
fn auto_capture_saves_once_per_tick() {
    let dir = TempDir::new().unwrap();
    let (mut session, _) = session_with(&[0], dir.path());
    session.start();
    assert_eq!(session.next_tick_interval(), Duration::from_millis(20));

    let idle = session.tick();
    assert!(idle.preview.is_some());
    assert!(idle.saved.is_none());
    assert!(saved_files(dir.path()).is_empty());

    session.start_auto_capture();
    assert_eq!(session.auto_capture(), AutoCapture::Running);

    let ticks = 4;
    for _ in 0..ticks {
        let outcome = session.tick();
        assert!(outcome.saved.is_some());
        assert_eq!(outcome.next_tick, Duration::from_millis(500));
    }
    assert_eq!(saved_files(dir.path()).len(), ticks);

    session.stop_auto_capture();
    let outcome = session.tick();
    assert!(outcome.saved.is_none());
    assert_eq!(outcome.next_tick, Duration::from_millis(20));
    assert_eq!(saved_files(dir.path()).len(), ticks);
}

#[test]
fn start_and_stop_are_idempotent() {
    let dir = TempDir::new().unwrap();
    let (mut session, _) = session_with(&[0], dir.path());

    session.stop_auto_capture();
    assert_eq!(session.auto_capture(), AutoCapture::Idle);
    session.start_auto_capture();
    session.start_auto_capture();
    assert_eq!(session.auto_capture(), AutoCapture::Running);
    session.stop_auto_capture();
    assert_eq!(session.auto_capture(), AutoCapture::Idle);
}

#[test]
fn failed_reads_skip_the_tick_silently() {
    let dir = TempDir::new().unwrap();
    let (mut session, devices) = session_with(&[0], dir.path());
    session.start();
    session.start_auto_capture();

    // preview and capture reads both fail
    devices.failing_reads.set(2);
    let outcome = session.tick();
    assert!(outcome.preview.is_none());
    assert!(outcome.saved.is_none());
    assert_eq!(session.status(), &CaptureStatus::Idle);

    let outcome = session.tick();
    assert!(outcome.preview.is_some());
    assert!(outcome.saved.is_some());
    assert_eq!(saved_files(dir.path()).len(), 1);
}

#[test]
fn switching_camera_never_holds_two_handles() {
    let dir = TempDir::new().unwrap();
    let (mut session, devices) = session_with(&[0, 1, 3], dir.path());

    assert!(session.start());
    assert_eq!(session.available_cameras(), &[0, 1, 3]);
    assert_eq!(session.active_camera(), Some(0));

    session.select_camera(3).unwrap();
    session.select_camera(1).unwrap();

    assert_eq!(session.active_camera(), Some(1));
    assert_eq!(session.config.camera_index, 1);
    assert_eq!(*devices.open.borrow(), vec![1]);
    assert_eq!(devices.max_open.get(), 1);

    session.shutdown();
    assert!(devices.open.borrow().is_empty());
}

#[test]
fn no_camera_leaves_session_running_without_source() {
    let dir = TempDir::new().unwrap();
    let (mut session, _) = session_with(&[], dir.path());

    assert!(!session.start());
    assert!(session.available_cameras().is_empty());
    assert_eq!(session.active_camera(), None);

    session.start_auto_capture();
    let outcome = session.tick();
    assert!(outcome.preview.is_none());
    assert!(outcome.saved.is_none());
    assert_eq!(outcome.next_tick, Duration::from_millis(100));
    assert_eq!(session.capture_once().unwrap(), None);
    assert!(saved_files(dir.path()).is_empty());
}

#[test]
fn failed_switch_reports_error_and_drops_source() {
    let dir = TempDir::new().unwrap();
    let (mut session, devices) = session_with(&[0], dir.path());
    session.start();

    assert!(session.select_camera(2).is_err());
    assert_eq!(session.active_camera(), None);
    assert!(devices.open.borrow().is_empty());
    assert!(matches!(session.status(), CaptureStatus::Error(_)));
}

#[test]
fn write_failure_is_reported_in_status() {
    let dir = TempDir::new().unwrap();
    let (mut session, _) = session_with(&[0], dir.path());
    session.start();
    session.set_output_dir(dir.path().join("missing"));

    let err = session.capture_once().unwrap_err();
    assert!(matches!(err, CaptureError::Write { .. }));
    assert!(matches!(session.status(), CaptureStatus::Error(_)));
}
