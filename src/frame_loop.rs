use std::time::{Duration, Instant};

use image::RgbImage;

use crate::capture::{self, CaptureConfig};
use crate::constants::timing::{AUTO_CAPTURE_TICK_MS, NO_SOURCE_TICK_MS, PREVIEW_TICK_MS};
use crate::crop::{self, CropTool};

/// Delay until the next tick.
///
/// Auto-capture runs on the slow interval to rate-limit saves.
pub fn tick_interval(has_source: bool, auto_capture: bool) -> Duration {
    let ms = if !has_source {
        NO_SOURCE_TICK_MS
    } else if auto_capture {
        AUTO_CAPTURE_TICK_MS
    } else {
        PREVIEW_TICK_MS
    };
    Duration::from_millis(ms)
}

/// Next due instant of the recurring poll.
#[derive(Debug, Clone, Copy)]
pub struct FrameTimer {
    next_due: Instant,
}

impl FrameTimer {
    /// A timer that is due immediately.
    pub fn new(now: Instant) -> Self {
        Self { next_due: now }
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.next_due
    }

    pub fn schedule(&mut self, now: Instant, interval: Duration) {
        self.next_due = now + interval;
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        self.next_due.saturating_duration_since(now)
    }
}

/// Resizes a frame for display and draws the crop overlay when crop mode is on.
pub fn render_preview(frame: &RgbImage, config: &CaptureConfig, tool: &CropTool) -> RgbImage {
    let mut display = capture::resize_to(frame, config.resolution);

    if config.crop_enabled {
        if let Some((rect, style)) = tool.overlay() {
            crop::draw_outline(&mut display, rect, style.color());
        }
    }

    display
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crop::OverlayStyle;
    use crate::presets::Resolution;
    use image::Rgb;

    #[test]
    fn interval_depends_on_mode() {
        assert_eq!(tick_interval(true, false), Duration::from_millis(20));
        assert_eq!(tick_interval(true, true), Duration::from_millis(500));
        assert_eq!(tick_interval(false, true), Duration::from_millis(100));
    }

    #[test]
    fn timer_becomes_due_after_interval() {
        let start = Instant::now();
        let mut timer = FrameTimer::new(start);
        assert!(timer.is_due(start));

        timer.schedule(start, Duration::from_millis(500));
        assert!(!timer.is_due(start + Duration::from_millis(499)));
        assert!(timer.is_due(start + Duration::from_millis(500)));
        assert_eq!(
            timer.remaining(start + Duration::from_millis(200)),
            Duration::from_millis(300)
        );
        assert_eq!(timer.remaining(start + Duration::from_secs(2)), Duration::ZERO);
    }

    #[test]
    fn preview_draws_overlay_only_in_crop_mode() {
        let frame = RgbImage::new(1280, 720);
        let mut tool = CropTool::new();
        tool.press(true, 10, 10);
        tool.release(true, 100, 100);

        let mut config = CaptureConfig {
            resolution: Resolution::Vga,
            ..CaptureConfig::default()
        };
        let plain = render_preview(&frame, &config, &tool);
        assert_eq!(plain.dimensions(), (640, 480));
        assert_eq!(*plain.get_pixel(10, 10), Rgb([0, 0, 0]));

        config.crop_enabled = true;
        let marked = render_preview(&frame, &config, &tool);
        assert_eq!(*marked.get_pixel(10, 10), OverlayStyle::Committed.color());
    }
}
