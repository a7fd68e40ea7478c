//! Drag-to-select crop rectangle over the preview.

use image::{Rgb, RgbImage, imageops};

use crate::constants::gui::{COMMITTED_COLOR, DRAG_COLOR, OUTLINE_THICKNESS};
use crate::error::{CaptureError, Result};

/// Two corners in frame pixel coordinates. Either corner may be the anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl CropRect {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// `(left, top, right, bottom)` with `left <= right` and `top <= bottom`.
    pub fn normalized(&self) -> (i32, i32, i32, i32) {
        (
            self.x1.min(self.x2),
            self.y1.min(self.y2),
            self.x1.max(self.x2),
            self.y1.max(self.y2),
        )
    }

    pub fn width(&self) -> u32 {
        self.x1.abs_diff(self.x2)
    }

    pub fn height(&self) -> u32 {
        self.y1.abs_diff(self.y2)
    }

    /// `(x, y, width, height)` of the rectangle intersected with a
    /// `frame_width` x `frame_height` frame.
    pub fn clamped_bounds(&self, frame_width: u32, frame_height: u32) -> (u32, u32, u32, u32) {
        let (left, top, right, bottom) = self.normalized();
        let clamp_x = |v: i32| v.clamp(0, frame_width as i32) as u32;
        let clamp_y = |v: i32| v.clamp(0, frame_height as i32) as u32;

        let (left, right) = (clamp_x(left), clamp_x(right));
        let (top, bottom) = (clamp_y(top), clamp_y(bottom));
        (left, top, right - left, bottom - top)
    }
}

/// How an overlay rectangle is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayStyle {
    Dragging,
    Committed,
}

impl OverlayStyle {
    pub fn color(self) -> Rgb<u8> {
        match self {
            OverlayStyle::Dragging => Rgb(DRAG_COLOR),
            OverlayStyle::Committed => Rgb(COMMITTED_COLOR),
        }
    }
}

/// Pointer-drag state. Events are ignored unless crop mode is enabled.
#[derive(Debug, Default, Clone)]
pub struct CropTool {
    anchor: Option<(i32, i32)>,
    live: Option<CropRect>,
    committed: Option<CropRect>,
}

impl CropTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, enabled: bool, x: i32, y: i32) {
        if !enabled {
            return;
        }
        self.anchor = Some((x, y));
        self.live = None;
    }

    pub fn motion(&mut self, enabled: bool, x: i32, y: i32) {
        if !enabled {
            return;
        }
        if let Some((ax, ay)) = self.anchor {
            self.live = Some(CropRect::new(ax, ay, x, y));
        }
    }

    pub fn release(&mut self, enabled: bool, x: i32, y: i32) {
        if !enabled {
            return;
        }
        if let Some((ax, ay)) = self.anchor.take() {
            self.committed = Some(CropRect::new(ax, ay, x, y));
            self.live = None;
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.anchor.is_some()
    }

    pub fn live(&self) -> Option<CropRect> {
        self.live
    }

    pub fn committed(&self) -> Option<CropRect> {
        self.committed
    }

    /// The rectangle to draw over the preview: the live one while dragging,
    /// otherwise the committed one.
    pub fn overlay(&self) -> Option<(CropRect, OverlayStyle)> {
        match (self.live, self.committed) {
            (Some(live), _) => Some((live, OverlayStyle::Dragging)),
            (None, Some(committed)) => Some((committed, OverlayStyle::Committed)),
            (None, None) => None,
        }
    }
}

/// Draws the outline of `rect` into `frame`, clipped to the frame.
pub fn draw_outline(frame: &mut RgbImage, rect: CropRect, color: Rgb<u8>) {
    let (width, height) = frame.dimensions();
    let (x, y, w, h) = rect.clamped_bounds(width, height);
    if w == 0 && h == 0 {
        return;
    }

    let right = (x + w).min(width.saturating_sub(1));
    let bottom = (y + h).min(height.saturating_sub(1));

    for t in 0..OUTLINE_THICKNESS {
        let top_row = y + t;
        let bottom_row = bottom.saturating_sub(t);
        for px in x..=right {
            if top_row <= bottom {
                frame.put_pixel(px, top_row, color);
            }
            if bottom_row >= y {
                frame.put_pixel(px, bottom_row, color);
            }
        }

        let left_col = x + t;
        let right_col = right.saturating_sub(t);
        for py in y..=bottom {
            if left_col <= right {
                frame.put_pixel(left_col, py, color);
            }
            if right_col >= x {
                frame.put_pixel(right_col, py, color);
            }
        }
    }
}

/// Slices `frame` to the normalized bounds of `rect`.
pub fn apply_crop(frame: &RgbImage, rect: CropRect) -> Result<RgbImage> {
    let (width, height) = frame.dimensions();
    let (x, y, w, h) = rect.clamped_bounds(width, height);

    if w == 0 || h == 0 {
        return Err(CaptureError::EmptyCrop {
            width: w,
            height: h,
        });
    }

    Ok(imageops::crop_imm(frame, x, y, w, h).to_image())
}
