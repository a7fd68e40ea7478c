// GUI-related constants
pub mod gui {
    // Window settings
    pub const WINDOW_TITLE: &str = "Camera Dataset Tool";
    pub const WINDOW_WIDTH: f32 = 1100.0;
    pub const WINDOW_HEIGHT: f32 = 750.0;
    pub const MIN_WINDOW_WIDTH: f32 = 640.0;
    pub const MIN_WINDOW_HEIGHT: f32 = 480.0;

    // Preview placeholder while no frame has arrived
    pub const PREVIEW_PLACEHOLDER_HEIGHT: f32 = 240.0;

    // Overlay colors (RGB)
    pub const DRAG_COLOR: [u8; 3] = [255, 255, 0];
    pub const COMMITTED_COLOR: [u8; 3] = [0, 255, 0];
    pub const OUTLINE_THICKNESS: u32 = 2;
}

// Capture configuration defaults
pub mod defaults {
    pub const RESOLUTION_LABEL: &str = "640x480";
    pub const MAX_PROBED_CAMERAS: u32 = 5;
    pub const FILE_PREFIX: &str = "img_";
    pub const FILE_EXTENSION: &str = "png";
}

// Frame loop timing constants
pub mod timing {
    pub const PREVIEW_TICK_MS: u64 = 20;
    pub const AUTO_CAPTURE_TICK_MS: u64 = 500;
    pub const NO_SOURCE_TICK_MS: u64 = 100;
}
