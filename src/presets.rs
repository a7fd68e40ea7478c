use std::fmt;
use std::str::FromStr;

use crate::error::CaptureError;

/// Target resolution every previewed and captured frame is resized to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resolution {
    Qvga,
    Vga,
    Svga,
    Hd720,
}

impl Resolution {
    pub const ALL: [Resolution; 4] = [
        Resolution::Qvga,
        Resolution::Vga,
        Resolution::Svga,
        Resolution::Hd720,
    ];

    pub fn dimensions(self) -> (u32, u32) {
        match self {
            Resolution::Qvga => (320, 240),
            Resolution::Vga => (640, 480),
            Resolution::Svga => (800, 600),
            Resolution::Hd720 => (1280, 720),
        }
    }

    pub fn width(self) -> u32 {
        self.dimensions().0
    }

    pub fn height(self) -> u32 {
        self.dimensions().1
    }

    pub fn label(self) -> &'static str {
        match self {
            Resolution::Qvga => "320x240",
            Resolution::Vga => "640x480",
            Resolution::Svga => "800x600",
            Resolution::Hd720 => "1280x720",
        }
    }
}

impl Default for Resolution {
    fn default() -> Self {
        parse_resolution(crate::constants::defaults::RESOLUTION_LABEL).unwrap_or(Resolution::Vga)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Resolution {
    type Err = CaptureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_resolution(s).ok_or_else(|| CaptureError::UnknownResolution(s.to_string()))
    }
}

/// Parses a `WxH` label (also accepts `W,H`, `W:H` and surrounding spaces).
/// Only the enumerated sizes are accepted.
pub fn parse_resolution(label: &str) -> Option<Resolution> {
    let parts: Vec<u32> = label
        .trim()
        .split(|c| c == 'x' || c == 'X' || c == ',' || c == ':')
        .filter_map(|s| s.trim().parse().ok())
        .collect();

    if parts.len() != 2 {
        return None;
    }

    Resolution::ALL
        .into_iter()
        .find(|r| r.dimensions() == (parts[0], parts[1]))
}
