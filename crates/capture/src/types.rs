use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BACKGROUND, DEFAULT_PAD_HEIGHT, DEFAULT_PAD_WIDTH, DEFAULT_STROKE_COLOR,
    DEFAULT_STROKE_WIDTH,
};

/// RGBA pixel, 8 bits per channel.
pub type Rgba = [u8; 4];

/// A single recorded input position in canvas pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X position in backing pixels
    pub x: f32,
    /// Y position in backing pixels
    pub y: f32,
    /// Milliseconds since the Unix epoch at which the point was recorded
    pub timestamp_ms: u64,
}

impl Point {
    pub fn new(x: f32, y: f32, timestamp_ms: u64) -> Self {
        Self { x, y, timestamp_ms }
    }
}

/// One continuous pointer-down-to-pointer-up drawing path.
///
/// Points are append-only while the stroke is active and immutable once the
/// stroke is completed. A stroke with a single point is valid (a dot).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub points: Vec<Point>,
}

impl Stroke {
    /// Start a new stroke at the given point.
    pub fn starting_at(point: Point) -> Self {
        Self {
            points: vec![point],
        }
    }

    /// The most recently recorded point.
    pub fn last_point(&self) -> Point {
        // A stroke always holds at least its starting point.
        self.points[self.points.len() - 1]
    }
}

/// Visual style applied to every stroke on a pad.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PadStyle {
    /// Ink color
    pub stroke_color: Rgba,
    /// Stroke width in backing pixels
    pub stroke_width: f32,
    /// Background fill color
    pub background: Rgba,
}

impl Default for PadStyle {
    fn default() -> Self {
        Self {
            stroke_color: DEFAULT_STROKE_COLOR,
            stroke_width: DEFAULT_STROKE_WIDTH,
            background: DEFAULT_BACKGROUND,
        }
    }
}

/// Configuration for a signature pad surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PadConfig {
    /// Backing width in pixels
    pub width: u32,
    /// Backing height in pixels
    pub height: u32,
    pub style: PadStyle,
}

impl Default for PadConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_PAD_WIDTH,
            height: DEFAULT_PAD_HEIGHT,
            style: PadStyle::default(),
        }
    }
}

impl PadConfig {
    /// Create a config with the given dimensions and default style.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            style: PadStyle::default(),
        }
    }
}

/// Full stroke geometry retained alongside the exported bitmap so a verifier
/// can replay or audit the drawing, not just view it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinatesPayload {
    pub strokes: Vec<Stroke>,
    /// Backing width at capture time
    pub width: u32,
    /// Backing height at capture time
    pub height: u32,
    pub captured_at: DateTime<Utc>,
}

/// Output of a successful capture: the rendered bitmap plus the geometry
/// that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureOutput {
    /// Base64-encoded PNG of the current surface
    pub image_png_base64: String,
    pub coordinates: CoordinatesPayload,
}
