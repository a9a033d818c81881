use crate::types::Rgba;

/// Default backing width of the capture surface in pixels.
pub const DEFAULT_PAD_WIDTH: u32 = 400;

/// Default backing height of the capture surface in pixels.
pub const DEFAULT_PAD_HEIGHT: u32 = 150;

/// Default stroke width in pixels.
pub const DEFAULT_STROKE_WIDTH: f32 = 2.0;

/// Default ink color (opaque black).
pub const DEFAULT_STROKE_COLOR: Rgba = [0, 0, 0, 255];

/// Default background (opaque white).
pub const DEFAULT_BACKGROUND: Rgba = [255, 255, 255, 255];

/// Validation message shown when capturing an empty surface.
pub const EMPTY_SIGNATURE_MESSAGE: &str = "Please draw your signature first";
