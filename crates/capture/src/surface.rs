//! CPU surface for signature rendering - 8-bit RGBA storage
//!
//! Stamping is hard-edged (no antialiasing) so that re-rendering the same
//! stroke list always produces byte-identical pixels.

use std::io::Cursor;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use glam::Vec2;
use thiserror::Error;

use crate::types::{Point, Rgba};

/// Error type for surface export operations.
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("Failed to encode surface as PNG: {0}")]
    PngEncode(#[from] image::ImageError),
}

/// An 8-bit RGBA CPU surface for signature rendering.
pub struct RasterSurface {
    /// Surface dimensions
    pub width: u32,
    pub height: u32,
    /// Pixel data in row-major order
    pixels: Vec<Rgba>,
}

impl RasterSurface {
    /// Create a new surface filled with the given background color.
    pub fn new(width: u32, height: u32, background: Rgba) -> Self {
        let pixel_count = (width as usize) * (height as usize);
        Self {
            width,
            height,
            pixels: vec![background; pixel_count],
        }
    }

    /// Fill the whole surface with a solid color.
    pub fn fill(&mut self, color: Rgba) {
        self.pixels.fill(color);
    }

    /// Get a pixel at the given coordinates.
    /// Returns None if coordinates are out of bounds.
    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let index = (y as usize) * (self.width as usize) + (x as usize);
        Some(self.pixels[index])
    }

    /// Set a pixel at the given coordinates.
    /// Does nothing if coordinates are out of bounds.
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        if x >= self.width || y >= self.height {
            return;
        }
        let index = (y as usize) * (self.width as usize) + (x as usize);
        self.pixels[index] = color;
    }

    /// Stamp a single dot: a filled disc of the given stroke width.
    pub fn stamp_dot(&mut self, at: Point, color: Rgba, stroke_width: f32) {
        self.stamp_segment(at, at, color, stroke_width);
    }

    /// Stamp a line segment with round caps.
    ///
    /// A pixel is inked when its center lies within stroke_width / 2 of the
    /// segment. Purely a function of the endpoints and style, so repeated
    /// stamping is idempotent.
    pub fn stamp_segment(&mut self, from: Point, to: Point, color: Rgba, stroke_width: f32) {
        let a = Vec2::new(from.x, from.y);
        let b = Vec2::new(to.x, to.y);
        let radius = (stroke_width / 2.0).max(0.5);

        let min_x = (a.x.min(b.x) - radius).floor().max(0.0) as u32;
        let min_y = (a.y.min(b.y) - radius).floor().max(0.0) as u32;
        let max_x = ((a.x.max(b.x) + radius).ceil() as u32).min(self.width.saturating_sub(1));
        let max_y = ((a.y.max(b.y) + radius).ceil() as u32).min(self.height.saturating_sub(1));
        if min_x > max_x || min_y > max_y {
            return;
        }

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let center = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                if distance_to_segment(center, a, b) <= radius {
                    self.set_pixel(x, y, color);
                }
            }
        }
    }

    /// True if any pixel differs from the given background color.
    ///
    /// This is the authoritative emptiness check: it inspects what was
    /// actually rendered rather than trusting bookkeeping flags.
    pub fn has_non_background(&self, background: Rgba) -> bool {
        self.pixels.iter().any(|p| *p != background)
    }

    /// Raw pixel bytes in RGBA order.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Pixel data for direct comparison (redraw idempotence tests).
    #[inline]
    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    /// Serialize the surface to a base64-encoded PNG.
    pub fn to_png_base64(&self) -> Result<String, SurfaceError> {
        let img = image::RgbaImage::from_raw(self.width, self.height, self.as_bytes().to_vec())
            .expect("pixel buffer matches surface dimensions");
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)?;
        Ok(B64.encode(bytes))
    }
}

/// Distance from a point to the closest point on segment ab.
fn distance_to_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}
