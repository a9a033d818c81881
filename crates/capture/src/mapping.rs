//! Client-to-canvas coordinate mapping.
//!
//! Input events arrive in the device's client coordinate space. The surface
//! may be displayed at a different size than its backing pixel size, so every
//! sample is scaled by the displayed-size-to-backing-size factor before being
//! recorded. Mouse and touch are normalized into one sample type so the
//! capture state machine has a single input path.

use serde::{Deserialize, Serialize};

use crate::types::Point;

/// One normalized input sample in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerSample {
    pub client_x: f32,
    pub client_y: f32,
    pub timestamp_ms: u64,
}

impl PointerSample {
    pub fn new(client_x: f32, client_y: f32, timestamp_ms: u64) -> Self {
        Self {
            client_x,
            client_y,
            timestamp_ms,
        }
    }

    /// Build a sample from a touch contact. Touches carry the same client
    /// coordinates as mouse events; callers pick the first active contact.
    pub fn from_touch(client_x: f32, client_y: f32, timestamp_ms: u64) -> Self {
        Self::new(client_x, client_y, timestamp_ms)
    }
}

/// Where and how large the surface is displayed, in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayMetrics {
    /// Client X of the surface's top-left corner
    pub origin_x: f32,
    /// Client Y of the surface's top-left corner
    pub origin_y: f32,
    /// Displayed width in client units
    pub display_width: f32,
    /// Displayed height in client units
    pub display_height: f32,
}

impl DisplayMetrics {
    /// Metrics for a surface displayed at its backing size with no offset.
    pub fn identity(width: u32, height: u32) -> Self {
        Self {
            origin_x: 0.0,
            origin_y: 0.0,
            display_width: width as f32,
            display_height: height as f32,
        }
    }

    /// Horizontal backing-pixels-per-client-unit factor.
    pub fn scale_x(&self, backing_width: u32) -> f32 {
        if self.display_width == 0.0 {
            return 1.0;
        }
        backing_width as f32 / self.display_width
    }

    /// Vertical backing-pixels-per-client-unit factor.
    pub fn scale_y(&self, backing_height: u32) -> f32 {
        if self.display_height == 0.0 {
            return 1.0;
        }
        backing_height as f32 / self.display_height
    }

    /// Map a client-space sample into backing pixel space.
    pub fn to_canvas(
        &self,
        sample: PointerSample,
        backing_width: u32,
        backing_height: u32,
    ) -> Point {
        Point::new(
            (sample.client_x - self.origin_x) * self.scale_x(backing_width),
            (sample.client_y - self.origin_y) * self.scale_y(backing_height),
            sample.timestamp_ms,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_mapping() {
        let metrics = DisplayMetrics::identity(400, 150);
        let point = metrics.to_canvas(PointerSample::new(10.0, 20.0, 5), 400, 150);
        assert_eq!(point, Point::new(10.0, 20.0, 5));
    }

    #[test]
    fn test_css_scaled_surface() {
        // Backing 400x150 displayed at 200x75: every client unit is two
        // backing pixels.
        let metrics = DisplayMetrics {
            origin_x: 0.0,
            origin_y: 0.0,
            display_width: 200.0,
            display_height: 75.0,
        };
        let point = metrics.to_canvas(PointerSample::new(100.0, 30.0, 0), 400, 150);
        assert_eq!(point.x, 200.0);
        assert_eq!(point.y, 60.0);
    }

    #[test]
    fn test_offset_origin() {
        let metrics = DisplayMetrics {
            origin_x: 50.0,
            origin_y: 40.0,
            display_width: 400.0,
            display_height: 150.0,
        };
        let point = metrics.to_canvas(PointerSample::new(60.0, 45.0, 0), 400, 150);
        assert_eq!(point.x, 10.0);
        assert_eq!(point.y, 5.0);
    }

    #[test]
    fn test_zero_display_size_does_not_divide_by_zero() {
        let metrics = DisplayMetrics {
            origin_x: 0.0,
            origin_y: 0.0,
            display_width: 0.0,
            display_height: 0.0,
        };
        let point = metrics.to_canvas(PointerSample::new(3.0, 4.0, 0), 400, 150);
        assert_eq!(point.x, 3.0);
        assert_eq!(point.y, 4.0);
    }

    #[test]
    fn test_touch_and_mouse_share_one_model() {
        let mouse = PointerSample::new(12.0, 34.0, 99);
        let touch = PointerSample::from_touch(12.0, 34.0, 99);
        assert_eq!(mouse, touch);
    }
}
