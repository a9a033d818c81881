//! The complete signature pad
//!
//! Connects the pieces of the capture surface:
//! - Input handling (normalized pointer samples, client-to-canvas mapping)
//! - The pure capture state machine (stroke bookkeeping)
//! - The raster surface (stamping and PNG export)
//!
//! The host event layer is responsible for suppressing default gestures
//! (scroll, text selection) while a stroke is active; only normalized
//! coordinates reach the pad.

use chrono::Utc;
use tracing::debug;

use crate::constants::EMPTY_SIGNATURE_MESSAGE;
use crate::mapping::{DisplayMetrics, PointerSample};
use crate::state::{CaptureEvent, CapturePhase, CaptureState, DrawCommand};
use crate::surface::{RasterSurface, SurfaceError};
use crate::types::{CaptureOutput, CoordinatesPayload, PadConfig, Stroke};

/// Error type for capture operations.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// Nothing has been drawn since the last clear.
    #[error("{EMPTY_SIGNATURE_MESSAGE}")]
    EmptySignature,
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

/// Interactive free-hand signature surface.
///
/// Input flows in via `pointer_down` / `pointer_move` / `pointer_up`; the
/// rendered bitmap plus the stroke geometry that produced it come out of
/// [`SignaturePad::capture`].
pub struct SignaturePad {
    config: PadConfig,
    state: CaptureState,
    surface: RasterSurface,
    /// Where the surface is displayed, for client-to-canvas mapping
    metrics: DisplayMetrics,
}

impl SignaturePad {
    /// Create a pad with a blank surface filled with the configured background.
    pub fn new(config: PadConfig) -> Self {
        Self {
            state: CaptureState::new(),
            surface: RasterSurface::new(config.width, config.height, config.style.background),
            metrics: DisplayMetrics::identity(config.width, config.height),
            config,
        }
    }

    /// Re-initialize with new dimensions or style.
    ///
    /// Any in-progress drawing is discarded, matching a surface whose
    /// parameters changed mid-session.
    pub fn reconfigure(&mut self, config: PadConfig) {
        debug!(
            width = config.width,
            height = config.height,
            "reconfiguring signature pad"
        );
        self.surface = RasterSurface::new(config.width, config.height, config.style.background);
        self.state = CaptureState::new();
        self.metrics = DisplayMetrics::identity(config.width, config.height);
        self.config = config;
    }

    /// Update the displayed geometry used for coordinate mapping.
    pub fn set_display_metrics(&mut self, metrics: DisplayMetrics) {
        self.metrics = metrics;
    }

    pub fn config(&self) -> &PadConfig {
        &self.config
    }

    pub fn width(&self) -> u32 {
        self.config.width
    }

    pub fn height(&self) -> u32 {
        self.config.height
    }

    /// True until the first point of the first stroke is recorded.
    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    /// Check if a stroke is currently in progress.
    pub fn is_drawing(&self) -> bool {
        self.state.phase() == CapturePhase::Drawing
    }

    /// Completed strokes in drawing order.
    pub fn strokes(&self) -> &[Stroke] {
        self.state.strokes()
    }

    /// Authoritative emptiness check: scan the rendered pixels for any
    /// non-background value. Must agree with [`SignaturePad::is_empty`].
    pub fn has_ink(&self) -> bool {
        self.surface.has_non_background(self.config.style.background)
    }

    /// Read-only view of the rendered surface.
    pub fn surface(&self) -> &RasterSurface {
        &self.surface
    }

    /// Begin a new stroke at the sampled position.
    pub fn pointer_down(&mut self, sample: PointerSample) {
        let point = self
            .metrics
            .to_canvas(sample, self.config.width, self.config.height);
        let cmd = self.state.apply(CaptureEvent::PointerDown(point));
        self.run_command(cmd);
    }

    /// Extend the in-progress stroke. No effect while idle.
    pub fn pointer_move(&mut self, sample: PointerSample) {
        let point = self
            .metrics
            .to_canvas(sample, self.config.width, self.config.height);
        let cmd = self.state.apply(CaptureEvent::PointerMove(point));
        self.run_command(cmd);
    }

    /// End the in-progress stroke. No effect while idle.
    pub fn pointer_up(&mut self) {
        let cmd = self.state.apply(CaptureEvent::PointerUp);
        self.run_command(cmd);
    }

    /// Discard all strokes and refill the background.
    pub fn clear(&mut self) {
        let cmd = self.state.apply(CaptureEvent::Clear);
        self.run_command(cmd);
    }

    /// Re-render the surface from the recorded stroke list.
    ///
    /// Idempotent: the same stroke list always reproduces pixel-identical
    /// output, so state-driven re-renders match the incremental drawing.
    pub fn redraw(&mut self) {
        self.surface.fill(self.config.style.background);
        let style = self.config.style;
        for stroke in self.state.all_strokes() {
            let Some(first) = stroke.points.first().copied() else {
                continue;
            };
            self.surface
                .stamp_dot(first, style.stroke_color, style.stroke_width);
            for pair in stroke.points.windows(2) {
                self.surface
                    .stamp_segment(pair[0], pair[1], style.stroke_color, style.stroke_width);
            }
        }
    }

    /// Serialize the current surface to a PNG plus the stroke geometry.
    ///
    /// Fails with [`CaptureError::EmptySignature`] when nothing has been
    /// drawn; the message is the user-facing validation text.
    pub fn capture(&self) -> Result<CaptureOutput, CaptureError> {
        if self.state.is_empty() {
            return Err(CaptureError::EmptySignature);
        }
        let image_png_base64 = self.surface.to_png_base64()?;
        Ok(CaptureOutput {
            image_png_base64,
            coordinates: CoordinatesPayload {
                strokes: self.state.all_strokes(),
                width: self.config.width,
                height: self.config.height,
                captured_at: Utc::now(),
            },
        })
    }

    fn run_command(&mut self, cmd: Option<DrawCommand>) {
        let style = self.config.style;
        match cmd {
            Some(DrawCommand::FillBackground) => self.surface.fill(style.background),
            Some(DrawCommand::Dot(at)) => {
                self.surface
                    .stamp_dot(at, style.stroke_color, style.stroke_width)
            }
            Some(DrawCommand::Segment { from, to }) => {
                self.surface
                    .stamp_segment(from, to, style.stroke_color, style.stroke_width)
            }
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(x: f32, y: f32) -> PointerSample {
        PointerSample::new(x, y, 0)
    }

    fn draw_stroke(pad: &mut SignaturePad, points: &[(f32, f32)]) {
        let mut iter = points.iter();
        let (x, y) = iter.next().expect("at least one point");
        pad.pointer_down(sample(*x, *y));
        for (x, y) in iter {
            pad.pointer_move(sample(*x, *y));
        }
        pad.pointer_up();
    }

    #[test]
    fn test_empty_capture_is_rejected() {
        let pad = SignaturePad::new(PadConfig::new(50, 50));
        let err = pad.capture().unwrap_err();
        assert!(matches!(err, CaptureError::EmptySignature));
        assert_eq!(err.to_string(), "Please draw your signature first");
    }

    #[test]
    fn test_capture_returns_image_and_geometry() {
        let mut pad = SignaturePad::new(PadConfig::new(50, 50));
        draw_stroke(&mut pad, &[(10.0, 10.0), (30.0, 30.0)]);

        let output = pad.capture().unwrap();
        assert!(!output.image_png_base64.is_empty());
        assert_eq!(output.coordinates.width, 50);
        assert_eq!(output.coordinates.height, 50);
        assert_eq!(output.coordinates.strokes.len(), 1);
        assert_eq!(output.coordinates.strokes[0].points.len(), 2);
    }

    #[test]
    fn test_flag_and_pixel_scan_agree() {
        let mut pad = SignaturePad::new(PadConfig::new(50, 50));
        assert_eq!(pad.is_empty(), !pad.has_ink());

        draw_stroke(&mut pad, &[(10.0, 10.0), (20.0, 20.0)]);
        assert!(!pad.is_empty());
        assert!(pad.has_ink());

        pad.clear();
        assert!(pad.is_empty());
        assert!(!pad.has_ink());
    }

    #[test]
    fn test_two_strokes_then_clear() {
        let mut pad = SignaturePad::new(PadConfig::new(50, 50));
        draw_stroke(&mut pad, &[(5.0, 5.0), (10.0, 10.0)]);
        draw_stroke(&mut pad, &[(20.0, 20.0), (25.0, 25.0)]);
        assert_eq!(pad.strokes().len(), 2);

        pad.clear();
        assert!(pad.is_empty());
        assert!(pad.strokes().is_empty());
        assert!(!pad.has_ink());
    }

    #[test]
    fn test_redraw_matches_incremental_render() {
        let mut pad = SignaturePad::new(PadConfig::new(60, 40));
        draw_stroke(&mut pad, &[(5.0, 5.0), (20.0, 15.0), (40.0, 30.0)]);
        draw_stroke(&mut pad, &[(50.0, 10.0)]);
        let live = pad.surface().pixels().to_vec();

        pad.redraw();
        let first = pad.surface().pixels().to_vec();
        pad.redraw();
        let second = pad.surface().pixels().to_vec();

        assert_eq!(live, first);
        assert_eq!(first, second);
    }

    #[test]
    fn test_css_scaling_keeps_geometry() {
        let mut pad = SignaturePad::new(PadConfig::new(100, 100));
        // Displayed at half size: client (25, 25) is backing (50, 50).
        pad.set_display_metrics(DisplayMetrics {
            origin_x: 0.0,
            origin_y: 0.0,
            display_width: 50.0,
            display_height: 50.0,
        });
        pad.pointer_down(sample(25.0, 25.0));
        pad.pointer_up();

        assert_eq!(pad.strokes()[0].points[0].x, 50.0);
        assert_eq!(pad.strokes()[0].points[0].y, 50.0);
    }

    #[test]
    fn test_reconfigure_discards_in_progress_drawing() {
        let mut pad = SignaturePad::new(PadConfig::new(50, 50));
        pad.pointer_down(sample(10.0, 10.0));
        assert!(pad.is_drawing());

        pad.reconfigure(PadConfig::new(80, 40));
        assert!(!pad.is_drawing());
        assert!(pad.is_empty());
        assert!(!pad.has_ink());
        assert_eq!(pad.width(), 80);
    }
}
