//! Pure capture state machine.
//!
//! Transitions are separated from rendering: applying an event mutates the
//! stroke state and returns the draw command the renderer should execute,
//! so the transition logic is testable without a surface.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{Point, Stroke};

/// Whether a stroke is currently being drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CapturePhase {
    #[default]
    Idle,
    Drawing,
}

/// Input events normalized from mouse or touch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CaptureEvent {
    PointerDown(Point),
    PointerMove(Point),
    PointerUp,
    Clear,
}

/// The rendering side effect of a transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCommand {
    /// Refill the whole surface with the background color
    FillBackground,
    /// Stamp a single dot (stroke start, or a one-point stroke)
    Dot(Point),
    /// Stamp a line segment between two consecutive points
    Segment { from: Point, to: Point },
}

/// Stroke state for one signing session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureState {
    phase: CapturePhase,
    /// Completed strokes, in drawing order
    strokes: Vec<Stroke>,
    /// The stroke currently being drawn (Some iff phase is Drawing)
    active: Option<Stroke>,
    /// False once the first point of the first stroke is recorded
    is_empty: bool,
}

impl Default for CaptureState {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureState {
    pub fn new() -> Self {
        Self {
            phase: CapturePhase::Idle,
            strokes: Vec::new(),
            active: None,
            is_empty: true,
        }
    }

    pub fn phase(&self) -> CapturePhase {
        self.phase
    }

    /// True until the first point of the first stroke is recorded, reset by
    /// [`CaptureEvent::Clear`].
    pub fn is_empty(&self) -> bool {
        self.is_empty
    }

    /// Completed strokes only; the in-progress stroke is not included until
    /// pointer-up.
    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    /// All recorded strokes including the in-progress one, for full redraws.
    pub fn all_strokes(&self) -> Vec<Stroke> {
        let mut all = self.strokes.clone();
        if let Some(active) = &self.active {
            all.push(active.clone());
        }
        all
    }

    /// Apply an event, returning the draw command the renderer should run.
    pub fn apply(&mut self, event: CaptureEvent) -> Option<DrawCommand> {
        match event {
            CaptureEvent::PointerDown(point) => {
                self.phase = CapturePhase::Drawing;
                self.active = Some(Stroke::starting_at(point));
                self.is_empty = false;
                Some(DrawCommand::Dot(point))
            }
            CaptureEvent::PointerMove(point) => {
                let Some(active) = self.active.as_mut() else {
                    debug!("pointer move while idle, ignoring");
                    return None;
                };
                let from = active.last_point();
                active.points.push(point);
                Some(DrawCommand::Segment { from, to: point })
            }
            CaptureEvent::PointerUp => {
                let Some(active) = self.active.take() else {
                    debug!("pointer up while idle, ignoring");
                    return None;
                };
                // A one-point stroke is retained; a single dot is valid.
                self.strokes.push(active);
                self.phase = CapturePhase::Idle;
                None
            }
            CaptureEvent::Clear => {
                self.strokes.clear();
                self.active = None;
                self.phase = CapturePhase::Idle;
                self.is_empty = true;
                Some(DrawCommand::FillBackground)
            }
        }
    }

    /// Total number of points recorded since the last clear.
    pub fn point_count(&self) -> usize {
        let active = self.active.as_ref().map(|s| s.points.len()).unwrap_or(0);
        self.strokes.iter().map(|s| s.points.len()).sum::<usize>() + active
    }
}
