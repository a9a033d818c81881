//! Draw/upload signature input with an explicit confirmation step.
//!
//! This variant of the capture surface supports two mutually exclusive
//! input modes: drawing on the pad, or uploading an existing image file.
//! A drawn signature is not committed directly; the user reviews the
//! rendered result and either accepts it (emitting the same output shape
//! as a plain capture) or rejects it, returning to a cleared pad.
//!
//! Emptiness here is decided by scanning the rendered pixels rather than
//! trusting the stroke bookkeeping; the two strategies must agree and the
//! tests assert that they do.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::EMPTY_SIGNATURE_MESSAGE;
use crate::pad::{CaptureError, SignaturePad};
use crate::surface::SurfaceError;
use crate::types::{CaptureOutput, CoordinatesPayload, PadConfig};

/// How the signature is being provided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum InputMode {
    #[default]
    Draw,
    Upload,
}

/// Error type for the confirmation flow.
#[derive(Debug, thiserror::Error)]
pub enum ConfirmError {
    #[error("{EMPTY_SIGNATURE_MESSAGE}")]
    EmptySignature,
    #[error("Operation requires {required:?} mode, current mode is {current:?}")]
    ModeMismatch {
        required: InputMode,
        current: InputMode,
    },
    #[error("No signature is awaiting confirmation")]
    NothingPending,
    #[error("Uploaded file is not a decodable image: {0}")]
    InvalidImage(String),
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

/// Two-mode signature input with accept/reject confirmation.
pub struct SignatureInput {
    mode: InputMode,
    pad: SignaturePad,
    /// Rendered drawing held between submit and accept/reject
    pending: Option<CaptureOutput>,
}

impl SignatureInput {
    pub fn new(config: PadConfig) -> Self {
        Self {
            mode: InputMode::Draw,
            pad: SignaturePad::new(config),
            pending: None,
        }
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    /// Switch input modes. The modes are mutually exclusive, so any state
    /// belonging to the previous mode is discarded.
    pub fn set_mode(&mut self, mode: InputMode) {
        if self.mode == mode {
            return;
        }
        debug!(?mode, "switching signature input mode");
        self.pad.clear();
        self.pending = None;
        self.mode = mode;
    }

    /// The drawing surface; only meaningful in [`InputMode::Draw`].
    pub fn pad(&self) -> &SignaturePad {
        &self.pad
    }

    pub fn pad_mut(&mut self) -> &mut SignaturePad {
        &mut self.pad
    }

    /// True while a rendered drawing is awaiting accept/reject.
    pub fn awaiting_confirmation(&self) -> bool {
        self.pending.is_some()
    }

    /// Render the drawn signature and hold it for confirmation.
    ///
    /// The pixel scan is the authoritative emptiness check.
    pub fn submit_drawing(&mut self) -> Result<(), ConfirmError> {
        self.require_mode(InputMode::Draw)?;
        if !self.pad.has_ink() {
            return Err(ConfirmError::EmptySignature);
        }
        let output = self.pad.capture().map_err(|e| match e {
            CaptureError::EmptySignature => ConfirmError::EmptySignature,
            CaptureError::Surface(e) => ConfirmError::Surface(e),
        })?;
        self.pending = Some(output);
        Ok(())
    }

    /// Commit the pending drawing, emitting the same shape as a capture.
    pub fn accept(&mut self) -> Result<CaptureOutput, ConfirmError> {
        self.pending.take().ok_or(ConfirmError::NothingPending)
    }

    /// Discard the pending drawing and return to a cleared pad.
    pub fn reject(&mut self) -> Result<(), ConfirmError> {
        if self.pending.take().is_none() {
            return Err(ConfirmError::NothingPending);
        }
        self.pad.clear();
        Ok(())
    }

    /// Commit an uploaded image directly.
    ///
    /// The payload must decode as an image; anything else is an input error.
    /// The emitted metadata carries the decoded dimensions and no strokes.
    pub fn upload(&mut self, image_base64: &str) -> Result<CaptureOutput, ConfirmError> {
        self.require_mode(InputMode::Upload)?;
        let encoded = strip_data_url(image_base64);
        let bytes = B64
            .decode(encoded.as_bytes())
            .map_err(|e| ConfirmError::InvalidImage(e.to_string()))?;
        let decoded = image::load_from_memory(&bytes)
            .map_err(|e| ConfirmError::InvalidImage(e.to_string()))?;
        Ok(CaptureOutput {
            image_png_base64: encoded.to_string(),
            coordinates: CoordinatesPayload {
                strokes: Vec::new(),
                width: decoded.width(),
                height: decoded.height(),
                captured_at: Utc::now(),
            },
        })
    }

    fn require_mode(&self, required: InputMode) -> Result<(), ConfirmError> {
        if self.mode != required {
            return Err(ConfirmError::ModeMismatch {
                required,
                current: self.mode,
            });
        }
        Ok(())
    }
}

/// Strip an optional `data:<mime>;base64,` prefix.
pub(crate) fn strip_data_url(payload: &str) -> &str {
    if payload.starts_with("data:") {
        payload
            .split_once(',')
            .map(|(_, rest)| rest)
            .unwrap_or(payload)
    } else {
        payload
    }
}
