//! Signature image recompression.
//!
//! Stored signature payloads can embed full-resolution PNG bitmaps. Before
//! persisting, each embedded image is downscaled into a bounding box and
//! re-encoded as JPEG over a white background (JPEG has no alpha channel, so
//! compositing first keeps transparent regions from turning black).
//!
//! Every failure path recovers to the original value: compression must never
//! abort a save.

use std::io::Cursor;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use serde_json::Value;
use tracing::{debug, warn};

use crate::constants::{SIGNATURE_JPEG_QUALITY, SIGNATURE_MAX_HEIGHT, SIGNATURE_MAX_WIDTH};

/// Whether a value was actually recompressed or passed through as-is.
///
/// Passthrough is a recovery, not an error; callers that only want the value
/// use [`CompressionOutcome::into_value`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompressionOutcome {
    /// The payload was recompressed
    Compressed(String),
    /// The original payload was kept (not an image map, or decode failed)
    Passthrough(String),
}

impl CompressionOutcome {
    pub fn into_value(self) -> String {
        match self {
            Self::Compressed(v) | Self::Passthrough(v) => v,
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Self::Compressed(v) | Self::Passthrough(v) => v,
        }
    }

    pub fn was_compressed(&self) -> bool {
        matches!(self, Self::Compressed(_))
    }
}

/// Recompress a single base64 image into the given bounding box.
///
/// The image is downscaled preserving aspect ratio so neither dimension
/// exceeds the box (never upscaled), drawn over white, and re-encoded as
/// JPEG at the given quality. Undecodable input passes through unchanged.
pub fn recompress_image(
    payload: &str,
    max_width: u32,
    max_height: u32,
    quality: u8,
) -> CompressionOutcome {
    let encoded = strip_data_url(payload);
    let Ok(bytes) = B64.decode(encoded.as_bytes()) else {
        debug!("signature image is not valid base64, passing through");
        return CompressionOutcome::Passthrough(payload.to_string());
    };
    let Ok(decoded) = image::load_from_memory(&bytes) else {
        debug!("signature image does not decode, passing through");
        return CompressionOutcome::Passthrough(payload.to_string());
    };

    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    let (new_width, new_height) = fit_within(width, height, max_width, max_height);
    let resized = image::imageops::resize(&rgba, new_width, new_height, FilterType::Triangle);

    // Composite over white so transparency does not re-encode black.
    let mut flattened = image::RgbImage::new(new_width, new_height);
    for (x, y, pixel) in resized.enumerate_pixels() {
        let alpha = pixel[3] as u32;
        let blend = |channel: u8| ((channel as u32 * alpha + 255 * (255 - alpha)) / 255) as u8;
        flattened.put_pixel(
            x,
            y,
            image::Rgb([blend(pixel[0]), blend(pixel[1]), blend(pixel[2])]),
        );
    }

    let mut jpeg = Vec::new();
    let mut cursor = Cursor::new(&mut jpeg);
    let encoder = JpegEncoder::new_with_quality(&mut cursor, quality);
    match flattened.write_with_encoder(encoder) {
        Ok(()) => CompressionOutcome::Compressed(B64.encode(jpeg)),
        Err(e) => {
            warn!("JPEG re-encode failed, passing through: {e}");
            CompressionOutcome::Passthrough(payload.to_string())
        }
    }
}

/// Compress a signature payload before storage.
///
/// A payload that parses as a JSON object is treated as a map of signer name
/// to signature object; each entry's `image` field is recompressed into the
/// configured bounding box. Non-image entries ride along untouched. Anything
/// that fails to parse (raw labels included) passes through unchanged.
pub fn compress_signature_payload(signature: &str) -> CompressionOutcome {
    let Ok(Value::Object(mut signers)) = serde_json::from_str::<Value>(signature) else {
        return CompressionOutcome::Passthrough(signature.to_string());
    };

    let mut any_compressed = false;
    for entry in signers.values_mut() {
        let Some(image) = entry.get("image").and_then(Value::as_str) else {
            continue;
        };
        let outcome = recompress_image(
            image,
            SIGNATURE_MAX_WIDTH,
            SIGNATURE_MAX_HEIGHT,
            SIGNATURE_JPEG_QUALITY,
        );
        if outcome.was_compressed() {
            any_compressed = true;
            entry["image"] = Value::String(outcome.into_value());
        }
    }

    if !any_compressed {
        // Nothing changed; keep the original text byte-for-byte.
        return CompressionOutcome::Passthrough(signature.to_string());
    }
    match serde_json::to_string(&Value::Object(signers)) {
        Ok(json) => CompressionOutcome::Compressed(json),
        Err(e) => {
            warn!("signature map re-serialization failed, passing through: {e}");
            CompressionOutcome::Passthrough(signature.to_string())
        }
    }
}

/// Dimensions scaled to fit inside the box, aspect ratio preserved,
/// never upscaled, never zero.
fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (1, 1);
    }
    let scale = (max_width as f32 / width as f32)
        .min(max_height as f32 / height as f32)
        .min(1.0);
    (
        ((width as f32 * scale) as u32).max(1),
        ((height as f32 * scale) as u32).max(1),
    )
}

/// Strip an optional `data:<mime>;base64,` prefix.
fn strip_data_url(payload: &str) -> &str {
    if payload.starts_with("data:") {
        payload
            .split_once(',')
            .map(|(_, rest)| rest)
            .unwrap_or(payload)
    } else {
        payload
    }
}
