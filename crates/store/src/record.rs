//! The persisted signed-document model.
//!
//! Records are stored as a JSON array under a single key, newest first.
//! Field names are camelCase on the wire to match the existing layout.
//! There is no schema-version field and no migration path; unreadable data
//! is treated as an empty store (a known limitation, preserved as-is).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One finalized, signed document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedDocument {
    /// Unique within the store; assigned at save time
    pub id: String,
    pub title: String,
    /// Rendered document body (placeholder substitution already applied by
    /// the caller); may carry a truncation marker suffix
    pub content: String,
    /// Signer display name
    pub signed_by: String,
    /// When the record was saved
    pub signed_at: DateTime<Utc>,
    /// Either a raw label, or a JSON-encoded map of signer name to
    /// signature object (see [`crate::compress`])
    pub signature: String,
    /// User-entered date, distinct from `signed_at`
    pub signing_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_name: Option<String>,
}

/// Caller-supplied fields for a save; the store assigns `id` and applies
/// compression and truncation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentDraft {
    pub title: String,
    pub content: String,
    pub signed_by: String,
    pub signed_at: DateTime<Utc>,
    pub signature: String,
    pub signing_date: String,
    pub template_name: Option<String>,
}

/// One entry in the named-signer signature map.
///
/// Only `image` is interpreted by the store (it gets recompressed); any
/// extra metadata fields ride along untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignerEntry {
    /// Base64-encoded signature bitmap
    pub image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}
