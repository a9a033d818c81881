//! Paraph signing session - capture-to-store orchestration
//!
//! A [`SigningSession`] collects the pieces of one signing flow: the
//! already-rendered document content (placeholder substitution happens
//! upstream), the user-entered signing date, and any number of named
//! signatures captured from a pad. Finalizing builds the draft record and
//! hands it to the signed-document store.

use std::collections::BTreeMap;

use chrono::Utc;
use tracing::debug;

use paraph_capture::CaptureOutput;
use paraph_store::{
    DocumentDraft, DocumentStore, KeyValueStore, SaveOutcome, SignerEntry, StoreError,
};

/// One in-progress signing flow for a single document.
#[derive(Debug, Clone)]
pub struct SigningSession {
    title: String,
    /// Rendered document body; `{{field}}` substitution already applied
    content: String,
    /// User-entered date, distinct from the save timestamp
    signing_date: String,
    template_name: Option<String>,
    /// Named signatures collected so far, in signer-name order
    signatures: BTreeMap<String, SignerEntry>,
}

impl SigningSession {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        signing_date: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            signing_date: signing_date.into(),
            template_name: None,
            signatures: BTreeMap::new(),
        }
    }

    /// Record which template produced the content.
    pub fn with_template(mut self, template_name: impl Into<String>) -> Self {
        self.template_name = Some(template_name.into());
        self
    }

    /// Attach a captured signature under the given signer name.
    ///
    /// Re-signing under the same name replaces the earlier signature.
    pub fn add_signature(&mut self, signer: impl Into<String>, output: &CaptureOutput) {
        let signer = signer.into();
        debug!(signer, "attaching signature to session");
        self.signatures.insert(
            signer,
            SignerEntry {
                image: output.image_png_base64.clone(),
                signed_at: Some(output.coordinates.captured_at),
                name: None,
            },
        );
    }

    pub fn has_signatures(&self) -> bool {
        !self.signatures.is_empty()
    }

    pub fn signer_names(&self) -> Vec<&str> {
        self.signatures.keys().map(String::as_str).collect()
    }

    /// The signature field as it will be persisted: a JSON signer map when
    /// signatures were captured, otherwise a raw label naming the signer.
    pub fn signature_payload(&self, signed_by: &str) -> String {
        if self.signatures.is_empty() {
            return format!("Signed by {signed_by}");
        }
        serde_json::to_string(&self.signatures)
            .unwrap_or_else(|_| format!("Signed by {signed_by}"))
    }

    /// Build the draft and save it. The store applies image compression,
    /// content truncation and eviction; the outcome reports what happened.
    pub fn finalize<S: KeyValueStore>(
        self,
        store: &mut DocumentStore<S>,
        signed_by: impl Into<String>,
    ) -> Result<SaveOutcome, StoreError> {
        let signed_by = signed_by.into();
        let signature = self.signature_payload(&signed_by);
        store.save(DocumentDraft {
            title: self.title,
            content: self.content,
            signed_by,
            signed_at: Utc::now(),
            signature,
            signing_date: self.signing_date,
            template_name: self.template_name,
        })
    }
}
