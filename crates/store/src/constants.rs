/// Storage key holding the JSON-encoded record list, newest first.
pub const STORAGE_KEY: &str = "signedDocuments";

/// Assumed storage budget (5MB).
pub const QUOTA_CEILING: u64 = 5 * 1024 * 1024;

/// Remaining capacity below which eviction runs before a save.
pub const LOW_SPACE_WATERMARK: u64 = 500_000;

/// Maximum records kept by the normal eviction path.
pub const MAX_DOCUMENTS: usize = 10;

/// Records kept by the aggressive eviction path after a quota error.
pub const AGGRESSIVE_KEEP: usize = 5;

/// Maximum stored content length in characters, marker included.
pub const MAX_CONTENT_CHARS: usize = 50_000;

/// Suffix appended to truncated content.
pub const TRUNCATION_MARKER: &str = "\n\n[... document truncated for storage]";

/// Bounding box for stored signature images.
pub const SIGNATURE_MAX_WIDTH: u32 = 200;
pub const SIGNATURE_MAX_HEIGHT: u32 = 80;

/// JPEG re-encode quality (0.6 on the 0..1 scale).
pub const SIGNATURE_JPEG_QUALITY: u8 = 60;
