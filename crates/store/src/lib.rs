//! Paraph signed-document store - quota-bounded client-side persistence
//!
//! This crate persists signed documents in a size-constrained key-value
//! store, keeping total usage within a fixed byte ceiling:
//! - [`kv`] - The narrow storage seam (`get`/`set`/`remove`/`estimate_usage`)
//!   plus an in-memory implementation with quota simulation
//! - [`record`] - The persisted [`record::SignedDocument`] model
//! - [`compress`] - Signature image downscaling and JPEG re-encoding
//! - [`store`] - Save/list/get/delete with eviction and quota recovery
//! - [`export`] - Standalone HTML wrapping for download/printing

pub mod compress;
pub mod constants;
pub mod export;
pub mod kv;
pub mod record;
pub mod store;

pub use compress::*;
pub use constants::*;
pub use export::*;
pub use kv::*;
pub use record::*;
pub use store::*;
