//! Paraph signature capture - stroke recording and rasterization
//!
//! This crate provides the interactive signature capture surface:
//! - [`types::Stroke`] - An ordered point list between pointer-down and pointer-up
//! - [`state`] - Pure capture state machine (transitions separate from drawing)
//! - [`surface`] - CPU RGBA surface with hard-edged stroke stamping
//! - [`mapping`] - Client-to-canvas coordinate mapping
//! - [`pad`] - The complete signature pad (state + surface + style)
//! - [`confirm`] - Draw/upload variant with an explicit confirmation step

pub mod confirm;
pub mod constants;
pub mod mapping;
pub mod pad;
pub mod state;
pub mod surface;
pub mod types;

pub use confirm::*;
pub use constants::*;
pub use mapping::*;
pub use pad::*;
pub use state::*;
pub use surface::*;
pub use types::*;
