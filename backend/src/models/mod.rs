//! Models for the LoomTrack backend
//!
//! Re-exports models from the shared crate

pub use shared::models::*;
