//! Core error types for weft-core.
//!
//! Uses `thiserror` for structured, matchable error variants covering the
//! failure modes of the snapshot data model.

use thiserror::Error;

/// Core errors produced by the weft-core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A user-facing asset key string failed to parse.
    #[error("invalid asset key '{raw}': {reason}")]
    InvalidAssetKey { raw: String, reason: String },

    /// A user-facing asset check key string failed to parse.
    #[error("invalid asset check key '{raw}': expected '<asset path>:<check name>'")]
    InvalidAssetCheckKey { raw: String },
}
