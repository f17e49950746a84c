//! Error types for graph queries.
//!
//! Every lookup against the built graph either succeeds or fails with a
//! structured, matchable variant; the graph itself stays valid and queryable
//! for other keys.

use thiserror::Error;
use weft_core::key::{AssetCheckKey, AssetKey};

/// Errors produced by queries against a [`RemoteAssetGraph`].
///
/// [`RemoteAssetGraph`]: crate::graph::RemoteAssetGraph
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// An asset key is not present in the graph.
    #[error("unknown asset key: {key}")]
    UnknownAssetKey { key: AssetKey },

    /// An asset check key is not present in the graph.
    #[error("unknown asset check key: {key}")]
    UnknownAssetCheckKey { key: AssetCheckKey },

    /// A topological ordering was requested but the dependency edges form a
    /// cycle.
    #[error("dependency cycle through asset key: {key}")]
    DependencyCycle { key: AssetKey },
}
