//! The remote asset graph: merging asset declarations from many
//! independently-deployed repositories into one queryable dependency graph.
//!
//! Construction is a strict one-pass pipeline over already-fetched
//! [`RepositorySnapshot`](weft_core::RepositorySnapshot) inputs: scope
//! resolution, duplicate detection, execution-set indexing, dependency
//! indexing, and node merging. The result is an immutable
//! [`RemoteAssetGraph`] that concurrent schedulers, sensors, and UI layers
//! can query without locking.

pub mod deps;
pub mod duplicates;
pub mod error;
pub mod execution_sets;
pub mod graph;
pub mod node;
pub mod scoped;
pub mod traverse;

// Re-export commonly used types
pub use deps::DependencyIndex;
pub use duplicates::{find_duplicate_declarations, BuildDiagnostics, DuplicateNodeWarning};
pub use error::GraphError;
pub use execution_sets::build_execution_set_index;
pub use graph::{RemoteAssetGraph, RemoteAssetGraphScope, IMPLICIT_ASSET_JOB_NAME};
pub use node::RemoteAssetNode;
pub use scoped::{RepositoryScopedAssetNode, TargetingInstigators};
