//! Dependency indexing: bidirectional adjacency over asset keys.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use weft_core::key::AssetKey;
use weft_core::snap::AssetNodeSnap;

static EMPTY_KEY_SET: BTreeSet<AssetKey> = BTreeSet::new();

/// Upstream/downstream adjacency derived from declared parent edges.
///
/// Every key referenced anywhere -- as a declaring asset or only as a parent
/// of one -- has an entry in both directions, so lookups never miss. Keys
/// referenced only as parents simply have empty upstream sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyIndex {
    upstream: BTreeMap<AssetKey, BTreeSet<AssetKey>>,
    downstream: BTreeMap<AssetKey, BTreeSet<AssetKey>>,
}

impl DependencyIndex {
    /// Builds the index from declared snapshots.
    ///
    /// Each parent edge is recorded in both directions: the declaring key
    /// gains an upstream entry and the parent key gains a downstream entry.
    pub fn build<'a>(snaps: impl IntoIterator<Item = &'a AssetNodeSnap>) -> Self {
        let mut index = DependencyIndex::default();
        for snap in snaps {
            index.touch(&snap.asset_key);
            for edge in &snap.parent_edges {
                index.touch(&edge.parent_asset_key);
                index
                    .upstream
                    .entry(snap.asset_key.clone())
                    .or_default()
                    .insert(edge.parent_asset_key.clone());
                index
                    .downstream
                    .entry(edge.parent_asset_key.clone())
                    .or_default()
                    .insert(snap.asset_key.clone());
            }
        }
        index
    }

    /// Grants `key` empty entries in both directions if it has none yet.
    fn touch(&mut self, key: &AssetKey) {
        if !self.upstream.contains_key(key) {
            self.upstream.insert(key.clone(), BTreeSet::new());
            self.downstream.insert(key.clone(), BTreeSet::new());
        }
    }

    /// Parents of `key`. Empty for unknown keys.
    pub fn parents_of(&self, key: &AssetKey) -> &BTreeSet<AssetKey> {
        self.upstream.get(key).unwrap_or(&EMPTY_KEY_SET)
    }

    /// Children of `key`. Empty for unknown keys.
    pub fn children_of(&self, key: &AssetKey) -> &BTreeSet<AssetKey> {
        self.downstream.get(key).unwrap_or(&EMPTY_KEY_SET)
    }

    /// Returns `true` if `key` was observed as a declaring asset or a parent.
    pub fn contains_key(&self, key: &AssetKey) -> bool {
        self.upstream.contains_key(key)
    }

    /// Iterates every observed key in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &AssetKey> {
        self.upstream.keys()
    }

    /// Number of observed keys.
    pub fn len(&self) -> usize {
        self.upstream.len()
    }

    /// Returns `true` if no key was observed.
    pub fn is_empty(&self) -> bool {
        self.upstream.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_core::snap::{AssetParentEdge, ExecutionType};

    fn key(name: &str) -> AssetKey {
        AssetKey::new([name])
    }

    fn asset_with_parents(name: &str, parents: &[&str]) -> AssetNodeSnap {
        let mut snap = AssetNodeSnap::new(key(name), ExecutionType::Materialization);
        snap.parent_edges = parents
            .iter()
            .map(|parent| AssetParentEdge::new(key(parent)))
            .collect();
        snap
    }

    #[test]
    fn edges_are_recorded_in_both_directions() {
        // Scenario: P depends on Q.
        let snaps = [asset_with_parents("q", &[]), asset_with_parents("p", &["q"])];
        let index = DependencyIndex::build(&snaps);

        assert_eq!(index.parents_of(&key("p")), &BTreeSet::from([key("q")]));
        assert_eq!(index.children_of(&key("q")), &BTreeSet::from([key("p")]));
        assert!(index.parents_of(&key("q")).is_empty());
        assert!(index.children_of(&key("p")).is_empty());
    }

    #[test]
    fn parent_only_keys_are_granted_entries() {
        // "raw" is referenced as a parent but never declared.
        let snaps = [asset_with_parents("events", &["raw"])];
        let index = DependencyIndex::build(&snaps);

        assert!(index.contains_key(&key("raw")));
        assert!(index.parents_of(&key("raw")).is_empty());
        assert_eq!(
            index.children_of(&key("raw")),
            &BTreeSet::from([key("events")])
        );
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn unknown_keys_yield_empty_sets() {
        let index = DependencyIndex::build([]);
        assert!(index.parents_of(&key("missing")).is_empty());
        assert!(index.children_of(&key("missing")).is_empty());
        assert!(index.is_empty());
    }

    #[test]
    fn duplicate_declarations_union_their_edges() {
        // Two repositories declare "c" with different parents; adjacency is
        // the union of both declarations.
        let snaps = [
            asset_with_parents("c", &["a"]),
            asset_with_parents("c", &["b"]),
        ];
        let index = DependencyIndex::build(&snaps);
        assert_eq!(
            index.parents_of(&key("c")),
            &BTreeSet::from([key("a"), key("b")])
        );
    }

    #[test]
    fn symmetry_holds_for_every_edge() {
        let snaps = [
            asset_with_parents("a", &[]),
            asset_with_parents("b", &["a"]),
            asset_with_parents("c", &["a", "b"]),
            asset_with_parents("d", &["c", "external"]),
        ];
        let index = DependencyIndex::build(&snaps);

        for child in index.keys() {
            for parent in index.parents_of(child) {
                assert!(index.children_of(parent).contains(child));
            }
        }
        for parent in index.keys() {
            for child in index.children_of(parent) {
                assert!(index.parents_of(child).contains(parent));
            }
        }
    }
}
