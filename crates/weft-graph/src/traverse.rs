//! Traversal queries over the built graph: topological ordering and
//! transitive ancestor/descendant closures.
//!
//! The adjacency stored on merged nodes covers direct edges only; these
//! queries derive orderings and closures from it. Keys referenced only as
//! parents (declared nowhere in scope) participate in orderings and
//! closures like any other key -- they just contribute no further edges.

use std::collections::{BTreeMap, BTreeSet};

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};

use weft_core::key::AssetKey;

use crate::error::GraphError;
use crate::graph::RemoteAssetGraph;
use crate::node::RemoteAssetNode;

impl RemoteAssetGraph {
    /// Every key reachable through the graph's edges, in a topological
    /// order: parents before children. Deterministic given identical builds.
    pub fn toposorted_asset_keys(&self) -> Result<Vec<AssetKey>, GraphError> {
        // Sorted key collection makes petgraph's visit order, and therefore
        // the returned order, deterministic.
        let mut all_keys: BTreeSet<&AssetKey> = BTreeSet::new();
        for node in self.asset_nodes() {
            all_keys.insert(node.key());
            all_keys.extend(node.parent_keys());
            all_keys.extend(node.child_keys());
        }

        let mut dag: DiGraph<&AssetKey, ()> = DiGraph::new();
        let mut indices: BTreeMap<&AssetKey, NodeIndex> = BTreeMap::new();
        for &key in &all_keys {
            indices.insert(key, dag.add_node(key));
        }

        // all_keys covers every key any node references, so the index
        // lookups cannot miss.
        for node in self.asset_nodes() {
            let child = indices[node.key()];
            for parent in node.parent_keys() {
                dag.add_edge(indices[parent], child, ());
            }
        }

        match toposort(&dag, None) {
            Ok(order) => Ok(order.into_iter().map(|idx| (*dag[idx]).clone()).collect()),
            Err(cycle) => Err(GraphError::DependencyCycle {
                key: (*dag[cycle.node_id()]).clone(),
            }),
        }
    }

    /// Keys transitively upstream of `key`, excluding `key` itself.
    ///
    /// Includes keys referenced only as parents; traversal continues through
    /// merged nodes only, since undeclared keys declare no edges.
    pub fn ancestor_keys(&self, key: &AssetKey) -> Result<BTreeSet<AssetKey>, GraphError> {
        self.closure(key, RemoteAssetNode::parent_keys)
    }

    /// Keys transitively downstream of `key`, excluding `key` itself.
    pub fn descendant_keys(&self, key: &AssetKey) -> Result<BTreeSet<AssetKey>, GraphError> {
        self.closure(key, RemoteAssetNode::child_keys)
    }

    fn closure(
        &self,
        key: &AssetKey,
        neighbors: impl Fn(&RemoteAssetNode) -> &BTreeSet<AssetKey>,
    ) -> Result<BTreeSet<AssetKey>, GraphError> {
        let start = self.get(key)?;
        let mut visited: BTreeSet<AssetKey> = BTreeSet::new();
        let mut frontier: Vec<AssetKey> = neighbors(start).iter().cloned().collect();
        while let Some(next) = frontier.pop() {
            if !visited.insert(next.clone()) {
                continue;
            }
            if let Ok(node) = self.get(&next) {
                for neighbor in neighbors(node) {
                    if !visited.contains(neighbor) {
                        frontier.push(neighbor.clone());
                    }
                }
            }
        }
        visited.remove(key);
        Ok(visited)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_core::repository::{RepositoryHandle, RepositorySnapshot};
    use weft_core::snap::{AssetNodeSnap, AssetParentEdge, ExecutionType};

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

    fn graph_of(snaps: Vec<AssetNodeSnap>) -> RemoteAssetGraph {
        let mut repo = RepositorySnapshot::new(RepositoryHandle::new("prod", "repo"));
        repo.asset_node_snaps = snaps;
        RemoteAssetGraph::from_repository(&repo)
    }

    #[test]
    fn toposort_orders_parents_before_children() {
        let graph = graph_of(vec![
            asset_with_parents("c", &["b"]),
            asset_with_parents("a", &[]),
            asset_with_parents("b", &["a"]),
        ]);
        let order = graph.toposorted_asset_keys().unwrap();
        let position = |name: &str| order.iter().position(|k| k == &key(name)).unwrap();
        assert!(position("a") < position("b"));
        assert!(position("b") < position("c"));
    }

    #[test]
    fn toposort_includes_undeclared_parents() {
        let graph = graph_of(vec![asset_with_parents("events", &["raw"])]);
        let order = graph.toposorted_asset_keys().unwrap();
        assert_eq!(order, vec![key("raw"), key("events")]);
    }

    #[test]
    fn toposort_reports_cycles() {
        let graph = graph_of(vec![
            asset_with_parents("a", &["b"]),
            asset_with_parents("b", &["a"]),
        ]);
        assert!(matches!(
            graph.toposorted_asset_keys(),
            Err(GraphError::DependencyCycle { .. })
        ));
    }

    #[test]
    fn ancestors_and_descendants_are_transitive() {
        let graph = graph_of(vec![
            asset_with_parents("a", &[]),
            asset_with_parents("b", &["a"]),
            asset_with_parents("c", &["b"]),
            asset_with_parents("d", &["b"]),
        ]);

        assert_eq!(
            graph.ancestor_keys(&key("c")).unwrap(),
            BTreeSet::from([key("a"), key("b")])
        );
        assert_eq!(
            graph.descendant_keys(&key("a")).unwrap(),
            BTreeSet::from([key("b"), key("c"), key("d")])
        );
        assert!(graph.descendant_keys(&key("c")).unwrap().is_empty());
    }

    #[test]
    fn closure_of_unknown_key_fails() {
        let graph = graph_of(vec![asset_with_parents("a", &[])]);
        assert!(graph.ancestor_keys(&key("missing")).is_err());
    }

    #[test]
    fn closure_tolerates_cycles() {
        let graph = graph_of(vec![
            asset_with_parents("a", &["b"]),
            asset_with_parents("b", &["a"]),
        ]);
        assert_eq!(
            graph.ancestor_keys(&key("a")).unwrap(),
            BTreeSet::from([key("b")])
        );
    }
}
