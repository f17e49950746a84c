//! Execution-set indexing: grouping assets and checks that must run as one
//! atomic unit.
//!
//! Snapshots carry an optional `execution_set_identifier`. All snapshots
//! (assets and checks alike, from any repository) sharing an identifier form
//! one execution set; a snapshot with no identifier executes alone. The index
//! maps every entity key to its full set, so membership lookups never need
//! the identifier again.

use std::collections::{BTreeMap, BTreeSet};

use weft_core::check::AssetCheckNodeSnap;
use weft_core::key::EntityKey;
use weft_core::snap::AssetNodeSnap;

/// Builds the execution-set index over the combined asset and check
/// snapshot population.
///
/// For a snapshot with identifier `id`, its set is the keys of every
/// snapshot sharing `id`, across repository boundaries. For a snapshot with
/// no identifier, its set is the singleton of its own key. Output containers
/// are ordered, so the result is deterministic given any input order.
pub fn build_execution_set_index<'a>(
    asset_node_snaps: impl IntoIterator<Item = &'a AssetNodeSnap>,
    asset_check_node_snaps: impl IntoIterator<Item = &'a AssetCheckNodeSnap>,
) -> BTreeMap<EntityKey, BTreeSet<EntityKey>> {
    let items: Vec<(Option<&str>, EntityKey)> = asset_node_snaps
        .into_iter()
        .map(|snap| {
            (
                snap.execution_set_identifier.as_deref(),
                EntityKey::Asset(snap.asset_key.clone()),
            )
        })
        .chain(asset_check_node_snaps.into_iter().map(|snap| {
            (
                snap.execution_set_identifier.as_deref(),
                EntityKey::Check(snap.key.clone()),
            )
        }))
        .collect();

    let mut sets_by_id: BTreeMap<&str, BTreeSet<EntityKey>> = BTreeMap::new();
    for (id, key) in &items {
        if let Some(id) = *id {
            sets_by_id.entry(id).or_default().insert(key.clone());
        }
    }

    let mut sets_by_key: BTreeMap<EntityKey, BTreeSet<EntityKey>> = BTreeMap::new();
    for (id, key) in items {
        let set = match id {
            Some(id) => sets_by_id[id].clone(),
            None => BTreeSet::from([key.clone()]),
        };
        sets_by_key.insert(key, set);
    }
    sets_by_key
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_core::key::{AssetCheckKey, AssetKey};
    use weft_core::snap::ExecutionType;

    fn asset(name: &str, set_id: Option<&str>) -> AssetNodeSnap {
        let mut snap = AssetNodeSnap::new(AssetKey::new([name]), ExecutionType::Materialization);
        snap.execution_set_identifier = set_id.map(str::to_string);
        snap
    }

    fn check(asset_name: &str, name: &str, set_id: Option<&str>) -> AssetCheckNodeSnap {
        let mut snap =
            AssetCheckNodeSnap::new(AssetCheckKey::new(AssetKey::new([asset_name]), name));
        snap.execution_set_identifier = set_id.map(str::to_string);
        snap
    }

    fn asset_entity(name: &str) -> EntityKey {
        EntityKey::Asset(AssetKey::new([name]))
    }

    fn check_entity(asset_name: &str, name: &str) -> EntityKey {
        EntityKey::Check(AssetCheckKey::new(AssetKey::new([asset_name]), name))
    }

    #[test]
    fn null_identifier_yields_singleton() {
        let assets = [asset("a", None)];
        let index = build_execution_set_index(&assets, []);
        assert_eq!(
            index[&asset_entity("a")],
            BTreeSet::from([asset_entity("a")])
        );
    }

    #[test]
    fn shared_identifier_groups_assets_and_checks() {
        let assets = [asset("a", Some("g1")), asset("b", Some("g1"))];
        let checks = [check("a", "chk", Some("g1"))];
        let index = build_execution_set_index(&assets, &checks);

        let expected = BTreeSet::from([
            asset_entity("a"),
            asset_entity("b"),
            check_entity("a", "chk"),
        ]);
        assert_eq!(index[&asset_entity("a")], expected);
        assert_eq!(index[&asset_entity("b")], expected);
        assert_eq!(index[&check_entity("a", "chk")], expected);
    }

    #[test]
    fn distinct_identifiers_stay_separate() {
        let assets = [asset("a", Some("g1")), asset("b", Some("g2"))];
        let index = build_execution_set_index(&assets, []);
        assert_eq!(
            index[&asset_entity("a")],
            BTreeSet::from([asset_entity("a")])
        );
        assert_eq!(
            index[&asset_entity("b")],
            BTreeSet::from([asset_entity("b")])
        );
    }

    #[test]
    fn index_covers_every_snapshot() {
        let assets = [asset("a", Some("g1")), asset("b", None)];
        let checks = [check("b", "chk", None)];
        let index = build_execution_set_index(&assets, &checks);
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn input_order_does_not_change_result() {
        let forward = [asset("a", Some("g1")), asset("b", Some("g1"))];
        let reversed = [asset("b", Some("g1")), asset("a", Some("g1"))];
        assert_eq!(
            build_execution_set_index(&forward, []),
            build_execution_set_index(&reversed, [])
        );
    }
}
