//! The merged asset node: one queryable unit per asset key.
//!
//! A [`RemoteAssetNode`] wraps every repository-scoped declaration of one
//! asset key behind a unified accessor surface. Executability flags are ORs
//! across declarations (any location can make the asset runnable) while
//! externality is an AND (external only if every location agrees). All
//! single-valued properties come from a priority declaration chosen once at
//! construction: the materializable one if any, else the observable one,
//! else the first declaration in input order.
//!
//! Nodes deliberately implement neither `Hash` nor `Eq`; the graph keys every
//! container by [`AssetKey`], so node identity is the key, never structural
//! equality over snapshot contents.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use weft_core::key::{AssetCheckKey, AssetKey, EntityKey};
use weft_core::metadata::MetadataMap;
use weft_core::partitions::{PartitionMapping, PartitionsSnap};
use weft_core::policy::{
    AutoMaterializePolicy, AutomationConditionSnap, BackfillPolicy, FreshnessPolicy,
};
use weft_core::repository::{InstigatorHandle, RepositoryHandle};
use weft_core::snap::{AssetNodeSnap, DEFAULT_GROUP_NAME};

use crate::scoped::RepositoryScopedAssetNode;

/// The merged, immutable view over every declaration of one asset key.
#[derive(Debug, Clone)]
pub struct RemoteAssetNode {
    key: AssetKey,
    parent_keys: BTreeSet<AssetKey>,
    child_keys: BTreeSet<AssetKey>,
    execution_set_entity_keys: BTreeSet<EntityKey>,
    scoped_asset_nodes: Vec<RepositoryScopedAssetNode>,
    check_keys: BTreeSet<AssetCheckKey>,
    // Derived state, computed once during the single-threaded build so the
    // finished node is freely shareable across reader threads.
    materializable_index: Option<usize>,
    observable_index: Option<usize>,
    priority_index: usize,
    is_external: bool,
}

impl RemoteAssetNode {
    /// Merges a non-empty group of scoped declarations of `key` with its
    /// adjacency, execution-set membership, and check associations.
    pub fn new(
        key: AssetKey,
        parent_keys: BTreeSet<AssetKey>,
        child_keys: BTreeSet<AssetKey>,
        execution_set_entity_keys: BTreeSet<EntityKey>,
        scoped_asset_nodes: Vec<RepositoryScopedAssetNode>,
        check_keys: BTreeSet<AssetCheckKey>,
    ) -> Self {
        debug_assert!(
            !scoped_asset_nodes.is_empty(),
            "a merged node needs at least one declaration"
        );
        debug_assert!(
            scoped_asset_nodes.iter().all(|node| node.key() == &key),
            "every declaration must carry the merged node's key"
        );

        let materializable_index = scoped_asset_nodes
            .iter()
            .position(|node| node.asset.is_materializable());
        let observable_index = scoped_asset_nodes
            .iter()
            .position(|node| node.asset.is_observable());
        let priority_index = materializable_index.or(observable_index).unwrap_or(0);
        let is_external = scoped_asset_nodes.iter().all(|node| node.asset.is_external());

        RemoteAssetNode {
            key,
            parent_keys,
            child_keys,
            execution_set_entity_keys,
            scoped_asset_nodes,
            check_keys,
            materializable_index,
            observable_index,
            priority_index,
            is_external,
        }
    }

    /// Key of the merged asset.
    pub fn key(&self) -> &AssetKey {
        &self.key
    }

    /// Keys of every declared upstream asset, unioned across declarations.
    pub fn parent_keys(&self) -> &BTreeSet<AssetKey> {
        &self.parent_keys
    }

    /// Keys of every asset declaring this one as a parent.
    pub fn child_keys(&self) -> &BTreeSet<AssetKey> {
        &self.child_keys
    }

    /// Assets and checks that must execute atomically with this asset.
    pub fn execution_set_entity_keys(&self) -> &BTreeSet<EntityKey> {
        &self.execution_set_entity_keys
    }

    /// The asset-key subset of the execution set.
    pub fn execution_set_asset_keys(&self) -> impl Iterator<Item = &AssetKey> {
        self.execution_set_entity_keys
            .iter()
            .filter_map(EntityKey::as_asset_key)
    }

    /// Keys of the checks bound to this asset.
    pub fn check_keys(&self) -> &BTreeSet<AssetCheckKey> {
        &self.check_keys
    }

    /// Every contributing declaration, in input order.
    pub fn scoped_asset_nodes(&self) -> &[RepositoryScopedAssetNode] {
        &self.scoped_asset_nodes
    }

    // -----------------------------------------------------------------------
    // Derived executability flags
    // -----------------------------------------------------------------------

    /// Returns `true` if any declaration is materializable.
    pub fn is_materializable(&self) -> bool {
        self.materializable_index.is_some()
    }

    /// Returns `true` if any declaration is observable.
    pub fn is_observable(&self) -> bool {
        self.observable_index.is_some()
    }

    /// Returns `true` if any declaration is executable.
    pub fn is_executable(&self) -> bool {
        self.materializable_index.is_some() || self.observable_index.is_some()
    }

    /// Returns `true` only if every declaration is external.
    pub fn is_external(&self) -> bool {
        self.is_external
    }

    // -----------------------------------------------------------------------
    // Priority-sourced single-valued properties
    // -----------------------------------------------------------------------

    /// The declaration supplying all single-valued merged properties:
    /// materializable if any, else observable, else the first declaration.
    ///
    /// When duplicates exist, non-priority declarations' values for these
    /// properties are ignored silently; the duplicate warning emitted at
    /// build time is the only signal.
    pub fn priority_node_snap(&self) -> &AssetNodeSnap {
        &self.scoped_asset_nodes[self.priority_index].asset
    }

    /// Repository of the priority declaration.
    pub fn priority_repository_handle(&self) -> &RepositoryHandle {
        &self.scoped_asset_nodes[self.priority_index].handle
    }

    /// Repositories of every declaration, in input order.
    pub fn repository_handles(&self) -> impl Iterator<Item = &RepositoryHandle> {
        self.scoped_asset_nodes.iter().map(|node| &node.handle)
    }

    /// Description of the priority declaration.
    pub fn description(&self) -> Option<&str> {
        self.priority_node_snap().description.as_deref()
    }

    /// Group name of the priority declaration, defaulting when undeclared.
    pub fn group_name(&self) -> &str {
        self.priority_node_snap()
            .group_name
            .as_deref()
            .unwrap_or(DEFAULT_GROUP_NAME)
    }

    /// Metadata of the priority declaration.
    pub fn metadata(&self) -> &MetadataMap {
        &self.priority_node_snap().metadata
    }

    /// Tags of the priority declaration.
    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.priority_node_snap().tags
    }

    /// Owners of the priority declaration.
    pub fn owners(&self) -> &[String] {
        &self.priority_node_snap().owners
    }

    /// Returns `true` if the priority declaration is partitioned.
    pub fn is_partitioned(&self) -> bool {
        self.priority_node_snap().partitions.is_some()
    }

    /// Partitions definition of the priority declaration.
    pub fn partitions(&self) -> Option<&PartitionsSnap> {
        self.priority_node_snap().partitions.as_ref()
    }

    /// Freshness policy of the priority declaration.
    pub fn freshness_policy(&self) -> Option<&FreshnessPolicy> {
        self.priority_node_snap().freshness_policy.as_ref()
    }

    /// Code version of the priority declaration.
    pub fn code_version(&self) -> Option<&str> {
        self.priority_node_snap().code_version.as_deref()
    }

    // -----------------------------------------------------------------------
    // Execution-type-scoped properties
    // -----------------------------------------------------------------------

    /// Partition mappings declared on the materializable declaration's
    /// parent edges. Empty when the asset is not materializable.
    pub fn partition_mappings(&self) -> BTreeMap<&AssetKey, &PartitionMapping> {
        match self.materializable_index {
            Some(index) => self.scoped_asset_nodes[index]
                .asset
                .parent_edges
                .iter()
                .filter_map(|edge| {
                    edge.partition_mapping
                        .as_ref()
                        .map(|mapping| (&edge.parent_asset_key, mapping))
                })
                .collect(),
            None => BTreeMap::new(),
        }
    }

    /// Auto-materialize policy of the materializable declaration, if any.
    /// The concept is only meaningful for materializable assets.
    pub fn auto_materialize_policy(&self) -> Option<&AutoMaterializePolicy> {
        self.materializable_index
            .and_then(|index| self.scoped_asset_nodes[index].asset.auto_materialize_policy.as_ref())
    }

    /// Backfill policy of the materializable declaration, if any.
    pub fn backfill_policy(&self) -> Option<&BackfillPolicy> {
        self.materializable_index
            .and_then(|index| self.scoped_asset_nodes[index].asset.backfill_policy.as_ref())
    }

    /// Automation condition: the materializable declaration's, else the
    /// observable declaration's, else `None`.
    pub fn automation_condition(&self) -> Option<&AutomationConditionSnap> {
        self.materializable_index
            .or(self.observable_index)
            .and_then(|index| self.scoped_asset_nodes[index].asset.automation_condition.as_ref())
    }

    /// Automatic observation interval of the observable declaration, if any.
    pub fn auto_observe_interval_minutes(&self) -> Option<f64> {
        self.observable_index
            .and_then(|index| self.scoped_asset_nodes[index].asset.auto_observe_interval_minutes)
    }

    /// Jobs the priority declaration belongs to. Empty for unexecutable
    /// assets: a pure source reference participates in no job.
    pub fn job_names(&self) -> &[String] {
        if self.is_executable() {
            &self.priority_node_snap().job_names
        } else {
            &[]
        }
    }

    // -----------------------------------------------------------------------
    // Execution-type-only accessors
    // -----------------------------------------------------------------------

    /// The materializable declaration's snapshot.
    ///
    /// # Panics
    ///
    /// Panics if no declaration is materializable. Callers must gate on
    /// [`is_materializable`](Self::is_materializable); reaching the panic is
    /// a programming error, not a recoverable condition.
    pub fn materializable_node_snap(&self) -> &AssetNodeSnap {
        match self.materializable_index {
            Some(index) => &self.scoped_asset_nodes[index].asset,
            None => panic!("no materializable declaration for asset key {}", self.key),
        }
    }

    /// The observable declaration's snapshot.
    ///
    /// # Panics
    ///
    /// Panics if no declaration is observable. Callers must gate on
    /// [`is_observable`](Self::is_observable).
    pub fn observable_node_snap(&self) -> &AssetNodeSnap {
        match self.observable_index {
            Some(index) => &self.scoped_asset_nodes[index].asset,
            None => panic!("no observable declaration for asset key {}", self.key),
        }
    }

    // -----------------------------------------------------------------------
    // Targeting instigators (workspace scope)
    // -----------------------------------------------------------------------

    /// Handles of every schedule targeting any declaration's jobs.
    ///
    /// Empty when the graph was built at repository scope, where targeting
    /// names are never resolved.
    pub fn targeting_schedule_handles(&self) -> Vec<InstigatorHandle> {
        self.targeting_handles(|node| node.targeting_schedule_names())
    }

    /// Handles of every sensor targeting any declaration's jobs.
    pub fn targeting_sensor_handles(&self) -> Vec<InstigatorHandle> {
        self.targeting_handles(|node| node.targeting_sensor_names())
    }

    fn targeting_handles(
        &self,
        names_of: impl Fn(&RepositoryScopedAssetNode) -> Option<&[String]>,
    ) -> Vec<InstigatorHandle> {
        let mut handles = Vec::new();
        for node in &self.scoped_asset_nodes {
            for name in names_of(node).unwrap_or_default() {
                handles.push(InstigatorHandle {
                    repository_handle: node.handle.clone(),
                    instigator_name: name.clone(),
                });
            }
        }
        handles
    }
}
