//! RemoteAssetGraph: the merged, queryable aggregate over every repository.
//!
//! Two construction paths (single repository, full workspace) funnel into one
//! private builder. The build is a strict one-pass pipeline: wrap snapshots
//! into scoped nodes (resolving schedule/sensor targeting at workspace
//! scope), detect duplicate declarations, index execution sets, index
//! dependencies, then merge per-key groups into [`RemoteAssetNode`]s. No step
//! observes partial results of a later step, and the finished graph is
//! immutable: concurrent readers need no locking.

use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use weft_core::check::AssetCheckNodeSnap;
use weft_core::key::{AssetCheckKey, AssetKey, EntityKey};
use weft_core::repository::{RepositoryHandle, RepositorySnapshot, WorkspaceSnapshot};

use crate::duplicates::{find_duplicate_declarations, BuildDiagnostics};
use crate::error::GraphError;
use crate::execution_sets::build_execution_set_index;
use crate::node::RemoteAssetNode;
use crate::scoped::{RepositoryScopedAssetNode, TargetingInstigators};
use crate::DependencyIndex;

/// Name of the implicit job that targets every asset of a repository.
///
/// Schedules and sensors targeting it are not attributed to individual
/// assets, since it would mark every asset as scheduled.
pub const IMPLICIT_ASSET_JOB_NAME: &str = "__ASSET_JOB";

/// Whether a graph was built from a single repository or from all
/// repositories across the whole workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemoteAssetGraphScope {
    /// Built from one repository; targeting names are unresolved.
    Repository,
    /// Built from every loaded code location of a workspace.
    Workspace,
}

/// The merged dependency graph over every asset and check declaration of the
/// source repositories.
#[derive(Debug, Clone)]
pub struct RemoteAssetGraph {
    scope: RemoteAssetGraphScope,
    asset_nodes_by_key: IndexMap<AssetKey, RemoteAssetNode>,
    asset_checks_by_key: IndexMap<AssetCheckKey, AssetCheckNodeSnap>,
    asset_check_execution_sets_by_key: BTreeMap<AssetCheckKey, BTreeSet<EntityKey>>,
    repository_handles_by_asset_check_key: BTreeMap<AssetCheckKey, RepositoryHandle>,
    diagnostics: BuildDiagnostics,
}

/// Per-repository index from job name to the schedules/sensors targeting it.
/// Built only at workspace scope.
struct TargetingIndex {
    schedules_by_job: BTreeMap<String, Vec<String>>,
    sensors_by_job: BTreeMap<String, Vec<String>>,
}

impl TargetingIndex {
    fn build(repo: &RepositorySnapshot) -> Self {
        let mut schedules_by_job: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for schedule in &repo.schedules {
            schedules_by_job
                .entry(schedule.job_name.clone())
                .or_default()
                .push(schedule.name.clone());
        }
        let mut sensors_by_job: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for sensor in &repo.sensors {
            sensors_by_job
                .entry(sensor.job_name.clone())
                .or_default()
                .push(sensor.name.clone());
        }
        TargetingIndex {
            schedules_by_job,
            sensors_by_job,
        }
    }

    /// Collects the schedules/sensors targeting any of `job_names`, skipping
    /// the implicit asset job.
    fn resolve(&self, job_names: &[String]) -> TargetingInstigators {
        let mut targeting = TargetingInstigators::default();
        for job_name in job_names {
            if job_name == IMPLICIT_ASSET_JOB_NAME {
                continue;
            }
            if let Some(schedules) = self.schedules_by_job.get(job_name) {
                targeting.schedule_names.extend(schedules.iter().cloned());
            }
            if let Some(sensors) = self.sensors_by_job.get(job_name) {
                targeting.sensor_names.extend(sensors.iter().cloned());
            }
        }
        targeting
    }
}

impl RemoteAssetGraph {
    /// Builds a repository-scoped graph from one repository's declarations.
    pub fn from_repository(repo: &RepositorySnapshot) -> Self {
        Self::build(RemoteAssetGraphScope::Repository, std::iter::once(repo))
    }

    /// Builds a workspace-scoped graph from every repository of every loaded
    /// code location.
    pub fn from_workspace_snapshot(workspace: &WorkspaceSnapshot) -> Self {
        Self::build(RemoteAssetGraphScope::Workspace, workspace.repositories())
    }

    fn build<'a>(
        scope: RemoteAssetGraphScope,
        repos: impl IntoIterator<Item = &'a RepositorySnapshot>,
    ) -> Self {
        // Step 1: wrap every asset snapshot into a scoped node, resolving
        // schedule/sensor targeting at workspace scope, and collect
        // (handle, check snapshot) pairs.
        let mut scoped_nodes: Vec<RepositoryScopedAssetNode> = Vec::new();
        let mut handle_check_pairs: Vec<(RepositoryHandle, AssetCheckNodeSnap)> = Vec::new();
        for repo in repos {
            let targeting_index = match scope {
                RemoteAssetGraphScope::Workspace => Some(TargetingIndex::build(repo)),
                RemoteAssetGraphScope::Repository => None,
            };
            for snap in &repo.asset_node_snaps {
                let targeting = targeting_index
                    .as_ref()
                    .map(|index| index.resolve(&snap.job_names));
                scoped_nodes.push(RepositoryScopedAssetNode::new(
                    repo.handle.clone(),
                    snap.clone(),
                    targeting,
                ));
            }
            for check in &repo.asset_check_node_snaps {
                handle_check_pairs.push((repo.handle.clone(), check.clone()));
            }
        }

        // Step 2: duplicate-declaration pass. Non-fatal; the diagnostics stay
        // attached to the graph and are also logged once here.
        let diagnostics = find_duplicate_declarations(&scoped_nodes);
        diagnostics.emit();

        // Step 3: execution-set index over the combined asset+check
        // population.
        let execution_sets_by_key = build_execution_set_index(
            scoped_nodes.iter().map(|node| &node.asset),
            handle_check_pairs.iter().map(|(_, check)| check),
        );

        // Step 4: dependency adjacency over asset keys.
        let dependency_index = DependencyIndex::build(scoped_nodes.iter().map(|node| &node.asset));

        // Step 5: group scoped nodes by asset key, preserving input order
        // within each group (priority selection depends on it).
        let mut scoped_nodes_by_key: IndexMap<AssetKey, Vec<RepositoryScopedAssetNode>> =
            IndexMap::new();
        for node in scoped_nodes {
            scoped_nodes_by_key
                .entry(node.key().clone())
                .or_default()
                .push(node);
        }

        // Step 6: check indexes -- snapshot by key, owning asset
        // association, and recording repository handle.
        let mut check_keys_by_asset_key: BTreeMap<AssetKey, BTreeSet<AssetCheckKey>> =
            BTreeMap::new();
        let mut asset_checks_by_key: IndexMap<AssetCheckKey, AssetCheckNodeSnap> = IndexMap::new();
        let mut repository_handles_by_asset_check_key: BTreeMap<AssetCheckKey, RepositoryHandle> =
            BTreeMap::new();
        for (handle, check) in handle_check_pairs {
            check_keys_by_asset_key
                .entry(check.asset_key().clone())
                .or_default()
                .insert(check.key.clone());
            repository_handles_by_asset_check_key.insert(check.key.clone(), handle);
            asset_checks_by_key.insert(check.key.clone(), check);
        }

        // Step 7: the check-key subset of the execution-set index.
        let asset_check_execution_sets_by_key: BTreeMap<AssetCheckKey, BTreeSet<EntityKey>> =
            execution_sets_by_key
                .iter()
                .filter_map(|(key, set)| {
                    key.as_check_key().map(|check| (check.clone(), set.clone()))
                })
                .collect();

        // Step 8: merge each per-key group into one RemoteAssetNode.
        let mut asset_nodes_by_key: IndexMap<AssetKey, RemoteAssetNode> =
            IndexMap::with_capacity(scoped_nodes_by_key.len());
        for (key, group) in scoped_nodes_by_key {
            let entity_key = EntityKey::Asset(key.clone());
            // The execution-set index is total over the snapshots it was
            // built from, so every declared key has an entry.
            let execution_set = execution_sets_by_key[&entity_key].clone();
            let node = RemoteAssetNode::new(
                key.clone(),
                dependency_index.parents_of(&key).clone(),
                dependency_index.children_of(&key).clone(),
                execution_set,
                group,
                check_keys_by_asset_key
                    .get(&key)
                    .cloned()
                    .unwrap_or_default(),
            );
            asset_nodes_by_key.insert(key, node);
        }

        RemoteAssetGraph {
            scope,
            asset_nodes_by_key,
            asset_checks_by_key,
            asset_check_execution_sets_by_key,
            repository_handles_by_asset_check_key,
            diagnostics,
        }
    }

    // -----------------------------------------------------------------------
    // Read-only accessors
    // -----------------------------------------------------------------------

    /// Scope this graph was built at.
    pub fn scope(&self) -> RemoteAssetGraphScope {
        self.scope
    }

    /// Warnings accumulated while building this graph.
    pub fn diagnostics(&self) -> &BuildDiagnostics {
        &self.diagnostics
    }

    /// Looks up the merged node for an asset key.
    pub fn get(&self, key: &AssetKey) -> Result<&RemoteAssetNode, GraphError> {
        self.asset_nodes_by_key
            .get(key)
            .ok_or_else(|| GraphError::UnknownAssetKey { key: key.clone() })
    }

    /// Returns `true` if the graph has a merged node for `key`.
    pub fn has_asset(&self, key: &AssetKey) -> bool {
        self.asset_nodes_by_key.contains_key(key)
    }

    /// Iterates every merged node, in first-declaration order.
    pub fn asset_nodes(&self) -> impl Iterator<Item = &RemoteAssetNode> {
        self.asset_nodes_by_key.values()
    }

    /// Iterates every asset key, in first-declaration order.
    pub fn asset_keys(&self) -> impl Iterator<Item = &AssetKey> {
        self.asset_nodes_by_key.keys()
    }

    /// Number of merged asset nodes.
    pub fn asset_count(&self) -> usize {
        self.asset_nodes_by_key.len()
    }

    /// Keys of assets with a materializable declaration.
    pub fn materializable_asset_keys(&self) -> impl Iterator<Item = &AssetKey> {
        self.asset_nodes()
            .filter(|node| node.is_materializable())
            .map(RemoteAssetNode::key)
    }

    /// Keys of assets with an observable declaration.
    pub fn observable_asset_keys(&self) -> impl Iterator<Item = &AssetKey> {
        self.asset_nodes()
            .filter(|node| node.is_observable())
            .map(RemoteAssetNode::key)
    }

    /// Keys of assets every declaration of which is external.
    pub fn external_asset_keys(&self) -> impl Iterator<Item = &AssetKey> {
        self.asset_nodes()
            .filter(|node| node.is_external())
            .map(RemoteAssetNode::key)
    }

    /// Looks up a check snapshot by key.
    pub fn get_check(&self, key: &AssetCheckKey) -> Result<&AssetCheckNodeSnap, GraphError> {
        self.asset_checks_by_key
            .get(key)
            .ok_or_else(|| GraphError::UnknownAssetCheckKey { key: key.clone() })
    }

    /// Iterates every check snapshot, in declaration order.
    pub fn asset_checks(&self) -> impl Iterator<Item = &AssetCheckNodeSnap> {
        self.asset_checks_by_key.values()
    }

    /// Iterates every check key, in declaration order.
    pub fn asset_check_keys(&self) -> impl Iterator<Item = &AssetCheckKey> {
        self.asset_checks_by_key.keys()
    }

    /// Number of check snapshots.
    pub fn asset_check_count(&self) -> usize {
        self.asset_checks_by_key.len()
    }

    // -----------------------------------------------------------------------
    // Execution-set queries
    // -----------------------------------------------------------------------

    /// The full set of assets and checks that must execute atomically with
    /// `key`.
    pub fn get_execution_set_asset_and_check_keys(
        &self,
        key: &EntityKey,
    ) -> Result<&BTreeSet<EntityKey>, GraphError> {
        match key {
            EntityKey::Asset(asset_key) => {
                Ok(self.get(asset_key)?.execution_set_entity_keys())
            }
            EntityKey::Check(check_key) => self
                .asset_check_execution_sets_by_key
                .get(check_key)
                .ok_or_else(|| GraphError::UnknownAssetCheckKey {
                    key: check_key.clone(),
                }),
        }
    }

    // -----------------------------------------------------------------------
    // Job queries
    // -----------------------------------------------------------------------

    /// Keys of every asset belonging to `job_name`.
    pub fn asset_keys_for_job(&self, job_name: &str) -> BTreeSet<AssetKey> {
        self.asset_nodes()
            .filter(|node| node.job_names().iter().any(|name| name == job_name))
            .map(|node| node.key().clone())
            .collect()
    }

    /// Every job name any asset belongs to.
    pub fn all_job_names(&self) -> BTreeSet<&str> {
        self.asset_nodes()
            .flat_map(|node| node.job_names().iter().map(String::as_str))
            .collect()
    }

    /// Names of the jobs that materialize (or, for observable-only assets,
    /// observe) the given asset.
    pub fn get_materialization_job_names(
        &self,
        key: &AssetKey,
    ) -> Result<&[String], GraphError> {
        Ok(self.get(key)?.job_names())
    }

    /// Keys of materializable assets targeted by `job_name`.
    pub fn get_materialization_asset_keys_for_job(&self, job_name: &str) -> Vec<AssetKey> {
        self.asset_nodes()
            .filter(|node| node.is_materializable())
            .filter(|node| node.job_names().iter().any(|name| name == job_name))
            .map(|node| node.key().clone())
            .collect()
    }

    /// Name of the implicit job containing all the given assets. The
    /// implicit job targets every asset of a repository, so the answer is
    /// its well-known name.
    pub fn implicit_job_name_for_assets<'a>(
        &self,
        _asset_keys: impl IntoIterator<Item = &'a AssetKey>,
    ) -> &'static str {
        IMPLICIT_ASSET_JOB_NAME
    }

    // -----------------------------------------------------------------------
    // Repository-ownership queries
    // -----------------------------------------------------------------------

    /// The repository owning an entity: the priority repository for an asset
    /// key, or the declaring repository for a check key.
    pub fn get_repository_handle(&self, key: &EntityKey) -> Result<&RepositoryHandle, GraphError> {
        match key {
            EntityKey::Asset(asset_key) => {
                Ok(self.get(asset_key)?.priority_repository_handle())
            }
            EntityKey::Check(check_key) => self
                .repository_handles_by_asset_check_key
                .get(check_key)
                .ok_or_else(|| GraphError::UnknownAssetCheckKey {
                    key: check_key.clone(),
                }),
        }
    }

    /// Partitions an arbitrary key set by owning repository. Fails if any
    /// key resolves to no repository.
    pub fn split_entity_keys_by_repository(
        &self,
        keys: impl IntoIterator<Item = EntityKey>,
    ) -> Result<Vec<BTreeSet<EntityKey>>, GraphError> {
        let mut keys_by_repo: BTreeMap<RepositoryHandle, BTreeSet<EntityKey>> = BTreeMap::new();
        for key in keys {
            let handle = self.get_repository_handle(&key)?.clone();
            keys_by_repo.entry(handle).or_default().insert(key);
        }
        Ok(keys_by_repo.into_values().collect())
    }
}
