//! Asset node snapshots: one repository's immutable declaration of an asset.
//!
//! An [`AssetNodeSnap`] is the unit of input to the remote asset graph
//! builder. It records the asset's key, its declared parent edges, and every
//! per-declaration property (policies, partitioning, metadata, job
//! membership). Snapshots are plain serde value types; how they arrive from a
//! code location is out of scope here.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::key::AssetKey;
use crate::metadata::MetadataMap;
use crate::partitions::{PartitionMapping, PartitionsSnap};
use crate::policy::{
    AutoMaterializePolicy, AutomationConditionSnap, BackfillPolicy, FreshnessPolicy,
};

/// Group name applied to assets that do not declare one.
pub const DEFAULT_GROUP_NAME: &str = "default";

/// How an asset declaration can be executed.
///
/// Classified once at ingestion rather than re-derived from boolean flag
/// combinations at every accessor call. The variants are mutually exclusive:
/// a declaration is runnable as a materialization, runnable as an
/// observation, or not runnable at all (a pure source reference).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ExecutionType {
    /// The declaration can be materialized.
    Materialization,
    /// The declaration is a source asset that can be observed.
    Observation,
    /// The declaration cannot be executed at all.
    Unexecutable,
}

impl ExecutionType {
    /// Lowercase label used in diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionType::Materialization => "materialization",
            ExecutionType::Observation => "observation",
            ExecutionType::Unexecutable => "unexecutable",
        }
    }
}

/// A declared dependency edge: this asset consumes a parent asset, optionally
/// through a partition mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetParentEdge {
    /// Key of the upstream asset.
    pub parent_asset_key: AssetKey,
    /// How this asset's partitions map onto the parent's partitions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition_mapping: Option<PartitionMapping>,
}

impl AssetParentEdge {
    /// Creates an edge to `parent_asset_key` with no partition mapping.
    pub fn new(parent_asset_key: AssetKey) -> Self {
        AssetParentEdge {
            parent_asset_key,
            partition_mapping: None,
        }
    }
}

/// One repository's declaration of an asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetNodeSnap {
    /// Key of the declared asset.
    pub asset_key: AssetKey,
    /// Declared upstream edges.
    #[serde(default)]
    pub parent_edges: Vec<AssetParentEdge>,
    /// How this declaration can be executed.
    pub execution_type: ExecutionType,
    /// Names of jobs this asset belongs to.
    #[serde(default)]
    pub job_names: Vec<String>,
    /// Human-oriented description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Group name; `None` means the default group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
    /// Arbitrary metadata entries.
    #[serde(default)]
    pub metadata: MetadataMap,
    /// Tags attached to the declaration.
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    /// Owner identifiers (users or teams).
    #[serde(default)]
    pub owners: Vec<String>,
    /// Partitioning of the asset, if partitioned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partitions: Option<PartitionsSnap>,
    /// Declared freshness policy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub freshness_policy: Option<FreshnessPolicy>,
    /// Declared auto-materialize policy. Only meaningful for materializable
    /// declarations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_materialize_policy: Option<AutoMaterializePolicy>,
    /// Declared automation condition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub automation_condition: Option<AutomationConditionSnap>,
    /// Declared backfill policy. Only meaningful for materializable
    /// declarations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backfill_policy: Option<BackfillPolicy>,
    /// Interval between automatic observations, for observable declarations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_observe_interval_minutes: Option<f64>,
    /// Code version of the asset's compute function.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_version: Option<String>,
    /// Identifier grouping this declaration with others that must execute
    /// together. `None` means the asset executes alone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_set_identifier: Option<String>,
}

impl AssetNodeSnap {
    /// Creates a snapshot with the given key and execution type and every
    /// other property empty.
    pub fn new(asset_key: AssetKey, execution_type: ExecutionType) -> Self {
        AssetNodeSnap {
            asset_key,
            parent_edges: Vec::new(),
            execution_type,
            job_names: Vec::new(),
            description: None,
            group_name: None,
            metadata: MetadataMap::new(),
            tags: BTreeMap::new(),
            owners: Vec::new(),
            partitions: None,
            freshness_policy: None,
            auto_materialize_policy: None,
            automation_condition: None,
            backfill_policy: None,
            auto_observe_interval_minutes: None,
            code_version: None,
            execution_set_identifier: None,
        }
    }

    /// Returns `true` if this declaration can be materialized.
    pub fn is_materializable(&self) -> bool {
        self.execution_type == ExecutionType::Materialization
    }

    /// Returns `true` if this declaration is an observable source.
    pub fn is_observable(&self) -> bool {
        self.execution_type == ExecutionType::Observation
    }

    /// Returns `true` if this declaration can be executed in any way.
    pub fn is_executable(&self) -> bool {
        self.execution_type != ExecutionType::Unexecutable
    }

    /// Returns `true` if this declaration is external: computed outside the
    /// orchestrator rather than materialized by it.
    pub fn is_external(&self) -> bool {
        self.execution_type != ExecutionType::Materialization
    }

    /// Returns `true` if the asset is partitioned.
    pub fn is_partitioned(&self) -> bool {
        self.partitions.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(name: &str) -> AssetKey {
        AssetKey::new([name])
    }

    #[test]
    fn execution_type_predicates() {
        let mat = AssetNodeSnap::new(key("a"), ExecutionType::Materialization);
        assert!(mat.is_materializable());
        assert!(!mat.is_observable());
        assert!(mat.is_executable());
        assert!(!mat.is_external());

        let obs = AssetNodeSnap::new(key("b"), ExecutionType::Observation);
        assert!(!obs.is_materializable());
        assert!(obs.is_observable());
        assert!(obs.is_executable());
        assert!(obs.is_external());

        let unex = AssetNodeSnap::new(key("c"), ExecutionType::Unexecutable);
        assert!(!unex.is_materializable());
        assert!(!unex.is_observable());
        assert!(!unex.is_executable());
        assert!(unex.is_external());
    }

    #[test]
    fn new_snapshot_has_empty_properties() {
        let snap = AssetNodeSnap::new(key("a"), ExecutionType::Materialization);
        assert!(snap.parent_edges.is_empty());
        assert!(snap.job_names.is_empty());
        assert!(snap.execution_set_identifier.is_none());
        assert!(!snap.is_partitioned());
    }

    #[test]
    fn execution_type_labels() {
        assert_eq!(ExecutionType::Materialization.as_str(), "materialization");
        assert_eq!(ExecutionType::Observation.as_str(), "observation");
        assert_eq!(ExecutionType::Unexecutable.as_str(), "unexecutable");
    }

    #[test]
    fn serde_roundtrip_is_stable() {
        let mut snap = AssetNodeSnap::new(key("events"), ExecutionType::Materialization);
        snap.parent_edges
            .push(AssetParentEdge::new(key("raw_events")));
        snap.job_names.push("daily".to_string());
        snap.group_name = Some("ingest".to_string());
        snap.code_version = Some("v2".to_string());
        snap.execution_set_identifier = Some("dbt_run_1".to_string());

        let json = serde_json::to_string(&snap).unwrap();
        let back: AssetNodeSnap = serde_json::from_str(&json).unwrap();
        let json2 = serde_json::to_string(&back).unwrap();
        assert_eq!(json, json2);
        assert_eq!(snap, back);
    }

    #[test]
    fn optional_fields_are_omitted_from_json() {
        let snap = AssetNodeSnap::new(key("a"), ExecutionType::Unexecutable);
        let json = serde_json::to_string(&snap).unwrap();
        assert!(!json.contains("freshness_policy"));
        assert!(!json.contains("code_version"));
    }
}
