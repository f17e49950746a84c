//! Policy snapshots attached to asset declarations.
//!
//! These are opaque value types from the graph's point of view: the graph
//! selects which declaration's policy wins when duplicates exist, but never
//! interprets the policy contents.

use serde::{Deserialize, Serialize};

/// A freshness requirement: how stale an asset may be before it is flagged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreshnessPolicy {
    /// Maximum tolerated lag behind upstream data, in minutes.
    pub maximum_lag_minutes: f64,
    /// Cron schedule the lag is evaluated against, when not continuous.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cron_schedule: Option<String>,
    /// Timezone for `cron_schedule`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cron_schedule_timezone: Option<String>,
}

/// Whether an auto-materialize policy requests eager or lazy evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AutoMaterializePolicyType {
    /// Materialize as soon as upstream data changes.
    Eager,
    /// Materialize only when required to satisfy freshness.
    Lazy,
}

/// Policy controlling automatic materialization of an asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoMaterializePolicy {
    /// Eager or lazy evaluation.
    pub policy_type: AutoMaterializePolicyType,
    /// Rate limit on automatic materializations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_materializations_per_minute: Option<u32>,
}

/// Policy controlling how backfills over partitioned assets are chunked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackfillPolicy {
    /// Maximum number of partitions per run; `None` backfills everything in
    /// a single run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_partitions_per_run: Option<u64>,
}

impl BackfillPolicy {
    /// Returns `true` if the whole backfill happens in one run.
    pub fn is_single_run(&self) -> bool {
        self.max_partitions_per_run.is_none()
    }
}

/// Snapshot of a declarative automation condition.
///
/// The condition tree itself is evaluated elsewhere; the graph carries only
/// its identity and display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomationConditionSnap {
    /// Name of the condition (e.g. `"eager"`, `"on_cron"`).
    pub name: String,
    /// Optional user-provided label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl AutomationConditionSnap {
    /// Creates a condition snapshot with the given name and no label.
    pub fn named(name: impl Into<String>) -> Self {
        AutomationConditionSnap {
            name: name.into(),
            label: None,
        }
    }
}
