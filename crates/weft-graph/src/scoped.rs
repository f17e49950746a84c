//! Repository-scoped asset nodes: a snapshot tagged with its provenance.

use serde::{Deserialize, Serialize};

use weft_core::key::AssetKey;
use weft_core::repository::RepositoryHandle;
use weft_core::snap::AssetNodeSnap;

/// Names of the schedules and sensors targeting an asset's jobs.
///
/// Resolved only when the graph is built at workspace scope, where the
/// builder can see every schedule and sensor of the repository. Either list
/// may be empty; an asset in no scheduled job has both empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetingInstigators {
    /// Schedules targeting any of the asset's jobs.
    pub schedule_names: Vec<String>,
    /// Sensors targeting any of the asset's jobs.
    pub sensor_names: Vec<String>,
}

/// One asset snapshot paired with the repository that declared it.
///
/// `targeting` is `Some` exactly when the enclosing graph was built at
/// workspace scope; at repository scope there is nothing to resolve against
/// and the field is `None`. The two name lists always travel together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryScopedAssetNode {
    /// Repository that declared the snapshot.
    pub handle: RepositoryHandle,
    /// The declared asset snapshot.
    pub asset: AssetNodeSnap,
    /// Targeting schedules/sensors, populated at workspace scope only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub targeting: Option<TargetingInstigators>,
}

impl RepositoryScopedAssetNode {
    /// Wraps a snapshot with its provenance.
    pub fn new(
        handle: RepositoryHandle,
        asset: AssetNodeSnap,
        targeting: Option<TargetingInstigators>,
    ) -> Self {
        RepositoryScopedAssetNode {
            handle,
            asset,
            targeting,
        }
    }

    /// Key of the declared asset.
    pub fn key(&self) -> &AssetKey {
        &self.asset.asset_key
    }

    /// Names of schedules targeting this declaration's jobs, when resolved.
    pub fn targeting_schedule_names(&self) -> Option<&[String]> {
        self.targeting
            .as_ref()
            .map(|targeting| targeting.schedule_names.as_slice())
    }

    /// Names of sensors targeting this declaration's jobs, when resolved.
    pub fn targeting_sensor_names(&self) -> Option<&[String]> {
        self.targeting
            .as_ref()
            .map(|targeting| targeting.sensor_names.as_slice())
    }
}
