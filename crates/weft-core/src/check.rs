//! Asset check snapshots: one repository's declaration of a check bound to
//! an asset.

use serde::{Deserialize, Serialize};

use crate::key::{AssetCheckKey, AssetKey};
use crate::policy::AutomationConditionSnap;

/// One repository's declaration of an asset check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetCheckNodeSnap {
    /// Key of the check: owning asset key plus check name.
    pub key: AssetCheckKey,
    /// Human-oriented description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether a failure of this check blocks downstream materializations.
    #[serde(default)]
    pub blocking: bool,
    /// Declared automation condition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub automation_condition: Option<AutomationConditionSnap>,
    /// Identifier grouping this check with assets/checks that must execute
    /// together. `None` means the check executes alone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_set_identifier: Option<String>,
}

impl AssetCheckNodeSnap {
    /// Creates a check snapshot with the given key and every other property
    /// empty.
    pub fn new(key: AssetCheckKey) -> Self {
        AssetCheckNodeSnap {
            key,
            description: None,
            blocking: false,
            automation_condition: None,
            execution_set_identifier: None,
        }
    }

    /// Key of the asset this check validates.
    pub fn asset_key(&self) -> &AssetKey {
        &self.key.asset_key
    }

    /// Name of the check.
    pub fn name(&self) -> &str {
        &self.key.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_snap_exposes_owning_asset() {
        let key = AssetCheckKey::new(AssetKey::new(["events"]), "row_count");
        let snap = AssetCheckNodeSnap::new(key);
        assert_eq!(snap.asset_key(), &AssetKey::new(["events"]));
        assert_eq!(snap.name(), "row_count");
        assert!(!snap.blocking);
    }

    #[test]
    fn serde_roundtrip() {
        let mut snap = AssetCheckNodeSnap::new(AssetCheckKey::new(
            AssetKey::new(["warehouse", "events"]),
            "non_null",
        ));
        snap.blocking = true;
        snap.execution_set_identifier = Some("g1".to_string());

        let json = serde_json::to_string(&snap).unwrap();
        let back: AssetCheckNodeSnap = serde_json::from_str(&json).unwrap();
        assert_eq!(snap, back);
    }
}
