//! Repository and workspace input contracts.
//!
//! A [`RepositorySnapshot`] is the fully-hydrated view of one repository's
//! declarations: its identity plus every asset snapshot, check snapshot,
//! schedule, and sensor it exposes. A [`WorkspaceSnapshot`] aggregates the
//! code locations of a whole deployment, each of which may or may not have
//! loaded successfully. Fetching these from remote processes is out of scope;
//! they arrive here as plain data.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::check::AssetCheckNodeSnap;
use crate::snap::AssetNodeSnap;

/// Identity of a repository: the code location it is deployed in plus its
/// name within that location.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RepositoryHandle {
    /// Name of the code location.
    pub location_name: String,
    /// Name of the repository within the location.
    pub repository_name: String,
}

impl RepositoryHandle {
    /// Creates a handle from a location name and repository name.
    pub fn new(location_name: impl Into<String>, repository_name: impl Into<String>) -> Self {
        RepositoryHandle {
            location_name: location_name.into(),
            repository_name: repository_name.into(),
        }
    }
}

impl fmt::Display for RepositoryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.repository_name, self.location_name)
    }
}

/// Identity of a schedule or sensor within a repository.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InstigatorHandle {
    /// Repository the instigator is defined in.
    pub repository_handle: RepositoryHandle,
    /// Name of the schedule or sensor.
    pub instigator_name: String,
}

/// The slice of a schedule definition this core consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSnap {
    /// Name of the schedule.
    pub name: String,
    /// Name of the job the schedule targets.
    pub job_name: String,
    /// Cron expression the schedule runs on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cron_schedule: Option<String>,
}

/// The slice of a sensor definition this core consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorSnap {
    /// Name of the sensor.
    pub name: String,
    /// Name of the job the sensor targets.
    pub job_name: String,
}

/// Fully-hydrated view of one repository's declarations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositorySnapshot {
    /// Identity of the repository.
    pub handle: RepositoryHandle,
    /// Asset declarations.
    #[serde(default)]
    pub asset_node_snaps: Vec<AssetNodeSnap>,
    /// Asset check declarations.
    #[serde(default)]
    pub asset_check_node_snaps: Vec<AssetCheckNodeSnap>,
    /// Schedules defined in the repository.
    #[serde(default)]
    pub schedules: Vec<ScheduleSnap>,
    /// Sensors defined in the repository.
    #[serde(default)]
    pub sensors: Vec<SensorSnap>,
}

impl RepositorySnapshot {
    /// Creates an empty repository snapshot with the given handle.
    pub fn new(handle: RepositoryHandle) -> Self {
        RepositorySnapshot {
            handle,
            asset_node_snaps: Vec::new(),
            asset_check_node_snaps: Vec::new(),
            schedules: Vec::new(),
            sensors: Vec::new(),
        }
    }
}

/// One code location of a workspace, with the repositories it serves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeLocationSnapshot {
    /// Name of the code location.
    pub name: String,
    /// Repositories served by the location.
    #[serde(default)]
    pub repositories: Vec<RepositorySnapshot>,
}

/// A workspace entry for one code location.
///
/// `code_location` is `None` when the location failed to load; the entry is
/// kept so the failure is visible, but it contributes nothing to the graph.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CodeLocationEntry {
    /// The loaded location, or `None` on load failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_location: Option<CodeLocationSnapshot>,
    /// Rendered load error, when the location failed to load.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_error: Option<String>,
}

/// Snapshot of a whole deployment's code locations.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WorkspaceSnapshot {
    /// Entries keyed by code location name, in workspace definition order.
    #[serde(default)]
    pub code_location_entries: IndexMap<String, CodeLocationEntry>,
}

impl WorkspaceSnapshot {
    /// Iterates the successfully loaded code locations.
    pub fn code_locations(&self) -> impl Iterator<Item = &CodeLocationSnapshot> {
        self.code_location_entries
            .values()
            .filter_map(|entry| entry.code_location.as_ref())
    }

    /// Iterates every repository of every loaded code location.
    pub fn repositories(&self) -> impl Iterator<Item = &RepositorySnapshot> {
        self.code_locations()
            .flat_map(|location| location.repositories.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(name: &str, repo_names: &[&str]) -> CodeLocationSnapshot {
        CodeLocationSnapshot {
            name: name.to_string(),
            repositories: repo_names
                .iter()
                .map(|repo| RepositorySnapshot::new(RepositoryHandle::new(name, *repo)))
                .collect(),
        }
    }

    #[test]
    fn handle_display() {
        let handle = RepositoryHandle::new("prod", "analytics");
        assert_eq!(format!("{}", handle), "analytics@prod");
    }

    #[test]
    fn handles_are_totally_ordered() {
        let a = RepositoryHandle::new("alpha", "z");
        let b = RepositoryHandle::new("beta", "a");
        assert!(a < b);
    }

    #[test]
    fn workspace_iteration_skips_failed_locations() {
        let mut workspace = WorkspaceSnapshot::default();
        workspace.code_location_entries.insert(
            "prod".to_string(),
            CodeLocationEntry {
                code_location: Some(location("prod", &["analytics", "ingest"])),
                load_error: None,
            },
        );
        workspace.code_location_entries.insert(
            "broken".to_string(),
            CodeLocationEntry {
                code_location: None,
                load_error: Some("import failed".to_string()),
            },
        );

        assert_eq!(workspace.code_locations().count(), 1);
        let repos: Vec<&str> = workspace
            .repositories()
            .map(|repo| repo.handle.repository_name.as_str())
            .collect();
        assert_eq!(repos, ["analytics", "ingest"]);
    }

    #[test]
    fn serde_roundtrip() {
        let mut workspace = WorkspaceSnapshot::default();
        workspace.code_location_entries.insert(
            "prod".to_string(),
            CodeLocationEntry {
                code_location: Some(location("prod", &["analytics"])),
                load_error: None,
            },
        );

        let json = serde_json::to_string(&workspace).unwrap();
        let back: WorkspaceSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(workspace, back);
    }
}
